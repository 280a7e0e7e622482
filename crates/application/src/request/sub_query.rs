use super::RequestId;
use crate::ports::{Allocation, ExternalHandle, SharedAllocator};
use ferrous_lookup_domain::{
    DnsAnswer, DomainError, RecordClass, RecordType, ResourceKind, SubQueryState,
};
use tracing::{trace, warn};

/// One elementary question (name + type + class) of a request.
///
/// `result` is present exactly when the state is `Answered`. The owner is
/// referenced by id only; a sub-query never keeps its request alive.
#[derive(Debug)]
pub struct SubQuery {
    record_type: RecordType,
    record_class: RecordClass,
    state: SubQueryState,
    external_handle: Option<ExternalHandle>,
    result: Option<DnsAnswer>,
    error: Option<DomainError>,
    owner: RequestId,
    _allocation: Allocation,
}

impl SubQuery {
    pub(crate) fn new(
        allocator: &SharedAllocator,
        owner: RequestId,
        record_type: RecordType,
        record_class: RecordClass,
    ) -> Result<Self, DomainError> {
        let allocation = Allocation::acquire(
            allocator,
            ResourceKind::SubQuery,
            std::mem::size_of::<SubQuery>(),
        )?;
        Ok(Self {
            record_type,
            record_class,
            state: SubQueryState::NotSent,
            external_handle: None,
            result: None,
            error: None,
            owner,
            _allocation: allocation,
        })
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn record_class(&self) -> RecordClass {
        self.record_class
    }

    pub fn state(&self) -> SubQueryState {
        self.state
    }

    pub fn external_handle(&self) -> Option<ExternalHandle> {
        self.external_handle
    }

    pub fn result(&self) -> Option<&DnsAnswer> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&DomainError> {
        self.error.as_ref()
    }

    pub fn owner(&self) -> RequestId {
        self.owner
    }

    pub(crate) fn mark_sent(&mut self, handle: ExternalHandle) -> Result<(), DomainError> {
        self.transition(SubQueryState::Sent)?;
        self.external_handle = Some(handle);
        Ok(())
    }

    pub(crate) fn attach_answer(&mut self, answer: DnsAnswer) -> Result<(), DomainError> {
        self.transition(SubQueryState::Answered)?;
        self.result = Some(answer);
        Ok(())
    }

    pub(crate) fn mark_failed(&mut self, error: DomainError) -> Result<(), DomainError> {
        self.transition(SubQueryState::Failed)?;
        self.error = Some(error);
        Ok(())
    }

    pub(crate) fn mark_canceled(&mut self, reason: DomainError) -> Result<(), DomainError> {
        self.transition(SubQueryState::Canceled)?;
        self.error = Some(reason);
        Ok(())
    }

    fn transition(&mut self, next: SubQueryState) -> Result<(), DomainError> {
        if !self.state.can_transition_to(next) {
            warn!(
                request = %self.owner,
                record_type = %self.record_type,
                from = %self.state,
                to = %next,
                "Rejected sub-query transition"
            );
            return Err(DomainError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        trace!(
            request = %self.owner,
            record_type = %self.record_type,
            from = %self.state,
            to = %next,
            "Sub-query transition"
        );
        self.state = next;
        Ok(())
    }

    /// Releases the owned result and this sub-query's own allocation.
    /// Siblings are untouched: walking the chain is the request's job.
    pub(crate) fn release(self) {
        trace!(
            request = %self.owner,
            record_type = %self.record_type,
            state = %self.state,
            "Sub-query released"
        );
    }
}
