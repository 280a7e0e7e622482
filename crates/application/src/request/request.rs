use super::bundling::bundled_complement;
use super::completion::{Completion, CompletionCallback, CompletionKind, Reply, UserContext};
use super::owned::{ArmedTimer, OwnedExtensions, OwnedName};
use super::SubQuery;
use crate::context::LookupContext;
use crate::ports::{
    Allocation, EngineOutcome, ExternalHandle, Reactor, ResolverEngine, SharedAllocator,
    TimerKind, TimerToken,
};
use ferrous_lookup_domain::{
    DispatchMode, DomainError, Extensions, RecordClass, RecordType, ResourceKind, SubQueryState,
    TransactionId,
};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handles of sub-queries that went out in one dispatch round.
pub type Dispatched = SmallVec<[ExternalHandle; 2]>;

/// Caller-visible unit of work: one name, one or two sub-queries.
///
/// Every owned resource holds an allocator lease. Teardown runs once, in a
/// fixed order, whether it is reached through [`Request::finalize`] or by
/// dropping a partially built request.
pub struct Request {
    id: RequestId,
    transaction_id: TransactionId,
    canceled: bool,
    finalized: bool,
    extensions: Option<OwnedExtensions>,
    sub_queries: SmallVec<[SubQuery; 2]>,
    cursor: usize,
    timeout_timer: Option<ArmedTimer>,
    local_callback_timer: Option<ArmedTimer>,
    deferred: Option<CompletionKind>,
    name: Option<OwnedName>,
    user_context: Option<UserContext>,
    completion_callback: Option<CompletionCallback>,
    allocator: SharedAllocator,
    engine: Arc<dyn ResolverEngine>,
    reactor: Arc<dyn Reactor>,
    allocation: Option<Allocation>,
}

impl Request {
    /// Builds a request for `name`/`record_type`, bundling the complementary
    /// address family when the extensions ask for both.
    ///
    /// Nothing stays allocated when this returns an error: a partially built
    /// request is dropped, which runs the regular teardown.
    pub fn new(
        context: &LookupContext,
        id: RequestId,
        name: &str,
        record_type: RecordType,
        extensions: &Extensions,
    ) -> Result<Self, DomainError> {
        validate_name(name)?;

        let allocation = Allocation::acquire(
            &context.allocator,
            ResourceKind::Request,
            std::mem::size_of::<Request>(),
        )?;

        let mut request = Self {
            id,
            transaction_id: TransactionId::random(),
            canceled: false,
            finalized: false,
            extensions: None,
            sub_queries: SmallVec::new(),
            cursor: 0,
            timeout_timer: None,
            local_callback_timer: None,
            deferred: None,
            name: None,
            user_context: None,
            completion_callback: None,
            allocator: Arc::clone(&context.allocator),
            engine: Arc::clone(&context.engine),
            reactor: Arc::clone(&context.reactor),
            allocation: Some(allocation),
        };

        request.name = Some(OwnedName::copy(&request.allocator, name)?);
        request.extensions = Some(OwnedExtensions::deep_copy(&request.allocator, extensions)?);

        request.push_sub_query(record_type, RecordClass::IN)?;
        request.cursor = 0;

        let complement = request
            .extensions
            .as_ref()
            .and_then(|copy| bundled_complement(copy.value(), record_type));
        if let Some(complement) = complement {
            request.push_sub_query(complement, RecordClass::IN)?;
        }

        debug!(
            request = %id,
            txid = %request.transaction_id,
            name = %name,
            record_type = %record_type,
            sub_queries = request.sub_queries.len(),
            "Request created"
        );
        Ok(request)
    }

    /// Appends a sub-query to the chain. The chain is untouched when the
    /// allocation fails or the request was already canceled.
    pub fn push_sub_query(
        &mut self,
        record_type: RecordType,
        record_class: RecordClass,
    ) -> Result<&mut SubQuery, DomainError> {
        if self.canceled || self.finalized {
            return Err(DomainError::Canceled);
        }

        let sub_query = SubQuery::new(&self.allocator, self.id, record_type, record_class)?;
        let index = self.sub_queries.len();
        self.sub_queries.push(sub_query);
        Ok(&mut self.sub_queries[index])
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    pub fn name(&self) -> &str {
        self.name.as_ref().map(OwnedName::as_str).unwrap_or_default()
    }

    pub fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref().map(OwnedExtensions::value)
    }

    pub fn sub_queries(&self) -> &[SubQuery] {
        &self.sub_queries
    }

    /// Sub-query the sequential dispatcher is working on, if any is left.
    pub fn current(&self) -> Option<&SubQuery> {
        self.sub_queries.get(self.cursor)
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    pub fn has_timer(&self, kind: TimerKind) -> bool {
        match kind {
            TimerKind::Timeout => self.timeout_timer.is_some(),
            TimerKind::LocalCallback => self.local_callback_timer.is_some(),
        }
    }

    pub fn deferred_completion(&self) -> Option<CompletionKind> {
        self.deferred
    }

    pub fn set_completion(
        &mut self,
        user_context: Option<UserContext>,
        callback: CompletionCallback,
    ) {
        self.user_context = user_context;
        self.completion_callback = Some(callback);
    }

    /// Hands sub-queries to the resolver engine.
    ///
    /// Concurrent mode sends everything still `NotSent`. Sequential mode keeps
    /// one sub-query in flight, moving the cursor past settled ones. A rejected
    /// hand-off marks that sub-query `Failed`. Nothing goes out once canceled.
    pub fn dispatch(&mut self, mode: DispatchMode) -> Dispatched {
        let mut sent = Dispatched::new();
        if self.canceled || self.finalized {
            return sent;
        }

        let name = self.name.as_ref().map(OwnedName::as_str).unwrap_or_default();
        let engine = self.engine.as_ref();

        match mode {
            DispatchMode::Concurrent => {
                for sub_query in self
                    .sub_queries
                    .iter_mut()
                    .filter(|sq| sq.state() == SubQueryState::NotSent)
                {
                    hand_off(engine, name, sub_query, &mut sent);
                }
            }
            DispatchMode::Sequential => {
                while let Some(state) = self.sub_queries.get(self.cursor).map(SubQuery::state) {
                    match state {
                        SubQueryState::NotSent => {
                            let sub_query = &mut self.sub_queries[self.cursor];
                            hand_off(engine, name, sub_query, &mut sent);
                            if sub_query.state() == SubQueryState::Sent {
                                break;
                            }
                            self.cursor += 1;
                        }
                        SubQueryState::Sent => break,
                        _ => self.cursor += 1,
                    }
                }
            }
        }

        sent
    }

    /// Attaches the engine's outcome to the sub-query dispatched under `handle`.
    /// Returns the chain index that transitioned.
    pub fn attach_outcome(
        &mut self,
        handle: ExternalHandle,
        outcome: EngineOutcome,
    ) -> Result<usize, DomainError> {
        let index = self
            .sub_queries
            .iter()
            .position(|sq| sq.external_handle() == Some(handle))
            .ok_or(DomainError::UnknownHandle(handle.0))?;

        let sub_query = &mut self.sub_queries[index];
        match outcome {
            Ok(answer) => sub_query.attach_answer(answer)?,
            Err(error) => sub_query.mark_failed(error)?,
        }
        Ok(index)
    }

    /// Marks the request canceled. In-flight sub-queries become `Canceled` and
    /// the engine is told to abandon them; answered ones keep their answers.
    /// Returns how many sub-queries were abandoned. Does not free anything.
    pub fn cancel(&mut self) -> usize {
        self.abandon(DomainError::Canceled)
    }

    /// Cancellation triggered by the request deadline.
    pub fn time_out(&mut self) -> usize {
        self.abandon(DomainError::QueryTimeout)
    }

    fn abandon(&mut self, reason: DomainError) -> usize {
        if self.canceled {
            return 0;
        }
        self.canceled = true;

        let mut abandoned = 0;
        for sub_query in self
            .sub_queries
            .iter_mut()
            .filter(|sq| sq.state() == SubQueryState::Sent)
        {
            if let Some(handle) = sub_query.external_handle() {
                self.engine.cancel(handle);
            }
            if sub_query.mark_canceled(reason.clone()).is_ok() {
                abandoned += 1;
            }
        }

        debug!(request = %self.id, reason = %reason, abandoned, "Request canceled");
        abandoned
    }

    /// True once nothing is in flight and nothing is left to send.
    pub fn is_complete(&self) -> bool {
        let in_flight = self
            .sub_queries
            .iter()
            .any(|sq| sq.state() == SubQueryState::Sent);
        let unsent = self
            .sub_queries
            .iter()
            .any(|sq| sq.state() == SubQueryState::NotSent);
        !in_flight && (self.canceled || !unsent)
    }

    pub fn completion_kind(&self) -> CompletionKind {
        if self.canceled {
            CompletionKind::Canceled
        } else if self
            .sub_queries
            .iter()
            .all(|sq| sq.state() == SubQueryState::Failed)
        {
            CompletionKind::Error
        } else {
            CompletionKind::Complete
        }
    }

    /// Arms (or re-arms) one of the two request timers.
    pub fn arm_timer(&mut self, kind: TimerKind, deadline: Duration) -> Result<(), DomainError> {
        if self.canceled {
            return Err(DomainError::Canceled);
        }

        let allocation = Allocation::acquire(
            &self.allocator,
            ResourceKind::Timer,
            std::mem::size_of::<ArmedTimer>(),
        )?;
        let token = TimerToken {
            request: self.id,
            kind,
        };
        let handle = self.reactor.arm_timer(deadline, token)?;
        let armed = ArmedTimer::new(handle, allocation);

        let slot = match kind {
            TimerKind::Timeout => &mut self.timeout_timer,
            TimerKind::LocalCallback => &mut self.local_callback_timer,
        };
        if let Some(previous) = slot.replace(armed) {
            self.reactor.disarm_timer(previous.handle());
        }
        Ok(())
    }

    /// Schedules delivery of `kind` through a zero-delay local callback timer,
    /// so the completion callback runs from reactor context.
    pub fn defer_completion(&mut self, kind: CompletionKind) -> Result<(), DomainError> {
        self.arm_timer(TimerKind::LocalCallback, Duration::ZERO)?;
        self.deferred = Some(kind);
        Ok(())
    }

    /// Releases a timer the reactor has already fired. The reactor no longer
    /// knows the handle, so it is not disarmed.
    pub fn timer_fired(&mut self, kind: TimerKind) -> bool {
        let slot = match kind {
            TimerKind::Timeout => &mut self.timeout_timer,
            TimerKind::LocalCallback => &mut self.local_callback_timer,
        };
        slot.take().is_some()
    }

    pub fn take_callback(&mut self) -> Option<CompletionCallback> {
        self.completion_callback.take()
    }

    /// Copies the combined result out and hands the user context back.
    pub fn build_completion(&mut self, kind: CompletionKind) -> Completion {
        Completion {
            request_id: self.id,
            transaction_id: self.transaction_id,
            name: Arc::from(self.name()),
            kind,
            replies: self.sub_queries.iter().map(Reply::from).collect(),
            user_context: self.user_context.take(),
        }
    }

    /// Single teardown entry point.
    pub fn finalize(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;

        drop(self.extensions.take());

        let released = self.sub_queries.len();
        for sub_query in self.sub_queries.drain(..) {
            sub_query.release();
        }
        self.cursor = 0;

        if let Some(timer) = self.timeout_timer.take() {
            self.reactor.disarm_timer(timer.handle());
        }
        if let Some(timer) = self.local_callback_timer.take() {
            self.reactor.disarm_timer(timer.handle());
        }

        drop(self.name.take());

        if self.completion_callback.is_some() {
            warn!(request = %self.id, "Request torn down without delivering its completion");
        }
        self.completion_callback = None;
        self.user_context = None;

        drop(self.allocation.take());

        debug!(
            request = %self.id,
            txid = %self.transaction_id,
            sub_queries = released,
            "Request finalized"
        );
    }
}

impl Drop for Request {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("transaction_id", &self.transaction_id)
            .field("name", &self.name())
            .field("canceled", &self.canceled)
            .field("cursor", &self.cursor)
            .field("sub_queries", &self.sub_queries)
            .finish_non_exhaustive()
    }
}

fn hand_off(
    engine: &dyn ResolverEngine,
    name: &str,
    sub_query: &mut SubQuery,
    sent: &mut Dispatched,
) {
    match engine.dispatch(name, sub_query.record_type(), sub_query.record_class()) {
        Ok(handle) => {
            if sub_query.mark_sent(handle).is_ok() {
                sent.push(handle);
            }
        }
        Err(error) => {
            warn!(
                request = %sub_query.owner(),
                record_type = %sub_query.record_type(),
                error = %error,
                "Resolver engine rejected sub-query"
            );
            let _ = sub_query.mark_failed(error);
        }
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name == "." {
        return Ok(());
    }
    let trimmed = name.strip_suffix('.').unwrap_or(name);
    if trimmed.is_empty() {
        return Err(DomainError::InvalidDomainName("empty name".into()));
    }
    if trimmed.len() > MAX_NAME_LEN {
        return Err(DomainError::InvalidDomainName(format!(
            "{} exceeds {} characters",
            name, MAX_NAME_LEN
        )));
    }
    if trimmed
        .split('.')
        .any(|label| label.is_empty() || label.len() > MAX_LABEL_LEN)
    {
        return Err(DomainError::InvalidDomainName(name.to_string()));
    }
    Ok(())
}
