use ferrous_lookup_domain::{DnsAnswer, DomainError, RecordClass, RecordType};

/// Correlates an asynchronous answer with the sub-query that was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExternalHandle(pub u64);

/// Answer delivery from the resolver engine: `(handle, result_or_error)`.
pub type EngineOutcome = Result<DnsAnswer, DomainError>;

/// The collaborator that actually talks DNS.
pub trait ResolverEngine: Send + Sync {
    fn dispatch(
        &self,
        name: &str,
        record_type: RecordType,
        record_class: RecordClass,
    ) -> Result<ExternalHandle, DomainError>;

    /// Best-effort and asynchronous; an answer may still arrive afterwards.
    fn cancel(&self, handle: ExternalHandle);
}
