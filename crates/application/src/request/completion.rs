use super::{RequestId, SubQuery};
use ferrous_lookup_domain::{
    DnsAnswer, DomainError, RecordClass, RecordType, SubQueryState, TransactionId,
};
use std::any::Any;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

/// Opaque caller value handed back with the final completion.
pub type UserContext = Arc<dyn Any + Send + Sync>;

/// Invoked exactly once per request that reaches final completion.
pub type CompletionCallback = Box<dyn FnOnce(Completion) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    /// Every sub-query settled and at least one was answered.
    Complete,
    /// Every sub-query failed.
    Error,
    /// The caller canceled the request.
    Canceled,
    /// The request deadline fired first.
    Timeout,
}

impl CompletionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionKind::Complete => "complete",
            CompletionKind::Error => "error",
            CompletionKind::Canceled => "canceled",
            CompletionKind::Timeout => "timeout",
        }
    }
}

impl fmt::Display for CompletionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one sub-query, copied out before the request is torn down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub record_type: RecordType,
    pub record_class: RecordClass,
    pub state: SubQueryState,
    pub answer: Option<DnsAnswer>,
    pub error: Option<DomainError>,
}

impl From<&SubQuery> for Reply {
    fn from(sub_query: &SubQuery) -> Self {
        Self {
            record_type: sub_query.record_type(),
            record_class: sub_query.record_class(),
            state: sub_query.state(),
            answer: sub_query.result().cloned(),
            error: sub_query.error().cloned(),
        }
    }
}

/// Combined result of a request. Replies follow chain order (requested type
/// first), independent of the order answers arrived in.
pub struct Completion {
    pub request_id: RequestId,
    pub transaction_id: TransactionId,
    pub name: Arc<str>,
    pub kind: CompletionKind,
    pub replies: Vec<Reply>,
    pub user_context: Option<UserContext>,
}

impl Completion {
    pub fn addresses(&self) -> Vec<IpAddr> {
        self.replies
            .iter()
            .filter_map(|reply| reply.answer.as_ref())
            .flat_map(DnsAnswer::addresses)
            .collect()
    }

    pub fn answered(&self) -> usize {
        self.replies
            .iter()
            .filter(|reply| reply.state == SubQueryState::Answered)
            .count()
    }

    pub fn user_context_as<T: Any>(&self) -> Option<&T> {
        self.user_context.as_deref()?.downcast_ref::<T>()
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("request_id", &self.request_id)
            .field("transaction_id", &self.transaction_id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("replies", &self.replies)
            .field("has_user_context", &self.user_context.is_some())
            .finish()
    }
}
