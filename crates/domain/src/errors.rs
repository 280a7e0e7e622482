use crate::{ResourceKind, SubQueryState};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Allocation failed for {0}")]
    AllocationFailure(ResourceKind),

    #[error("Dispatch failed: {0}")]
    DispatchFailure(String),

    #[error("Lookup canceled")]
    Canceled,

    #[error("Query timeout")]
    QueryTimeout,

    #[error("Timer deadline out of range: {0} ms")]
    InvalidDeadline(u128),

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid sub-query transition: {from} -> {to}")]
    InvalidTransition {
        from: SubQueryState,
        to: SubQueryState,
    },

    #[error("Unknown dispatch handle: {0}")]
    UnknownHandle(u64),

    #[error("Unknown request: {0}")]
    UnknownRequest(u64),
}
