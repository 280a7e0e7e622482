use crate::request::RequestId;
use ferrous_lookup_domain::DomainError;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Deadline for the whole request.
    Timeout,
    /// Zero-delay timer used to deliver a completion from reactor context.
    LocalCallback,
}

/// What the reactor hands back when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    pub request: RequestId,
    pub kind: TimerKind,
}

/// Timer primitives of the event loop the lookups run on.
///
/// Both calls are made from the reactor's own callback context only.
/// `disarm_timer` on a handle that already fired or was already disarmed is a no-op.
pub trait Reactor: Send + Sync {
    fn arm_timer(&self, deadline: Duration, token: TimerToken) -> Result<TimerHandle, DomainError>;

    fn disarm_timer(&self, handle: TimerHandle);
}
