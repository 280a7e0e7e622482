use ferrous_lookup_application::ports::{Reactor, TimerHandle, TimerToken};
use ferrous_lookup_domain::DomainError;
use rustc_hash::FxHashMap;
use std::future::poll_fn;
use std::sync::Mutex;
use std::task::{Context, Poll, Waker};
use std::time::Duration;
use tokio_util::time::{delay_queue, DelayQueue};
use tracing::{trace, warn};

/// Longest deadline the wheel accepts; `DelayQueue` panics past roughly two years.
const MAX_DEADLINE: Duration = Duration::from_secs(365 * 24 * 60 * 60);

struct TimerWheel {
    next_handle: u64,
    queue: DelayQueue<(TimerHandle, TimerToken)>,
    keys: FxHashMap<TimerHandle, delay_queue::Key>,
    waker: Option<Waker>,
}

/// Timer reactor backed by a tokio `DelayQueue`.
///
/// Must be armed from inside a tokio runtime. Expired tokens are pulled by the
/// event loop through [`TokioReactor::expired`].
pub struct TokioReactor {
    wheel: Mutex<TimerWheel>,
}

impl TokioReactor {
    pub fn new() -> Self {
        Self {
            wheel: Mutex::new(TimerWheel {
                next_handle: 0,
                queue: DelayQueue::new(),
                keys: FxHashMap::default(),
                waker: None,
            }),
        }
    }

    pub fn armed(&self) -> usize {
        self.wheel.lock().map(|wheel| wheel.keys.len()).unwrap_or(0)
    }

    /// Next expired timer. Stays pending while nothing is armed.
    pub async fn expired(&self) -> TimerToken {
        poll_fn(|cx| self.poll_expired(cx)).await
    }

    pub fn poll_expired(&self, cx: &mut Context<'_>) -> Poll<TimerToken> {
        let Ok(mut wheel) = self.wheel.lock() else {
            return Poll::Pending;
        };

        match wheel.queue.poll_expired(cx) {
            Poll::Ready(Some(expired)) => {
                let (handle, token) = expired.into_inner();
                wheel.keys.remove(&handle);
                trace!(timer = handle.0, request = %token.request, kind = ?token.kind, "Timer fired");
                Poll::Ready(token)
            }
            Poll::Ready(None) | Poll::Pending => {
                wheel.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl Default for TokioReactor {
    fn default() -> Self {
        Self::new()
    }
}

impl Reactor for TokioReactor {
    fn arm_timer(&self, deadline: Duration, token: TimerToken) -> Result<TimerHandle, DomainError> {
        if deadline > MAX_DEADLINE {
            warn!(request = %token.request, kind = ?token.kind, ?deadline, "Timer deadline out of range");
            return Err(DomainError::InvalidDeadline(deadline.as_millis()));
        }

        let mut wheel = self
            .wheel
            .lock()
            .map_err(|_| DomainError::DispatchFailure("timer wheel poisoned".into()))?;

        wheel.next_handle += 1;
        let handle = TimerHandle(wheel.next_handle);
        let key = wheel.queue.insert((handle, token), deadline);
        wheel.keys.insert(handle, key);

        if let Some(waker) = wheel.waker.take() {
            waker.wake();
        }
        trace!(timer = handle.0, request = %token.request, kind = ?token.kind, ?deadline, "Timer armed");
        Ok(handle)
    }

    fn disarm_timer(&self, handle: TimerHandle) {
        let Ok(mut wheel) = self.wheel.lock() else {
            return;
        };
        // unknown handles already fired or were disarmed
        if let Some(key) = wheel.keys.remove(&handle) {
            wheel.queue.remove(&key);
            trace!(timer = handle.0, "Timer disarmed");
        }
    }
}
