use ferrous_lookup_application::ports::{
    AllocationId, ExternalHandle, MemoryAllocator, Reactor, ResolverEngine, TimerHandle,
    TimerKind, TimerToken,
};
use ferrous_lookup_application::{Completion, CompletionCallback, RequestId};
use ferrous_lookup_domain::{
    AnswerRecord, DnsAnswer, DomainError, Extensions, RecordClass, RecordType, ResourceKind,
    RETURN_BOTH_V4_AND_V6,
};
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

pub fn both_families() -> Extensions {
    Extensions::new().with_flag(RETURN_BOTH_V4_AND_V6, true)
}

pub fn address_answer(name: &str, ip: &str) -> DnsAnswer {
    let ip: IpAddr = ip.parse().unwrap();
    DnsAnswer::no_error(vec![AnswerRecord::address(name, ip, 300)])
}

// ============================================================================
// TrackingAllocator
// ============================================================================

#[derive(Default)]
struct TrackingState {
    next_id: u64,
    attempts: usize,
    live: HashMap<u64, (ResourceKind, usize)>,
    allocations: usize,
    deallocations: usize,
    double_frees: usize,
    history: Vec<ResourceKind>,
    fail_at: Option<usize>,
    fail_kind: Option<ResourceKind>,
}

/// Records every allocate/deallocate pair and can be told to fail.
#[derive(Default)]
pub struct TrackingAllocator {
    state: Mutex<TrackingState>,
}

impl TrackingAllocator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The `n`th allocation attempt (1-based) fails.
    pub fn failing_at(n: usize) -> Arc<Self> {
        let allocator = Self::default();
        allocator.state.lock().unwrap().fail_at = Some(n);
        Arc::new(allocator)
    }

    /// Every allocation of `kind` fails.
    pub fn failing_on(kind: ResourceKind) -> Arc<Self> {
        let allocator = Self::default();
        allocator.state.lock().unwrap().fail_kind = Some(kind);
        Arc::new(allocator)
    }

    pub fn live(&self) -> usize {
        self.state.lock().unwrap().live.len()
    }

    pub fn live_of(&self, kind: ResourceKind) -> usize {
        self.state
            .lock()
            .unwrap()
            .live
            .values()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    pub fn allocations(&self) -> usize {
        self.state.lock().unwrap().allocations
    }

    pub fn deallocations(&self) -> usize {
        self.state.lock().unwrap().deallocations
    }

    pub fn double_frees(&self) -> usize {
        self.state.lock().unwrap().double_frees
    }

    /// Kinds of successful allocations, in order.
    pub fn history(&self) -> Vec<ResourceKind> {
        self.state.lock().unwrap().history.clone()
    }

    pub fn assert_clean(&self) {
        let state = self.state.lock().unwrap();
        assert!(state.live.is_empty(), "leaked: {:?}", state.live);
        assert_eq!(state.double_frees, 0, "double free detected");
        assert_eq!(state.allocations, state.deallocations);
    }
}

impl MemoryAllocator for TrackingAllocator {
    fn allocate(&self, kind: ResourceKind, size: usize) -> Option<AllocationId> {
        let mut state = self.state.lock().unwrap();
        state.attempts += 1;
        if state.fail_at == Some(state.attempts) || state.fail_kind == Some(kind) {
            return None;
        }
        state.next_id += 1;
        let id = state.next_id;
        state.live.insert(id, (kind, size));
        state.allocations += 1;
        state.history.push(kind);
        Some(AllocationId(id))
    }

    fn deallocate(&self, kind: ResourceKind, id: AllocationId) {
        let mut state = self.state.lock().unwrap();
        match state.live.remove(&id.0) {
            Some((allocated_kind, _)) => {
                assert_eq!(allocated_kind, kind, "kind mismatch on deallocate");
                state.deallocations += 1;
            }
            None => state.double_frees += 1,
        }
    }
}

// ============================================================================
// MockEngine
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub name: String,
    pub record_type: RecordType,
    pub record_class: RecordClass,
    pub handle: ExternalHandle,
}

#[derive(Default)]
struct EngineState {
    next_handle: u64,
    dispatched: Vec<Dispatch>,
    canceled: Vec<ExternalHandle>,
    reject: HashSet<RecordType>,
}

/// Records hand-offs; answers are delivered by the test through the driver.
#[derive(Default)]
pub struct MockEngine {
    state: Mutex<EngineState>,
}

impl MockEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reject(&self, record_type: RecordType) {
        self.state.lock().unwrap().reject.insert(record_type);
    }

    pub fn dispatched(&self) -> Vec<Dispatch> {
        self.state.lock().unwrap().dispatched.clone()
    }

    pub fn dispatch_count(&self) -> usize {
        self.state.lock().unwrap().dispatched.len()
    }

    /// Handle of the most recent dispatch of `record_type`.
    pub fn handle_for(&self, record_type: RecordType) -> ExternalHandle {
        self.state
            .lock()
            .unwrap()
            .dispatched
            .iter()
            .rev()
            .find(|d| d.record_type == record_type)
            .map(|d| d.handle)
            .unwrap_or_else(|| panic!("{} was never dispatched", record_type))
    }

    pub fn canceled(&self) -> Vec<ExternalHandle> {
        self.state.lock().unwrap().canceled.clone()
    }
}

impl ResolverEngine for MockEngine {
    fn dispatch(
        &self,
        name: &str,
        record_type: RecordType,
        record_class: RecordClass,
    ) -> Result<ExternalHandle, DomainError> {
        let mut state = self.state.lock().unwrap();
        if state.reject.contains(&record_type) {
            return Err(DomainError::DispatchFailure(format!(
                "{} rejected",
                record_type
            )));
        }
        state.next_handle += 1;
        let handle = ExternalHandle(state.next_handle);
        state.dispatched.push(Dispatch {
            name: name.to_string(),
            record_type,
            record_class,
            handle,
        });
        Ok(handle)
    }

    fn cancel(&self, handle: ExternalHandle) {
        self.state.lock().unwrap().canceled.push(handle);
    }
}

// ============================================================================
// MockReactor
// ============================================================================

#[derive(Default)]
struct ReactorState {
    next_handle: u64,
    armed: HashMap<TimerHandle, (Duration, TimerToken)>,
    disarmed: Vec<TimerHandle>,
    stale_disarms: usize,
}

/// Keeps armed timers in a table; tests fire them by hand.
#[derive(Default)]
pub struct MockReactor {
    state: Mutex<ReactorState>,
}

impl MockReactor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn armed_count(&self) -> usize {
        self.state.lock().unwrap().armed.len()
    }

    pub fn armed_deadline(&self, request: RequestId, kind: TimerKind) -> Option<Duration> {
        self.state
            .lock()
            .unwrap()
            .armed
            .values()
            .find(|(_, token)| token.request == request && token.kind == kind)
            .map(|(deadline, _)| *deadline)
    }

    pub fn disarm_count(&self) -> usize {
        self.state.lock().unwrap().disarmed.len()
    }

    pub fn stale_disarms(&self) -> usize {
        self.state.lock().unwrap().stale_disarms
    }

    /// Simulates expiry: the timer leaves the table and its token is returned.
    pub fn fire(&self, request: RequestId, kind: TimerKind) -> Option<TimerToken> {
        let mut state = self.state.lock().unwrap();
        let handle = state
            .armed
            .iter()
            .find(|(_, (_, token))| token.request == request && token.kind == kind)
            .map(|(handle, _)| *handle)?;
        state.armed.remove(&handle).map(|(_, token)| token)
    }
}

impl Reactor for MockReactor {
    fn arm_timer(&self, deadline: Duration, token: TimerToken) -> Result<TimerHandle, DomainError> {
        let mut state = self.state.lock().unwrap();
        state.next_handle += 1;
        let handle = TimerHandle(state.next_handle);
        state.armed.insert(handle, (deadline, token));
        Ok(handle)
    }

    fn disarm_timer(&self, handle: TimerHandle) {
        let mut state = self.state.lock().unwrap();
        if state.armed.remove(&handle).is_some() {
            state.disarmed.push(handle);
        } else {
            state.stale_disarms += 1;
        }
    }
}

// ============================================================================
// Completions
// ============================================================================

/// Collects completions delivered to callbacks built by [`Completions::callback`].
#[derive(Clone, Default)]
pub struct Completions(Arc<Mutex<Vec<Completion>>>);

impl Completions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> CompletionCallback {
        let sink = Arc::clone(&self.0);
        Box::new(move |completion| sink.lock().unwrap().push(completion))
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn take(&self) -> Vec<Completion> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}
