#![allow(dead_code)]

use ferrous_lookup_application::ports::{ExternalHandle, ResolverEngine};
use ferrous_lookup_application::{Completion, CompletionCallback, LookupContext, LookupDriver};
use ferrous_lookup_domain::{
    DomainError, LocalRecord, LookupConfig, RecordClass, RecordType,
};
use ferrous_lookup_infrastructure::{
    BudgetAllocator, EngineEvent, EventLoop, LocalRecordsEngine, TokioReactor,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn local_record(hostname: &str, ip: &str) -> LocalRecord {
    LocalRecord {
        hostname: hostname.into(),
        domain: None,
        ip: ip.into(),
        ttl: None,
    }
}

pub fn home_records() -> Vec<LocalRecord> {
    vec![
        local_record("nas", "192.168.1.10"),
        local_record("nas", "fd00::10"),
        local_record("printer", "192.168.1.20"),
    ]
}

/// Engine that accepts every dispatch and never answers.
#[derive(Default)]
pub struct SilentEngine {
    next_handle: AtomicU64,
    canceled: Mutex<Vec<ExternalHandle>>,
}

impl SilentEngine {
    pub fn canceled(&self) -> Vec<ExternalHandle> {
        self.canceled.lock().unwrap().clone()
    }
}

impl ResolverEngine for SilentEngine {
    fn dispatch(
        &self,
        _name: &str,
        _record_type: RecordType,
        _record_class: RecordClass,
    ) -> Result<ExternalHandle, DomainError> {
        Ok(ExternalHandle(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1))
    }

    fn cancel(&self, handle: ExternalHandle) {
        self.canceled.lock().unwrap().push(handle);
    }
}

pub struct Runtime {
    pub allocator: Arc<BudgetAllocator>,
    pub reactor: Arc<TokioReactor>,
    pub event_loop: EventLoop,
}

impl Runtime {
    pub fn local(config: LookupConfig, latency: Duration) -> Self {
        let (engine, answers) =
            LocalRecordsEngine::new(&home_records(), Some("home.lan")).unwrap();
        Self::build(config, Arc::new(engine.with_latency(latency)), answers)
    }

    /// Wires a silent engine; the returned sender keeps the answer channel open.
    pub fn silent(config: LookupConfig) -> (Self, Arc<SilentEngine>, mpsc::UnboundedSender<EngineEvent>) {
        let engine = Arc::new(SilentEngine::default());
        let (sender, answers) = mpsc::unbounded_channel();
        let runtime = Self::build(config, engine.clone(), answers);
        (runtime, engine, sender)
    }

    fn build(
        config: LookupConfig,
        engine: Arc<dyn ResolverEngine>,
        answers: mpsc::UnboundedReceiver<EngineEvent>,
    ) -> Self {
        init_tracing();
        let allocator = Arc::new(BudgetAllocator::unbounded());
        let reactor = Arc::new(TokioReactor::new());
        let context = LookupContext::new(allocator.clone(), engine, reactor.clone())
            .with_config(config);
        Self {
            allocator,
            reactor: reactor.clone(),
            event_loop: EventLoop::new(LookupDriver::new(context), reactor, answers),
        }
    }

    pub fn driver(&mut self) -> &mut LookupDriver {
        self.event_loop.driver_mut()
    }
}

pub fn oneshot_callback() -> (CompletionCallback, oneshot::Receiver<Completion>) {
    let (tx, rx) = oneshot::channel();
    let callback: CompletionCallback = Box::new(move |completion| {
        let _ = tx.send(completion);
    });
    (callback, rx)
}
