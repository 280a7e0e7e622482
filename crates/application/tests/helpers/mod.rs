#![allow(dead_code)]

pub mod mock_ports;

pub use mock_ports::{
    address_answer, both_families, init_tracing, Completions, MockEngine, MockReactor,
    TrackingAllocator,
};

use ferrous_lookup_application::LookupContext;
use ferrous_lookup_domain::{DispatchMode, LookupConfig};
use std::sync::Arc;

pub struct Harness {
    pub allocator: Arc<TrackingAllocator>,
    pub engine: Arc<MockEngine>,
    pub reactor: Arc<MockReactor>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_allocator(TrackingAllocator::new())
    }

    pub fn with_allocator(allocator: Arc<TrackingAllocator>) -> Self {
        init_tracing();
        Self {
            allocator,
            engine: MockEngine::new(),
            reactor: MockReactor::new(),
        }
    }

    pub fn context(&self) -> LookupContext {
        self.context_with(DispatchMode::Concurrent)
    }

    pub fn context_with(&self, mode: DispatchMode) -> LookupContext {
        LookupContext::new(
            self.allocator.clone(),
            self.engine.clone(),
            self.reactor.clone(),
        )
        .with_config(LookupConfig {
            dispatch_mode: mode,
            ..LookupConfig::default()
        })
    }
}
