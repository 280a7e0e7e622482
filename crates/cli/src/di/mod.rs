use ferrous_lookup_application::{LookupContext, LookupDriver};
use ferrous_lookup_domain::Config;
use ferrous_lookup_infrastructure::{BudgetAllocator, EventLoop, LocalRecordsEngine, TokioReactor};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Wired lookup runtime: the caller's allocator plus the loop that owns the driver.
pub struct LookupServices {
    pub allocator: Arc<BudgetAllocator>,
    pub event_loop: EventLoop,
}

impl LookupServices {
    pub fn build(config: &Config, latency: Duration) -> anyhow::Result<Self> {
        let allocator = Arc::new(BudgetAllocator::from_config(&config.memory));
        let reactor = Arc::new(TokioReactor::new());
        let (engine, answers) = LocalRecordsEngine::new(
            &config.local_records,
            config.lookup.local_domain.as_deref(),
        )?;
        let engine = Arc::new(engine.with_latency(latency));

        info!(
            local_names = engine.names(),
            budget_bytes = ?allocator.budget_bytes(),
            latency_ms = latency.as_millis() as u64,
            "Lookup services ready"
        );

        let context = LookupContext::new(allocator.clone(), engine, reactor.clone())
            .with_config(config.lookup.clone());
        let event_loop = EventLoop::new(LookupDriver::new(context), reactor, answers);

        Ok(Self {
            allocator,
            event_loop,
        })
    }
}
