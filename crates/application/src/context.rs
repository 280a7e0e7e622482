use crate::ports::{Reactor, ResolverEngine, SharedAllocator};
use ferrous_lookup_domain::{Extensions, LookupConfig, RETURN_BOTH_V4_AND_V6};
use std::sync::Arc;

/// Everything a request is bound to at construction: the caller's allocator,
/// the resolver engine and the reactor, plus lookup settings.
#[derive(Clone)]
pub struct LookupContext {
    pub allocator: SharedAllocator,
    pub engine: Arc<dyn ResolverEngine>,
    pub reactor: Arc<dyn Reactor>,
    pub config: LookupConfig,
}

impl LookupContext {
    pub fn new(
        allocator: SharedAllocator,
        engine: Arc<dyn ResolverEngine>,
        reactor: Arc<dyn Reactor>,
    ) -> Self {
        Self {
            allocator,
            engine,
            reactor,
            config: LookupConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LookupConfig) -> Self {
        self.config = config;
        self
    }

    /// Extensions applied when the caller passes none.
    pub fn default_extensions(&self) -> Extensions {
        if self.config.return_both_v4_and_v6 {
            Extensions::new().with_flag(RETURN_BOTH_V4_AND_V6, true)
        } else {
            Extensions::new()
        }
    }
}

impl std::fmt::Debug for LookupContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
