//! Ferrous Lookup Infrastructure Layer
pub mod engine;
pub mod event_loop;
pub mod memory;
pub mod reactor;

pub use engine::{EngineEvent, LocalRecordsEngine};
pub use event_loop::EventLoop;
pub use memory::{AllocatorStats, BudgetAllocator};
pub use reactor::TokioReactor;
