pub mod allocator;
pub mod reactor;
pub mod resolver_engine;

pub use allocator::{Allocation, AllocationId, MemoryAllocator, SharedAllocator};
pub use reactor::{Reactor, TimerHandle, TimerKind, TimerToken};
pub use resolver_engine::{EngineOutcome, ExternalHandle, ResolverEngine};
