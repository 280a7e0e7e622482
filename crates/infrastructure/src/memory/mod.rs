pub mod budget_allocator;

pub use budget_allocator::{AllocatorStats, BudgetAllocator};
