use ferrous_lookup_application::ports::{AllocationId, MemoryAllocator};
use ferrous_lookup_domain::{MemoryConfig, ResourceKind};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Mutex;
use tracing::{error, warn};

/// Snapshot of allocator accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllocatorStats {
    pub allocations: u64,
    pub deallocations: u64,
    pub failures: u64,
    pub double_frees: u64,
    pub live: usize,
    pub live_bytes: usize,
    pub peak_bytes: usize,
    /// Live blocks per resource kind, indexed by [`ResourceKind::index`].
    pub live_by_kind: [usize; ResourceKind::ALL.len()],
}

#[derive(Default)]
struct BudgetState {
    next_id: u64,
    blocks: FxHashMap<u64, (ResourceKind, usize)>,
    stats: AllocatorStats,
}

/// Accounting allocator with an optional byte budget.
///
/// Block contents live on the global heap; this type only decides whether a
/// block may be handed out and tracks it until it comes back.
pub struct BudgetAllocator {
    budget_bytes: Option<usize>,
    state: Mutex<BudgetState>,
}

impl BudgetAllocator {
    pub fn new(budget_bytes: Option<usize>) -> Self {
        Self {
            budget_bytes,
            state: Mutex::new(BudgetState::default()),
        }
    }

    pub fn from_config(config: &MemoryConfig) -> Self {
        Self::new(config.budget_bytes)
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn budget_bytes(&self) -> Option<usize> {
        self.budget_bytes
    }

    pub fn stats(&self) -> AllocatorStats {
        match self.state.lock() {
            Ok(state) => state.stats.clone(),
            Err(poisoned) => poisoned.into_inner().stats.clone(),
        }
    }

    pub fn is_balanced(&self) -> bool {
        let stats = self.stats();
        stats.live == 0 && stats.double_frees == 0
    }
}

impl MemoryAllocator for BudgetAllocator {
    fn allocate(&self, kind: ResourceKind, size: usize) -> Option<AllocationId> {
        let mut state = self.state.lock().ok()?;

        if let Some(budget) = self.budget_bytes {
            if state.stats.live_bytes.saturating_add(size) > budget {
                state.stats.failures += 1;
                warn!(
                    kind = %kind,
                    size,
                    live_bytes = state.stats.live_bytes,
                    budget,
                    "Allocation budget exhausted"
                );
                return None;
            }
        }

        state.next_id += 1;
        let id = state.next_id;
        state.blocks.insert(id, (kind, size));

        let stats = &mut state.stats;
        stats.allocations += 1;
        stats.live += 1;
        stats.live_bytes += size;
        stats.peak_bytes = stats.peak_bytes.max(stats.live_bytes);
        stats.live_by_kind[kind.index()] += 1;

        Some(AllocationId(id))
    }

    fn deallocate(&self, kind: ResourceKind, id: AllocationId) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };

        match state.blocks.remove(&id.0) {
            Some((allocated_kind, size)) => {
                if allocated_kind != kind {
                    error!(
                        id = id.0,
                        allocated = %allocated_kind,
                        released = %kind,
                        "Block released under the wrong kind"
                    );
                }
                let stats = &mut state.stats;
                stats.deallocations += 1;
                stats.live -= 1;
                stats.live_bytes -= size;
                stats.live_by_kind[allocated_kind.index()] -= 1;
            }
            None => {
                state.stats.double_frees += 1;
                error!(id = id.0, kind = %kind, "Double free detected");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_release_balance() {
        let allocator = BudgetAllocator::unbounded();

        let a = allocator.allocate(ResourceKind::Request, 128).unwrap();
        let b = allocator.allocate(ResourceKind::NameBuffer, 12).unwrap();
        assert_ne!(a, b);

        let stats = allocator.stats();
        assert_eq!(stats.live, 2);
        assert_eq!(stats.live_bytes, 140);
        assert_eq!(stats.live_by_kind[ResourceKind::Request.index()], 1);

        allocator.deallocate(ResourceKind::NameBuffer, b);
        allocator.deallocate(ResourceKind::Request, a);

        let stats = allocator.stats();
        assert_eq!(stats.allocations, 2);
        assert_eq!(stats.deallocations, 2);
        assert_eq!(stats.peak_bytes, 140);
        assert!(allocator.is_balanced());
    }

    #[test]
    fn test_budget_refuses_oversized_allocation() {
        let allocator = BudgetAllocator::new(Some(100));

        let first = allocator.allocate(ResourceKind::Request, 80).unwrap();
        assert!(allocator.allocate(ResourceKind::SubQuery, 40).is_none());
        assert_eq!(allocator.stats().failures, 1);

        allocator.deallocate(ResourceKind::Request, first);
        assert!(allocator.allocate(ResourceKind::SubQuery, 40).is_some());
    }

    #[test]
    fn test_double_free_is_counted() {
        let allocator = BudgetAllocator::unbounded();
        let id = allocator.allocate(ResourceKind::Timer, 16).unwrap();

        allocator.deallocate(ResourceKind::Timer, id);
        allocator.deallocate(ResourceKind::Timer, id);

        let stats = allocator.stats();
        assert_eq!(stats.deallocations, 1);
        assert_eq!(stats.double_frees, 1);
        assert!(!allocator.is_balanced());
    }
}
