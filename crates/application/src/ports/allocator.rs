use ferrous_lookup_domain::{DomainError, ResourceKind};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Identifier of one block handed out by a [`MemoryAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllocationId(pub u64);

/// Caller-supplied allocate/deallocate pair.
///
/// Every resource a lookup owns (the request itself, its name buffer, the
/// extension copy, each sub-query, each armed timer) is accounted through this
/// capability. Returning `None` from `allocate` signals an allocation failure.
pub trait MemoryAllocator: Send + Sync {
    fn allocate(&self, kind: ResourceKind, size: usize) -> Option<AllocationId>;

    fn deallocate(&self, kind: ResourceKind, id: AllocationId);
}

pub type SharedAllocator = Arc<dyn MemoryAllocator>;

/// Lease on one allocator block. Not `Clone`: the block goes back to the
/// allocator exactly once, when the lease is dropped.
pub struct Allocation {
    allocator: SharedAllocator,
    kind: ResourceKind,
    id: AllocationId,
    size: usize,
}

impl Allocation {
    pub fn acquire(
        allocator: &SharedAllocator,
        kind: ResourceKind,
        size: usize,
    ) -> Result<Self, DomainError> {
        let id = allocator
            .allocate(kind, size)
            .ok_or(DomainError::AllocationFailure(kind))?;
        trace!(kind = %kind, id = id.0, size, "Allocated");
        Ok(Self {
            allocator: Arc::clone(allocator),
            kind,
            id,
            size,
        })
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl Drop for Allocation {
    fn drop(&mut self) {
        trace!(kind = %self.kind, id = self.id.0, "Deallocated");
        self.allocator.deallocate(self.kind, self.id);
    }
}

impl fmt::Debug for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocation")
            .field("kind", &self.kind)
            .field("id", &self.id.0)
            .field("size", &self.size)
            .finish()
    }
}
