use crate::ports::{Allocation, SharedAllocator, TimerHandle};
use compact_str::CompactString;
use ferrous_lookup_domain::{DomainError, Extensions, ResourceKind};

// Fields drop in declaration order, so each value is gone before its lease.

pub(crate) struct OwnedName {
    value: CompactString,
    _allocation: Allocation,
}

impl OwnedName {
    pub(crate) fn copy(allocator: &SharedAllocator, name: &str) -> Result<Self, DomainError> {
        let allocation = Allocation::acquire(allocator, ResourceKind::NameBuffer, name.len() + 1)?;
        Ok(Self {
            value: CompactString::from(name),
            _allocation: allocation,
        })
    }

    pub(crate) fn as_str(&self) -> &str {
        self.value.as_str()
    }
}

pub(crate) struct OwnedExtensions {
    value: Extensions,
    _allocation: Allocation,
}

impl OwnedExtensions {
    pub(crate) fn deep_copy(
        allocator: &SharedAllocator,
        extensions: &Extensions,
    ) -> Result<Self, DomainError> {
        let allocation =
            Allocation::acquire(allocator, ResourceKind::Extensions, extensions.footprint())?;
        Ok(Self {
            value: extensions.deep_copy(),
            _allocation: allocation,
        })
    }

    pub(crate) fn value(&self) -> &Extensions {
        &self.value
    }
}

pub(crate) struct ArmedTimer {
    handle: TimerHandle,
    _allocation: Allocation,
}

impl ArmedTimer {
    pub(crate) fn new(handle: TimerHandle, allocation: Allocation) -> Self {
        Self {
            handle,
            _allocation: allocation,
        }
    }

    pub(crate) fn handle(&self) -> TimerHandle {
        self.handle
    }
}
