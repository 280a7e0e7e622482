use serde::{Deserialize, Serialize};

/// Allocation budget for lookup bookkeeping
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MemoryConfig {
    /// Maximum live bytes the allocator hands out. `None` means unbounded.
    #[serde(default)]
    pub budget_bytes: Option<usize>,
}
