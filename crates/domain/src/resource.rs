use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of resources a lookup acquires through the caller's allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Request,
    NameBuffer,
    Extensions,
    SubQuery,
    Timer,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Request,
        ResourceKind::NameBuffer,
        ResourceKind::Extensions,
        ResourceKind::SubQuery,
        ResourceKind::Timer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Request => "request",
            ResourceKind::NameBuffer => "name_buffer",
            ResourceKind::Extensions => "extensions",
            ResourceKind::SubQuery => "sub_query",
            ResourceKind::Timer => "timer",
        }
    }

    /// Dense index, handy for per-kind counters.
    pub fn index(&self) -> usize {
        match self {
            ResourceKind::Request => 0,
            ResourceKind::NameBuffer => 1,
            ResourceKind::Extensions => 2,
            ResourceKind::SubQuery => 3,
            ResourceKind::Timer => 4,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
