use serde::{Deserialize, Serialize};

/// Longest request deadline accepted by validation (one day).
pub const MAX_TIMEOUT_MS: u64 = 24 * 60 * 60 * 1000;

/// How the sub-queries of one request are handed to the resolver engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Every sub-query is dispatched as soon as the request is submitted.
    #[default]
    Concurrent,
    /// One sub-query at a time; the next goes out once the current one settles.
    Sequential,
}

/// Lookup behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LookupConfig {
    /// Deadline for a whole request in milliseconds (default: 5000).
    /// `0` disables the deadline; values above [`MAX_TIMEOUT_MS`] are rejected.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub dispatch_mode: DispatchMode,

    /// Value of `return_both_v4_and_v6` when the caller passes no extensions
    #[serde(default)]
    pub return_both_v4_and_v6: bool,

    /// Domain appended to bare local record hostnames (e.g. "home.lan")
    #[serde(default)]
    pub local_domain: Option<String>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            dispatch_mode: DispatchMode::default(),
            return_both_v4_and_v6: false,
            local_domain: None,
        }
    }
}

fn default_timeout_ms() -> u64 {
    5000
}
