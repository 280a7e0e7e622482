//! Configuration module for Ferrous Lookup
//!
//! - `root`: Main configuration and CLI overrides
//! - `lookup`: Timeouts, dispatch mode and default extensions
//! - `memory`: Allocation budget
//! - `logging`: Logging settings
//! - `local_records`: Static records served by the local engine
//! - `errors`: Configuration errors

pub mod errors;
pub mod local_records;
pub mod logging;
pub mod lookup;
pub mod memory;
pub mod root;

pub use errors::ConfigError;
pub use local_records::LocalRecord;
pub use logging::{LogFormat, LoggingConfig};
pub use lookup::{DispatchMode, LookupConfig, MAX_TIMEOUT_MS};
pub use memory::MemoryConfig;
pub use root::{CliOverrides, Config};
