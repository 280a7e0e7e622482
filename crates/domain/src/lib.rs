//! Ferrous Lookup Domain Layer
pub mod answer;
pub mod config;
pub mod dns_record;
pub mod errors;
pub mod extensions;
pub mod resource;
pub mod sub_query_state;
pub mod transaction;

pub use answer::{AnswerRecord, DnsAnswer, RecordData, ResponseCode};
pub use config::{
    CliOverrides, Config, ConfigError, DispatchMode, LocalRecord, LogFormat, LoggingConfig,
    LookupConfig, MemoryConfig, MAX_TIMEOUT_MS,
};
pub use dns_record::{RecordClass, RecordType};
pub use errors::DomainError;
pub use extensions::{
    ExtensionValue, Extensions, EXTENSION_FALSE, EXTENSION_TRUE, RETURN_BOTH_V4_AND_V6,
};
pub use resource::ResourceKind;
pub use sub_query_state::SubQueryState;
pub use transaction::TransactionId;
