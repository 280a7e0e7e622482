pub mod local_records;

pub use local_records::{EngineEvent, LocalRecordsEngine};
