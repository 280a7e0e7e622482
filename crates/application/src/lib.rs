//! Ferrous Lookup Application Layer
//!
//! Request/sub-query lifecycle, the bundling decision and the driver that
//! funnels completion, cancellation and timeouts into one teardown path.
pub mod context;
pub mod driver;
pub mod ports;
pub mod request;

pub use context::LookupContext;
pub use driver::LookupDriver;
pub use request::{
    Completion, CompletionCallback, CompletionKind, Reply, Request, RequestId, SubQuery,
    UserContext,
};
