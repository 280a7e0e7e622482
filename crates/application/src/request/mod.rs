pub mod bundling;
pub mod completion;
mod owned;
#[allow(clippy::module_inception)]
pub mod request;
pub mod sub_query;

pub use bundling::bundled_complement;
pub use completion::{Completion, CompletionCallback, CompletionKind, Reply, UserContext};
pub use request::{Dispatched, Request, RequestId};
pub use sub_query::SubQuery;
