pub mod tokio_reactor;

pub use tokio_reactor::TokioReactor;
