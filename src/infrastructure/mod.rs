//! Infrastructure Layer
//!
//! Cross-cutting runtime concerns for the lookup pipeline.

pub mod retry_policy;
pub mod shutdown;

pub use retry_policy::RetryPolicy;
pub use shutdown::{shutdown_signal, LookupGuard, ShutdownController};
