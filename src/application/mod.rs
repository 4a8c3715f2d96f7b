//! Application Layer
//!
//! Use cases that drive the domain through its ports.

mod lookup_orchestrator;
mod rejection_handler;

pub use lookup_orchestrator::{LookupOrchestrator, LookupOutcome};
pub use rejection_handler::RejectionHandler;
