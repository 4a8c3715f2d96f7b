//! countryBlock Library
//!
//! Restricts which countries players may join from: geolocates each
//! connecting player's IP through HTTP lookup providers and kicks or bans
//! players the country policy denies.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{LookupOrchestrator, LookupOutcome, RejectionHandler};
pub use config::{load_config, Config};
pub use domain::entities::{PlayerConnection, PolicyConfig, ProviderReply};
pub use domain::errors::{ConfigError, LookupError};
pub use domain::ports::{GeoLookupClient, Localizer, Permissions, PlayerSession, PlayerSessions};
pub use domain::value_objects::{CountryCode, Decision, PolicyMode};
pub use infrastructure::{RetryPolicy, ShutdownController};
