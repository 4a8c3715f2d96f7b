//! Domain Errors
//!
//! Failures that can occur while resolving a player's country, and
//! configuration problems caught at startup.

/// Classified failure of a single lookup attempt.
///
/// Every variant is recoverable: the orchestrator logs it and retries
/// with a freshly selected provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// Provider answered with a status other than 200.
    #[error("provider returned status {0}")]
    Status(u16),
    /// Provider answered 200 with nothing in the body.
    #[error("provider returned an empty body")]
    EmptyBody,
    /// Provider answered with a placeholder such as `undefined` or `xx`.
    #[error("provider returned placeholder value {0:?}")]
    Sentinel(String),
    /// Request did not complete within the configured timeout.
    #[error("provider request timed out")]
    Timeout,
    /// Connection, TLS or body decoding error.
    #[error("provider request failed: {0}")]
    Transport(String),
}

/// Invalid configuration detected at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("at least one lookup provider is required")]
    NoProviders,
    #[error("provider template {0:?} has no {{ip}} placeholder")]
    MissingIpPlaceholder(String),
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}
