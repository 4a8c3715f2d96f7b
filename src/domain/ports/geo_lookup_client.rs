//! Geo Lookup Client Port
//!
//! Defines the interface for querying a remote country lookup provider.

use crate::domain::entities::ProviderReply;
use crate::domain::errors::LookupError;
use async_trait::async_trait;

/// HTTP client for geolocation providers.
///
/// This is an outbound port. Implementations issue exactly one GET per
/// call and never retry; retrying is the orchestrator's job.
#[async_trait]
pub trait GeoLookupClient: Send + Sync {
    /// Fetch `url` and return the status code and body.
    ///
    /// Any HTTP status is returned as `Ok`; only failures that produce no
    /// status at all (timeout, connection error) are `Err`.
    async fn fetch(&self, url: &str) -> Result<ProviderReply, LookupError>;
}
