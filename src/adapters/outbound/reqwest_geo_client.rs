//! Reqwest Geo Lookup Client
//!
//! Implements GeoLookupClient over HTTP with reqwest.

use crate::domain::entities::ProviderReply;
use crate::domain::errors::LookupError;
use crate::domain::ports::GeoLookupClient;
use async_trait::async_trait;
use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for lookup providers.
///
/// Every request is bounded by the configured timeout; an expired
/// request is reported as [`LookupError::Timeout`].
pub struct ReqwestGeoLookupClient {
    client: reqwest::Client,
}

impl ReqwestGeoLookupClient {
    /// Build a client with the given request timeout.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("country-block/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    fn classify(e: reqwest::Error) -> LookupError {
        if e.is_timeout() {
            LookupError::Timeout
        } else {
            LookupError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl GeoLookupClient for ReqwestGeoLookupClient {
    async fn fetch(&self, url: &str) -> Result<ProviderReply, LookupError> {
        let response = self.client.get(url).send().await.map_err(Self::classify)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(Self::classify)?;

        Ok(ProviderReply::new(status, body))
    }
}
