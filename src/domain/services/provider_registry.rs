//! Provider Registry Service
//!
//! Holds the configured geolocation endpoints and picks one per attempt.

use crate::domain::errors::ConfigError;
use rand::Rng;

/// Placeholder replaced by the player's IP in an endpoint template.
pub const IP_PLACEHOLDER: &str = "{ip}";

/// Public endpoints used when no providers are configured.
pub const DEFAULT_PROVIDERS: [&str; 4] = [
    "http://ip-api.com/line/{ip}?fields=countryCode",
    "http://legacy.iphub.info/api.php?showtype=4&ip={ip}",
    "http://geoip.nekudo.com/api/{ip}",
    "http://ipinfo.io/{ip}/country",
];

/// A lookup endpoint, described as a URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    template: String,
}

impl ProviderEndpoint {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Build the request URL for `ip`.
    pub fn url_for(&self, ip: &str) -> String {
        self.template.replace(IP_PLACEHOLDER, ip)
    }
}

/// Ordered, non-empty set of provider endpoints.
///
/// The registry has no network state; it is built once and shared.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    endpoints: Vec<ProviderEndpoint>,
}

impl ProviderRegistry {
    /// Create a registry from URL templates.
    ///
    /// Fails if no templates are given or a template lacks `{ip}`.
    pub fn new<I, S>(templates: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let endpoints: Vec<ProviderEndpoint> = templates
            .into_iter()
            .map(|t| {
                let t: String = t.into();
                ProviderEndpoint::new(t.trim())
            })
            .filter(|e| !e.template.is_empty())
            .collect();

        if endpoints.is_empty() {
            return Err(ConfigError::NoProviders);
        }

        if let Some(bad) = endpoints.iter().find(|e| !e.template.contains(IP_PLACEHOLDER)) {
            return Err(ConfigError::MissingIpPlaceholder(bad.template.clone()));
        }

        Ok(Self { endpoints })
    }

    /// Registry with the four public default providers.
    pub fn with_defaults() -> Self {
        Self {
            endpoints: DEFAULT_PROVIDERS.iter().map(|t| ProviderEndpoint::new(*t)).collect(),
        }
    }

    pub fn endpoints(&self) -> &[ProviderEndpoint] {
        &self.endpoints
    }

    /// Pick an endpoint uniformly at random.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &ProviderEndpoint {
        pick(&self.endpoints, rng)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Select one endpoint uniformly at random.
///
/// Earlier failures are not excluded, so consecutive calls may return the
/// same endpoint. `endpoints` must not be empty.
pub fn pick<'a, R: Rng + ?Sized>(endpoints: &'a [ProviderEndpoint], rng: &mut R) -> &'a ProviderEndpoint {
    &endpoints[rng.gen_range(0..endpoints.len())]
}
