use crate::domain::entities::PolicyConfig;
use crate::domain::errors::ConfigError;
use crate::domain::services::{ProviderRegistry, DEFAULT_PROVIDERS};
use crate::domain::value_objects::{Decision, PolicyMode};
use crate::infrastructure::RetryPolicy;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Host bridge
    pub listen_addr: String,
    pub debug: bool,

    // Policy (plugin config file keys)
    pub admin_excluded: bool,
    pub ban_instantly: bool,
    pub country_list: Vec<String>,
    pub whitelist: bool,

    // Lookup providers
    pub providers: Vec<String>,
    pub http_timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
    pub retry_backoff_max_ms: u64,
    pub on_exhausted: Decision,
    pub rng_seed: Option<u64>,

    // Permissions
    pub bypass_ids: Vec<String>,
    pub admin_ids: Vec<String>,

    pub drain_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let policy = PolicyFile::default();
        Self {
            listen_addr: "127.0.0.1:7070".to_string(),
            debug: false,
            admin_excluded: policy.admin_excluded,
            ban_instantly: policy.ban_instantly,
            country_list: policy.country_list,
            whitelist: policy.whitelist,
            providers: DEFAULT_PROVIDERS.iter().map(|p| p.to_string()).collect(),
            http_timeout_secs: 10,
            max_attempts: 10,
            retry_backoff_ms: 250,
            retry_backoff_max_ms: 10_000,
            on_exhausted: Decision::Allow,
            rng_seed: None,
            bypass_ids: Vec::new(),
            admin_ids: Vec::new(),
            drain_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Immutable policy shared by every lookup.
    pub fn policy(&self) -> PolicyConfig {
        PolicyConfig::new(
            PolicyMode::from_whitelist_flag(self.whitelist),
            &self.country_list,
            self.admin_excluded,
            self.ban_instantly,
        )
    }

    /// Retry bounds; `max_attempts == 0` retries forever.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: (self.max_attempts > 0).then_some(self.max_attempts),
            base_backoff: Duration::from_millis(self.retry_backoff_ms),
            max_backoff: Duration::from_millis(self.retry_backoff_max_ms),
            on_exhausted: self.on_exhausted,
        }
    }

    pub fn registry(&self) -> Result<ProviderRegistry, ConfigError> {
        ProviderRegistry::new(self.providers.iter().cloned())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }
}

/// On-disk plugin configuration.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct PolicyFile {
    pub admin_excluded: bool,
    pub ban_instantly: bool,
    pub country_list: Vec<String>,
    pub whitelist: bool,
}

impl Default for PolicyFile {
    fn default() -> Self {
        Self {
            admin_excluded: true,
            ban_instantly: false,
            country_list: vec!["CN".to_string(), "RU".to_string()],
            whitelist: false,
        }
    }
}

impl PolicyFile {
    pub fn from_path(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {}", path, e))?;
        let file = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("invalid config file {}: {}", path, e))?;
        Ok(file)
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    load_config_with(|key| std::env::var(key).ok())
}

/// Build the configuration from a variable lookup.
///
/// Values from `COUNTRYBLOCK_CONFIG_PATH` are applied first; individual
/// variables override them.
pub fn load_config_with<F>(var: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = Config::default();

    let policy = match var("COUNTRYBLOCK_CONFIG_PATH") {
        Some(path) => PolicyFile::from_path(&path)?,
        None => PolicyFile::default(),
    };

    let listen_addr = var("COUNTRYBLOCK_LISTEN_ADDR").unwrap_or(defaults.listen_addr);

    let debug = var("DEBUG").is_some();

    let admin_excluded = flag(var("COUNTRYBLOCK_ADMIN_EXCLUDED"), policy.admin_excluded);
    let ban_instantly = flag(var("COUNTRYBLOCK_BAN_INSTANTLY"), policy.ban_instantly);
    let whitelist = flag(var("COUNTRYBLOCK_WHITELIST"), policy.whitelist);
    let country_list = var("COUNTRYBLOCK_COUNTRY_LIST")
        .map(|v| list(&v))
        .unwrap_or(policy.country_list);

    let providers = var("COUNTRYBLOCK_PROVIDERS")
        .map(|v| list(&v))
        .unwrap_or(defaults.providers);

    let http_timeout_secs = number(
        var("COUNTRYBLOCK_HTTP_TIMEOUT_SECS"),
        defaults.http_timeout_secs,
    );
    let max_attempts = number(var("COUNTRYBLOCK_MAX_ATTEMPTS"), defaults.max_attempts);
    let retry_backoff_ms = number(var("COUNTRYBLOCK_RETRY_BACKOFF_MS"), defaults.retry_backoff_ms);
    let retry_backoff_max_ms = number(
        var("COUNTRYBLOCK_RETRY_BACKOFF_MAX_MS"),
        defaults.retry_backoff_max_ms,
    );

    let on_exhausted = match var("COUNTRYBLOCK_ON_EXHAUSTED") {
        Some(v) => Decision::parse(&v).ok_or(ConfigError::InvalidValue {
            key: "COUNTRYBLOCK_ON_EXHAUSTED".to_string(),
            value: v,
        })?,
        None => defaults.on_exhausted,
    };

    let rng_seed = var("COUNTRYBLOCK_RNG_SEED").and_then(|v| v.trim().parse().ok());

    let bypass_ids = var("COUNTRYBLOCK_BYPASS_IDS")
        .map(|v| list(&v))
        .unwrap_or_default();
    let admin_ids = var("COUNTRYBLOCK_ADMIN_IDS")
        .map(|v| list(&v))
        .unwrap_or_default();

    let drain_timeout_secs = number(
        var("COUNTRYBLOCK_DRAIN_TIMEOUT_SECS"),
        defaults.drain_timeout_secs,
    );

    Ok(Config {
        listen_addr,
        debug,
        admin_excluded,
        ban_instantly,
        country_list,
        whitelist,
        providers,
        http_timeout_secs,
        max_attempts,
        retry_backoff_ms,
        retry_backoff_max_ms,
        on_exhausted,
        rng_seed,
        bypass_ids,
        admin_ids,
        drain_timeout_secs,
    })
}

fn flag(value: Option<String>, default: bool) -> bool {
    value
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(default)
}

fn number<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
