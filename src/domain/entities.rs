//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the country-block domain.
//! They have no external dependencies and contain only business logic.

use crate::domain::value_objects::{CountryCode, PolicyMode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A player connecting to the game server.
///
/// Supplied by the host for each connection event and never modified
/// while the player's lookup is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConnection {
    /// Opaque player identifier (e.g. a Steam ID)
    pub id: String,
    /// Display name, used only for logging
    pub name: String,
    /// Raw network address as reported by the host, possibly with a port
    pub address: String,
    /// Preferred message language, if the host knows it
    #[serde(default)]
    pub locale: Option<String>,
}

impl PlayerConnection {
    pub fn new(id: impl Into<String>, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            locale: None,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// One try at resolving a player's country through a single provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupAttempt {
    /// Player the attempt belongs to
    pub player_id: String,
    /// Address with any port suffix removed
    pub ip: String,
    /// Fully-formed provider URL
    pub url: String,
    /// 1-based attempt counter
    pub number: u32,
}

/// Raw answer from a lookup provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReply {
    pub status: u16,
    pub body: String,
}

impl ProviderReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A 200 reply carrying `body`.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }
}

/// Access policy applied to resolved countries.
///
/// Built once at startup and shared read-only between lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    pub mode: PolicyMode,
    /// Upper-case country codes
    country_codes: HashSet<String>,
    /// Skip the lookup for members of the admin group
    pub admin_excluded: bool,
    /// Ban permanently instead of kicking
    pub ban_instantly: bool,
}

impl PolicyConfig {
    /// Create a policy, normalizing every listed code to upper case.
    pub fn new<I, S>(mode: PolicyMode, codes: I, admin_excluded: bool, ban_instantly: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let country_codes = codes
            .into_iter()
            .map(|c| c.as_ref().trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .collect();

        Self {
            mode,
            country_codes,
            admin_excluded,
            ban_instantly,
        }
    }

    /// Whether `code` appears in the configured list.
    pub fn lists(&self, code: &CountryCode) -> bool {
        self.country_codes.contains(&code.normalized())
    }

    pub fn country_codes(&self) -> &HashSet<String> {
        &self.country_codes
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::new(PolicyMode::Blacklist, ["CN", "RU"], true, false)
    }
}
