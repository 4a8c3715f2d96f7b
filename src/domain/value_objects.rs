//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use serde::{Deserialize, Serialize};

/// Country code as reported by a lookup provider.
///
/// The original spelling is kept for player-facing messages, while
/// policy comparisons go through [`CountryCode::normalized`] so that
/// `"us"` and `"US"` are treated alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryCode(String);

impl CountryCode {
    /// Value used when a provider answered but no country could be extracted.
    pub const UNKNOWN: &'static str = "unknown";

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The code for an unresolvable country.
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-cased form used for list membership.
    pub fn normalized(&self) -> String {
        self.0.trim().to_ascii_uppercase()
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the configured country list is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyMode {
    /// Listed countries are blocked, everyone else may join.
    Blacklist,
    /// Only listed countries may join.
    Whitelist,
}

impl PolicyMode {
    /// Map the plugin's `Whitelist` flag to a mode.
    pub fn from_whitelist_flag(whitelist: bool) -> Self {
        if whitelist {
            Self::Whitelist
        } else {
            Self::Blacklist
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blacklist => "blacklist",
            Self::Whitelist => "whitelist",
        }
    }
}

impl Default for PolicyMode {
    fn default() -> Self {
        Self::Blacklist
    }
}

impl std::fmt::Display for PolicyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of evaluating a country against the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_deny(&self) -> bool {
        matches!(self, Self::Deny)
    }

    /// Parse `allow` / `deny`, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "allow" => Some(Self::Allow),
            "deny" => Some(Self::Deny),
            _ => None,
        }
    }
}

/// Why a player skipped the country lookup entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassReason {
    /// Loopback or private network address.
    LocalAddress,
    /// Member of the admin group while admins are excluded.
    ExemptAdmin,
    /// Holds the bypass permission.
    Permission,
}

impl std::fmt::Display for BypassReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocalAddress => write!(f, "local address"),
            Self::ExemptAdmin => write!(f, "admin excluded"),
            Self::Permission => write!(f, "bypass permission"),
        }
    }
}

/// What the rejection handler did to a denied player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionAction {
    Kicked,
    Banned,
    /// The player was already gone when the decision arrived.
    SessionGone,
}

impl std::fmt::Display for RejectionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kicked => write!(f, "kicked"),
            Self::Banned => write!(f, "banned"),
            Self::SessionGone => write!(f, "session gone"),
        }
    }
}
