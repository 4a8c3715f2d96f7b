//! Policy Engine Service
//!
//! Pure domain logic deciding whether a country may join.

use crate::domain::entities::PolicyConfig;
use crate::domain::value_objects::{CountryCode, Decision, PolicyMode};

pub struct PolicyEngine;

impl PolicyEngine {
    /// Evaluate `country` against `policy`.
    ///
    /// Whitelist mode denies unless the country is listed; blacklist mode
    /// denies only listed countries. `unknown` is treated like any other
    /// code.
    pub fn evaluate(country: &CountryCode, policy: &PolicyConfig) -> Decision {
        let listed = policy.lists(country);

        match (policy.mode, listed) {
            (PolicyMode::Whitelist, false) | (PolicyMode::Blacklist, true) => Decision::Deny,
            _ => Decision::Allow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blacklist(codes: &[&str]) -> PolicyConfig {
        PolicyConfig::new(PolicyMode::Blacklist, codes.iter().copied(), true, false)
    }

    fn whitelist(codes: &[&str]) -> PolicyConfig {
        PolicyConfig::new(PolicyMode::Whitelist, codes.iter().copied(), true, false)
    }

    // ===== Blacklist Tests =====

    #[test]
    fn test_blacklist_denies_listed() {
        let policy = blacklist(&["CN", "RU"]);
        assert_eq!(PolicyEngine::evaluate(&CountryCode::new("CN"), &policy), Decision::Deny);
        assert_eq!(PolicyEngine::evaluate(&CountryCode::new("RU"), &policy), Decision::Deny);
    }

    #[test]
    fn test_blacklist_allows_unlisted() {
        let policy = blacklist(&["CN", "RU"]);
        assert_eq!(PolicyEngine::evaluate(&CountryCode::new("US"), &policy), Decision::Allow);
    }

    #[test]
    fn test_blacklist_allows_unknown() {
        let policy = blacklist(&["CN", "RU"]);
        assert_eq!(PolicyEngine::evaluate(&CountryCode::unknown(), &policy), Decision::Allow);
    }

    #[test]
    fn test_blacklist_empty_list_allows_everyone() {
        let policy = blacklist(&[]);
        for code in ["CN", "US", "unknown"] {
            assert_eq!(
                PolicyEngine::evaluate(&CountryCode::new(code), &policy),
                Decision::Allow,
                "Failed for code: {}",
                code
            );
        }
    }

    // ===== Whitelist Tests =====

    #[test]
    fn test_whitelist_allows_listed() {
        let policy = whitelist(&["US"]);
        assert_eq!(PolicyEngine::evaluate(&CountryCode::new("US"), &policy), Decision::Allow);
    }

    #[test]
    fn test_whitelist_denies_unlisted() {
        let policy = whitelist(&["US"]);
        assert_eq!(PolicyEngine::evaluate(&CountryCode::new("CN"), &policy), Decision::Deny);
    }

    #[test]
    fn test_whitelist_denies_unknown_unless_listed() {
        assert_eq!(
            PolicyEngine::evaluate(&CountryCode::unknown(), &whitelist(&["US"])),
            Decision::Deny
        );
        assert_eq!(
            PolicyEngine::evaluate(&CountryCode::unknown(), &whitelist(&["US", "unknown"])),
            Decision::Allow
        );
    }

    // ===== Normalization Tests =====

    #[test]
    fn test_lowercase_provider_code_matches_uppercase_list() {
        let policy = blacklist(&["CN"]);
        assert_eq!(PolicyEngine::evaluate(&CountryCode::new("cn"), &policy), Decision::Deny);
    }

    #[test]
    fn test_lowercase_list_matches_uppercase_code() {
        let policy = whitelist(&["us"]);
        assert_eq!(PolicyEngine::evaluate(&CountryCode::new("US"), &policy), Decision::Allow);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let policy = blacklist(&["CN", "RU"]);
        let code = CountryCode::new("RU");
        let first = PolicyEngine::evaluate(&code, &policy);
        let second = PolicyEngine::evaluate(&code, &policy);
        assert_eq!(first, second);
    }
}
