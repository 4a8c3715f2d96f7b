//! Localizer Port
//!
//! Defines the interface for player-facing message formatting.

/// Key of the rejection message.
pub const NOT_ALLOWED: &str = "NotAllowed";

/// English template for [`NOT_ALLOWED`]; `{0}` is the country code.
pub const NOT_ALLOWED_TEMPLATE: &str = "This server doesn't allow players from {0}";

/// Formats localized messages.
pub trait Localizer: Send + Sync {
    /// Render `key` in `locale` (or the default language) with positional
    /// arguments substituted for `{0}`, `{1}`, ...
    fn format(&self, key: &str, locale: Option<&str>, args: &[&str]) -> String;
}
