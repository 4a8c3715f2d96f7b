//! Template Localizer
//!
//! Implements Localizer with per-locale message tables and `{N}`
//! placeholder substitution.

use crate::domain::ports::{Localizer, NOT_ALLOWED, NOT_ALLOWED_TEMPLATE};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Locale used when the player's locale has no entry for a key.
pub const DEFAULT_LOCALE: &str = "en";

/// In-memory message tables keyed by locale.
///
/// Lookup order: player locale, then [`DEFAULT_LOCALE`], then the key
/// itself.
pub struct TemplateLocalizer {
    tables: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl TemplateLocalizer {
    /// Localizer with the built-in English messages.
    pub fn new() -> Self {
        let localizer = Self {
            tables: RwLock::new(HashMap::new()),
        };
        localizer.register_messages(DEFAULT_LOCALE, [(NOT_ALLOWED, NOT_ALLOWED_TEMPLATE)]);
        localizer
    }

    /// Add or replace messages for `locale`.
    pub fn register_messages<I, K, V>(&self, locale: &str, messages: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut tables = self.tables.write();
        let table = tables.entry(locale.to_lowercase()).or_default();
        for (key, template) in messages {
            table.insert(key.into(), template.into());
        }
    }

    fn template(&self, key: &str, locale: Option<&str>) -> Option<String> {
        let tables = self.tables.read();
        locale
            .map(str::to_lowercase)
            .and_then(|l| tables.get(&l).and_then(|t| t.get(key)).cloned())
            .or_else(|| {
                tables
                    .get(DEFAULT_LOCALE)
                    .and_then(|t| t.get(key))
                    .cloned()
            })
    }
}

impl Default for TemplateLocalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Localizer for TemplateLocalizer {
    fn format(&self, key: &str, locale: Option<&str>, args: &[&str]) -> String {
        let Some(template) = self.template(key, locale) else {
            tracing::debug!("no message registered for {}", key);
            return key.to_string();
        };

        substitute(&template, args)
    }
}

/// Replace `{0}`, `{1}`, ... with positional arguments.
///
/// Placeholders without a matching argument are left as written.
fn substitute(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let arg = after.find('}').and_then(|close| {
            after[..close]
                .parse::<usize>()
                .ok()
                .and_then(|i| args.get(i))
                .map(|a| (close, *a))
        });

        match arg {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
