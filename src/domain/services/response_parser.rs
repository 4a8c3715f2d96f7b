//! Response Parser Service
//!
//! Extracts a country code from whatever a lookup provider sent back.
//! Providers answer either with JSON (in a few shapes) or with bare text,
//! and the parser handles all of them without per-provider branching.

use crate::domain::entities::ProviderReply;
use crate::domain::errors::LookupError;
use crate::domain::value_objects::CountryCode;
use serde::Deserialize;

/// Bodies that mean "no answer" even though the request succeeded.
pub const SENTINEL_VALUES: [&str; 2] = ["undefined", "xx"];

/// Parsed form of a provider body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderResponse {
    /// `{"country": {"code": "DE", ...}, ...}`
    NestedCountry(String),
    /// `{"countryCode": "US", ...}`
    CountryCodeField(String),
    /// A JSON object without any recognised country field.
    UnrecognizedJson,
    /// Anything that is not a JSON object, reduced to its first token.
    PlainText(String),
}

impl ProviderResponse {
    /// Country carried by this response, `unknown` when there is none.
    pub fn country(&self) -> CountryCode {
        match self {
            Self::NestedCountry(code) | Self::CountryCodeField(code) | Self::PlainText(code)
                if !code.trim().is_empty() =>
            {
                CountryCode::new(code.trim())
            }
            _ => CountryCode::unknown(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NestedCountry {
    code: String,
}

/// Known JSON layouts, tried in order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonShape {
    Nested {
        country: NestedCountry,
    },
    Flat {
        #[serde(rename = "countryCode")]
        country_code: String,
    },
    Other(serde_json::Map<String, serde_json::Value>),
}

pub struct ResponseParser;

impl ResponseParser {
    /// Reject replies that must be retried instead of parsed.
    ///
    /// Returns the body when the reply is usable.
    pub fn accept(reply: &ProviderReply) -> Result<&str, LookupError> {
        if reply.status != 200 {
            return Err(LookupError::Status(reply.status));
        }

        let trimmed = reply.body.trim();
        if trimmed.is_empty() {
            return Err(LookupError::EmptyBody);
        }

        if SENTINEL_VALUES
            .iter()
            .any(|s| trimmed.eq_ignore_ascii_case(s))
        {
            return Err(LookupError::Sentinel(trimmed.to_string()));
        }

        Ok(&reply.body)
    }

    /// Classify a body: structured JSON first, plain text otherwise.
    pub fn parse(body: &str) -> ProviderResponse {
        match serde_json::from_str::<JsonShape>(body) {
            Ok(JsonShape::Nested { country }) => ProviderResponse::NestedCountry(country.code),
            Ok(JsonShape::Flat { country_code }) => ProviderResponse::CountryCodeField(country_code),
            Ok(JsonShape::Other(_)) => ProviderResponse::UnrecognizedJson,
            Err(_) => ProviderResponse::PlainText(Self::first_token(body).to_string()),
        }
    }

    /// Accept and parse a reply in one step.
    pub fn country_from(reply: &ProviderReply) -> Result<CountryCode, LookupError> {
        let body = Self::accept(reply)?;
        Ok(Self::parse(body).country())
    }

    /// Everything before the first whitespace run, ignoring leading whitespace.
    fn first_token(body: &str) -> &str {
        body.split_whitespace().next().unwrap_or("")
    }
}
