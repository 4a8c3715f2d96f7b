mod address_normalizer;
mod policy_engine;
pub mod provider_registry;
mod response_parser;

pub use address_normalizer::AddressNormalizer;
pub use policy_engine::PolicyEngine;
pub use provider_registry::{ProviderEndpoint, ProviderRegistry, DEFAULT_PROVIDERS};
pub use response_parser::{ProviderResponse, ResponseParser, SENTINEL_VALUES};
