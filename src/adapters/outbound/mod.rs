mod bridge_sessions;
mod reqwest_geo_client;
mod static_permissions;
mod template_localizer;

pub use bridge_sessions::{BridgeSession, BridgeSessions};
pub use reqwest_geo_client::{ReqwestGeoLookupClient, DEFAULT_TIMEOUT};
pub use static_permissions::StaticPermissions;
pub use template_localizer::{TemplateLocalizer, DEFAULT_LOCALE};
