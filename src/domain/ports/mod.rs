mod geo_lookup_client;
mod localizer;
mod permissions;
mod player_sessions;

pub use geo_lookup_client::GeoLookupClient;
pub use localizer::{Localizer, NOT_ALLOWED, NOT_ALLOWED_TEMPLATE};
pub use permissions::{Permissions, ADMIN_GROUP, PERM_BYPASS};
pub use player_sessions::{PlayerSession, PlayerSessions};
