//! Player Session Port
//!
//! Defines the interface to the host's live player sessions.

use std::sync::Arc;
use std::time::Duration;

/// A connected player as seen by the host.
pub trait PlayerSession: Send + Sync {
    /// Player identifier.
    fn id(&self) -> &str;

    /// Network address reported by the host.
    fn address(&self) -> &str;

    /// Whether the host considers this player an administrator.
    fn is_admin(&self) -> bool;

    /// Disconnect the player with a message.
    fn kick(&self, message: &str);

    /// Ban the player. A zero `duration` means permanent.
    fn ban(&self, message: &str, duration: Duration);
}

/// Registry of live sessions.
///
/// Lookups that finish after the player left get `None` and must treat
/// the decision as a no-op.
pub trait PlayerSessions: Send + Sync {
    fn lookup(&self, id: &str) -> Option<Arc<dyn PlayerSession>>;
}
