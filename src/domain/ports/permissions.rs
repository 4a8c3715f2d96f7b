//! Permission Port
//!
//! Defines the interface to the host's permission and group system.

/// Permission granted to players who skip the country check.
pub const PERM_BYPASS: &str = "countryblock.bypass";

/// Group whose members count as administrators.
pub const ADMIN_GROUP: &str = "admin";

/// Read-only view of the permission system.
pub trait Permissions: Send + Sync {
    /// Whether user `id` holds `perm`.
    fn has_permission(&self, id: &str, perm: &str) -> bool;

    /// Whether user `id` belongs to `group`.
    fn user_has_group(&self, id: &str, group: &str) -> bool;
}
