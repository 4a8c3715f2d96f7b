//! Static Permissions
//!
//! Implements Permissions with in-memory grants and group memberships.

use crate::domain::ports::{Permissions, ADMIN_GROUP, PERM_BYPASS};
use dashmap::{DashMap, DashSet};

/// In-memory permission store.
///
/// Seeded from configuration at startup; grants can be added at runtime.
pub struct StaticPermissions {
    grants: DashMap<String, DashSet<String>>,
    groups: DashMap<String, DashSet<String>>,
}

impl StaticPermissions {
    pub fn new() -> Self {
        Self {
            grants: DashMap::new(),
            groups: DashMap::new(),
        }
    }

    /// Store seeded with bypass holders and admins.
    pub fn from_ids<B, A>(bypass_ids: B, admin_ids: A) -> Self
    where
        B: IntoIterator,
        B::Item: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        let perms = Self::new();
        for id in bypass_ids {
            perms.grant(id.as_ref(), PERM_BYPASS);
        }
        for id in admin_ids {
            perms.add_to_group(id.as_ref(), ADMIN_GROUP);
        }
        perms
    }

    pub fn grant(&self, id: &str, perm: &str) {
        self.grants
            .entry(id.to_string())
            .or_default()
            .insert(perm.to_string());
    }

    pub fn revoke(&self, id: &str, perm: &str) {
        if let Some(perms) = self.grants.get(id) {
            perms.remove(perm);
        }
    }

    pub fn add_to_group(&self, id: &str, group: &str) {
        self.groups
            .entry(id.to_string())
            .or_default()
            .insert(group.to_string());
    }
}

impl Default for StaticPermissions {
    fn default() -> Self {
        Self::new()
    }
}

impl Permissions for StaticPermissions {
    fn has_permission(&self, id: &str, perm: &str) -> bool {
        self.grants
            .get(id)
            .map(|perms| perms.contains(perm))
            .unwrap_or(false)
    }

    fn user_has_group(&self, id: &str, group: &str) -> bool {
        self.groups
            .get(id)
            .map(|groups| groups.contains(group))
            .unwrap_or(false)
    }
}
