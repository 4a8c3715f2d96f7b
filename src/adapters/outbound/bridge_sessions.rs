//! Bridge Session Registry
//!
//! Implements PlayerSessions for players announced over the host bridge.
//! Kicks and bans are queued as commands on the bridge connection that
//! announced the player.

use crate::adapters::bridge_protocol::HostCommand;
use crate::domain::ports::{PlayerSession, PlayerSessions};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// A player connected through a host bridge.
pub struct BridgeSession {
    id: String,
    address: String,
    admin: bool,
    /// Bridge connection that owns this player
    bridge_id: u64,
    commands: mpsc::UnboundedSender<HostCommand>,
}

impl BridgeSession {
    pub fn new(
        id: impl Into<String>,
        address: impl Into<String>,
        admin: bool,
        bridge_id: u64,
        commands: mpsc::UnboundedSender<HostCommand>,
    ) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            admin,
            bridge_id,
            commands,
        }
    }

    fn send(&self, command: HostCommand) {
        if self.commands.send(command).is_err() {
            tracing::debug!("bridge for {} is closed, dropping command", self.id);
        }
    }
}

impl PlayerSession for BridgeSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn is_admin(&self) -> bool {
        self.admin
    }

    fn kick(&self, message: &str) {
        self.send(HostCommand::Kick {
            id: self.id.clone(),
            message: message.to_string(),
        });
    }

    fn ban(&self, message: &str, duration: Duration) {
        self.send(HostCommand::Ban {
            id: self.id.clone(),
            message: message.to_string(),
            duration_secs: duration.as_secs(),
        });
    }
}

/// DashMap-backed registry of live bridge sessions.
pub struct BridgeSessions {
    sessions: DashMap<String, Arc<BridgeSession>>,
}

impl BridgeSessions {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Add or replace a session.
    pub fn register(&self, session: BridgeSession) {
        self.sessions.insert(session.id.clone(), Arc::new(session));
    }

    pub fn remove(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Drop every session announced by bridge connection `bridge_id`.
    pub fn remove_bridge(&self, bridge_id: u64) -> usize {
        let mut removed = 0;
        self.sessions.retain(|_, s| {
            if s.bridge_id == bridge_id {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for BridgeSessions {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerSessions for BridgeSessions {
    fn lookup(&self, id: &str) -> Option<Arc<dyn PlayerSession>> {
        self.sessions
            .get(id)
            .map(|e| e.value().clone() as Arc<dyn PlayerSession>)
    }
}
