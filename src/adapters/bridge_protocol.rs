//! Host Bridge Protocol
//!
//! Newline-delimited JSON messages exchanged with the game host.

use crate::domain::entities::PlayerConnection;
use serde::{Deserialize, Serialize};

/// Message sent by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum HostEvent {
    /// A player finished connecting.
    Connected {
        id: String,
        name: String,
        address: String,
        #[serde(default)]
        admin: bool,
        #[serde(default)]
        locale: Option<String>,
    },
    /// A player left.
    Disconnected { id: String },
}

/// Message sent to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum HostCommand {
    Kick {
        id: String,
        message: String,
    },
    /// `duration_secs == 0` is a permanent ban.
    Ban {
        id: String,
        message: String,
        duration_secs: u64,
    },
}

impl HostEvent {
    /// Player described by a `connected` event.
    pub fn connection(&self) -> Option<PlayerConnection> {
        match self {
            Self::Connected {
                id,
                name,
                address,
                locale,
                ..
            } => Some(PlayerConnection {
                id: id.clone(),
                name: name.clone(),
                address: address.clone(),
                locale: locale.clone(),
            }),
            Self::Disconnected { .. } => None,
        }
    }
}
