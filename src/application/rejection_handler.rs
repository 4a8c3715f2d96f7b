//! Rejection Handler
//!
//! Turns a deny decision into a kick or a permanent ban.

use crate::domain::entities::PlayerConnection;
use crate::domain::ports::{Localizer, PlayerSession, PlayerSessions, NOT_ALLOWED};
use crate::domain::value_objects::{CountryCode, RejectionAction};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Applies rejections to live player sessions.
///
/// Actions are fire-and-forget: they are never retried or undone.
pub struct RejectionHandler {
    sessions: Arc<dyn PlayerSessions>,
    localizer: Arc<dyn Localizer>,
    ban_instantly: bool,
}

impl RejectionHandler {
    pub fn new(
        sessions: Arc<dyn PlayerSessions>,
        localizer: Arc<dyn Localizer>,
        ban_instantly: bool,
    ) -> Self {
        Self {
            sessions,
            localizer,
            ban_instantly,
        }
    }

    /// Kick or ban `player`, naming `country` in the message.
    ///
    /// `started` is the session the check began for. Only that session is
    /// acted on: a player who left, or who reconnected in the meantime, is
    /// reported as [`RejectionAction::SessionGone`] and nothing else happens.
    pub fn reject(
        &self,
        player: &PlayerConnection,
        country: &CountryCode,
        started: Option<&Weak<dyn PlayerSession>>,
    ) -> RejectionAction {
        let session = match (self.sessions.lookup(&player.id), started) {
            (Some(current), Some(started)) if same_session(&current, started) => current,
            (Some(_), Some(_)) => {
                tracing::debug!(
                    "{} ({}) reconnected before the country check finished",
                    player.name,
                    player.id
                );
                return RejectionAction::SessionGone;
            }
            _ => {
                tracing::debug!(
                    "{} ({}) left before the country check finished",
                    player.name,
                    player.id
                );
                return RejectionAction::SessionGone;
            }
        };

        let message = self
            .localizer
            .format(NOT_ALLOWED, player.locale.as_deref(), &[country.as_str()]);

        if self.ban_instantly {
            session.ban(&message, Duration::ZERO);
            tracing::info!("banned {} ({}) from {}", player.name, player.id, country);
            RejectionAction::Banned
        } else {
            session.kick(&message);
            tracing::info!("kicked {} ({}) from {}", player.name, player.id, country);
            RejectionAction::Kicked
        }
    }
}

// A live Weak keeps its allocation, so a new session never reuses the address.
fn same_session(current: &Arc<dyn PlayerSession>, started: &Weak<dyn PlayerSession>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(current) as *const (),
        started.as_ptr() as *const (),
    )
}
