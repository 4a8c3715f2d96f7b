//! Lookup Orchestrator - Main application use case
//!
//! Runs the country check for every connecting player: bypass checks,
//! provider selection, the HTTP lookup with retries, the policy decision
//! and finally the rejection.

use crate::application::RejectionHandler;
use crate::domain::entities::{LookupAttempt, PlayerConnection, PolicyConfig};
use crate::domain::errors::LookupError;
use crate::domain::ports::{
    GeoLookupClient, Permissions, PlayerSession, PlayerSessions, ADMIN_GROUP, PERM_BYPASS,
};
use crate::domain::services::{AddressNormalizer, PolicyEngine, ProviderRegistry, ResponseParser};
use crate::domain::value_objects::{BypassReason, CountryCode, Decision, RejectionAction};
use crate::infrastructure::{RetryPolicy, ShutdownController};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;

/// Final result of one player's country check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// No lookup was made.
    Bypassed(BypassReason),
    /// Country resolved and permitted.
    Allowed { country: CountryCode },
    /// Country resolved and denied.
    Rejected {
        country: CountryCode,
        action: RejectionAction,
    },
    /// Every attempt failed; `action` is set when the fallback denied.
    Exhausted {
        attempts: u32,
        action: Option<RejectionAction>,
    },
}

impl std::fmt::Display for LookupOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bypassed(reason) => write!(f, "bypassed ({})", reason),
            Self::Allowed { country } => write!(f, "allowed from {}", country),
            Self::Rejected { country, action } => write!(f, "{} from {}", action, country),
            Self::Exhausted {
                attempts,
                action: None,
            } => write!(f, "allowed after {} failed attempts", attempts),
            Self::Exhausted {
                attempts,
                action: Some(action),
            } => write!(f, "{} after {} failed attempts", action, attempts),
        }
    }
}

/// Country check use case.
///
/// Holds only immutable, shared collaborators: every player runs through
/// [`check_player`](Self::check_player) independently.
pub struct LookupOrchestrator {
    registry: ProviderRegistry,
    client: Arc<dyn GeoLookupClient>,
    sessions: Arc<dyn PlayerSessions>,
    permissions: Arc<dyn Permissions>,
    rejection: RejectionHandler,
    policy: Arc<PolicyConfig>,
    retry: RetryPolicy,
    rng_seed: Option<u64>,
    shutdown: Option<ShutdownController>,
}

impl LookupOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        registry: ProviderRegistry,
        client: Arc<dyn GeoLookupClient>,
        sessions: Arc<dyn PlayerSessions>,
        permissions: Arc<dyn Permissions>,
        rejection: RejectionHandler,
        policy: Arc<PolicyConfig>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            registry,
            client,
            sessions,
            permissions,
            rejection,
            policy,
            retry,
            rng_seed: None,
            shutdown: None,
        }
    }

    /// Seed provider selection so runs are reproducible.
    pub fn with_rng_seed(mut self, seed: Option<u64>) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Register spawned lookups with a shutdown controller.
    pub fn with_shutdown(mut self, controller: ShutdownController) -> Self {
        self.shutdown = Some(controller);
        self
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Entry point for the "player connected" event.
    ///
    /// Spawns the check on the runtime and returns immediately. The check
    /// is bound to the session registered for the player at this moment.
    pub fn on_player_connected(self: &Arc<Self>, player: PlayerConnection) -> JoinHandle<LookupOutcome> {
        let this = Arc::clone(self);
        let guard = self.shutdown.as_ref().map(|s| s.lookup_guard());
        let started = self.current_session(&player.id);

        tokio::spawn(async move {
            let _guard = guard;
            let outcome = this.check_session(&player, started).await;
            tracing::info!(
                "country check for {} ({}) finished: {}",
                player.name,
                player.id,
                outcome
            );
            outcome
        })
    }

    /// Run the full check for one player.
    pub async fn check_player(&self, player: &PlayerConnection) -> LookupOutcome {
        let started = self.current_session(&player.id);
        self.check_session(player, started).await
    }

    fn current_session(&self, id: &str) -> Option<Weak<dyn PlayerSession>> {
        self.sessions.lookup(id).map(|s| Arc::downgrade(&s))
    }

    async fn check_session(
        &self,
        player: &PlayerConnection,
        started: Option<Weak<dyn PlayerSession>>,
    ) -> LookupOutcome {
        let ip = AddressNormalizer::normalize(&player.address);

        if let Some(reason) = self.bypass_reason(player, &ip) {
            tracing::debug!(
                "skipping country check for {} ({}): {}",
                player.name,
                ip,
                reason
            );
            return LookupOutcome::Bypassed(reason);
        }

        let mut rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut attempts = 0u32;

        loop {
            attempts = attempts.saturating_add(1);
            let endpoint = self.registry.pick(&mut rng);
            let attempt = LookupAttempt {
                player_id: player.id.clone(),
                ip: ip.clone(),
                url: endpoint.url_for(&ip),
                number: attempts,
            };

            match self.resolve(&attempt).await {
                Ok(country) => return self.decide(player, country, started.as_ref()),
                Err(e) => {
                    tracing::warn!(
                        "getting country for {} ({}) failed on attempt {}: {}",
                        player.name,
                        ip,
                        attempts,
                        e
                    );

                    if !self.retry.should_retry(attempts) {
                        return self.exhausted(player, attempts, started.as_ref());
                    }

                    let delay = self.retry.backoff(attempts);
                    if delay.is_zero() {
                        tokio::task::yield_now().await;
                    } else {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }

    /// First bypass condition that applies to `player`, if any.
    pub fn bypass_reason(&self, player: &PlayerConnection, ip: &str) -> Option<BypassReason> {
        if AddressNormalizer::is_local(ip) {
            return Some(BypassReason::LocalAddress);
        }
        if self.policy.admin_excluded && self.is_admin(&player.id) {
            return Some(BypassReason::ExemptAdmin);
        }
        if self.permissions.has_permission(&player.id, PERM_BYPASS) {
            return Some(BypassReason::Permission);
        }
        None
    }

    fn is_admin(&self, id: &str) -> bool {
        self.permissions.user_has_group(id, ADMIN_GROUP)
            || self
                .sessions
                .lookup(id)
                .map(|s| s.is_admin())
                .unwrap_or(false)
    }

    async fn resolve(&self, attempt: &LookupAttempt) -> Result<CountryCode, LookupError> {
        tracing::debug!(
            "lookup attempt {} for {}: {}",
            attempt.number,
            attempt.player_id,
            attempt.url
        );

        let reply = self.client.fetch(&attempt.url).await?;
        let country = ResponseParser::country_from(&reply)?;

        tracing::debug!("country response was {} for {}", country, attempt.ip);
        Ok(country)
    }

    fn decide(
        &self,
        player: &PlayerConnection,
        country: CountryCode,
        started: Option<&Weak<dyn PlayerSession>>,
    ) -> LookupOutcome {
        match PolicyEngine::evaluate(&country, &self.policy) {
            Decision::Allow => LookupOutcome::Allowed { country },
            Decision::Deny => {
                let action = self.rejection.reject(player, &country, started);
                LookupOutcome::Rejected { country, action }
            }
        }
    }

    fn exhausted(
        &self,
        player: &PlayerConnection,
        attempts: u32,
        started: Option<&Weak<dyn PlayerSession>>,
    ) -> LookupOutcome {
        tracing::warn!(
            "giving up on country for {} after {} attempts, applying {:?}",
            player.name,
            attempts,
            self.retry.on_exhausted
        );

        let action = match self.retry.on_exhausted {
            Decision::Allow => None,
            Decision::Deny => Some(
                self.rejection
                    .reject(player, &CountryCode::unknown(), started),
            ),
        };

        LookupOutcome::Exhausted { attempts, action }
    }
}
