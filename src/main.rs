//! countryBlock - Country restriction service for game hosts
//!
//! This is the composition root that wires together all the components.

mod adapters;
mod application;
mod config;
mod domain;
mod infrastructure;

use crate::adapters::inbound::HostBridge;
use crate::adapters::outbound::{
    BridgeSessions, ReqwestGeoLookupClient, StaticPermissions, TemplateLocalizer,
};
use crate::application::{LookupOrchestrator, RejectionHandler};
use crate::config::load_config;
use crate::infrastructure::{shutdown_signal, ShutdownController};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let policy = Arc::new(cfg.policy());
    let registry = cfg.registry()?;

    tracing::info!(
        "starting countryBlock listen={} mode={} countries={:?} providers={}",
        cfg.listen_addr,
        policy.mode,
        cfg.country_list,
        registry.endpoints().len()
    );

    // ===== COMPOSITION ROOT =====

    // 1. Create outbound adapters
    let client = Arc::new(ReqwestGeoLookupClient::new(cfg.http_timeout())?);
    let sessions = Arc::new(BridgeSessions::new());
    let permissions = Arc::new(StaticPermissions::from_ids(&cfg.bypass_ids, &cfg.admin_ids));
    let localizer = Arc::new(TemplateLocalizer::new());

    // 2. Create application service
    let shutdown = ShutdownController::new();
    let rejection = RejectionHandler::new(sessions.clone(), localizer, policy.ban_instantly);
    let orchestrator = LookupOrchestrator::new(
        registry,
        client,
        sessions.clone(),
        permissions,
        rejection,
        policy,
        cfg.retry_policy(),
    )
    .with_rng_seed(cfg.rng_seed)
    .with_shutdown(shutdown.clone());

    // 3. Create inbound adapter and run until a signal arrives
    let bridge = HostBridge::new(
        Arc::new(orchestrator),
        sessions,
        cfg.listen_addr.clone(),
        shutdown.clone(),
    )
    .with_drain_timeout(cfg.drain_timeout());

    tokio::spawn(shutdown_signal(shutdown.clone()));
    let result = bridge.run().await;

    shutdown.shutdown();
    if shutdown.wait_for_drain(cfg.drain_timeout()).await {
        tracing::info!("all lookups finished");
    }

    result
}
