//! Host Bridge Adapter
//!
//! Accepts TCP connections from the game host and speaks newline-delimited
//! JSON: `connected`/`disconnected` events in, `kick`/`ban` commands out.

use crate::adapters::bridge_protocol::{HostCommand, HostEvent};
use crate::adapters::outbound::{BridgeSession, BridgeSessions};
use crate::application::LookupOrchestrator;
use crate::infrastructure::ShutdownController;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;

/// How long a closing bridge waits for its lookups during shutdown.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Host Bridge - inbound adapter for player events.
///
/// Each accepted connection is one host. Players it announces are
/// registered in [`BridgeSessions`] and handed to the orchestrator;
/// rejections flow back over the same connection.
///
/// On shutdown every bridge stops reading events but keeps its sessions
/// and command writer until in-flight lookups have drained, so late
/// rejections still reach the host.
pub struct HostBridge {
    orchestrator: Arc<LookupOrchestrator>,
    sessions: Arc<BridgeSessions>,
    listen_addr: String,
    shutdown: ShutdownController,
    drain_timeout: Duration,
    next_bridge_id: AtomicU64,
}

impl HostBridge {
    pub fn new(
        orchestrator: Arc<LookupOrchestrator>,
        sessions: Arc<BridgeSessions>,
        listen_addr: String,
        shutdown: ShutdownController,
    ) -> Self {
        Self {
            orchestrator,
            sessions,
            listen_addr,
            shutdown,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            next_bridge_id: AtomicU64::new(0),
        }
    }

    /// Bound the wait for in-flight lookups once shutdown begins.
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn run(&self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&self.listen_addr).await?;
        self.serve(listener).await
    }

    /// Serve host connections on an already bound listener.
    ///
    /// Returns after shutdown once every bridge connection has drained
    /// and flushed its queued commands.
    pub async fn serve(&self, listener: TcpListener) -> anyhow::Result<()> {
        let mut stop = self.shutdown.subscribe();
        if self.shutdown.is_shutdown() {
            return Ok(());
        }

        tracing::info!("host bridge listening on {}", listener.local_addr()?);

        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                _ = stop.recv() => {
                    tracing::info!("host bridge stopped accepting connections");
                    break;
                }
                Some(finished) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = finished {
                        tracing::error!("host bridge task failed: {:?}", e);
                    }
                }
                accepted = listener.accept() => {
                    let (stream, addr) = accepted?;
                    let bridge_id = self.next_bridge_id.fetch_add(1, Ordering::Relaxed);

                    connections.spawn(Self::serve_connection(
                        self.orchestrator.clone(),
                        self.sessions.clone(),
                        self.shutdown.clone(),
                        self.drain_timeout,
                        stream,
                        addr,
                        bridge_id,
                    ));
                }
            }
        }

        while let Some(finished) = connections.join_next().await {
            if let Err(e) = finished {
                tracing::error!("host bridge task failed: {:?}", e);
            }
        }

        Ok(())
    }

    async fn serve_connection(
        orchestrator: Arc<LookupOrchestrator>,
        sessions: Arc<BridgeSessions>,
        shutdown: ShutdownController,
        drain_timeout: Duration,
        stream: TcpStream,
        addr: SocketAddr,
        bridge_id: u64,
    ) {
        tracing::info!("host {} connected (bridge {})", addr, bridge_id);

        let stop = shutdown.subscribe();
        let (read_half, write_half) = stream.into_split();
        let (commands, queued) = mpsc::unbounded_channel();
        let writer = tokio::spawn(Self::write_commands(write_half, queued, addr));

        if shutdown.is_shutdown() {
            tracing::debug!("host {} connected during shutdown, not reading events", addr);
        } else if let Err(e) = Self::read_events(
            &orchestrator,
            &sessions,
            read_half,
            addr,
            bridge_id,
            &commands,
            stop,
        )
        .await
        {
            tracing::error!("host bridge error from {}: {:?}", addr, e);
        }
        drop(commands);

        // Sessions must outlive the drain: a lookup that denies its player
        // still needs them to reach the host.
        if shutdown.is_shutdown() && !shutdown.wait_for_drain(drain_timeout).await {
            tracing::warn!("host {} closing with lookups still in flight", addr);
        }

        let dropped = sessions.remove_bridge(bridge_id);
        tracing::info!("host {} disconnected, dropped {} sessions", addr, dropped);

        if let Err(e) = writer.await {
            tracing::error!("command writer for {} failed: {:?}", addr, e);
        }
    }

    async fn read_events(
        orchestrator: &Arc<LookupOrchestrator>,
        sessions: &BridgeSessions,
        read_half: OwnedReadHalf,
        addr: SocketAddr,
        bridge_id: u64,
        commands: &mpsc::UnboundedSender<HostCommand>,
        mut stop: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let mut lines = BufReader::new(read_half).lines();

        loop {
            let line = tokio::select! {
                _ = stop.recv() => break,
                line = lines.next_line() => line?,
            };

            let Some(line) = line else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let event = match serde_json::from_str::<HostEvent>(&line) {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("malformed message from host {}: {}", addr, e);
                    continue;
                }
            };

            match event {
                HostEvent::Connected {
                    ref id,
                    ref address,
                    admin,
                    ..
                } => {
                    sessions.register(BridgeSession::new(
                        id.as_str(),
                        address.as_str(),
                        admin,
                        bridge_id,
                        commands.clone(),
                    ));
                    if let Some(player) = event.connection() {
                        orchestrator.on_player_connected(player);
                    }
                }
                HostEvent::Disconnected { id } => {
                    tracing::debug!("player {} disconnected", id);
                    sessions.remove(&id);
                }
            }
        }

        Ok(())
    }

    /// Drain queued commands onto the socket as JSON lines.
    ///
    /// Ends once every sender is dropped or the host stops reading.
    async fn write_commands(
        mut writer: OwnedWriteHalf,
        mut queued: mpsc::UnboundedReceiver<HostCommand>,
        addr: SocketAddr,
    ) {
        while let Some(command) = queued.recv().await {
            let mut line = match serde_json::to_string(&command) {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!("failed to encode command for {}: {}", addr, e);
                    continue;
                }
            };
            line.push('\n');

            if let Err(e) = writer.write_all(line.as_bytes()).await {
                tracing::warn!("failed to send command to host {}: {}", addr, e);
                return;
            }
        }

        let _ = writer.shutdown().await;
    }
}
