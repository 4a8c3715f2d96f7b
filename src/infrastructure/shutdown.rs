//! Graceful Shutdown
//!
//! Stops the host bridge on Ctrl+C/SIGTERM and lets lookups that are
//! already running finish before the process exits.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

/// Coordinates shutdown between the bridge and in-flight lookups.
#[derive(Clone)]
pub struct ShutdownController {
    stopping: Arc<AtomicBool>,
    in_flight: Arc<AtomicUsize>,
    stop_tx: broadcast::Sender<()>,
    drained: Arc<Notify>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (stop_tx, _) = broadcast::channel(1);
        Self {
            stopping: Arc::new(AtomicBool::new(false)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            stop_tx,
            drained: Arc::new(Notify::new()),
        }
    }

    /// Receiver that fires once shutdown begins.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.stop_tx.subscribe()
    }

    /// Begin shutdown. Later calls are no-ops.
    pub fn shutdown(&self) {
        if !self.stopping.swap(true, Ordering::SeqCst) {
            tracing::info!("shutting down, {} lookups in flight", self.in_flight());
            let _ = self.stop_tx.send(());
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    /// Number of lookups that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Track a lookup until the returned guard is dropped.
    pub fn lookup_guard(&self) -> LookupGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        LookupGuard {
            controller: self.clone(),
        }
    }

    fn lookup_finished(&self) {
        let prev = self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if prev == 1 {
            self.drained.notify_waiters();
        }
    }

    /// Wait until no lookups are in flight, or `timeout` elapses.
    ///
    /// Returns `true` if everything drained.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let drained = self.drained.notified();
        tokio::pin!(drained);
        drained.as_mut().enable();

        if self.in_flight() == 0 {
            return true;
        }

        tokio::select! {
            _ = drained => true,
            _ = tokio::time::sleep(timeout) => {
                tracing::warn!(
                    "drain timeout: {} lookups still in flight",
                    self.in_flight()
                );
                false
            }
        }
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks one in-flight lookup; released on drop.
pub struct LookupGuard {
    controller: ShutdownController,
}

impl Drop for LookupGuard {
    fn drop(&mut self) {
        self.controller.lookup_finished();
    }
}

/// Resolve once Ctrl+C or SIGTERM is received, then trigger shutdown.
pub async fn shutdown_signal(controller: ShutdownController) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {:?}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {:?}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C"),
        _ = terminate => tracing::info!("received SIGTERM"),
    }

    controller.shutdown();
}
