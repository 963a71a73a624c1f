//! Background refresh timers
//!
//! Two timers run in the background: one tells the app to reload the open
//! market, the other to sweep expired cache entries. They only send
//! messages; the main loop owns the app and does the work.

use std::time::Duration;
use tokio::sync::mpsc;

/// Messages sent from background timers to the main loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMessage {
    /// Time to reload the open market
    RefreshDue,
    /// Time to drop expired cache entries
    CleanupDue,
}

/// Configuration for refresh intervals
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Interval between market reloads
    pub refresh_interval: Duration,
    /// Interval between cache sweeps
    pub cleanup_interval: Duration,
    /// Whether the timers run at all
    pub enabled: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(300),  // 5 minutes
            cleanup_interval: Duration::from_secs(1800), // 30 minutes
            enabled: true,
        }
    }
}

/// Handle for controlling the background timers
pub struct RefreshHandle {
    /// Channel for receiving timer messages
    pub receiver: mpsc::Receiver<RefreshMessage>,
    shutdown_tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Spawns the timers; messages arrive on `receiver`
    pub fn spawn(config: RefreshConfig) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(32);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        if config.enabled {
            tokio::spawn(async move {
                let mut refresh = tokio::time::interval(config.refresh_interval);
                let mut cleanup = tokio::time::interval(config.cleanup_interval);
                // Both fire immediately on the first tick
                refresh.tick().await;
                cleanup.tick().await;

                loop {
                    let message = tokio::select! {
                        _ = refresh.tick() => RefreshMessage::RefreshDue,
                        _ = cleanup.tick() => RefreshMessage::CleanupDue,
                        _ = shutdown_rx.recv() => break,
                    };
                    if msg_tx.send(message).await.is_err() {
                        // Receiver dropped
                        break;
                    }
                }
            });
        }

        Self {
            receiver: msg_rx,
            shutdown_tx,
        }
    }

    /// Stops the timers
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Checks for a pending message without blocking
pub fn try_recv(handle: &mut RefreshHandle) -> Option<RefreshMessage> {
    handle.receiver.try_recv().ok()
}
