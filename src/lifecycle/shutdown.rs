//! Shutdown coordination for the proxy.

use std::future::Future;
use std::time::Duration;

use tokio::sync::broadcast;

/// How long in-flight requests get to finish after shutdown is triggered.
/// Streams may never end on their own, so the process exits when this elapses.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that the server loop (and anything else
/// long-running) can subscribe to. Dropping the coordinator counts as a trigger.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Future that completes once shutdown is triggered or the coordinator
    /// is dropped. Subscribes immediately, so a later trigger is never missed.
    pub fn signalled(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.subscribe();
        async move {
            let _ = rx.recv().await;
        }
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Get the number of active subscribers (tasks still running).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
