//! Connectivity monitor - a single global online/offline gate.
//!
//! Purely event-driven: the hosting application feeds platform connectivity
//! signals in through [`ConnectivityMonitor::set_online`] and
//! [`ConnectivityMonitor::set_offline`]; the orchestrator watches for the
//! offline→online edge to trigger queue draining. There is no polling, and
//! one monitor serves every category.

use std::sync::Arc;
use tokio::sync::watch;

/// Tracks online/offline transitions and broadcasts them to watchers.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    state: Arc<watch::Sender<bool>>,
}

impl ConnectivityMonitor {
    /// Create a monitor with the given initial state.
    pub fn new(initially_online: bool) -> Self {
        let (tx, _rx) = watch::channel(initially_online);
        Self { state: Arc::new(tx) }
    }

    /// Report the platform as online. Watchers only wake on a transition.
    pub fn set_online(&self) {
        self.set(true);
    }

    /// Report the platform as offline. In-flight attempts still resolve on
    /// their own; only new remote activity is suppressed.
    pub fn set_offline(&self) {
        self.set(false);
    }

    fn set(&self, online: bool) {
        // Only a real transition reaches the watchers.
        let changed = self.state.send_if_modified(|state| {
            if *state == online {
                false
            } else {
                *state = online;
                true
            }
        });
        if changed {
            tracing::info!(online, "connectivity changed");
        }
    }

    /// Current state.
    pub fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions() {
        let monitor = ConnectivityMonitor::new(true);
        assert!(monitor.is_online());

        monitor.set_offline();
        assert!(!monitor.is_online());

        monitor.set_online();
        assert!(monitor.is_online());
    }

    #[tokio::test]
    async fn watchers_see_the_edge() {
        let monitor = ConnectivityMonitor::new(false);
        let mut watcher = monitor.subscribe();

        monitor.set_online();

        watcher.changed().await.unwrap();
        assert!(*watcher.borrow_and_update());
    }

    #[tokio::test]
    async fn repeated_signal_is_not_a_transition() {
        let monitor = ConnectivityMonitor::new(true);
        let mut watcher = monitor.subscribe();
        watcher.borrow_and_update();

        monitor.set_online();

        // No transition happened, so nothing is marked changed.
        assert!(!watcher.has_changed().unwrap());
    }
}
