use tokio::sync::broadcast;
use tracing::info;

use super::types::{OverallStatus, Snapshot, StatusTransition};

/// Detects overall-status changes across check cycles and fans them out.
///
/// Three-state machine over `OverallStatus`, seeded `Online` so that a first
/// cycle landing on `Partial` or `Offline` is reported as a transition. The
/// stored previous status advances exactly once per emitted event.
pub struct ChangeNotifier {
    previous: OverallStatus,
    tx: broadcast::Sender<StatusTransition>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(64);
        Self { previous: OverallStatus::Online, tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusTransition> {
        self.tx.subscribe()
    }

    /// Overall status as of the last emitted transition
    pub fn previous(&self) -> OverallStatus {
        self.previous
    }

    /// Evaluate a completed cycle's snapshot; emits at most one event, and
    /// only when the overall status actually changed.
    pub fn observe(&mut self, snapshot: &Snapshot) -> Option<StatusTransition> {
        let current = snapshot.overall_status;
        if current == self.previous {
            return None;
        }

        let transition =
            StatusTransition { previous: self.previous, current, snapshot: snapshot.clone() };
        self.previous = current;

        info!(previous = %transition.previous, current = %transition.current, "overall status changed");

        // Ignore errors if there are no receivers
        let _ = self.tx.send(transition.clone());

        Some(transition)
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
