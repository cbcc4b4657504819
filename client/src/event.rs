//! Lifecycle events for external collaborators.
//!
//! Status widgets and other host UI should depend on these events only,
//! never on the orchestrator's internals.

use serde::Serialize;
use tillsync_engine::Category;

/// What the sync layer is doing, for observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SyncEvent {
    /// A full sync pass began.
    SyncStarted,
    /// Per-step progress within a pass: `index` of `total` categories.
    Progress {
        category: Category,
        index: usize,
        total: usize,
    },
    /// A full sync pass finished (individual categories may have failed).
    FullSyncComplete,
    /// A delivery could not go out and was queued for later.
    DataQueued { category: Category },
    /// Connectivity returned; queued deliveries are about to drain.
    Reconnected,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn events_serialize_tagged() {
        let event = SyncEvent::Progress {
            category: Category::Orders,
            index: 3,
            total: 5,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "progress", "category": "orders", "index": 3, "total": 5})
        );

        let event = SyncEvent::DataQueued {
            category: Category::Products,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "dataQueued", "category": "products"})
        );
    }
}
