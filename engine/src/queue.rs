//! Pending-operation data model.
//!
//! A delivery that fails (or is attempted offline) becomes a
//! [`PendingOperation`] in the category's [`PendingQueue`]. The queue is a
//! plain FIFO: operations are replayed strictly oldest-first, and a failure
//! mid-drain leaves the undelivered suffix in place for the next pass. The
//! durable persistence of queues is the client's concern; this module only
//! defines the shape and the ordering rules.

use crate::{error::Error, Record, Timestamp};
use serde::{Deserialize, Serialize};

/// The kind of remote operation a queue entry carries.
///
/// Serialized names are the remote protocol's operation verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Insert,
    Update,
    Upsert,
    Delete,
}

impl OperationKind {
    /// Wire name of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Insert => "insert",
            OperationKind::Update => "update",
            OperationKind::Upsert => "upsert",
            OperationKind::Delete => "delete",
        }
    }
}

/// A not-yet-confirmed remote operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOperation {
    /// Operation verb to replay
    pub kind: OperationKind,
    /// Records the operation carries, in their original order
    pub items: Vec<Record>,
    /// When the operation entered the queue (milliseconds since epoch)
    pub enqueued_at: Timestamp,
}

/// FIFO queue of pending operations for a single category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingQueue {
    operations: Vec<PendingOperation>,
}

impl PendingQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation at the tail.
    pub fn enqueue(&mut self, kind: OperationKind, items: Vec<Record>, enqueued_at: Timestamp) {
        self.operations.push(PendingOperation {
            kind,
            items,
            enqueued_at,
        });
    }

    /// Operations in replay order, oldest first.
    pub fn operations(&self) -> &[PendingOperation] {
        &self.operations
    }

    /// Drop the first `delivered` operations after a partially successful
    /// drain pass. The remainder keeps its order.
    pub fn drop_first(&mut self, delivered: usize) {
        let delivered = delivered.min(self.operations.len());
        self.operations.drain(..delivered);
    }

    /// Remove everything after a fully successful drain pass.
    pub fn clear(&mut self) {
        self.operations.clear();
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Serialize for durable storage.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|e| Error::InvalidQueue(e.to_string()))
    }

    /// Deserialize from durable storage.
    ///
    /// Callers that load persisted queues are expected to treat this error as
    /// "no queue" - a corrupt queue must never take the sync layer down.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::InvalidQueue(e.to_string()))
    }
}
