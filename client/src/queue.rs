//! Durable per-category pending-operation queues.
//!
//! Every enqueue persists immediately under `syncQueue_<key>`, so queued
//! deliveries survive a process restart. Draining replays oldest-first and
//! halts on the first failure, keeping the undelivered suffix in order for
//! the next pass; the delivered prefix is never re-sent.

use crate::error::Result;
use crate::store::LocalStore;
use crate::transport::Transport;
use std::sync::Arc;
use tillsync_engine::{Category, OperationKind, PendingQueue, Record, Timestamp};

/// What one drain pass did for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    /// Operations delivered and removed in this pass
    pub delivered: usize,
    /// Operations still queued after the pass
    pub remaining: usize,
}

/// Durable pending-operation queues over the local store.
#[derive(Clone)]
pub struct PendingQueues {
    store: Arc<dyn LocalStore>,
}

impl PendingQueues {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// Load a category's queue, failing open on corruption.
    pub fn load(&self, category: Category) -> PendingQueue {
        let Some(raw) = self.store.get_item(&category.queue_key()) else {
            return PendingQueue::new();
        };
        match PendingQueue::from_json(&raw) {
            Ok(queue) => queue,
            Err(e) => {
                tracing::warn!(%category, error = %e, "corrupt pending queue, starting empty");
                PendingQueue::new()
            }
        }
    }

    fn save(&self, category: Category, queue: &PendingQueue) -> Result<()> {
        if queue.is_empty() {
            self.store.remove_item(&category.queue_key());
            return Ok(());
        }
        self.store.set_item(&category.queue_key(), &queue.to_json()?)
    }

    /// Append an operation and persist at once.
    pub fn enqueue(
        &self,
        category: Category,
        kind: OperationKind,
        items: Vec<Record>,
        enqueued_at: Timestamp,
    ) -> Result<()> {
        let mut queue = self.load(category);
        queue.enqueue(kind, items, enqueued_at);
        tracing::debug!(%category, pending = queue.len(), "operation queued for later delivery");
        self.save(category, &queue)
    }

    /// Pending operation count for a category.
    pub fn len(&self, category: Category) -> usize {
        self.load(category).len()
    }

    /// Replay a category's queue oldest-first through the transport.
    ///
    /// Stops at the first failed delivery; a fully drained queue is removed
    /// from the store. Draining an empty queue is a no-op.
    pub async fn drain(&self, category: Category, transport: &dyn Transport) -> Result<DrainReport> {
        let mut queue = self.load(category);
        if queue.is_empty() {
            return Ok(DrainReport {
                delivered: 0,
                remaining: 0,
            });
        }

        let mut delivered = 0;
        for operation in queue.operations() {
            let outcome = transport
                .send(category, operation.kind, &operation.items)
                .await;
            if !outcome.delivered() {
                break;
            }
            delivered += 1;
        }

        queue.drop_first(delivered);
        let remaining = queue.len();
        self.save(category, &queue)?;

        if remaining > 0 {
            tracing::warn!(%category, delivered, remaining, "drain halted mid-queue");
        } else if delivered > 0 {
            tracing::info!(%category, delivered, "pending queue drained");
        }

        Ok(DrainReport {
            delivered,
            remaining,
        })
    }

    /// Drop a category's queue without delivering it.
    pub fn clear(&self, category: Category) {
        self.store.remove_item(&category.queue_key());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::transport::Outcome;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tillsync_engine::records_from_value;

    /// Transport that answers from a script and records every send.
    struct ScriptedTransport {
        outcomes: Mutex<VecDeque<Outcome>>,
        sent: Mutex<Vec<(Category, OperationKind, usize)>>,
    }

    impl ScriptedTransport {
        fn new(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into_iter().collect()),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<(Category, OperationKind, usize)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, category: Category, kind: OperationKind, items: &[Record]) -> Outcome {
            self.sent.lock().unwrap().push((category, kind, items.len()));
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Outcome::Confirmed)
        }

        async fn pull(&self, _: Category, _: Option<Timestamp>) -> Option<Vec<Record>> {
            None
        }
    }

    fn queues() -> PendingQueues {
        PendingQueues::new(Arc::new(MemoryStore::new()))
    }

    fn item(id: &str) -> Vec<Record> {
        records_from_value(json!([{"id": id, "timestamp": 100}]))
    }

    #[tokio::test]
    async fn drain_empty_is_noop() {
        let queues = queues();
        let transport = ScriptedTransport::new([]);

        let report = queues.drain(Category::Orders, &transport).await.unwrap();

        assert_eq!(report, DrainReport { delivered: 0, remaining: 0 });
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn full_drain_clears_persisted_queue() {
        let queues = queues();
        queues
            .enqueue(Category::Products, OperationKind::Upsert, item("a"), 1)
            .unwrap();
        queues
            .enqueue(Category::Products, OperationKind::Delete, item("b"), 2)
            .unwrap();

        let transport = ScriptedTransport::new([Outcome::Confirmed, Outcome::Unconfirmed]);
        let report = queues.drain(Category::Products, &transport).await.unwrap();

        assert_eq!(report, DrainReport { delivered: 2, remaining: 0 });
        assert_eq!(queues.len(Category::Products), 0);

        // Replay order was FIFO.
        let kinds: Vec<_> = transport.sent().iter().map(|(_, k, _)| *k).collect();
        assert_eq!(kinds, [OperationKind::Upsert, OperationKind::Delete]);
    }

    #[tokio::test]
    async fn failure_halts_and_keeps_suffix() {
        let queues = queues();
        for (id, at) in [("a", 1), ("b", 2), ("c", 3)] {
            queues
                .enqueue(Category::Products, OperationKind::Upsert, item(id), at)
                .unwrap();
        }

        // A delivered, B fails: queue must become [B, C], C never attempted.
        let transport = ScriptedTransport::new([Outcome::Confirmed, Outcome::Failed]);
        let report = queues.drain(Category::Products, &transport).await.unwrap();

        assert_eq!(report, DrainReport { delivered: 1, remaining: 2 });
        assert_eq!(transport.sent().len(), 2);

        let queue = queues.load(Category::Products);
        let stamps: Vec<_> = queue.operations().iter().map(|op| op.enqueued_at).collect();
        assert_eq!(stamps, [2, 3]);

        // Next pass does not re-send A.
        let transport = ScriptedTransport::new([Outcome::Confirmed, Outcome::Confirmed]);
        let report = queues.drain(Category::Products, &transport).await.unwrap();
        assert_eq!(report, DrainReport { delivered: 2, remaining: 0 });
    }

    #[tokio::test]
    async fn corrupt_queue_loads_empty() {
        let store = Arc::new(MemoryStore::new());
        store
            .set_item(&Category::Users.queue_key(), "]][[ garbage")
            .unwrap();

        let queues = PendingQueues::new(store);
        assert_eq!(queues.len(Category::Users), 0);

        let transport = ScriptedTransport::new([]);
        let report = queues.drain(Category::Users, &transport).await.unwrap();
        assert_eq!(report, DrainReport { delivered: 0, remaining: 0 });
    }

    #[tokio::test]
    async fn queues_are_isolated_per_category() {
        let queues = queues();
        queues
            .enqueue(Category::Products, OperationKind::Upsert, item("p"), 1)
            .unwrap();
        queues
            .enqueue(Category::Orders, OperationKind::Upsert, item("o"), 2)
            .unwrap();

        let transport = ScriptedTransport::new([Outcome::Failed]);
        queues.drain(Category::Products, &transport).await.unwrap();

        // A failing products drain leaves orders untouched.
        assert_eq!(queues.len(Category::Products), 1);
        assert_eq!(queues.len(Category::Orders), 1);
    }
}
