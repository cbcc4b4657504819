//! Sync orchestrator - drives full syncs, push hooks, and queue draining.
//!
//! One orchestrator instance exists per process, constructed explicitly and
//! handed by reference to whatever needs it. It owns the `syncing` mutex:
//! only one full pass may be in flight process-wide, and concurrent trigger
//! attempts are silently dropped - the next periodic tick retries naturally.
//!
//! A pass walks the categories in the fixed [`Category::ALL`] order. Each
//! category is pulled (best-effort), merged, and pushed independently; one
//! category's failure never aborts the rest of the pass.

use crate::config::SyncConfig;
use crate::connectivity::ConnectivityMonitor;
use crate::error::Result;
use crate::event::SyncEvent;
use crate::queue::PendingQueues;
use crate::store::{CategoryStore, LocalStore};
use crate::transport::Transport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tillsync_engine::{merge, Category, OperationKind, Record, Timestamp};
use tokio::sync::broadcast;

/// The synchronization service.
pub struct SyncOrchestrator {
    store: CategoryStore,
    queues: PendingQueues,
    transport: Arc<dyn Transport>,
    connectivity: ConnectivityMonitor,
    config: SyncConfig,
    syncing: AtomicBool,
    events: broadcast::Sender<SyncEvent>,
}

/// Resets the `syncing` flag when a pass ends, however it ends.
struct SyncingGuard<'a>(&'a AtomicBool);

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SyncOrchestrator {
    /// Build the service from its injected collaborators.
    pub fn new(
        store: Arc<dyn LocalStore>,
        transport: Arc<dyn Transport>,
        connectivity: ConnectivityMonitor,
        config: SyncConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            store: CategoryStore::new(store.clone()),
            queues: PendingQueues::new(store),
            transport,
            connectivity,
            config,
            syncing: AtomicBool::new(false),
            events,
        }
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// The local category store, for hosts that read synced data back.
    pub fn store(&self) -> &CategoryStore {
        &self.store
    }

    fn emit(&self, event: SyncEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn now_ms() -> Timestamp {
        chrono::Utc::now().timestamp_millis().max(0) as Timestamp
    }

    /// Run one full sync pass over every category.
    ///
    /// Returns `false` without doing anything when offline or when a pass is
    /// already in flight. Per-category failures are logged, reported through
    /// [`SyncEvent::Progress`] gaps, and do not abort the pass.
    pub async fn sync_all(&self) -> bool {
        if !self.connectivity.is_online() {
            tracing::debug!("offline, skipping sync pass");
            return false;
        }
        if self
            .syncing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("sync already in flight, dropping trigger");
            return false;
        }
        let _guard = SyncingGuard(&self.syncing);

        self.emit(SyncEvent::SyncStarted);
        tracing::info!("full sync started");

        let total = Category::ALL.len();
        for (position, category) in Category::ALL.into_iter().enumerate() {
            self.emit(SyncEvent::Progress {
                category,
                index: position + 1,
                total,
            });

            if let Err(e) = self.sync_category(category).await {
                tracing::warn!(%category, error = %e, "category sync failed, continuing");
            }

            // Breathe between categories so the remote is not hammered.
            if position + 1 < total && !self.config.throttle.is_zero() {
                tokio::time::sleep(self.config.throttle).await;
            }
        }

        self.emit(SyncEvent::FullSyncComplete);
        tracing::info!("full sync complete");
        true
    }

    async fn sync_category(&self, category: Category) -> Result<()> {
        // First contact with a category: ask the remote to provision it.
        if self.store.watermark(category).is_none() {
            let outcome = self.transport.init(category).await;
            tracing::debug!(%category, ?outcome, "remote sheet init");
        }

        // Pull is best-effort; an opaque transport yields nothing usable and
        // the pass degrades to push-only.
        if let Some(remote) = self
            .transport
            .pull(category, self.store.watermark(category))
            .await
        {
            let local = self.store.read(category);
            let merged = merge(category, local, remote);
            self.store.write(category, merged)?;
            tracing::debug!(%category, "remote snapshot merged");
        }

        self.push_category(category).await
    }

    /// Push the category's full local snapshot as one upsert.
    ///
    /// An empty or unreadable snapshot is skipped silently. A failed delivery
    /// defers to the pending queue.
    pub async fn push_category(&self, category: Category) -> Result<()> {
        let snapshot = self.store.read(category);
        if snapshot.is_empty() {
            tracing::debug!(%category, "no local data, skipping push");
            return Ok(());
        }

        let outcome = self
            .transport
            .send(category, OperationKind::Upsert, &snapshot)
            .await;

        if outcome.delivered() {
            self.store.set_watermark(category, Self::now_ms())?;
        } else {
            self.queues
                .enqueue(category, OperationKind::Upsert, snapshot, Self::now_ms())?;
            self.emit(SyncEvent::DataQueued { category });
        }
        Ok(())
    }

    /// Host hook: a record was saved.
    ///
    /// Assigns a timestamp when the record has none, mirrors it into the
    /// local snapshot, and pushes the category - or queues when offline.
    pub async fn on_record_saved(&self, category: Category, mut record: Record) -> Result<()> {
        record.ensure_timestamp(Self::now_ms());
        self.store.upsert(category, record.clone())?;

        if !self.connectivity.is_online() {
            self.queues
                .enqueue(category, OperationKind::Upsert, vec![record], Self::now_ms())?;
            self.emit(SyncEvent::DataQueued { category });
            return Ok(());
        }

        self.push_category(category).await
    }

    /// Host hook: a record was deleted.
    ///
    /// Removes it locally and sends a delete carrying just the identity
    /// field - or queues the delete when offline or when delivery fails.
    pub async fn on_record_deleted(
        &self,
        category: Category,
        identity: serde_json::Value,
    ) -> Result<()> {
        self.store.remove(category, &identity)?;

        let mut item = Record::new();
        item.set(category.identity_field(), identity);
        let items = vec![item];

        if self.connectivity.is_online() {
            let outcome = self
                .transport
                .send(category, OperationKind::Delete, &items)
                .await;
            if outcome.delivered() {
                self.store.set_watermark(category, Self::now_ms())?;
                return Ok(());
            }
        }

        self.queues
            .enqueue(category, OperationKind::Delete, items, Self::now_ms())?;
        self.emit(SyncEvent::DataQueued { category });
        Ok(())
    }

    /// One drain pass per category, in the fixed order.
    ///
    /// A category whose drain errors locally is logged and skipped; the
    /// remaining categories still get their pass, same as in [`sync_all`].
    ///
    /// [`sync_all`]: SyncOrchestrator::sync_all
    pub async fn drain_queues(&self) {
        for category in Category::ALL {
            match self.queues.drain(category, self.transport.as_ref()).await {
                Ok(report) if report.delivered > 0 => {
                    if let Err(e) = self.store.set_watermark(category, Self::now_ms()) {
                        tracing::warn!(%category, error = %e, "watermark update failed");
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(%category, error = %e, "queue drain failed, continuing");
                }
            }
        }
    }

    /// Offline→online edge: announce it, drain queues, then sync.
    pub async fn handle_reconnected(&self) {
        self.emit(SyncEvent::Reconnected);
        tracing::info!("back online, draining pending queues");
        self.drain_queues().await;
        self.sync_all().await;
    }

    /// Manual trigger: drop every local snapshot, watermark and queue, then
    /// run one full sync so pull can repopulate from the remote.
    pub async fn clear_cache_and_resync(&self) -> bool {
        for category in Category::ALL {
            self.store.clear(category);
            self.queues.clear(category);
        }
        tracing::info!("local cache cleared, forcing full sync");
        self.sync_all().await
    }

    /// Periodic trigger loop: startup delay, first sync, then a fixed
    /// interval, reacting to reconnections in between.
    ///
    /// Runs until the task is dropped; a pass in flight cannot be aborted,
    /// only the next one prevented.
    pub async fn run(self: Arc<Self>) {
        let mut online = self.connectivity.subscribe();
        online.borrow_and_update();

        // Let dependent local writes settle before the first attempt.
        tokio::time::sleep(self.config.startup_delay).await;
        self.sync_all().await;

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // interval() fires immediately; the startup sync already happened.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sync_all().await;
                }
                changed = online.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if *online.borrow_and_update() {
                        self.handle_reconnected().await;
                    }
                }
            }
        }
    }
}
