//! # Tillsync Client
//!
//! The runtime half of Tillsync: an offline-tolerant synchronization layer
//! between a local key-value store and a spreadsheet-backed remote store
//! reachable only over unreliable, possibly opaque HTTP.
//!
//! The pure merge and queue logic lives in `tillsync-engine`; this crate
//! wires it to the world:
//!
//! - [`store`] - typed local persistence, namespaced per category
//! - [`queue`] - durable per-category pending-operation queues
//! - [`transport`] - best-effort HTTP sink with a three-valued outcome
//! - [`connectivity`] - online/offline monitor gating remote activity
//! - [`orchestrator`] - periodic full syncs, push hooks, queue draining
//!
//! ## Degradation model
//!
//! There are no fatal errors. When the network or the remote endpoint is
//! unavailable the layer degrades to local-only operation: deliveries are
//! queued, drained on reconnect, and the hosting application keeps working
//! untouched. Because the remote channel may return opaque responses,
//! "delivered" can mean only "dispatched without a network-level error" -
//! the [`transport::Outcome`] type keeps that distinction explicit.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tillsync_client::{
//!     connectivity::ConnectivityMonitor, orchestrator::SyncOrchestrator,
//!     store::MemoryStore, transport::HttpTransport, SyncConfig,
//! };
//!
//! # async fn demo() {
//! let config = SyncConfig::new("https://sheets.example/exec");
//! let store = Arc::new(MemoryStore::new());
//! let transport = Arc::new(HttpTransport::from_config(&config));
//! let connectivity = ConnectivityMonitor::new(true);
//!
//! let orchestrator = Arc::new(SyncOrchestrator::new(
//!     store, transport, connectivity.clone(), config,
//! ));
//!
//! // Periodic trigger: startup delay, then a fixed interval.
//! tokio::spawn(orchestrator.clone().run());
//!
//! // Host hooks.
//! connectivity.set_offline();
//! let _events = orchestrator.subscribe();
//! # }
//! ```

pub mod config;
pub mod connectivity;
pub mod error;
pub mod event;
pub mod orchestrator;
pub mod queue;
pub mod store;
pub mod transport;

// Re-export main types at crate root
pub use config::{ConfigError, SyncConfig};
pub use connectivity::ConnectivityMonitor;
pub use error::{Result, SyncError};
pub use event::SyncEvent;
pub use orchestrator::SyncOrchestrator;
pub use queue::{DrainReport, PendingQueues};
pub use store::{CategoryStore, FileStore, LocalStore, MemoryStore};
pub use transport::{HttpTransport, Outcome, Transport};

// The engine types flow through every public API here; re-export them so
// hosts depend on one crate.
pub use tillsync_engine::{Category, OperationKind, Record, Timestamp};
