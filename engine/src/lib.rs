//! # Tillsync Engine
//!
//! Deterministic synchronization logic for an offline-tolerant point-of-sale
//! application.
//!
//! The engine mirrors locally persisted business records (products, orders,
//! finance entries, users, configuration) against a remote spreadsheet-backed
//! store. This crate holds the pure half of that work: category identity,
//! record matching, timestamp-ordered merging, and the pending-operation data
//! model. It performs no IO - storage adapters, HTTP transport, and the sync
//! orchestrator live in the companion client crate.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine has no knowledge of files, network, or platform
//! - **Deterministic**: the same inputs always produce the same outputs
//! - **Fail open**: malformed or absent local data is treated as empty input,
//!   never as an error
//!
//! ## Core Concepts
//!
//! ### Categories
//!
//! Business data is partitioned into a fixed set of [`Category`] values. Each
//! category maps to exactly one local storage key, one remote sheet, and one
//! identity field used for record matching.
//!
//! ### Records
//!
//! A [`Record`] is an open JSON object. The engine never owns record
//! identity; it only reads the category's identity field and the
//! `timestamp` field (milliseconds since epoch) for ordering.
//!
//! ### Merge
//!
//! [`merge`] reconciles a local and a remote item set with a last-writer-wins
//! rule: the record with the greater timestamp survives, local wins ties,
//! unmatched remote records are appended as new.
//!
//! ### Pending Operations
//!
//! Deliveries that fail (or are attempted while offline) become
//! [`PendingOperation`]s in a per-category [`PendingQueue`], replayed strictly
//! oldest-first when connectivity returns.
//!
//! ## Quick Start
//!
//! ```rust
//! use tillsync_engine::{merge, Category, Record};
//! use serde_json::json;
//!
//! let local = vec![Record::try_from(json!({"id": "p1", "timestamp": 200})).unwrap()];
//! let remote = vec![
//!     Record::try_from(json!({"id": "p1", "timestamp": 150})).unwrap(),
//!     Record::try_from(json!({"id": "p2", "timestamp": 300})).unwrap(),
//! ];
//!
//! let merged = merge(Category::Products, local, remote);
//!
//! // Local p1 wins (200 > 150), remote p2 is appended, sorted newest-first.
//! assert_eq!(merged.len(), 2);
//! assert_eq!(merged[0].timestamp(), 300);
//! assert_eq!(merged[1].timestamp(), 200);
//! ```

pub mod category;
pub mod error;
pub mod merge;
pub mod queue;
pub mod record;

// Re-export main types at crate root
pub use category::Category;
pub use error::Error;
pub use merge::merge;
pub use queue::{OperationKind, PendingOperation, PendingQueue};
pub use record::{records_from_value, records_to_value, Record};

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;
