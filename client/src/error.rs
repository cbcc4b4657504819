//! Unified error handling for the client runtime.
//!
//! Transport failures are deliberately NOT errors - they are [`Outcome`]
//! values, because a failed delivery is an expected state the queue absorbs.
//! Errors here are the genuinely local problems: storage IO and
//! serialization.
//!
//! [`Outcome`]: crate::transport::Outcome

use thiserror::Error;

/// Application error type for the sync runtime.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("engine error: {0}")]
    Engine(#[from] tillsync_engine::Error),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, SyncError>;
