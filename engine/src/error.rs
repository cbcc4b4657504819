//! Error types for the Tillsync engine.
//!
//! The surface is deliberately small: malformed business records are not
//! errors (the engine fails open and treats them as absent data), so only
//! genuinely unrecoverable inputs produce an `Error`.

use thiserror::Error;

/// All possible errors from the Tillsync engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("invalid pending queue: {0}")]
    InvalidQueue(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
