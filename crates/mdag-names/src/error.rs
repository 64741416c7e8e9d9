//! Error types for naming operations.

use thiserror::Error;

/// Errors that can occur during naming operations.
#[derive(Debug, Error)]
pub enum NameError {
    /// No record is published under this name.
    #[error("name not found: {name}")]
    NotFound { name: String },

    /// The name or key label is invalid.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// A record with an equal or newer sequence number is already stored.
    #[error("stale record for {name}: sequence {offered} is not newer than {current}")]
    StaleSequence {
        name: String,
        offered: u64,
        current: u64,
    },

    /// The record signature does not verify against its key.
    #[error("bad signature on record for {name}")]
    BadSignature { name: String },

    /// The record's validity window has passed.
    #[error("record for {name} expired at {expired_at}")]
    Expired { name: String, expired_at: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error during file-based name operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for naming operations.
pub type Result<T> = std::result::Result<T, NameError>;
