//! Error types for node and link-table operations.

use mdag_store::{ObjectKind, StoreError};
use mdag_types::ObjectId;

/// Errors that can occur while reading or editing nodes.
#[derive(Debug, thiserror::Error)]
pub enum DagError {
    /// No link with this exact name exists in the node.
    #[error("no link named {name:?}")]
    LinkNotFound {
        /// The requested link name.
        name: String,
    },

    /// An intermediate path segment does not exist and creation was not requested.
    #[error("no link named {segment:?} under {path:?}")]
    MissingSegment {
        /// The segment that could not be found.
        segment: String,
        /// The path walked before the missing segment.
        path: String,
    },

    /// The link name is unusable (empty, or contains empty segments).
    #[error("invalid link name {name:?}: {reason}")]
    InvalidLinkName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The object exists but is not a DAG node.
    #[error("object {id} is a {kind} object, not a node")]
    NotANode {
        /// The object that was loaded.
        id: ObjectId,
        /// Its actual kind.
        kind: ObjectKind,
    },

    /// Canonical encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(String),

    /// The storage collaborator failed.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias for DAG results.
pub type DagResult<T> = Result<T, DagError>;
