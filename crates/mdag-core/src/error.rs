//! The error taxonomy callers of the core API branch on.

use mdag_dag::DagError;
use mdag_names::NameError;
use mdag_store::StoreError;
use mdag_types::TypeError;
use thiserror::Error;

/// Coarse classification of an [`ApiError`], stable across context wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The reference string is malformed or uses unsupported syntax.
    InvalidReference,
    /// A named link, path segment, object, or key does not exist.
    NotFound,
    /// The object store failed to fetch or persist an object.
    Storage,
    /// A caller-supplied data source failed mid-read.
    Io,
    /// An option or parameter was misused.
    InvalidArgument,
    /// A mutable-name lookup failed.
    Naming,
    /// The caller cancelled the operation before it persisted anything.
    Cancelled,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid reference {reference:?}: {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[source] StoreError),

    #[error("corrupt node: {0}")]
    Codec(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("naming error: {0}")]
    Naming(#[from] NameError),

    #[error("name {name} did not resolve within {limit} steps")]
    ResolveDepth { name: String, limit: usize },

    #[error("operation cancelled")]
    Cancelled,

    #[error("{op} on {root}: {source}")]
    Patch {
        op: &'static str,
        root: String,
        #[source]
        source: Box<ApiError>,
    },
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidReference { .. } => ErrorKind::InvalidReference,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Storage(_) | Self::Codec(_) => ErrorKind::Storage,
            Self::Io(_) => ErrorKind::Io,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Naming(_) | Self::ResolveDepth { .. } => ErrorKind::Naming,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Patch { source, .. } => source.kind(),
        }
    }

    /// Wrap with the patch operation and root it failed on. Kind is preserved.
    pub fn in_patch(self, op: &'static str, root: impl Into<String>) -> Self {
        Self::Patch {
            op,
            root: root.into(),
            source: Box::new(self),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => Self::NotFound(format!("object {id}")),
            other => Self::Storage(other),
        }
    }
}

impl From<DagError> for ApiError {
    fn from(e: DagError) -> Self {
        match e {
            DagError::LinkNotFound { name } => Self::NotFound(format!("no link named {name:?}")),
            e @ DagError::MissingSegment { .. } => Self::NotFound(e.to_string()),
            e @ (DagError::InvalidLinkName { .. } | DagError::NotANode { .. }) => {
                Self::InvalidArgument(e.to_string())
            }
            DagError::Codec(msg) => Self::Codec(msg),
            DagError::Store(e) => e.into(),
        }
    }
}

impl From<TypeError> for ApiError {
    fn from(e: TypeError) -> Self {
        match e {
            TypeError::InvalidReference { reference, reason } => {
                Self::InvalidReference { reference, reason }
            }
            other => Self::InvalidReference {
                reference: String::new(),
                reason: other.to_string(),
            },
        }
    }
}
