//! Foundation types for the mdag Merkle-DAG object store.
//!
//! Every other mdag crate depends on `mdag-types`. It holds the two values a
//! caller hands around when talking to a node: the content identity of an
//! object and the human-facing reference string that names one.
//!
//! # Key Types
//!
//! - [`ObjectId`] - Content address of a stored object (BLAKE3 hash)
//! - [`Reference`] - Parsed object reference: an identity or mutable name
//!   followed by zero or more link-name segments
//! - [`RefRoot`] - The head of a reference (literal identity or mutable name)

pub mod error;
pub mod object;
pub mod path;

pub use error::TypeError;
pub use object::ObjectId;
pub use path::{RefRoot, Reference, DAG_NAMESPACE, NAME_NAMESPACE};
