//! Content-addressed object storage for mdag.
//!
//! This crate is the storage collaborator the patch engine writes through. It
//! is a hash-keyed object store: every object is immutable and identified by
//! the BLAKE3 hash of its bytes (domain-separated by object kind).
//!
//! # Object Kinds
//!
//! - [`ObjectKind::Raw`] -- an uninterpreted block
//! - [`ObjectKind::Node`] -- an encoded Merkle-DAG node (data + links)
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsObjectStore`] -- loose object files under a repository directory
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Writes are idempotent: writing existing content is a no-op.
//! 3. Concurrent reads are always safe (objects are immutable).
//! 4. The store never interprets object contents -- it is a pure key-value store.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod object;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{ObjectKind, StoredObject};
pub use traits::ObjectStore;
