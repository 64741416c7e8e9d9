//! Core API for mdag.
//!
//! [`CoreApi`] is the single entry point to one node. It hands out cheap
//! sub-APIs that share the node's [`NodeContext`]:
//!
//! - [`ObjectApi`] - the patch engine plus plain node reads and writes
//! - [`BlockApi`] - raw blocks
//! - [`DagApi`] - graph reads (`get`, `resolve`, `tree`)
//! - [`NameApi`] - signed mutable names
//! - [`KeyApi`] - signing keys
//! - [`PinApi`] - pins
//! - [`UnixfsApi`] - chunked files
//!
//! Every reference string goes through the [`Resolver`], and every failure
//! is an [`ApiError`] whose [`ErrorKind`] survives context wrapping.

pub mod api;
pub mod block;
pub mod config;
pub mod context;
pub mod dag;
pub mod error;
pub mod key;
pub mod name;
pub mod object;
pub mod options;
pub mod pin;
pub mod resolve;
pub mod stream;
pub mod unixfs;

pub use api::CoreApi;
pub use block::{BlockApi, BlockStat};
pub use config::NodeConfig;
pub use context::NodeContext;
pub use dag::{DagApi, DagResolved, TreeEntry};
pub use error::{ApiError, ApiResult, ErrorKind};
pub use key::{KeyApi, KeyInfo, KeyStore, SELF_KEY};
pub use name::NameApi;
pub use object::{ObjectApi, PatchOp};
pub use options::{ApiOptions, CancelToken};
pub use pin::{PinApi, PinEntry, PinMode, PinSet};
pub use resolve::Resolver;
pub use unixfs::UnixfsApi;

// Re-export the types callers need alongside the API.
pub use mdag_dag::{Link, Node, NodeStat, Template};
pub use mdag_names::NameRecord;
pub use mdag_types::{ObjectId, Reference};
