//! Merkle-DAG object model for mdag.
//!
//! A [`Node`] is a data segment plus an ordered table of named [`Link`]s to
//! other objects. Nodes are values: every operation here returns a new node
//! and leaves its input untouched, so the identity of an existing node never
//! changes.
//!
//! - [`node`] - the object model, canonical codec, and pure link/data edits
//! - [`editor`] - multi-segment link insertion with intermediary synthesis
//! - [`walk`] - following link names from a root to a descendant

pub mod editor;
pub mod error;
pub mod node;
pub mod walk;

pub use editor::{Edit, Editor};
pub use error::{DagError, DagResult};
pub use node::{Link, Node, NodeStat, Template, DIR_DATA, FILE_DATA};
pub use walk::{load_node, walk, Walked};
