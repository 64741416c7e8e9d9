//! Mutable names for mdag.
//!
//! A mutable name is a stable label whose target changes over time. Each
//! published value is a [`NameRecord`]: the target reference, a sequence
//! number, a validity window, and an Ed25519 signature by the key the name
//! belongs to. Records are only ever replaced by records with a higher
//! sequence number, so concurrent publishers converge on the newest value.
//!
//! # Modules
//!
//! - [`error`] - Error types for naming operations
//! - [`types`] - [`NameRecord`] and its signing rules
//! - [`traits`] - The [`NameStore`] trait defining the storage interface
//! - [`names`] - Key label and name validation
//! - [`memory`] - In-memory [`InMemoryNameStore`]
//! - [`fs`] - One JSON file per name, [`FsNameStore`]

pub mod error;
pub mod fs;
pub mod memory;
pub mod names;
pub mod traits;
pub mod types;

pub use error::{NameError, Result};
pub use fs::FsNameStore;
pub use memory::InMemoryNameStore;
pub use names::{validate_key_label, validate_name};
pub use traits::NameStore;
pub use types::NameRecord;
