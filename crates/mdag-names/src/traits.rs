//! The [`NameStore`] trait defining the record storage interface.
//!
//! Any backend (in-memory, filesystem, a remote directory) implements this
//! trait to hold the latest record for each mutable name.

use crate::error::{NameError, Result};
use crate::types::NameRecord;

/// Storage backend for name records.
///
/// Implementations must be thread-safe (`Send + Sync`). A `put` replaces the
/// stored record only when the new one carries a strictly higher sequence
/// number; serialising concurrent publishers is the store's job.
pub trait NameStore: Send + Sync {
    /// Read the current record for `name`.
    ///
    /// Returns `Ok(None)` if nothing is published under the name.
    fn get(&self, name: &str) -> Result<Option<NameRecord>>;

    /// Store `record`, rejecting it if it is not newer than the current one.
    fn put(&self, record: &NameRecord) -> Result<()>;

    /// Remove the record for `name`. Returns `true` if one existed.
    fn remove(&self, name: &str) -> Result<bool>;

    /// All stored records, sorted by name.
    fn list(&self) -> Result<Vec<NameRecord>>;

    /// Sequence number the next publish under `name` should use.
    fn next_sequence(&self, name: &str) -> Result<u64> {
        Ok(self.get(name)?.map_or(1, |r| r.sequence + 1))
    }
}

/// Reject `offered` unless it is newer than `current`.
pub(crate) fn ensure_newer(current: Option<&NameRecord>, offered: &NameRecord) -> Result<()> {
    match current {
        Some(existing) if existing.sequence >= offered.sequence => Err(NameError::StaleSequence {
            name: offered.name.clone(),
            offered: offered.sequence,
            current: existing.sequence,
        }),
        _ => Ok(()),
    }
}
