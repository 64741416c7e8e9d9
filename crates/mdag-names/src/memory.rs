//! In-memory name store for testing and ephemeral nodes.

use std::collections::BTreeMap;
use std::sync::RwLock;

use tracing::debug;

use crate::error::{NameError, Result};
use crate::names::validate_name;
use crate::traits::{ensure_newer, NameStore};
use crate::types::NameRecord;

/// An in-memory implementation of [`NameStore`].
///
/// All records live in a `BTreeMap` behind a `RwLock`. Data is lost when the
/// store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryNameStore {
    records: RwLock<BTreeMap<String, NameRecord>>,
}

impl InMemoryNameStore {
    /// Create a new empty name store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(e: impl std::fmt::Display) -> NameError {
    NameError::Serialization(format!("lock poisoned: {e}"))
}

impl NameStore for InMemoryNameStore {
    fn get(&self, name: &str) -> Result<Option<NameRecord>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.get(name).cloned())
    }

    fn put(&self, record: &NameRecord) -> Result<()> {
        validate_name(&record.name)?;
        let mut records = self.records.write().map_err(poisoned)?;
        ensure_newer(records.get(&record.name), record)?;
        debug!(name = %record.name, seq = record.sequence, "stored name record");
        records.insert(record.name.clone(), record.clone());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<bool> {
        let mut records = self.records.write().map_err(poisoned)?;
        Ok(records.remove(name).is_some())
    }

    fn list(&self) -> Result<Vec<NameRecord>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.values().cloned().collect())
    }
}
