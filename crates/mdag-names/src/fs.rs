//! Filesystem-backed name store.
//!
//! Each name's current record is kept as pretty-printed JSON at
//! `<root>/names/<name>.json`. Replacement goes through a temporary file in
//! the same directory followed by a rename.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{NameError, Result};
use crate::names::validate_name;
use crate::traits::{ensure_newer, NameStore};
use crate::types::NameRecord;

const RECORD_EXT: &str = "json";

/// A [`NameStore`] persisting one JSON file per name.
#[derive(Debug)]
pub struct FsNameStore {
    names_dir: PathBuf,
    // Serialises read-check-replace in `put`.
    write_lock: Mutex<()>,
}

impl FsNameStore {
    /// Open (or create) the name directory under `root`.
    pub fn open(root: &Path) -> Result<Self> {
        let names_dir = root.join("names");
        fs::create_dir_all(&names_dir)?;
        Ok(Self {
            names_dir,
            write_lock: Mutex::new(()),
        })
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.names_dir.join(format!("{name}.{RECORD_EXT}"))
    }

    fn read_record(path: &Path) -> Result<Option<NameRecord>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| NameError::Serialization(format!("{}: {e}", path.display())))
    }
}

impl NameStore for FsNameStore {
    fn get(&self, name: &str) -> Result<Option<NameRecord>> {
        validate_name(name)?;
        Self::read_record(&self.record_path(name))
    }

    fn put(&self, record: &NameRecord) -> Result<()> {
        validate_name(&record.name)?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| NameError::Serialization(format!("lock poisoned: {e}")))?;

        let path = self.record_path(&record.name);
        ensure_newer(Self::read_record(&path)?.as_ref(), record)?;

        let json = serde_json::to_vec_pretty(record)
            .map_err(|e| NameError::Serialization(e.to_string()))?;
        let mut tmp = NamedTempFile::new_in(&self.names_dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| NameError::Io(e.error))?;

        debug!(name = %record.name, seq = record.sequence, "wrote name record");
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<bool> {
        validate_name(name)?;
        match fs::remove_file(self.record_path(name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<NameRecord>> {
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.names_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXT) {
                continue;
            }
            if let Some(record) = Self::read_record(&path)? {
                records.push(record);
            }
        }
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }
}
