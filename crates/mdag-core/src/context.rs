//! The node context every sub-API shares.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mdag_names::{FsNameStore, InMemoryNameStore, NameStore};
use mdag_store::{FsObjectStore, InMemoryObjectStore, ObjectStore, StoreError};
use tempfile::NamedTempFile;
use tracing::info;

use crate::config::NodeConfig;
use crate::error::{ApiError, ApiResult};
use crate::key::KeyStore;
use crate::pin::PinSet;

/// Everything one node owns: its stores, keys, pins and configuration.
///
/// A context is built once and shared behind an `Arc`. It holds no
/// per-call state, so any number of facades and sub-APIs may use it
/// concurrently.
pub struct NodeContext {
    store: Arc<dyn ObjectStore>,
    names: Arc<dyn NameStore>,
    keys: KeyStore,
    pins: PinSet,
    config: NodeConfig,
    repo: Option<PathBuf>,
}

impl NodeContext {
    /// A node whose state lives only in memory.
    pub fn in_memory(config: NodeConfig) -> ApiResult<Self> {
        Self::with_stores(
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(InMemoryNameStore::new()),
            config,
        )
    }

    /// A node over caller-supplied stores, with in-memory keys and pins.
    ///
    /// The configuration is validated the same way [`NodeConfig::load`]
    /// validates a file.
    pub fn with_stores(
        store: Arc<dyn ObjectStore>,
        names: Arc<dyn NameStore>,
        config: NodeConfig,
    ) -> ApiResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            names,
            keys: KeyStore::in_memory(),
            pins: PinSet::in_memory(),
            config,
            repo: None,
        })
    }

    /// Open (or initialise) a repository directory.
    ///
    /// ```text
    /// <repo>/config.toml   optional, see NodeConfig
    /// <repo>/objects/      loose objects
    /// <repo>/names/        one record per published name
    /// <repo>/keys/         one secret per key label
    /// <repo>/pins.json     pin set
    /// ```
    pub fn open(repo: &Path) -> ApiResult<Self> {
        fs::create_dir_all(repo)?;
        let config = NodeConfig::load(repo)?;
        let store = FsObjectStore::open(repo)?;
        let names = FsNameStore::open(repo)?;
        let keys = KeyStore::open(&repo.join("keys"))?;
        let pins = PinSet::open(&repo.join("pins.json"))?;
        info!(repo = %repo.display(), "opened node repository");
        Ok(Self {
            store: Arc::new(store),
            names: Arc::new(names),
            keys,
            pins,
            config,
            repo: Some(repo.to_path_buf()),
        })
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    pub fn names(&self) -> &dyn NameStore {
        self.names.as_ref()
    }

    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    pub fn pins(&self) -> &PinSet {
        &self.pins
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Repository directory, if this node is filesystem-backed.
    pub fn repo(&self) -> Option<&Path> {
        self.repo.as_deref()
    }
}

impl std::fmt::Debug for NodeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeContext")
            .field("repo", &self.repo)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Replace `path` with `bytes` via a temporary file in the same directory.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub(crate) fn poisoned(e: impl std::fmt::Display) -> ApiError {
    ApiError::Storage(StoreError::Backend(format!("lock poisoned: {e}")))
}
