//! Pins: objects the node promises to keep.
//!
//! A direct pin covers one object. A recursive pin covers the object and
//! everything reachable from it.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use mdag_store::ObjectStore;
use mdag_types::ObjectId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::{poisoned, write_atomic, NodeContext};
use crate::dag::reachable;
use crate::error::{ApiError, ApiResult};
use crate::options::ApiOptions;
use crate::resolve::Resolver;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinMode {
    Direct,
    Recursive,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PinEntry {
    pub id: ObjectId,
    pub mode: PinMode,
}

/// The pin table, optionally mirrored to a JSON file.
pub struct PinSet {
    path: Option<PathBuf>,
    pins: RwLock<BTreeMap<ObjectId, PinMode>>,
}

impl PinSet {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            pins: RwLock::new(BTreeMap::new()),
        }
    }

    /// Load the pin file at `path`; a missing file is an empty set.
    pub fn open(path: &Path) -> ApiResult<Self> {
        let pins = match fs::read(path) {
            Ok(bytes) => {
                let entries: Vec<PinEntry> = serde_json::from_slice(&bytes).map_err(|e| {
                    ApiError::InvalidArgument(format!("corrupt pin file {}: {e}", path.display()))
                })?;
                entries.into_iter().map(|e| (e.id, e.mode)).collect()
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path: Some(path.to_path_buf()),
            pins: RwLock::new(pins),
        })
    }

    /// Pin `id`, replacing any existing mode.
    pub fn insert(&self, id: ObjectId, mode: PinMode) -> ApiResult<()> {
        let mut pins = self.pins.write().map_err(poisoned)?;
        pins.insert(id, mode);
        self.flush(&pins)
    }

    pub fn remove(&self, id: &ObjectId) -> ApiResult<Option<PinMode>> {
        let mut pins = self.pins.write().map_err(poisoned)?;
        let removed = pins.remove(id);
        if removed.is_some() {
            self.flush(&pins)?;
        }
        Ok(removed)
    }

    pub fn list(&self) -> ApiResult<Vec<PinEntry>> {
        let pins = self.pins.read().map_err(poisoned)?;
        Ok(pins
            .iter()
            .map(|(id, mode)| PinEntry { id: *id, mode: *mode })
            .collect())
    }

    /// Whether `id` is pinned directly or lies under a recursive pin.
    pub fn covers(&self, store: &dyn ObjectStore, id: &ObjectId) -> ApiResult<bool> {
        let entries = self.list()?;
        if entries.iter().any(|e| e.id == *id) {
            return Ok(true);
        }
        for entry in entries.iter().filter(|e| e.mode == PinMode::Recursive) {
            if reachable(store, entry.id)?.contains(id) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn flush(&self, pins: &BTreeMap<ObjectId, PinMode>) -> ApiResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let entries: Vec<PinEntry> = pins
            .iter()
            .map(|(id, mode)| PinEntry { id: *id, mode: *mode })
            .collect();
        let json = serde_json::to_vec_pretty(&entries)
            .map_err(|e| ApiError::InvalidArgument(e.to_string()))?;
        write_atomic(path, &json)?;
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct PinApi {
    ctx: Arc<NodeContext>,
    opts: ApiOptions,
}

impl PinApi {
    pub(crate) fn new(ctx: Arc<NodeContext>, opts: ApiOptions) -> Self {
        Self { ctx, opts }
    }

    /// Pin the object at `reference`. A recursive pin first checks that
    /// every descendant is present.
    pub fn add(&self, reference: &str, recursive: bool) -> ApiResult<ObjectId> {
        let id = Resolver::new(&self.ctx, &self.opts).resolve_str(reference)?;
        let mode = if recursive {
            reachable(self.ctx.store(), id)?;
            PinMode::Recursive
        } else {
            if !self.ctx.store().exists(&id)? {
                return Err(ApiError::NotFound(format!("object {id}")));
            }
            PinMode::Direct
        };
        self.opts.check_cancelled()?;
        self.ctx.pins().insert(id, mode)?;
        debug!(id = %id.short_hex(), ?mode, "pinned");
        Ok(id)
    }

    pub fn rm(&self, reference: &str) -> ApiResult<ObjectId> {
        let id = Resolver::new(&self.ctx, &self.opts).resolve_str(reference)?;
        match self.ctx.pins().remove(&id)? {
            Some(_) => Ok(id),
            None => Err(ApiError::NotFound(format!("{id} is not pinned"))),
        }
    }

    pub fn ls(&self) -> ApiResult<Vec<PinEntry>> {
        self.ctx.pins().list()
    }

    pub fn is_pinned(&self, id: &ObjectId) -> ApiResult<bool> {
        self.ctx.pins().covers(self.ctx.store(), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;
    use crate::error::ErrorKind;
    use mdag_dag::Node;
    use mdag_store::StoredObject;

    fn ctx() -> Arc<NodeContext> {
        Arc::new(NodeContext::in_memory(NodeConfig::default()).unwrap())
    }

    fn put(ctx: &NodeContext, node: &Node) -> ObjectId {
        ctx.store().write(&node.to_stored_object().unwrap()).unwrap()
    }

    #[test]
    fn direct_pin_covers_only_itself() {
        let ctx = ctx();
        let api = PinApi::new(ctx.clone(), ApiOptions::default());
        let leaf = put(&ctx, &Node::with_data(b"leaf".to_vec()));
        let root = put(&ctx, &Node::empty().with_link("l", leaf, 4));

        api.add(&root.to_hex(), false).unwrap();
        assert!(api.is_pinned(&root).unwrap());
        assert!(!api.is_pinned(&leaf).unwrap());
    }

    #[test]
    fn recursive_pin_covers_descendants() {
        let ctx = ctx();
        let api = PinApi::new(ctx.clone(), ApiOptions::default());
        let leaf = put(&ctx, &Node::with_data(b"leaf".to_vec()));
        let root = put(&ctx, &Node::empty().with_link("l", leaf, 4));

        api.add(&root.to_hex(), true).unwrap();
        assert!(api.is_pinned(&leaf).unwrap());
        assert_eq!(api.ls().unwrap(), vec![PinEntry { id: root, mode: PinMode::Recursive }]);
    }

    #[test]
    fn recursive_pin_needs_complete_graph() {
        let ctx = ctx();
        let api = PinApi::new(ctx.clone(), ApiOptions::default());
        let ghost = ObjectId::from_hash([5; 32]);
        let root = put(&ctx, &Node::empty().with_link("g", ghost, 1));
        assert_eq!(api.add(&root.to_hex(), true).unwrap_err().kind(), ErrorKind::NotFound);
        assert!(api.add(&root.to_hex(), false).is_ok());
    }

    #[test]
    fn rm_unpinned_is_not_found() {
        let ctx = ctx();
        let api = PinApi::new(ctx.clone(), ApiOptions::default());
        let id = ctx.store().write(&StoredObject::raw(b"x".to_vec())).unwrap();
        assert_eq!(api.rm(&id.to_hex()).unwrap_err().kind(), ErrorKind::NotFound);
        api.add(&id.to_hex(), false).unwrap();
        assert_eq!(api.rm(&id.to_hex()).unwrap(), id);
        assert!(api.ls().unwrap().is_empty());
    }

    #[test]
    fn pin_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pins.json");
        let id = ObjectId::from_hash([8; 32]);
        PinSet::open(&path).unwrap().insert(id, PinMode::Direct).unwrap();

        let reopened = PinSet::open(&path).unwrap();
        assert_eq!(reopened.list().unwrap(), vec![PinEntry { id, mode: PinMode::Direct }]);
    }
}
