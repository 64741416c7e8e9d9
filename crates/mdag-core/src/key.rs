//! Signing keys: the local key store and the Key sub-API.
//!
//! A key's public half names the mutable name it publishes under. Every node
//! has a key labelled `self` from the moment it starts.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use mdag_crypto::{SigningKey, VerifyingKey};
use mdag_names::validate_key_label;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::context::{poisoned, write_atomic, NodeContext};
use crate::error::{ApiError, ApiResult};
use crate::options::ApiOptions;

/// Label of the key every node starts with.
pub const SELF_KEY: &str = "self";

const KEY_EXT: &str = "key";

/// Label-to-secret map, optionally mirrored to one file per key.
pub struct KeyStore {
    dir: Option<PathBuf>,
    keys: RwLock<BTreeMap<String, SigningKey>>,
}

impl KeyStore {
    pub fn in_memory() -> Self {
        let mut keys = BTreeMap::new();
        keys.insert(SELF_KEY.to_string(), SigningKey::generate());
        Self {
            dir: None,
            keys: RwLock::new(keys),
        }
    }

    /// Load every `<label>.key` under `dir`, creating `self` if absent.
    pub fn open(dir: &Path) -> ApiResult<Self> {
        fs::create_dir_all(dir)?;
        let mut keys = BTreeMap::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(KEY_EXT) {
                continue;
            }
            let Some(label) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            keys.insert(label.to_string(), read_key_file(&path)?);
        }

        let store = Self {
            dir: Some(dir.to_path_buf()),
            keys: RwLock::new(keys),
        };
        if !store.contains(SELF_KEY)? {
            store.insert(SELF_KEY, SigningKey::generate())?;
            info!(dir = %dir.display(), "generated self key");
        }
        Ok(store)
    }

    pub fn contains(&self, label: &str) -> ApiResult<bool> {
        Ok(self.keys.read().map_err(poisoned)?.contains_key(label))
    }

    pub fn get(&self, label: &str) -> ApiResult<SigningKey> {
        self.keys
            .read()
            .map_err(poisoned)?
            .get(label)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("key {label:?}")))
    }

    /// Add a key under a label that must not be taken yet.
    pub fn insert(&self, label: &str, key: SigningKey) -> ApiResult<()> {
        let mut keys = self.keys.write().map_err(poisoned)?;
        if keys.contains_key(label) {
            return Err(ApiError::InvalidArgument(format!("key {label:?} already exists")));
        }
        if let Some(dir) = &self.dir {
            write_atomic(&key_path(dir, label), key.to_hex().as_bytes())?;
        }
        keys.insert(label.to_string(), key);
        Ok(())
    }

    pub fn remove(&self, label: &str) -> ApiResult<SigningKey> {
        let mut keys = self.keys.write().map_err(poisoned)?;
        let key = keys
            .remove(label)
            .ok_or_else(|| ApiError::NotFound(format!("key {label:?}")))?;
        if let Some(dir) = &self.dir {
            fs::remove_file(key_path(dir, label))?;
        }
        Ok(key)
    }

    /// Move the key at `old` to `new` under one write lock.
    ///
    /// On disk the new file is written before the old one is removed; if
    /// either step fails the store is left as it was.
    pub fn rename(&self, old: &str, new: &str) -> ApiResult<SigningKey> {
        let mut keys = self.keys.write().map_err(poisoned)?;
        if keys.contains_key(new) {
            return Err(ApiError::InvalidArgument(format!("key {new:?} already exists")));
        }
        let key = keys
            .get(old)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("key {old:?}")))?;
        if let Some(dir) = &self.dir {
            let target = key_path(dir, new);
            write_atomic(&target, key.to_hex().as_bytes())?;
            if let Err(e) = fs::remove_file(key_path(dir, old)) {
                if let Err(cleanup) = fs::remove_file(&target) {
                    warn!(path = %target.display(), error = %cleanup, "could not undo key rename");
                }
                return Err(e.into());
            }
        }
        keys.remove(old);
        keys.insert(new.to_string(), key.clone());
        Ok(key)
    }

    /// Labels and public keys, sorted by label.
    pub fn list(&self) -> ApiResult<Vec<(String, VerifyingKey)>> {
        let keys = self.keys.read().map_err(poisoned)?;
        Ok(keys
            .iter()
            .map(|(label, key)| (label.clone(), key.verifying_key()))
            .collect())
    }
}

fn key_path(dir: &Path, label: &str) -> PathBuf {
    dir.join(format!("{label}.{KEY_EXT}"))
}

fn read_key_file(path: &Path) -> ApiResult<SigningKey> {
    SigningKey::from_hex(&fs::read_to_string(path)?)
        .map_err(|e| ApiError::InvalidArgument(format!("key file {}: {e}", path.display())))
}

/// A key as shown to callers: its label and the name it publishes under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyInfo {
    pub name: String,
    pub id: String,
}

impl KeyInfo {
    fn new(label: impl Into<String>, key: &VerifyingKey) -> Self {
        Self {
            name: label.into(),
            id: key.to_hex(),
        }
    }
}

/// Key management.
#[derive(Clone, Debug)]
pub struct KeyApi {
    ctx: Arc<NodeContext>,
    opts: ApiOptions,
}

impl KeyApi {
    pub(crate) fn new(ctx: Arc<NodeContext>, opts: ApiOptions) -> Self {
        Self { ctx, opts }
    }

    /// Create a fresh Ed25519 key under `label`.
    pub fn generate(&self, label: &str) -> ApiResult<KeyInfo> {
        check_label(label)?;
        self.opts.check_cancelled()?;
        let key = SigningKey::generate();
        let info = KeyInfo::new(label, &key.verifying_key());
        self.ctx.keys().insert(label, key)?;
        debug!(label, id = %info.id, "generated key");
        Ok(info)
    }

    pub fn list(&self) -> ApiResult<Vec<KeyInfo>> {
        Ok(self
            .ctx
            .keys()
            .list()?
            .iter()
            .map(|(label, key)| KeyInfo::new(label.as_str(), key))
            .collect())
    }

    /// Move a key to a new label. The `self` key cannot be renamed.
    pub fn rename(&self, old: &str, new: &str) -> ApiResult<KeyInfo> {
        if old == SELF_KEY {
            return Err(ApiError::InvalidArgument("cannot rename the self key".into()));
        }
        check_label(new)?;
        let key = self.ctx.keys().rename(old, new)?;
        debug!(old, new, "renamed key");
        Ok(KeyInfo::new(new, &key.verifying_key()))
    }

    /// Delete a key. The `self` key cannot be removed.
    pub fn remove(&self, label: &str) -> ApiResult<KeyInfo> {
        if label == SELF_KEY {
            return Err(ApiError::InvalidArgument("cannot remove the self key".into()));
        }
        let key = self.ctx.keys().remove(label)?;
        Ok(KeyInfo::new(label, &key.verifying_key()))
    }
}

fn check_label(label: &str) -> ApiResult<()> {
    validate_key_label(label).map_err(|e| ApiError::InvalidArgument(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;
    use crate::error::ErrorKind;

    fn api() -> KeyApi {
        let ctx = Arc::new(NodeContext::in_memory(NodeConfig::default()).unwrap());
        KeyApi::new(ctx, ApiOptions::default())
    }

    #[test]
    fn starts_with_self_only() {
        let keys = api().list().unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].name, SELF_KEY);
    }

    #[test]
    fn generate_and_list() {
        let api = api();
        let info = api.generate("site").unwrap();
        assert_eq!(info.id.len(), 64);
        let names: Vec<_> = api.list().unwrap().into_iter().map(|k| k.name).collect();
        assert_eq!(names, vec!["self", "site"]);
    }

    #[test]
    fn duplicate_label_is_invalid() {
        let api = api();
        api.generate("a").unwrap();
        assert_eq!(api.generate("a").unwrap_err().kind(), ErrorKind::InvalidArgument);
        assert_eq!(api.generate("bad/label").unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn rename_keeps_public_key() {
        let api = api();
        let before = api.generate("old").unwrap();
        let after = api.rename("old", "new").unwrap();
        assert_eq!(before.id, after.id);
        assert_eq!(after.name, "new");
        assert_eq!(api.remove("old").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn self_key_is_protected() {
        let api = api();
        assert!(api.remove(SELF_KEY).is_err());
        assert!(api.rename(SELF_KEY, "other").is_err());
    }

    #[test]
    fn file_backed_keys_persist() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path()).unwrap();
        let key = SigningKey::generate();
        let public = key.verifying_key();
        store.insert("k", key).unwrap();

        let reopened = KeyStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("k").unwrap().verifying_key(), public);
        reopened.remove("k").unwrap();
        assert!(!KeyStore::open(dir.path()).unwrap().contains("k").unwrap());
    }

    #[test]
    fn rename_onto_taken_label_keeps_both_keys() {
        let api = api();
        let a = api.generate("a").unwrap();
        let b = api.generate("b").unwrap();
        assert_eq!(api.rename("a", "b").unwrap_err().kind(), ErrorKind::InvalidArgument);
        let keys = api.list().unwrap();
        assert!(keys.contains(&a));
        assert!(keys.contains(&b));
    }

    #[test]
    fn failed_rename_write_keeps_old_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path()).unwrap();
        let key = SigningKey::generate();
        let public = key.verifying_key();
        store.insert("a", key).unwrap();
        // A directory in the way makes writing `b.key` fail.
        fs::create_dir(dir.path().join("b.key")).unwrap();

        assert!(store.rename("a", "b").is_err());
        assert_eq!(store.get("a").unwrap().verifying_key(), public);
        assert!(!store.contains("b").unwrap());
        assert!(dir.path().join("a.key").is_file());
    }

    #[test]
    fn file_backed_rename_moves_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path()).unwrap();
        store.insert("a", SigningKey::generate()).unwrap();
        let public = store.get("a").unwrap().verifying_key();

        store.rename("a", "b").unwrap();
        assert!(!dir.path().join("a.key").exists());
        let reopened = KeyStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("b").unwrap().verifying_key(), public);
        assert!(!reopened.contains("a").unwrap());
    }

    #[test]
    fn corrupt_key_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.key"), "not hex").unwrap();
        assert!(KeyStore::open(dir.path()).is_err());
    }
}
