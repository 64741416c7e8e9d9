use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// File name of the node configuration inside a repository directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Tunables for one node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Objects whose encoding exceeds this many bytes are still stored, but
    /// a warning is logged: peers may refuse to exchange them.
    pub max_object_size: u64,
    /// Read size used when consuming streamed data.
    pub chunk_size: usize,
    /// How many mutable-name hops a single resolution may follow.
    pub name_resolve_depth: usize,
    /// Validity window of newly published name records, in seconds.
    pub name_ttl_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            max_object_size: 1024 * 1024,
            chunk_size: 256 * 1024,
            name_resolve_depth: 32,
            name_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl NodeConfig {
    /// Load `config.toml` from `repo`. A missing file yields the defaults.
    pub fn load(repo: &Path) -> ApiResult<Self> {
        let path = repo.join(CONFIG_FILE);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        let config: Self = toml::from_str(&text)
            .map_err(|e| ApiError::InvalidArgument(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Write this configuration to `repo/config.toml`.
    pub fn save(&self, repo: &Path) -> ApiResult<()> {
        let text = toml::to_string_pretty(self)
            .map_err(|e| ApiError::InvalidArgument(e.to_string()))?;
        fs::write(repo.join(CONFIG_FILE), text)?;
        Ok(())
    }

    pub fn validate(&self) -> ApiResult<()> {
        if self.chunk_size == 0 {
            return Err(ApiError::InvalidArgument("chunk_size must be positive".into()));
        }
        if self.name_resolve_depth == 0 {
            return Err(ApiError::InvalidArgument(
                "name_resolve_depth must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Record validity window, capped at roughly a century.
    pub fn name_ttl(&self) -> chrono::Duration {
        const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;
        chrono::Duration::seconds(self.name_ttl_secs.min(MAX_TTL_SECS) as i64)
    }
}
