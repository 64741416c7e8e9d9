//! The Block sub-API: raw bytes in and out of the object store.

use std::sync::Arc;

use mdag_store::StoredObject;
use mdag_types::ObjectId;
use serde::Serialize;
use tracing::debug;

use crate::context::NodeContext;
use crate::error::{ApiError, ApiResult};
use crate::options::ApiOptions;
use crate::resolve::Resolver;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlockStat {
    pub key: ObjectId,
    pub size: u64,
    pub kind: String,
}

#[derive(Clone, Debug)]
pub struct BlockApi {
    ctx: Arc<NodeContext>,
    opts: ApiOptions,
}

impl BlockApi {
    pub(crate) fn new(ctx: Arc<NodeContext>, opts: ApiOptions) -> Self {
        Self { ctx, opts }
    }

    /// Store `data` as a raw block.
    pub fn put(&self, data: &[u8]) -> ApiResult<ObjectId> {
        self.opts.check_cancelled()?;
        Ok(self.ctx.store().write(&StoredObject::raw(data.to_vec()))?)
    }

    /// The stored bytes of any object. For a node this is its encoding.
    pub fn get(&self, reference: &str) -> ApiResult<Vec<u8>> {
        let id = self.resolve(reference)?;
        Ok(self.ctx.store().get(&id)?.data)
    }

    pub fn stat(&self, reference: &str) -> ApiResult<BlockStat> {
        let id = self.resolve(reference)?;
        let stored = self.ctx.store().get(&id)?;
        Ok(BlockStat {
            key: id,
            size: stored.size,
            kind: stored.kind.to_string(),
        })
    }

    /// Delete a block. Pinned objects are refused.
    pub fn rm(&self, reference: &str) -> ApiResult<ObjectId> {
        let id = self.resolve(reference)?;
        if self.ctx.pins().covers(self.ctx.store(), &id)? {
            return Err(ApiError::InvalidArgument(format!("{id} is pinned")));
        }
        if !self.ctx.store().delete(&id)? {
            return Err(ApiError::NotFound(format!("object {id}")));
        }
        debug!(id = %id.short_hex(), "removed block");
        Ok(id)
    }

    fn resolve(&self, reference: &str) -> ApiResult<ObjectId> {
        Resolver::new(&self.ctx, &self.opts).resolve_str(reference)
    }
}
