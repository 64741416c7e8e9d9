//! The Unixfs sub-API: files as chunked DAGs.
//!
//! A file is stored as raw leaf blocks of `chunk_size` bytes and one root
//! node whose data is [`FILE_DATA`] and whose links, named `0`, `1`, ...,
//! list the leaves in order.

use std::io::Read;
use std::sync::Arc;

use mdag_dag::{Link, Node, FILE_DATA};
use mdag_store::{ObjectKind, StoredObject};
use mdag_types::ObjectId;
use tracing::debug;

use crate::context::NodeContext;
use crate::error::{ApiError, ApiResult};
use crate::options::ApiOptions;
use crate::resolve::Resolver;
use crate::stream::Chunks;

#[derive(Clone, Debug)]
pub struct UnixfsApi {
    ctx: Arc<NodeContext>,
    opts: ApiOptions,
}

impl UnixfsApi {
    pub(crate) fn new(ctx: Arc<NodeContext>, opts: ApiOptions) -> Self {
        Self { ctx, opts }
    }

    /// Chunk `reader` into leaves and return the file root.
    pub fn add(&self, reader: impl Read) -> ApiResult<ObjectId> {
        let store = self.ctx.store();
        let mut links = Vec::new();
        for (index, chunk) in Chunks::new(reader, self.ctx.config().chunk_size).enumerate() {
            self.opts.check_cancelled()?;
            let leaf = StoredObject::raw(chunk?);
            let size = leaf.size;
            let id = store.write(&leaf)?;
            links.push(Link::new(index.to_string(), id, size));
        }

        let root = Node::new(FILE_DATA.to_vec(), links);
        self.opts.check_cancelled()?;
        let id = store.write(&root.to_stored_object()?)?;
        debug!(id = %id.short_hex(), leaves = root.links().len(), "added file");
        Ok(id)
    }

    /// The full contents of a file root, or of a single raw block.
    pub fn cat(&self, reference: &str) -> ApiResult<Vec<u8>> {
        let id = Resolver::new(&self.ctx, &self.opts).resolve_str(reference)?;
        let store = self.ctx.store();
        let stored = store.get(&id)?;
        if stored.kind == ObjectKind::Raw {
            return Ok(stored.data);
        }

        let node = Node::from_stored_object(&stored)?;
        if node.data() != FILE_DATA {
            return Err(ApiError::InvalidArgument(format!("{id} is not a file")));
        }
        let mut out = Vec::new();
        for link in node.links() {
            self.opts.check_cancelled()?;
            let leaf = store.get(&link.target)?;
            if leaf.kind != ObjectKind::Raw {
                return Err(ApiError::InvalidArgument(format!(
                    "file {id} has a non-raw leaf {}",
                    link.target
                )));
            }
            out.extend_from_slice(&leaf.data);
        }
        Ok(out)
    }
}
