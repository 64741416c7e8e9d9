//! The Object sub-API and its patch engine.
//!
//! Every patch follows the same pipeline: resolve the root reference, apply
//! one pure transform to the root node, persist the result, return its new
//! identity. The root node is never modified; a failed patch leaves nothing
//! behind in the store except objects that were already there.

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use mdag_dag::{load_node, Editor, Link, Node, NodeStat, Template};
use mdag_store::{ObjectKind, ObjectStore, StoredObject};
use mdag_types::{ObjectId, Reference};
use tracing::{debug, warn};

use crate::context::NodeContext;
use crate::error::ApiResult;
use crate::options::ApiOptions;
use crate::resolve::Resolver;
use crate::stream::Chunks;

/// One patch operation with its parameters.
pub enum PatchOp<'a> {
    /// Concatenate the stream onto the existing data segment.
    AppendData(Box<dyn Read + 'a>),
    /// Replace the data segment with the stream's contents.
    SetData(Box<dyn Read + 'a>),
    /// Install a link to `target` at `name`, which may span several segments.
    AddLink {
        name: String,
        target: Reference,
        create: bool,
    },
    /// Remove the single-segment link `name`.
    RmLink { name: String },
}

impl PatchOp<'_> {
    /// Command-style name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AppendData(_) => "append-data",
            Self::SetData(_) => "set-data",
            Self::AddLink { .. } => "add-link",
            Self::RmLink { .. } => "rm-link",
        }
    }
}

impl fmt::Debug for PatchOp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AppendData(_) | Self::SetData(_) => f.write_str(self.name()),
            Self::AddLink {
                name,
                target,
                create,
            } => f
                .debug_struct("AddLink")
                .field("name", name)
                .field("target", target)
                .field("create", create)
                .finish(),
            Self::RmLink { name } => f.debug_struct("RmLink").field("name", name).finish(),
        }
    }
}

/// Reading, creating and patching DAG nodes.
#[derive(Clone, Debug)]
pub struct ObjectApi {
    ctx: Arc<NodeContext>,
    opts: ApiOptions,
}

impl ObjectApi {
    pub(crate) fn new(ctx: Arc<NodeContext>, opts: ApiOptions) -> Self {
        Self { ctx, opts }
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.ctx, &self.opts)
    }

    // ---------------------------------------------------------------
    // Patch engine
    // ---------------------------------------------------------------

    /// Apply `op` to the object at `root` and return the new identity.
    ///
    /// Errors keep their [`ErrorKind`](crate::ErrorKind) and are wrapped
    /// with the operation name and the root reference.
    pub fn patch(&self, root: &str, op: PatchOp<'_>) -> ApiResult<ObjectId> {
        let op_name = op.name();
        self.apply(root, op)
            .map_err(|e| e.in_patch(op_name, root))
    }

    /// Append the contents of `data` to the root's data segment.
    pub fn append_data(&self, root: &str, data: impl Read) -> ApiResult<ObjectId> {
        self.patch(root, PatchOp::AppendData(Box::new(data)))
    }

    /// Replace the root's data segment with the contents of `data`.
    pub fn set_data(&self, root: &str, data: impl Read) -> ApiResult<ObjectId> {
        self.patch(root, PatchOp::SetData(Box::new(data)))
    }

    /// Link `target` under `name` (`a/b/c` for nested links).
    ///
    /// With `create`, missing intermediate nodes are synthesised empty;
    /// without it a missing intermediate is `NotFound`.
    pub fn add_link(
        &self,
        root: &str,
        name: &str,
        target: &str,
        create: bool,
    ) -> ApiResult<ObjectId> {
        let target = self
            .resolver()
            .parse(target)
            .map_err(|e| e.in_patch("add-link", root))?;
        self.patch(
            root,
            PatchOp::AddLink {
                name: name.to_string(),
                target,
                create,
            },
        )
    }

    /// Remove the link called exactly `name`.
    pub fn rm_link(&self, root: &str, name: &str) -> ApiResult<ObjectId> {
        self.patch(
            root,
            PatchOp::RmLink {
                name: name.to_string(),
            },
        )
    }

    fn apply(&self, root: &str, op: PatchOp<'_>) -> ApiResult<ObjectId> {
        let resolver = self.resolver();
        let root_id = resolver.resolve_str(root)?;
        let store = self.ctx.store();
        let node = load_node(store, &root_id)?;
        let op_name = op.name();

        let (patched, staged) = match op {
            PatchOp::AppendData(reader) => {
                let more = self.read_stream(reader)?;
                (node.with_appended_data(&more), Vec::new())
            }
            PatchOp::SetData(reader) => {
                let data = self.read_stream(reader)?;
                (node.with_replaced_data(data), Vec::new())
            }
            PatchOp::AddLink {
                name,
                target,
                create,
            } => {
                let target_id = resolver.resolve(&target)?;
                let size = object_size(store, &target_id)?;
                let edit = Editor::new(store)
                    .create_intermediates(create)
                    .insert_link(&node, &name, target_id, size)?;
                (edit.root, edit.staged)
            }
            PatchOp::RmLink { name } => (node.without_link(&name)?, Vec::new()),
        };

        let id = self.persist(&patched, &staged)?;
        debug!(
            op = op_name,
            root = %root_id.short_hex(),
            new = %id.short_hex(),
            staged = staged.len(),
            "patched object"
        );
        Ok(id)
    }

    /// Drain a stream chunk by chunk, stopping early on cancellation.
    fn read_stream(&self, reader: Box<dyn Read + '_>) -> ApiResult<Vec<u8>> {
        let mut data = Vec::new();
        for chunk in Chunks::new(reader, self.ctx.config().chunk_size) {
            self.opts.check_cancelled()?;
            data.extend_from_slice(&chunk?);
        }
        Ok(data)
    }

    /// Write `staged` descendants, then `node`. Nothing is written if the
    /// caller has already cancelled.
    fn persist(&self, node: &Node, staged: &[StoredObject]) -> ApiResult<ObjectId> {
        self.opts.check_cancelled()?;
        let stored = node.to_stored_object()?;
        let limit = self.ctx.config().max_object_size;
        if stored.size > limit {
            warn!(
                size = stored.size,
                limit,
                "object exceeds the advisory size limit; peers may refuse it"
            );
        }
        let store = self.ctx.store();
        store.write_batch(staged)?;
        Ok(store.write(&stored)?)
    }

    // ---------------------------------------------------------------
    // Plain object operations
    // ---------------------------------------------------------------

    /// Store a node built from `template`.
    pub fn new_object(&self, template: Template) -> ApiResult<ObjectId> {
        self.persist(&template.build(), &[])
    }

    /// Store an arbitrary node.
    pub fn put(&self, node: &Node) -> ApiResult<ObjectId> {
        self.persist(node, &[])
    }

    pub fn get(&self, reference: &str) -> ApiResult<Node> {
        let id = self.resolver().resolve_str(reference)?;
        Ok(load_node(self.ctx.store(), &id)?)
    }

    pub fn data(&self, reference: &str) -> ApiResult<Vec<u8>> {
        Ok(self.get(reference)?.data().to_vec())
    }

    pub fn links(&self, reference: &str) -> ApiResult<Vec<Link>> {
        Ok(self.get(reference)?.links().to_vec())
    }

    pub fn stat(&self, reference: &str) -> ApiResult<NodeStat> {
        Ok(self.get(reference)?.stat()?)
    }
}

/// Advisory size recorded on a link to `id`: a node's cumulative size, or a
/// raw block's length.
pub(crate) fn object_size(store: &dyn ObjectStore, id: &ObjectId) -> ApiResult<u64> {
    let stored = store.get(id)?;
    match stored.kind {
        ObjectKind::Raw => Ok(stored.size),
        ObjectKind::Node => Ok(Node::from_stored_object(&stored)?.cumulative_size()?),
    }
}
