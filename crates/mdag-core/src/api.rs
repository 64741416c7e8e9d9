//! The facade: one entry point per node.

use std::sync::Arc;

use mdag_types::ObjectId;

use crate::block::BlockApi;
use crate::context::NodeContext;
use crate::dag::DagApi;
use crate::error::ApiResult;
use crate::key::KeyApi;
use crate::name::NameApi;
use crate::object::ObjectApi;
use crate::options::ApiOptions;
use crate::pin::PinApi;
use crate::resolve::Resolver;
use crate::unixfs::UnixfsApi;

/// Entry point to every subsystem of one node.
///
/// Accessors build a fresh sub-API on each call. Building one clones an
/// `Arc` and the options; it never touches storage. All sub-APIs obtained
/// from the same facade share its context and options.
///
/// ```
/// use std::sync::Arc;
/// use mdag_core::{CoreApi, NodeConfig, NodeContext, Template};
///
/// let api = CoreApi::new(Arc::new(NodeContext::in_memory(NodeConfig::default()).unwrap()));
/// let root = api.object().new_object(Template::Empty).unwrap();
/// let patched = api.object().set_data(&root.to_hex(), &b"hi"[..]).unwrap();
/// assert_eq!(api.object().data(&patched.to_hex()).unwrap(), b"hi");
/// ```
#[derive(Clone, Debug)]
pub struct CoreApi {
    ctx: Arc<NodeContext>,
    opts: ApiOptions,
}

impl CoreApi {
    pub fn new(ctx: Arc<NodeContext>) -> Self {
        Self {
            ctx,
            opts: ApiOptions::default(),
        }
    }

    /// A facade over the same node with different options.
    pub fn with_options(&self, opts: ApiOptions) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
            opts,
        }
    }

    pub fn context(&self) -> &Arc<NodeContext> {
        &self.ctx
    }

    pub fn options(&self) -> &ApiOptions {
        &self.opts
    }

    pub fn object(&self) -> ObjectApi {
        ObjectApi::new(Arc::clone(&self.ctx), self.opts.clone())
    }

    pub fn block(&self) -> BlockApi {
        BlockApi::new(Arc::clone(&self.ctx), self.opts.clone())
    }

    pub fn dag(&self) -> DagApi {
        DagApi::new(Arc::clone(&self.ctx), self.opts.clone())
    }

    pub fn name(&self) -> NameApi {
        NameApi::new(Arc::clone(&self.ctx), self.opts.clone())
    }

    pub fn key(&self) -> KeyApi {
        KeyApi::new(Arc::clone(&self.ctx), self.opts.clone())
    }

    pub fn pin(&self) -> PinApi {
        PinApi::new(Arc::clone(&self.ctx), self.opts.clone())
    }

    pub fn unixfs(&self) -> UnixfsApi {
        UnixfsApi::new(Arc::clone(&self.ctx), self.opts.clone())
    }

    /// Resolve any reference string to an identity.
    pub fn resolve(&self, reference: &str) -> ApiResult<ObjectId> {
        Resolver::new(&self.ctx, &self.opts).resolve_str(reference)
    }
}
