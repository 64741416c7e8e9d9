//! The Dag sub-API: whole-graph reads over nodes and raw blocks.

use std::collections::BTreeSet;
use std::sync::Arc;

use mdag_dag::{load_node, Node};
use mdag_store::{ObjectKind, ObjectStore};
use mdag_types::ObjectId;
use serde::Serialize;

use crate::context::NodeContext;
use crate::error::{ApiError, ApiResult};
use crate::options::ApiOptions;
use crate::resolve::Resolver;

/// Where a path walk stopped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DagResolved {
    /// The last object reached.
    pub id: ObjectId,
    /// Segments left over because the walk reached a raw block.
    pub remainder: Vec<String>,
}

/// One entry of a depth-first listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TreeEntry {
    /// Slash-joined link names from the root; empty for the root itself.
    pub path: String,
    pub id: ObjectId,
    pub kind: String,
}

#[derive(Clone, Debug)]
pub struct DagApi {
    ctx: Arc<NodeContext>,
    opts: ApiOptions,
}

impl DagApi {
    pub(crate) fn new(ctx: Arc<NodeContext>, opts: ApiOptions) -> Self {
        Self { ctx, opts }
    }

    pub fn put(&self, node: &Node) -> ApiResult<ObjectId> {
        self.opts.check_cancelled()?;
        Ok(self.ctx.store().write(&node.to_stored_object()?)?)
    }

    pub fn get(&self, reference: &str) -> ApiResult<Node> {
        let id = Resolver::new(&self.ctx, &self.opts).resolve_str(reference)?;
        Ok(load_node(self.ctx.store(), &id)?)
    }

    /// Follow a path as far as the graph allows.
    ///
    /// Unlike full resolution, reaching a raw block with segments left is
    /// not an error: the unconsumed segments are returned as the remainder.
    pub fn resolve(&self, reference: &str) -> ApiResult<DagResolved> {
        let resolver = Resolver::new(&self.ctx, &self.opts);
        let (mut current, literal) = resolver.resolve_root(&resolver.parse(reference)?)?;
        let store = self.ctx.store();

        let segments = literal.segments();
        for (i, segment) in segments.iter().enumerate() {
            let stored = store.get(&current)?;
            if stored.kind == ObjectKind::Raw {
                return Ok(DagResolved {
                    id: current,
                    remainder: segments[i..].to_vec(),
                });
            }
            let node = Node::from_stored_object(&stored)?;
            current = node
                .get_link(segment)
                .ok_or_else(|| {
                    ApiError::NotFound(format!(
                        "no link named {segment:?} under {}",
                        segments[..i].join("/")
                    ))
                })?
                .target;
        }
        Ok(DagResolved {
            id: current,
            remainder: Vec::new(),
        })
    }

    /// Every path reachable from `reference`, depth-first, root first.
    pub fn tree(&self, reference: &str) -> ApiResult<Vec<TreeEntry>> {
        let root = Resolver::new(&self.ctx, &self.opts).resolve_str(reference)?;
        let store = self.ctx.store();
        let mut out = Vec::new();
        let mut stack = vec![(String::new(), root)];
        while let Some((path, id)) = stack.pop() {
            self.opts.check_cancelled()?;
            let stored = store.get(&id)?;
            out.push(TreeEntry {
                path: path.clone(),
                id,
                kind: stored.kind.to_string(),
            });
            if stored.kind == ObjectKind::Node {
                let node = Node::from_stored_object(&stored)?;
                for link in node.links().iter().rev() {
                    let child = if path.is_empty() {
                        link.name.clone()
                    } else {
                        format!("{path}/{}", link.name)
                    };
                    stack.push((child, link.target));
                }
            }
        }
        Ok(out)
    }
}

/// Every object reachable from `root`, including `root`. Each object is
/// loaded exactly once; a missing descendant is `NotFound`.
pub(crate) fn reachable(store: &dyn ObjectStore, root: ObjectId) -> ApiResult<BTreeSet<ObjectId>> {
    let mut seen = BTreeSet::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        let stored = store.get(&id)?;
        if stored.kind == ObjectKind::Node {
            let node = Node::from_stored_object(&stored)?;
            stack.extend(node.links().iter().map(|l| l.target));
        }
    }
    Ok(seen)
}
