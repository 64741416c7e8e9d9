//! Following link names from a root node to a descendant.

use mdag_store::ObjectStore;
use mdag_types::ObjectId;

use crate::error::{DagError, DagResult};
use crate::node::Node;

/// Outcome of a successful walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Walked {
    /// Identity reached after the last segment.
    pub id: ObjectId,
    /// Identities visited along the way, root first, `id` last.
    pub trail: Vec<ObjectId>,
}

/// Load and decode a node that must exist.
pub fn load_node<S: ObjectStore + ?Sized>(store: &S, id: &ObjectId) -> DagResult<Node> {
    let stored = store.get(id)?;
    Node::from_stored_object(&stored)
}

/// Follow `segments` from `root`, one link lookup per segment.
///
/// A missing segment reports the path walked so far. The final target only
/// needs to exist as a link; it is not loaded, so a walk may end on a raw
/// block.
pub fn walk<S, I>(store: &S, root: ObjectId, segments: I) -> DagResult<Walked>
where
    S: ObjectStore + ?Sized,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut current = root;
    let mut trail = vec![root];
    let mut walked = String::new();

    for segment in segments {
        let segment = segment.as_ref();
        let node = load_node(store, &current)?;
        let link = node
            .get_link(segment)
            .ok_or_else(|| DagError::MissingSegment {
                segment: segment.to_string(),
                path: format!("{root}{walked}"),
            })?;
        current = link.target;
        trail.push(current);
        walked.push('/');
        walked.push_str(segment);
    }

    Ok(Walked { id: current, trail })
}
