//! Multi-segment link insertion.
//!
//! Installing `a/b/c` under a root means rebuilding every node on that path:
//! the deepest node gains the `c` link, which changes its identity, which
//! changes the `b` link in its parent, and so on up to the root. The
//! [`Editor`] does this in one recursive pass and hands back the new root
//! together with every rebuilt or synthesised node below it. Nothing is
//! written; the caller persists [`Edit::staged`] and then the root.

use mdag_store::{ObjectStore, StoredObject};
use mdag_types::ObjectId;
use tracing::debug;

use crate::error::{DagError, DagResult};
use crate::node::Node;
use crate::walk::load_node;

/// Result of an edit: the new root plus the nodes it now depends on.
#[derive(Clone, Debug)]
pub struct Edit {
    /// The rewritten root node.
    pub root: Node,
    /// Rebuilt or synthesised descendants, deepest first.
    pub staged: Vec<StoredObject>,
}

/// Rewrites link paths below a root, reading existing children from `store`.
pub struct Editor<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    create: bool,
}

impl<'a, S: ObjectStore + ?Sized> Editor<'a, S> {
    /// An editor that refuses to invent missing intermediate nodes.
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            create: false,
        }
    }

    /// Synthesise empty nodes for missing intermediate segments.
    pub fn create_intermediates(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    /// Install a link to `target` at `path` below `root`.
    ///
    /// A path without `/` is a plain insert-or-replace on `root`. Otherwise
    /// every segment but the last must name an existing child node, unless
    /// intermediate creation is on, in which case missing ones start out
    /// empty.
    pub fn insert_link(
        &self,
        root: &Node,
        path: &str,
        target: ObjectId,
        target_size: u64,
    ) -> DagResult<Edit> {
        let segments = split_link_path(path)?;
        let mut staged = Vec::new();
        let root = self.insert(root, &segments, 0, target, target_size, &mut staged)?;
        debug!(path, staged = staged.len(), "rewrote link path");
        Ok(Edit { root, staged })
    }

    fn insert(
        &self,
        node: &Node,
        segments: &[&str],
        depth: usize,
        target: ObjectId,
        target_size: u64,
        staged: &mut Vec<StoredObject>,
    ) -> DagResult<Node> {
        let segment = segments[depth];
        if depth + 1 == segments.len() {
            return Ok(node.with_link(segment, target, target_size));
        }

        let child = match node.get_link(segment) {
            Some(link) => load_node(self.store, &link.target)?,
            None if self.create => Node::empty(),
            None => {
                return Err(DagError::MissingSegment {
                    segment: segment.to_string(),
                    path: segments[..depth].join("/"),
                })
            }
        };

        let rebuilt = self.insert(&child, segments, depth + 1, target, target_size, staged)?;
        let stored = rebuilt.to_stored_object()?;
        let id = stored.compute_id();
        let size = rebuilt.cumulative_size()?;
        staged.push(stored);
        Ok(node.with_link(segment, id, size))
    }
}

/// Split a link path into segments, rejecting empty names and empty segments.
pub fn split_link_path(path: &str) -> DagResult<Vec<&str>> {
    if path.is_empty() {
        return Err(DagError::InvalidLinkName {
            name: path.to_string(),
            reason: "link name must not be empty".into(),
        });
    }
    let segments: Vec<&str> = path.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(DagError::InvalidLinkName {
            name: path.to_string(),
            reason: "path segments must not be empty".into(),
        });
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walk::walk;
    use mdag_store::InMemoryObjectStore;

    fn put(store: &InMemoryObjectStore, node: &Node) -> ObjectId {
        store.write(&node.to_stored_object().unwrap()).unwrap()
    }

    fn commit(store: &InMemoryObjectStore, edit: &Edit) -> ObjectId {
        store.write_batch(&edit.staged).unwrap();
        put(store, &edit.root)
    }

    #[test]
    fn single_segment_touches_only_root() {
        let store = InMemoryObjectStore::new();
        let t = put(&store, &Node::with_data(b"t".to_vec()));
        let edit = Editor::new(&store)
            .insert_link(&Node::empty(), "foo", t, 9)
            .unwrap();
        assert!(edit.staged.is_empty());
        assert_eq!(edit.root.links().len(), 1);
        assert_eq!(edit.root.get_link("foo").unwrap().size, 9);
    }

    #[test]
    fn missing_intermediate_without_create_fails() {
        let store = InMemoryObjectStore::new();
        let t = put(&store, &Node::empty());
        let err = Editor::new(&store)
            .insert_link(&Node::empty(), "a/b", t, 1)
            .unwrap_err();
        assert!(matches!(err, DagError::MissingSegment { segment, .. } if segment == "a"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn create_synthesises_empty_intermediates() {
        let store = InMemoryObjectStore::new();
        let t = put(&store, &Node::with_data(b"target".to_vec()));
        let edit = Editor::new(&store)
            .create_intermediates(true)
            .insert_link(&Node::empty(), "a/b/c", t, 6)
            .unwrap();
        assert_eq!(edit.staged.len(), 2);
        let root = commit(&store, &edit);

        assert_eq!(walk(&store, root, ["a", "b", "c"]).unwrap().id, t);
        let a = load_node(&store, &walk(&store, root, ["a"]).unwrap().id).unwrap();
        assert!(a.data().is_empty());
        assert_eq!(a.links().len(), 1);
    }

    #[test]
    fn existing_intermediate_is_rewrapped_with_siblings_kept() {
        let store = InMemoryObjectStore::new();
        let sibling = put(&store, &Node::with_data(b"sib".to_vec()));
        let t = put(&store, &Node::with_data(b"new".to_vec()));
        let dir = Node::empty().with_link("keep", sibling, 3);
        let dir_id = put(&store, &dir);
        let root = Node::with_data(b"root".to_vec()).with_link("dir", dir_id, 50);

        let edit = Editor::new(&store).insert_link(&root, "dir/added", t, 3).unwrap();
        let new_root = commit(&store, &edit);

        assert_eq!(edit.root.data(), b"root");
        assert_ne!(edit.root.get_link("dir").unwrap().target, dir_id);
        assert_eq!(walk(&store, new_root, ["dir", "keep"]).unwrap().id, sibling);
        assert_eq!(walk(&store, new_root, ["dir", "added"]).unwrap().id, t);
        // The original intermediate is still readable and unchanged.
        assert_eq!(load_node(&store, &dir_id).unwrap(), dir);
    }

    #[test]
    fn parent_size_reflects_rebuilt_child() {
        let store = InMemoryObjectStore::new();
        let t = put(&store, &Node::empty());
        let edit = Editor::new(&store)
            .create_intermediates(true)
            .insert_link(&Node::empty(), "a/b", t, 1000)
            .unwrap();
        let a_size = edit.root.get_link("a").unwrap().size;
        assert!(a_size > 1000);
    }

    #[test]
    fn rejects_empty_segments() {
        let store = InMemoryObjectStore::new();
        let t = ObjectId::from_hash([1; 32]);
        for bad in ["", "a//b", "/a", "a/"] {
            let err = Editor::new(&store)
                .create_intermediates(true)
                .insert_link(&Node::empty(), bad, t, 1)
                .unwrap_err();
            assert!(matches!(err, DagError::InvalidLinkName { .. }), "{bad:?}");
        }
    }

    #[test]
    fn same_edit_twice_is_deterministic() {
        let store = InMemoryObjectStore::new();
        let t = put(&store, &Node::with_data(b"x".to_vec()));
        let editor = Editor::new(&store).create_intermediates(true);
        let one = editor.insert_link(&Node::empty(), "p/q", t, 1).unwrap();
        let two = editor.insert_link(&Node::empty(), "p/q", t, 1).unwrap();
        assert_eq!(one.root.id().unwrap(), two.root.id().unwrap());
    }
}
