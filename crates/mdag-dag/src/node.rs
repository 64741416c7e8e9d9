//! The Merkle-DAG object model.
//!
//! A [`Node`] is `(links, data)`. Its identity is the domain-separated BLAKE3
//! hash of its canonical encoding, which is the bincode serialization of the
//! struct below. The encoding is deterministic, so two nodes with the same
//! link table and data always share an identity.

use serde::{Deserialize, Serialize};

use mdag_store::{ObjectKind, StoredObject};
use mdag_types::ObjectId;

use crate::error::{DagError, DagResult};

/// Data segment written by [`Template::Dir`].
pub const DIR_DATA: &[u8] = b"dir";

/// Data segment carried by file roots built by the unixfs layer.
pub const FILE_DATA: &[u8] = b"file";

/// A named, sized reference from one node to another object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    /// Name of the link, unique within one node's link table.
    pub name: String,
    /// Identity of the referenced object.
    pub target: ObjectId,
    /// Cumulative size of the referenced object. Advisory only.
    pub size: u64,
}

impl Link {
    /// Create a new link.
    pub fn new(name: impl Into<String>, target: ObjectId, size: u64) -> Self {
        Self {
            name: name.into(),
            target,
            size,
        }
    }
}

/// An immutable Merkle-DAG node: a data segment plus an ordered link table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    links: Vec<Link>,
    data: Vec<u8>,
}

/// Size and shape summary of a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeStat {
    /// Identity of the node.
    pub hash: ObjectId,
    /// Number of entries in the link table.
    pub num_links: usize,
    /// Size of the canonical encoding.
    pub block_size: u64,
    /// Size of the encoding minus the data segment.
    pub links_size: u64,
    /// Size of the data segment.
    pub data_size: u64,
    /// Encoded size plus the advisory sizes of all links.
    pub cumulative_size: u64,
}

/// Starting points for `object new`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Template {
    /// No data and no links.
    Empty,
    /// A directory marker with no entries.
    Dir,
}

impl Template {
    /// Parse a template name (`empty`, `dir`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "empty" => Some(Self::Empty),
            "dir" => Some(Self::Dir),
            _ => None,
        }
    }

    /// Build the node this template describes.
    pub fn build(&self) -> Node {
        match self {
            Self::Empty => Node::empty(),
            Self::Dir => Node::with_data(DIR_DATA.to_vec()),
        }
    }
}

impl Node {
    /// Create a node from its parts.
    pub fn new(data: Vec<u8>, links: Vec<Link>) -> Self {
        Self { links, data }
    }

    /// A node with no data and no links.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A node with the given data and no links.
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            links: Vec::new(),
            data,
        }
    }

    /// The data segment.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The link table, in order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Look up a link by exact name.
    pub fn get_link(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.name == name)
    }

    // ---------------------------------------------------------------
    // Codec
    // ---------------------------------------------------------------

    /// Canonical encoding of this node.
    pub fn encode(&self) -> DagResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| DagError::Codec(e.to_string()))
    }

    /// Decode a canonical encoding.
    pub fn decode(bytes: &[u8]) -> DagResult<Self> {
        bincode::deserialize(bytes).map_err(|e| DagError::Codec(e.to_string()))
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> DagResult<StoredObject> {
        Ok(StoredObject::new(ObjectKind::Node, self.encode()?))
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> DagResult<Self> {
        if obj.kind != ObjectKind::Node {
            return Err(DagError::NotANode {
                id: obj.compute_id(),
                kind: obj.kind,
            });
        }
        Self::decode(&obj.data)
    }

    /// Identity of this node.
    pub fn id(&self) -> DagResult<ObjectId> {
        Ok(self.to_stored_object()?.compute_id())
    }

    /// Size of the canonical encoding.
    pub fn encoded_size(&self) -> DagResult<u64> {
        bincode::serialized_size(self).map_err(|e| DagError::Codec(e.to_string()))
    }

    /// Encoded size plus the advisory sizes of all linked objects.
    pub fn cumulative_size(&self) -> DagResult<u64> {
        let links: u64 = self.links.iter().map(|l| l.size).sum();
        Ok(self.encoded_size()? + links)
    }

    /// Size and shape summary.
    pub fn stat(&self) -> DagResult<NodeStat> {
        let stored = self.to_stored_object()?;
        let block_size = stored.size;
        let data_size = self.data.len() as u64;
        Ok(NodeStat {
            hash: stored.compute_id(),
            num_links: self.links.len(),
            block_size,
            links_size: block_size - data_size,
            data_size,
            cumulative_size: self.cumulative_size()?,
        })
    }

    // ---------------------------------------------------------------
    // Pure edits. Each returns a new node; `self` is never modified.
    // ---------------------------------------------------------------

    /// Install a single-segment link. An existing link with the same name is
    /// removed first, so the new entry always lands at the end of the table.
    pub fn with_link(&self, name: &str, target: ObjectId, size: u64) -> Self {
        let mut links: Vec<Link> = self
            .links
            .iter()
            .filter(|l| l.name != name)
            .cloned()
            .collect();
        links.push(Link::new(name, target, size));
        Self {
            links,
            data: self.data.clone(),
        }
    }

    /// Remove the link with exactly this name.
    pub fn without_link(&self, name: &str) -> DagResult<Self> {
        if self.get_link(name).is_none() {
            return Err(DagError::LinkNotFound {
                name: name.to_string(),
            });
        }
        let links = self
            .links
            .iter()
            .filter(|l| l.name != name)
            .cloned()
            .collect();
        Ok(Self {
            links,
            data: self.data.clone(),
        })
    }

    /// Replace the data segment wholesale.
    pub fn with_replaced_data(&self, data: Vec<u8>) -> Self {
        Self {
            links: self.links.clone(),
            data,
        }
    }

    /// Append bytes to the data segment.
    pub fn with_appended_data(&self, more: &[u8]) -> Self {
        let mut data = Vec::with_capacity(self.data.len() + more.len());
        data.extend_from_slice(&self.data);
        data.extend_from_slice(more);
        Self {
            links: self.links.clone(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn target(byte: u8) -> ObjectId {
        ObjectId::from_hash([byte; 32])
    }

    #[test]
    fn identity_is_deterministic() {
        let node = Node::new(b"hello".to_vec(), vec![Link::new("a", target(1), 10)]);
        assert_eq!(node.id().unwrap(), node.clone().id().unwrap());
    }

    #[test]
    fn identity_depends_on_every_field() {
        let base = Node::new(b"d".to_vec(), vec![Link::new("a", target(1), 10)]);
        let variants = [
            base.with_replaced_data(b"e".to_vec()),
            Node::new(b"d".to_vec(), vec![Link::new("b", target(1), 10)]),
            Node::new(b"d".to_vec(), vec![Link::new("a", target(2), 10)]),
            Node::new(b"d".to_vec(), vec![Link::new("a", target(1), 11)]),
        ];
        let id = base.id().unwrap();
        for v in variants {
            assert_ne!(v.id().unwrap(), id);
        }
    }

    #[test]
    fn link_order_is_significant() {
        let ab = Node::new(
            vec![],
            vec![Link::new("a", target(1), 1), Link::new("b", target(2), 1)],
        );
        let ba = Node::new(
            vec![],
            vec![Link::new("b", target(2), 1), Link::new("a", target(1), 1)],
        );
        assert_ne!(ab.id().unwrap(), ba.id().unwrap());
    }

    #[test]
    fn codec_roundtrip() {
        let node = Node::new(b"payload".to_vec(), vec![Link::new("x", target(3), 7)]);
        let stored = node.to_stored_object().unwrap();
        assert_eq!(Node::from_stored_object(&stored).unwrap(), node);
    }

    #[test]
    fn raw_object_is_not_a_node() {
        let raw = StoredObject::raw(b"bytes".to_vec());
        assert!(matches!(
            Node::from_stored_object(&raw),
            Err(DagError::NotANode {
                kind: ObjectKind::Raw,
                ..
            })
        ));
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(Node::decode(&[0xff; 3]), Err(DagError::Codec(_))));
    }

    #[test]
    fn with_link_replaces_by_name_and_appends() {
        let node = Node::empty()
            .with_link("a", target(1), 1)
            .with_link("b", target(2), 1)
            .with_link("a", target(3), 5);
        let names: Vec<&str> = node.links().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(node.get_link("a").unwrap().target, target(3));
        assert_eq!(node.get_link("a").unwrap().size, 5);
    }

    #[test]
    fn without_link_missing_name() {
        let err = Node::empty().without_link("nonexistent").unwrap_err();
        assert!(matches!(err, DagError::LinkNotFound { name } if name == "nonexistent"));
    }

    #[test]
    fn without_link_is_exact_match() {
        let node = Node::empty().with_link("a", target(1), 1);
        assert!(node.without_link("a/b").is_err());
        assert!(node.without_link("a").unwrap().links().is_empty());
    }

    #[test]
    fn edits_leave_the_original_untouched() {
        let original = Node::new(b"keep".to_vec(), vec![Link::new("l", target(1), 1)]);
        let snapshot = original.clone();
        let _ = original.with_appended_data(b"more");
        let _ = original.with_replaced_data(b"new".to_vec());
        let _ = original.with_link("m", target(2), 2);
        let _ = original.without_link("l");
        assert_eq!(original, snapshot);
    }

    #[test]
    fn stat_accounts_for_links() {
        let node = Node::new(b"abc".to_vec(), vec![Link::new("child", target(1), 100)]);
        let stat = node.stat().unwrap();
        assert_eq!(stat.hash, node.id().unwrap());
        assert_eq!(stat.num_links, 1);
        assert_eq!(stat.data_size, 3);
        assert_eq!(stat.block_size, node.encode().unwrap().len() as u64);
        assert_eq!(stat.links_size, stat.block_size - 3);
        assert_eq!(stat.cumulative_size, stat.block_size + 100);
    }

    #[test]
    fn templates() {
        assert_eq!(Template::from_name("empty").unwrap().build(), Node::empty());
        assert_eq!(Template::from_name("dir").unwrap().build().data(), DIR_DATA);
        assert!(Template::from_name("unixfs-file").is_none());
    }

    fn arb_node() -> impl Strategy<Value = Node> {
        (
            proptest::collection::vec(any::<u8>(), 0..64),
            proptest::collection::vec(("[a-z]{1,6}", any::<u8>(), any::<u32>()), 0..6),
        )
            .prop_map(|(data, links)| {
                links.into_iter().fold(Node::with_data(data), |n, (name, t, size)| {
                    n.with_link(&name, target(t), u64::from(size))
                })
            })
    }

    proptest! {
        #[test]
        fn data_edits_never_touch_links(node in arb_node(), bytes in proptest::collection::vec(any::<u8>(), 0..32)) {
            let appended = node.with_appended_data(&bytes);
            prop_assert_eq!(appended.links(), node.links());
            let replaced = node.with_replaced_data(bytes);
            prop_assert_eq!(replaced.links(), node.links());
        }

        #[test]
        fn link_edits_never_touch_data(node in arb_node(), name in "[a-z]{1,6}", t in any::<u8>()) {
            let added = node.with_link(&name, target(t), 1);
            prop_assert_eq!(added.data(), node.data());
            let removed = added.without_link(&name).unwrap();
            prop_assert_eq!(removed.data(), node.data());
        }

        #[test]
        fn add_then_remove_restores_other_links(node in arb_node(), name in "[A-Z]{1,6}", t in any::<u8>()) {
            // Upper-case names never collide with the generated lower-case ones.
            let restored = node.with_link(&name, target(t), 1).without_link(&name).unwrap();
            prop_assert_eq!(restored.id().unwrap(), node.id().unwrap());
        }

        #[test]
        fn append_is_associative(node in arb_node(),
                                 a in proptest::collection::vec(any::<u8>(), 0..32),
                                 b in proptest::collection::vec(any::<u8>(), 0..32)) {
            let stepwise = node.with_appended_data(&a).with_appended_data(&b);
            let joined: Vec<u8> = a.iter().chain(b.iter()).copied().collect();
            let joined_node = node.with_appended_data(&joined);
            prop_assert_eq!(stepwise.data(), joined_node.data());
        }
    }
}
