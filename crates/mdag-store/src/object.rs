use mdag_crypto::ContentHasher;
use mdag_types::ObjectId;

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Uninterpreted bytes (block API).
    Raw,
    /// Canonically encoded Merkle-DAG node.
    Node,
}

impl ObjectKind {
    /// One-byte tag used by on-disk backends.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Raw => 0x00,
            Self::Node => 0x01,
        }
    }

    /// Parse a tag written by [`ObjectKind::tag`].
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x00 => Some(Self::Raw),
            0x01 => Some(Self::Node),
            _ => None,
        }
    }

    fn hasher(&self) -> &'static ContentHasher {
        match self {
            Self::Raw => &ContentHasher::RAW,
            Self::Node => &ContentHasher::NODE,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raw => write!(f, "raw"),
            Self::Node => write!(f, "node"),
        }
    }
}

/// A stored object: kind tag + serialized bytes + cached size.
///
/// `StoredObject` is the unit of storage. The store never interprets the
/// bytes; its identity is the domain-separated hash of `data`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The serialized bytes of the object.
    pub data: Vec<u8>,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredObject {
    /// Create a new stored object from kind and data.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// A raw block.
    pub fn raw(data: Vec<u8>) -> Self {
        Self::new(ObjectKind::Raw, data)
    }

    /// Compute the content-addressed ID for this object.
    pub fn compute_id(&self) -> ObjectId {
        self.kind.hasher().hash(&self.data)
    }
}
