use mdag_types::ObjectId;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag that is prepended to every hash
/// computation, so a raw block and a DAG node with identical bytes never
/// share an identity.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for Merkle-DAG nodes (data + link table).
    pub const NODE: Self = Self {
        domain: "mdag-node-v1",
    };
    /// Hasher for raw, uninterpreted blocks.
    pub const RAW: Self = Self {
        domain: "mdag-raw-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ObjectId::from_hash(*hasher.finalize().as_bytes())
    }

    /// Verify that data produces the expected object ID.
    pub fn verify(&self, data: &[u8], expected: &ObjectId) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}
