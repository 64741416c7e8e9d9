//! Object references: the strings callers use to name an object.
//!
//! Accepted forms:
//!
//! - `<id>` - a literal identity
//! - `<id>/a/b` - an identity followed by link names to walk
//! - `/dag/<id>[/a/b]` - the same, with an explicit namespace
//! - `/name/<name>[/a/b]` - a mutable name resolved at lookup time
//!
//! A single trailing `/` is tolerated. Empty segments anywhere else are not.

use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;
use crate::object::ObjectId;

/// Namespace prefix for literal identities.
pub const DAG_NAMESPACE: &str = "dag";

/// Namespace prefix for mutable names.
pub const NAME_NAMESPACE: &str = "name";

/// The head of a reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RefRoot {
    /// A literal content identity. Resolution is idempotent.
    Object(ObjectId),
    /// A mutable name. Resolution may change over time.
    Name(String),
}

/// A parsed object reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Reference {
    root: RefRoot,
    segments: Vec<String>,
}

impl Reference {
    /// A reference naming exactly `id`.
    pub fn object(id: ObjectId) -> Self {
        Self {
            root: RefRoot::Object(id),
            segments: Vec::new(),
        }
    }

    /// A reference naming the current target of a mutable name.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            root: RefRoot::Name(name.into()),
            segments: Vec::new(),
        }
    }

    /// Parse a reference string.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let invalid = |reason: &str| TypeError::InvalidReference {
            reference: input.to_string(),
            reason: reason.to_string(),
        };

        if input.is_empty() {
            return Err(invalid("empty reference"));
        }

        let body = input.strip_suffix('/').unwrap_or(input);
        let (root, rest) = if let Some(namespaced) = body.strip_prefix('/') {
            let mut parts = namespaced.splitn(3, '/');
            let namespace = parts.next().unwrap_or_default();
            let head = parts
                .next()
                .filter(|h| !h.is_empty())
                .ok_or_else(|| invalid("missing identity or name after namespace"))?;
            let root = match namespace {
                DAG_NAMESPACE => RefRoot::Object(
                    ObjectId::from_hex(head).map_err(|e| invalid(&e.to_string()))?,
                ),
                NAME_NAMESPACE => RefRoot::Name(head.to_string()),
                other => return Err(invalid(&format!("unknown namespace {other:?}"))),
            };
            (root, parts.next())
        } else {
            let mut parts = body.splitn(2, '/');
            let head = parts.next().unwrap_or_default();
            let id = ObjectId::from_hex(head).map_err(|e| invalid(&e.to_string()))?;
            (RefRoot::Object(id), parts.next())
        };

        let mut segments = Vec::new();
        if let Some(rest) = rest {
            for segment in rest.split('/') {
                if segment.is_empty() {
                    return Err(invalid("empty path segment"));
                }
                segments.push(segment.to_string());
            }
        }

        Ok(Self { root, segments })
    }

    /// The head of the reference.
    pub fn root(&self) -> &RefRoot {
        &self.root
    }

    /// Link names to follow from the root, in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns `true` if resolving this reference needs the naming layer.
    pub fn is_mutable(&self) -> bool {
        matches!(self.root, RefRoot::Name(_))
    }

    /// Replace the root, keeping `segments` after the new root's own.
    pub fn rebase(&self, root: Reference) -> Self {
        let mut rebased = root;
        rebased.segments.extend(self.segments.iter().cloned());
        rebased
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            RefRoot::Object(id) => write!(f, "/{DAG_NAMESPACE}/{id}")?,
            RefRoot::Name(name) => write!(f, "/{NAME_NAMESPACE}/{name}")?,
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for Reference {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<ObjectId> for Reference {
    fn from(id: ObjectId) -> Self {
        Self::object(id)
    }
}
