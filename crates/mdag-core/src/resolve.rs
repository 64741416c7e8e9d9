//! Turning reference strings into object identities.
//!
//! Resolution happens in two phases. First every mutable-name root is
//! replaced by the reference its current record points at, repeatedly, until
//! the root is a literal identity. Then the link-name segments are walked one
//! node at a time.

use chrono::Utc;
use mdag_dag::walk;
use mdag_names::NameError;
use mdag_types::{ObjectId, RefRoot, Reference};
use tracing::debug;

use crate::context::NodeContext;
use crate::error::{ApiError, ApiResult};
use crate::options::ApiOptions;

/// Resolves references against one node context.
pub struct Resolver<'a> {
    ctx: &'a NodeContext,
    opts: &'a ApiOptions,
}

impl<'a> Resolver<'a> {
    pub fn new(ctx: &'a NodeContext, opts: &'a ApiOptions) -> Self {
        Self { ctx, opts }
    }

    /// Parse a reference string, reporting syntax errors as `InvalidReference`.
    pub fn parse(&self, input: &str) -> ApiResult<Reference> {
        Ok(Reference::parse(input)?)
    }

    /// Parse and resolve in one step.
    pub fn resolve_str(&self, input: &str) -> ApiResult<ObjectId> {
        self.resolve(&self.parse(input)?)
    }

    /// Resolve `reference` to the identity it currently denotes.
    pub fn resolve(&self, reference: &Reference) -> ApiResult<ObjectId> {
        let (root, literal) = self.resolve_root(reference)?;
        let walked = walk(self.ctx.store(), root, literal.segments())?;
        debug!(reference = %reference, id = %walked.id.short_hex(), "resolved reference");
        Ok(walked.id)
    }

    /// Expand mutable-name roots until the root is a literal identity.
    ///
    /// Segments are carried along: if `/name/k` points at `/dag/x/a`, then
    /// `/name/k/b` expands to `/dag/x/a/b`.
    pub fn resolve_names(&self, reference: &Reference) -> ApiResult<Reference> {
        Ok(self.resolve_root(reference)?.1)
    }

    /// Expand names and return the literal root identity alongside the
    /// expanded reference. No segment is walked.
    pub fn resolve_root(&self, reference: &Reference) -> ApiResult<(ObjectId, Reference)> {
        if reference.is_mutable() && !self.opts.resolve_names {
            return Err(ApiError::InvalidArgument(format!(
                "name resolution is disabled: {reference}"
            )));
        }
        let limit = self.ctx.config().name_resolve_depth;
        let mut current = reference.clone();
        let mut hops = 0;
        loop {
            let name = match current.root().clone() {
                RefRoot::Object(id) => return Ok((id, current)),
                RefRoot::Name(name) => name,
            };
            if hops == limit {
                return Err(ApiError::ResolveDepth {
                    name: reference.to_string(),
                    limit,
                });
            }
            current = current.rebase(self.lookup(&name)?);
            hops += 1;
        }
    }

    /// The verified, unexpired target of one name.
    fn lookup(&self, name: &str) -> ApiResult<Reference> {
        let record = self
            .ctx
            .names()
            .get(name)?
            .ok_or_else(|| NameError::NotFound {
                name: name.to_string(),
            })?;
        if record.name != name {
            return Err(NameError::BadSignature {
                name: name.to_string(),
            }
            .into());
        }
        record.check(Utc::now())?;
        Reference::parse(&record.value).map_err(|e| {
            ApiError::Naming(NameError::InvalidName {
                name: name.to_string(),
                reason: format!("record value is not a reference: {e}"),
            })
        })
    }
}
