//! The Name sub-API: publishing and resolving mutable names.

use std::sync::Arc;

use chrono::Utc;
use mdag_names::NameRecord;
use mdag_types::{Reference, NAME_NAMESPACE};
use tracing::info;

use crate::context::NodeContext;
use crate::error::ApiResult;
use crate::options::ApiOptions;
use crate::resolve::Resolver;

#[derive(Clone, Debug)]
pub struct NameApi {
    ctx: Arc<NodeContext>,
    opts: ApiOptions,
}

impl NameApi {
    pub(crate) fn new(ctx: Arc<NodeContext>, opts: ApiOptions) -> Self {
        Self { ctx, opts }
    }

    /// Point the name owned by `key` at `reference`.
    ///
    /// The reference must resolve now. It is stored as written (normalised),
    /// so a name may point at another name or at a path below an object.
    pub fn publish(&self, reference: &str, key: &str) -> ApiResult<NameRecord> {
        let resolver = Resolver::new(&self.ctx, &self.opts);
        let target = resolver.parse(reference)?;
        resolver.resolve(&target)?;

        let signing_key = self.ctx.keys().get(key)?;
        let name = signing_key.verifying_key().to_hex();
        let sequence = self.ctx.names().next_sequence(&name)?;
        let record = NameRecord::sign(
            &signing_key,
            target.to_string(),
            sequence,
            Utc::now(),
            self.ctx.config().name_ttl(),
        );

        self.opts.check_cancelled()?;
        self.ctx.names().put(&record)?;
        info!(name = %record.name, value = %record.value, seq = sequence, "published name");
        Ok(record)
    }

    /// The literal reference a name currently points at.
    ///
    /// Accepts either a bare name or `/name/<name>[/segments]`.
    pub fn resolve(&self, name: &str) -> ApiResult<Reference> {
        let resolver = Resolver::new(&self.ctx, &self.opts);
        let prefix = format!("/{NAME_NAMESPACE}/");
        let reference = if name.starts_with(&prefix) {
            resolver.parse(name)?
        } else {
            resolver.parse(&format!("{prefix}{name}"))?
        };
        resolver.resolve_names(&reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;
    use crate::error::ErrorKind;
    use crate::key::SELF_KEY;
    use crate::object::ObjectApi;
    use mdag_dag::{Node, Template};

    fn apis() -> (NameApi, ObjectApi) {
        let ctx = Arc::new(NodeContext::in_memory(NodeConfig::default()).unwrap());
        (
            NameApi::new(ctx.clone(), ApiOptions::default()),
            ObjectApi::new(ctx, ApiOptions::default()),
        )
    }

    #[test]
    fn publish_then_resolve() {
        let (names, objects) = apis();
        let id = objects.new_object(Template::Dir).unwrap();
        let record = names.publish(&id.to_hex(), SELF_KEY).unwrap();
        assert_eq!(record.sequence, 1);
        assert_eq!(record.value, format!("/dag/{id}"));

        let resolved = names.resolve(&record.name).unwrap();
        assert_eq!(resolved, Reference::object(id));
        let prefixed = names.resolve(&format!("/name/{}", record.name)).unwrap();
        assert_eq!(prefixed, resolved);
    }

    #[test]
    fn republish_bumps_sequence_and_moves_name() {
        let (names, objects) = apis();
        let a = objects.put(&Node::with_data(b"a".to_vec())).unwrap();
        let b = objects.put(&Node::with_data(b"b".to_vec())).unwrap();
        names.publish(&a.to_hex(), SELF_KEY).unwrap();
        let second = names.publish(&b.to_hex(), SELF_KEY).unwrap();
        assert_eq!(second.sequence, 2);
        assert_eq!(names.resolve(&second.name).unwrap(), Reference::object(b));
    }

    #[test]
    fn name_paths_are_usable_as_patch_roots() {
        let (names, objects) = apis();
        let root = objects.new_object(Template::Empty).unwrap();
        let record = names.publish(&root.to_hex(), SELF_KEY).unwrap();
        let patched = objects
            .set_data(&format!("/name/{}", record.name), &b"via name"[..])
            .unwrap();
        assert_eq!(objects.data(&patched.to_hex()).unwrap(), b"via name");
    }

    #[test]
    fn publish_requires_resolvable_target_and_known_key() {
        let (names, objects) = apis();
        let ghost = mdag_types::ObjectId::from_hash([4; 32]);
        assert_eq!(
            names.publish(&format!("{ghost}/x"), SELF_KEY).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        let id = objects.new_object(Template::Empty).unwrap();
        assert_eq!(
            names.publish(&id.to_hex(), "nokey").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn unknown_name_is_naming_error() {
        let (names, _) = apis();
        assert_eq!(names.resolve("abcdef").unwrap_err().kind(), ErrorKind::Naming);
    }
}
