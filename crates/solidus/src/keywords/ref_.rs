//! `$ref` and `$dynamicRef`.
//!
//! References compile eagerly into the tree. When the compiler detects that
//! a reference re-enters a schema already on the current compilation path,
//! it switches to a lazily-built node, breaking the ownership cycle through
//! the registry. At validation time, re-entering the same lazy reference for
//! the same instance location without having descended into the instance is
//! reported as a detected cycle rather than looping forever.
use std::{cell::RefCell, collections::VecDeque, hash::BuildHasher, rc::Rc, sync::Arc};

use ahash::AHashSet;
use once_cell::sync::OnceCell;
use solidus_referencing::{Draft, Registry, Resource, Uri};
use solidus_value::{Object, Pointer, Value};

use crate::{
    compiler::{self, Context},
    error::{error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    node::SchemaNode,
    options::ValidationOptions,
    paths::LocationNode,
    validator::Validate,
};

pub(crate) enum RefValidator {
    Default { inner: SchemaNode },
    Lazy(LazyRefValidator),
}

impl RefValidator {
    fn compile(
        ctx: &Context<'_>,
        keyword: &'static str,
        reference: &str,
    ) -> Result<Box<Self>, ValidationError<'static>> {
        if let Some((base_uri, scopes, resource)) = ctx.lookup_maybe_recursive(reference)? {
            return Ok(Box::new(RefValidator::Lazy(LazyRefValidator {
                resource,
                config: Arc::clone(ctx.config()),
                registry: Arc::clone(&ctx.registry),
                base_uri,
                scopes,
                reference: reference.to_string(),
                location: ctx.location().join(keyword),
                inner: OnceCell::default(),
            })));
        }
        let kctx = ctx.with_path(keyword);
        let resolved = kctx.lookup(reference)?;
        let (contents, resolver) = resolved.into_inner();
        let resource_ref = Draft::default().create_resource_ref(contents);
        let kctx = kctx.with_resolver(resolver);
        let inner = compiler::compile_with(&kctx, resource_ref)?;
        Ok(Box::new(RefValidator::Default { inner }))
    }
}

/// A reference that is part of a cycle: the target subtree is built on
/// first use instead of at compile time.
pub(crate) struct LazyRefValidator {
    resource: Resource,
    config: Arc<ValidationOptions>,
    registry: Arc<Registry>,
    base_uri: Uri<String>,
    scopes: VecDeque<Uri<String>>,
    reference: String,
    location: Pointer,
    inner: OnceCell<SchemaNode>,
}

thread_local! {
    /// `(reference identity, instance address)` pairs currently being
    /// validated on this thread; re-entry means the schema loops without
    /// consuming input.
    static ACTIVE: RefCell<AHashSet<(u64, usize)>> = RefCell::new(AHashSet::new());
}

struct ActiveGuard {
    key: (u64, usize),
}

impl ActiveGuard {
    /// `None` when the pair is already on the stack.
    fn enter(key: (u64, usize)) -> Option<ActiveGuard> {
        ACTIVE.with(|active| active.borrow_mut().insert(key).then_some(ActiveGuard { key }))
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            active.borrow_mut().remove(&self.key);
        });
    }
}

impl LazyRefValidator {
    fn lazy_compile(&self) -> &SchemaNode {
        self.inner.get_or_init(|| {
            let resolver = self
                .registry
                .resolver_from_raw_parts(self.base_uri.clone(), self.scopes.clone());
            let vocabularies = self
                .resource
                .contents()
                .get("$schema")
                .and_then(Value::as_str)
                .and_then(|meta| self.registry.vocabularies_for(meta).ok())
                .unwrap_or_default();
            let ctx = Context::new(
                Arc::clone(&self.config),
                Arc::clone(&self.registry),
                Rc::new(resolver),
                vocabularies,
            );
            // This schema already compiled once on the path that discovered
            // the cycle.
            compiler::compile(&ctx, self.resource.as_ref()).expect("Invalid schema")
        })
    }

    fn cycle_key(&self, instance: &Value) -> (u64, usize) {
        let identity = ahash::RandomState::with_seeds(7, 11, 13, 17)
            .hash_one(self.base_uri.as_str());
        (identity, instance as *const Value as usize)
    }
}

impl Validate for LazyRefValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match ActiveGuard::enter(self.cycle_key(instance)) {
            Some(_guard) => self.lazy_compile().is_valid(instance),
            None => false,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        match ActiveGuard::enter(self.cycle_key(instance)) {
            Some(_guard) => {
                // Collect eagerly so the guard covers the whole descent.
                let errors: Vec<ValidationError<'i>> =
                    self.lazy_compile().validate(instance, location).collect();
                Box::new(errors.into_iter())
            }
            None => error(ValidationError::cycle_detected(
                self.location.clone(),
                location.into(),
                instance,
                &self.reference,
            )),
        }
    }
}

impl Validate for RefValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match self {
            RefValidator::Default { inner } => inner.is_valid(instance),
            RefValidator::Lazy(lazy) => lazy.is_valid(instance),
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        match self {
            RefValidator::Default { inner } => inner.validate(instance, location),
            RefValidator::Lazy(lazy) => lazy.validate(instance, location),
        }
    }

    fn apply<'a>(
        &'a self,
        instance: &Value,
        location: &LocationNode,
    ) -> crate::validator::PartialApplication<'a> {
        match self {
            RefValidator::Default { inner } => inner.apply_rooted(instance, location).into(),
            RefValidator::Lazy(lazy) => {
                crate::validator::Validate::apply(lazy, instance, location)
            }
        }
    }
}

fn compile_reference(
    ctx: &Context<'_>,
    keyword: &'static str,
    schema: &Value,
) -> BoxedCompilationResult {
    let Some(reference) = schema.as_str() else {
        return Err(ValidationError::invalid_reference(
            ctx.location().join(keyword),
            &Value::Null,
            schema.to_string(),
        )
        .into_owned());
    };
    Ok(Some(RefValidator::compile(ctx, keyword, reference)?))
}

pub(crate) fn compile_ref(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    compile_reference(ctx, "$ref", schema)
}

/// `$dynamicRef` resolves through the dynamic scope the compiler built on
/// the way here; references compile inline, so that scope coincides with
/// the evaluation-time scope.
pub(crate) fn compile_dynamic_ref(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    compile_reference(ctx, "$dynamicRef", schema)
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(
        &json!({
            "properties": {"foo": {"$ref": "#/$defs/foo"}},
            "$defs": {"foo": {"type": "string"}}
        }),
        &json!({"foo": "ok"})
    )]
    #[test_case(
        &json!({
            "$ref": "#/$defs/positive",
            "$defs": {"positive": {"minimum": 0}}
        }),
        &json!(5)
    )]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test]
    fn recursive_reference_descends() {
        let schema = json!({
            "$defs": {
                "node": {
                    "type": "object",
                    "properties": {
                        "value": {"type": "integer"},
                        "next": {"$ref": "#/$defs/node"}
                    }
                }
            },
            "$ref": "#/$defs/node"
        });
        tests_util::is_valid(&schema, &json!({"value": 1, "next": {"value": 2}}));
        tests_util::is_not_valid(&schema, &json!({"value": 1, "next": {"value": "x"}}));
    }

    #[test]
    fn self_reference_without_descent_is_a_cycle() {
        let schema = solidus_value::Value::from(json!({"$ref": "#"}));
        let compiled = crate::Schema::new(&schema).unwrap();
        let instance = solidus_value::Value::from(json!(1));
        assert!(!compiled.is_valid(&instance));
        let errors: Vec<_> = compiled.iter_errors(&instance).collect();
        assert!(errors[0].to_string().contains("infinite loop"));
    }

    #[test]
    fn error_paths_cross_references() {
        tests_util::assert_schema_location(
            &json!({
                "properties": {"foo": {"$ref": "#/$defs/foo"}},
                "$defs": {"foo": {"type": "string"}}
            }),
            &json!({"foo": 42}),
            "/properties/foo/$ref/type",
        );
    }
}
