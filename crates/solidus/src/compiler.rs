//! Compilation of schema documents into validator trees.
//!
//! The builder walks the schema in three passes per object: identifiers
//! (`$id`, `$schema`, `$anchor`, `$dynamicAnchor`, `$vocabulary`) are
//! handled by the referencing layer, reserved keywords (`$defs`,
//! `$comment`) are skipped, and everything else is dispatched to a keyword
//! behavior in vocabulary order.
use std::{cell::RefCell, collections::VecDeque, rc::Rc, sync::Arc};

use ahash::{AHashMap, AHashSet};
use once_cell::sync::Lazy;
use solidus_referencing::{
    uri, Draft, Registry, Resolved, Resolver, Resource, ResourceRef, Uri, Vocabulary,
    VocabularySet, SPECIFICATIONS,
};
use solidus_value::{Pointer, ReferenceToken, Value};

use crate::{
    error::ValidationError,
    keywords::{self, custom::CustomKeyword},
    node::SchemaNode,
    options::{UnknownKeywords, ValidationOptions},
    validator::Schema,
};

pub(crate) const DEFAULT_ROOT_URL: &str = "schema:///";
const DEFAULT_META_SCHEMA: &str = "https://json-schema.org/draft/2020-12/schema";

/// Identifier keywords, applied before anything else and never dispatched.
const IDENTIFIERS: &[&str] = &["$id", "$schema", "$anchor", "$dynamicAnchor", "$vocabulary"];
/// Reserved keywords: locations for reuse, no behavior of their own.
const RESERVED: &[&str] = &["$defs", "definitions", "$comment"];

/// State carried while compiling one subschema.
#[derive(Debug, Clone)]
pub(crate) struct Context<'a> {
    config: Arc<ValidationOptions>,
    pub(crate) registry: Arc<Registry>,
    resolver: Rc<Resolver<'a>>,
    location: Pointer,
    vocabularies: VocabularySet,
    /// References already entered on this compilation path, for cycle
    /// detection.
    seen: Rc<RefCell<AHashSet<Uri<String>>>>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        config: Arc<ValidationOptions>,
        registry: Arc<Registry>,
        resolver: Rc<Resolver<'a>>,
        vocabularies: VocabularySet,
    ) -> Self {
        Context {
            config,
            registry,
            resolver,
            location: Pointer::root(),
            vocabularies,
            seen: Rc::new(RefCell::new(AHashSet::new())),
        }
    }

    pub(crate) fn config(&self) -> &Arc<ValidationOptions> {
        &self.config
    }

    pub(crate) fn location(&self) -> &Pointer {
        &self.location
    }

    pub(crate) fn has_vocabulary(&self, vocabulary: Vocabulary) -> bool {
        self.vocabularies.contains(vocabulary)
    }

    /// A context one keyword (or index) deeper.
    pub(crate) fn with_path(&self, token: impl Into<ReferenceToken>) -> Context<'a> {
        Context {
            config: Arc::clone(&self.config),
            registry: Arc::clone(&self.registry),
            resolver: Rc::clone(&self.resolver),
            location: self.location.join(token),
            vocabularies: self.vocabularies,
            seen: Rc::clone(&self.seen),
        }
    }

    /// Enter a subschema, re-basing the resolver when it opens a new
    /// resource and switching vocabularies when it names a meta-schema.
    pub(crate) fn in_subresource(
        &self,
        resource: ResourceRef<'_>,
    ) -> Result<Context<'a>, ValidationError<'static>> {
        let resolver = self.resolver.in_subresource(resource)?;
        let vocabularies = match resource.contents().get("$schema").and_then(Value::as_str) {
            Some(meta) => self.registry.vocabularies_for(meta)?,
            None => self.vocabularies,
        };
        Ok(Context {
            config: Arc::clone(&self.config),
            registry: Arc::clone(&self.registry),
            resolver: Rc::new(resolver),
            location: self.location.clone(),
            vocabularies,
            seen: Rc::clone(&self.seen),
        })
    }

    pub(crate) fn with_resolver(&self, resolver: Resolver<'a>) -> Context<'a> {
        Context {
            config: Arc::clone(&self.config),
            registry: Arc::clone(&self.registry),
            resolver: Rc::new(resolver),
            location: self.location.clone(),
            vocabularies: self.vocabularies,
            seen: Rc::clone(&self.seen),
        }
    }

    pub(crate) fn as_resource_ref<'r>(&self, contents: &'r Value) -> ResourceRef<'r> {
        Draft::default().create_resource_ref(contents)
    }

    pub(crate) fn lookup(&self, reference: &str) -> Result<Resolved<'a>, ValidationError<'static>> {
        Ok(self.resolver.lookup(reference)?)
    }

    pub(crate) fn scopes(&self) -> VecDeque<Uri<String>> {
        self.resolver.scope_snapshot()
    }

    pub(crate) fn base_uri(&self) -> Option<Uri<String>> {
        let base = self.resolver.base_uri();
        if base.scheme().as_str() == "schema" {
            None
        } else {
            Some(base.to_owned())
        }
    }

    pub(crate) fn validates_formats_by_default(&self) -> bool {
        self.config
            .validate_formats()
            .unwrap_or_else(|| self.has_vocabulary(Vocabulary::FormatAssertion))
    }

    pub(crate) fn is_circular_reference(
        &self,
        reference: &str,
    ) -> Result<bool, ValidationError<'static>> {
        let uri = uri::resolve_against(&self.resolver.base_uri(), reference)?;
        Ok(self.seen.borrow().contains(&uri))
    }

    pub(crate) fn mark_seen(&self, reference: &str) -> Result<(), ValidationError<'static>> {
        let uri = uri::resolve_against(&self.resolver.base_uri(), reference)?;
        self.seen.borrow_mut().insert(uri);
        Ok(())
    }

    /// Resolve a reference that may be part of a cycle. Returns the raw
    /// parts to build a lazy validator when the cycle is already confirmed,
    /// `None` when eager compilation is safe.
    pub(crate) fn lookup_maybe_recursive(
        &self,
        reference: &str,
    ) -> Result<Option<(Uri<String>, VecDeque<Uri<String>>, Resource)>, ValidationError<'static>>
    {
        if !self.is_circular_reference(reference)? {
            self.mark_seen(reference)?;
            return Ok(None);
        }
        let resolved = self.resolver.lookup(reference)?;
        let resource = Draft::default().create_resource(resolved.contents().clone());
        let mut base_uri = resolved.resolver().base_uri().to_owned();
        let scopes = resolved.resolver().scope_snapshot();
        if let Some(id) = resource.id() {
            base_uri = uri::resolve_against(&base_uri.borrow(), id)?;
        }
        Ok(Some((base_uri, scopes, resource)))
    }
}

static META_SCHEMA_VALIDATOR: Lazy<Schema> = Lazy::new(|| {
    Schema::options()
        .without_schema_validation()
        .build(&solidus_referencing::meta::DRAFT202012)
        .expect("Invalid meta-schema")
});

pub(crate) fn build_schema(
    mut config: ValidationOptions,
    schema: &Value,
) -> Result<Schema, ValidationError<'static>> {
    let draft = Draft::default().detect(schema)?;
    let resource = draft.create_resource(schema.clone());
    let resource_ref = draft.create_resource_ref(schema);
    let base_uri = resource.id().unwrap_or(DEFAULT_ROOT_URL).to_string();

    let mut resources = Vec::with_capacity(1 + config.resources.len());
    resources.push((base_uri.clone(), resource));
    for (uri, resource) in config.resources.drain() {
        resources.push((uri, resource));
    }

    let registry = Arc::new(
        SPECIFICATIONS
            .clone()
            .try_with_resources(resources.into_iter(), &*config.locator)?,
    );
    let resolver = Rc::new(registry.try_resolver(&base_uri)?);
    let meta_uri = schema
        .get("$schema")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_META_SCHEMA);
    let vocabularies = registry.vocabularies_for(meta_uri)?;

    if config.validate_schema {
        let result = META_SCHEMA_VALIDATOR.validate(schema);
        if let Err(mut errors) = result {
            let first = errors.next().expect("at least one error");
            return Err(ValidationError::invalid_schema(
                first.schema_path.clone(),
                schema.clone(),
                first.to_string(),
            ));
        }
    }

    let config = Arc::new(config);
    let ctx = Context::new(
        Arc::clone(&config),
        Arc::clone(&registry),
        resolver,
        vocabularies,
    );
    let root = compile(&ctx, resource_ref)?;
    Ok(Schema { root, config })
}

/// Compile a subschema into a tree node.
pub(crate) fn compile(
    ctx: &Context<'_>,
    resource: ResourceRef<'_>,
) -> Result<SchemaNode, ValidationError<'static>> {
    let ctx = ctx.in_subresource(resource)?;
    compile_with(&ctx, resource)
}

pub(crate) fn compile_with(
    ctx: &Context<'_>,
    resource: ResourceRef<'_>,
) -> Result<SchemaNode, ValidationError<'static>> {
    match resource.contents().untagged() {
        Value::Bool(true) => Ok(SchemaNode::from_boolean(ctx, None)),
        Value::Bool(false) => Ok(SchemaNode::from_boolean(
            ctx,
            Some(keywords::boolean::FalseValidator::compile(
                ctx.location().clone(),
            )),
        )),
        Value::Object(schema) => {
            let mut validators = Vec::with_capacity(schema.len());
            let mut annotations = AHashMap::new();
            for (key, value) in schema {
                let Some(keyword) = key.as_str() else {
                    return Err(ValidationError::invalid_schema(
                        ctx.location().clone(),
                        resource.contents().clone(),
                        "schema keys must be strings",
                    ));
                };
                if IDENTIFIERS.contains(&keyword) || RESERVED.contains(&keyword) {
                    continue;
                }
                if let Some(factory) = ctx.config().get_keyword_factory(keyword) {
                    let path = ctx.location().join(keyword);
                    let validator = CustomKeyword::new(factory.init(schema, value, path)?);
                    validators.push((keyword.to_string(), Box::new(validator) as _));
                } else if let Some(compiled) = keywords::compile_keyword(ctx, keyword, schema, value)
                {
                    if let Some(validator) = compiled? {
                        validators.push((keyword.to_string(), validator));
                    }
                } else {
                    match ctx.config().unknown_keywords() {
                        UnknownKeywords::Ignore => {}
                        UnknownKeywords::Fail => {
                            return Err(ValidationError::unknown_keyword(
                                ctx.location().join(keyword),
                                resource.contents().clone(),
                                keyword,
                            ));
                        }
                        UnknownKeywords::Annotate => {
                            annotations.insert(keyword.to_string(), value.clone());
                        }
                    }
                }
            }
            // Execution order: assertions before structural applicators,
            // `additionalProperties` after the keywords it consults, the
            // unevaluated pair strictly last. Declaration order breaks ties.
            validators.sort_by_key(|(keyword, _)| keywords::execution_order(keyword));
            let annotations = if annotations.is_empty() {
                None
            } else {
                Some(annotations)
            };
            Ok(SchemaNode::from_keywords(ctx, validators, annotations))
        }
        _ => Err(ValidationError::invalid_schema(
            ctx.location().clone(),
            resource.contents().clone(),
            "a schema must be an object or a boolean",
        )),
    }
}

/// Compile a nested value that must itself be a schema, at `token` below
/// the current location.
pub(crate) fn compile_subschema(
    ctx: &Context<'_>,
    value: &Value,
    token: impl Into<ReferenceToken>,
) -> Result<SchemaNode, ValidationError<'static>> {
    let sctx = ctx.with_path(token);
    compile(&sctx, sctx.as_resource_ref(value))
}
