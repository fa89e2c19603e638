use std::{collections::VecDeque, sync::Arc};

use ahash::{AHashMap, AHashSet};
use fluent_uri::Uri;
use once_cell::sync::Lazy;
use solidus_value::Value;

use crate::{
    meta, uri, Anchor, Error, Resolver, Resource, SchemaLocator, UnsupportedLocator,
    VocabularySet,
};

type ResourceMap = AHashMap<Uri<String>, Arc<Resource>>;
type AnchorMap = AHashMap<Uri<String>, AHashMap<String, Anchor>>;

/// The embedded draft 2020-12 meta-schema resources, pre-processed.
pub static SPECIFICATIONS: Lazy<Registry> = Lazy::new(|| {
    let pairs = meta::META_SCHEMAS.iter().map(|(uri, schema)| {
        (
            *uri,
            Resource::from_contents((*schema).clone()).expect("Invalid meta-schema"),
        )
    });
    let mut resources = ResourceMap::with_capacity(16);
    let mut anchors = AnchorMap::new();
    process_resources(pairs, &UnsupportedLocator, &mut resources, &mut anchors)
        .expect("Failed to process meta-schemas");
    Registry { resources, anchors }
});

/// A registry of schema resources addressable by canonical URI.
///
/// Adding a resource eagerly walks its subresources, so nested `$id`s and
/// anchors are immediately retrievable. References that leave the supplied
/// set are fetched through the [`SchemaLocator`] given at construction; the
/// registry performs no I/O of its own.
#[derive(Debug, Clone)]
pub struct Registry {
    resources: ResourceMap,
    anchors: AnchorMap,
}

impl Registry {
    /// Create a registry holding a single resource.
    pub fn try_new(uri: impl Into<String>, resource: Resource) -> Result<Registry, Error> {
        Self::try_from_resources([(uri, resource)].into_iter())
    }

    /// Create a registry from `(URI, resource)` pairs.
    pub fn try_from_resources(
        pairs: impl Iterator<Item = (impl Into<String>, Resource)>,
    ) -> Result<Registry, Error> {
        Self::try_from_resources_with_locator(pairs, &UnsupportedLocator)
    }

    /// Create a registry from pairs, fetching external references through
    /// `locator`.
    pub fn try_from_resources_with_locator(
        pairs: impl Iterator<Item = (impl Into<String>, Resource)>,
        locator: &dyn SchemaLocator,
    ) -> Result<Registry, Error> {
        let mut resources = ResourceMap::new();
        let mut anchors = AnchorMap::new();
        process_resources(pairs, locator, &mut resources, &mut anchors)?;
        Ok(Registry { resources, anchors })
    }

    /// A new registry extended with more resources.
    pub fn try_with_resources(
        self,
        pairs: impl Iterator<Item = (impl Into<String>, Resource)>,
        locator: &dyn SchemaLocator,
    ) -> Result<Registry, Error> {
        let mut resources = self.resources;
        let mut anchors = self.anchors;
        process_resources(pairs, locator, &mut resources, &mut anchors)?;
        Ok(Registry { resources, anchors })
    }

    /// Create a [`Resolver`] rooted at `base_uri`.
    pub fn try_resolver(&self, base_uri: &str) -> Result<Resolver<'_>, Error> {
        Ok(self.resolver(uri::from_str(base_uri)?))
    }

    /// Create a [`Resolver`] from an already-parsed base URI.
    #[must_use]
    pub fn resolver(&self, base_uri: Uri<String>) -> Resolver<'_> {
        Resolver::new(self, base_uri)
    }

    /// Rebuild a resolver from a saved base URI and dynamic scope.
    #[must_use]
    pub fn resolver_from_raw_parts(
        &self,
        base_uri: Uri<String>,
        scope: VecDeque<Uri<String>>,
    ) -> Resolver<'_> {
        Resolver::from_parts(self, base_uri, scope)
    }

    /// The vocabularies activated by the meta-schema at `uri`.
    pub fn vocabularies_for(&self, uri: &str) -> Result<VocabularySet, Error> {
        let parsed = uri::from_str(uri.trim_end_matches('#'))?;
        let resource = self
            .resources
            .get(&parsed)
            .ok_or_else(|| Error::unknown_meta_schema(uri))?;
        match resource.contents().get("$vocabulary") {
            Some(value) => VocabularySet::from_value(value),
            None => Ok(VocabularySet::standard()),
        }
    }

    /// Whether a resource with this URI is registered.
    #[must_use]
    pub fn contains(&self, uri: &Uri<String>) -> bool {
        self.resources.contains_key(uri)
    }

    pub(crate) fn get(&self, uri: &Uri<String>) -> Result<&Resource, Error> {
        self.resources.get(uri).map(Arc::as_ref).ok_or_else(|| {
            Error::unretrievable(
                uri.as_str(),
                Some("the locator supplied no such resource".to_string()),
            )
        })
    }

    pub(crate) fn anchor(&self, uri: &Uri<String>, name: &str) -> Result<&Anchor, Error> {
        if let Some(anchor) = self
            .anchors
            .get(uri)
            .and_then(|anchors| anchors.get(name))
        {
            return Ok(anchor);
        }
        // The resource may be registered under a retrieval URI that differs
        // from its declared id.
        if let Some(resource) = self.resources.get(uri) {
            if let Some(id) = resource.id() {
                let declared = uri::from_str(id)?;
                if let Some(anchor) = self
                    .anchors
                    .get(&declared)
                    .and_then(|anchors| anchors.get(name))
                {
                    return Ok(anchor);
                }
            }
        }
        if name.contains('/') {
            Err(Error::invalid_anchor(name))
        } else {
            Err(Error::no_such_anchor(name))
        }
    }
}

fn process_resources(
    pairs: impl Iterator<Item = (impl Into<String>, Resource)>,
    locator: &dyn SchemaLocator,
    resources: &mut ResourceMap,
    anchors: &mut AnchorMap,
) -> Result<(), Error> {
    let mut queue = VecDeque::with_capacity(32);
    let mut external = AHashSet::new();

    for (uri, resource) in pairs {
        let uri = uri::from_str(uri.into().trim_end_matches('#'))?;
        let resource = Arc::new(resource);
        insert_resource(resources, uri.clone(), Arc::clone(&resource))?;
        queue.push_back((uri, resource));
    }

    loop {
        if queue.is_empty() && external.is_empty() {
            break;
        }

        while let Some((mut base, resource)) = queue.pop_front() {
            if let Some(id) = resource.id() {
                base = uri::resolve_against(&base.borrow(), id)?;
            }

            for anchor in resource.anchors() {
                anchors
                    .entry(base.clone())
                    .or_default()
                    .insert(anchor.name().to_string(), anchor);
            }

            collect_external_reference(&base, resource.contents(), &mut external)?;

            for subresource in resource.subresources() {
                let subresource = Arc::new(subresource);
                if let Some(sub_id) = subresource.id() {
                    let sub_base = uri::resolve_against(&base.borrow(), sub_id)?;
                    collect_external_reference(&sub_base, subresource.contents(), &mut external)?;
                } else {
                    collect_external_reference(&base, subresource.contents(), &mut external)?;
                }
                queue.push_back((base.clone(), subresource));
            }
            if resource.id().is_some() {
                insert_resource(resources, base, resource)?;
            }
        }

        for uri in external.drain() {
            if !resources.contains_key(&uri) {
                let retrieved = locator
                    .locate(&uri.borrow())
                    .map_err(|error| Error::unretrievable(uri.as_str(), Some(error.to_string())))?;
                let resource = Arc::new(Resource::from_contents(retrieved)?);
                insert_resource(resources, uri.clone(), Arc::clone(&resource))?;
                queue.push_back((uri, resource));
            }
        }
    }

    Ok(())
}

fn insert_resource(
    resources: &mut ResourceMap,
    uri: Uri<String>,
    resource: Arc<Resource>,
) -> Result<(), Error> {
    if let Some(existing) = resources.get(&uri) {
        if existing.contents() != resource.contents() {
            return Err(Error::duplicate_id(uri.as_str()));
        }
        return Ok(());
    }
    resources.insert(uri, resource);
    Ok(())
}

/// Record the absolute part of an external `$ref` for retrieval.
fn collect_external_reference(
    base: &Uri<String>,
    contents: &Value,
    collected: &mut AHashSet<Uri<String>>,
) -> Result<(), Error> {
    if base.scheme().as_str() == "urn" {
        return Ok(());
    }
    if let Some(reference) = contents.get("$ref").and_then(Value::as_str) {
        if reference.starts_with('#') {
            return Ok(());
        }
        let resolved = uri::resolve_against(&base.borrow(), reference)?;
        let without_fragment = match resolved.as_str().rsplit_once('#') {
            Some((absolute, _)) => uri::from_str(absolute)?,
            None => resolved,
        };
        if without_fragment.scheme().as_str() != uri::DEFAULT_SCHEME {
            collected.insert(without_fragment);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use ahash::AHashMap;
    use fluent_uri::Uri;
    use serde_json::json;
    use solidus_value::Value;

    use crate::{Draft, Error, Registry, SchemaLocator};

    #[test]
    fn resolves_nested_ids_and_anchors() {
        let resource = Draft::Draft202012.create_resource(Value::from(json!({
            "$id": "https://example.com/root",
            "$defs": {
                "named": {"$anchor": "item", "type": "integer"},
                "nested": {"$id": "nested", "type": "string"}
            }
        })));
        let registry = Registry::try_new("https://example.com/root", resource).unwrap();
        let resolver = registry.try_resolver("https://example.com/root").unwrap();

        let anchored = resolver.lookup("#item").unwrap();
        assert_eq!(
            anchored.contents().get("type").and_then(Value::as_str),
            Some("integer")
        );
        let nested = resolver.lookup("nested").unwrap();
        assert_eq!(
            nested.contents().get("type").and_then(Value::as_str),
            Some("string")
        );
        let pointered = resolver.lookup("#/$defs/named/type").unwrap();
        assert_eq!(pointered.contents(), &Value::from("integer"));
    }

    #[test]
    fn missing_anchor_is_reported() {
        let resource = Draft::Draft202012.create_resource(Value::from(json!({
            "$defs": {"foo": {"$anchor": "known"}}
        })));
        let registry = Registry::try_new("https://example.com/s", resource).unwrap();
        let resolver = registry.try_resolver("https://example.com/s").unwrap();
        assert_eq!(
            resolver.lookup("#unknown").unwrap_err().to_string(),
            "Anchor 'unknown' does not exist"
        );
    }

    #[test]
    fn conflicting_ids_are_rejected() {
        let first = Draft::Draft202012.create_resource(Value::from(json!({"type": "string"})));
        let second = Draft::Draft202012.create_resource(Value::from(json!({"type": "number"})));
        let result = Registry::try_from_resources(
            [
                ("https://example.com/same", first),
                ("https://example.com/same", second),
            ]
            .into_iter(),
        );
        assert!(matches!(result, Err(Error::DuplicateId { .. })));
    }

    struct MapLocator {
        schemas: AHashMap<String, Value>,
    }

    impl SchemaLocator for MapLocator {
        fn locate(
            &self,
            uri: &Uri<&str>,
        ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
            self.schemas
                .get(uri.as_str())
                .cloned()
                .ok_or_else(|| format!("no schema for {uri}").into())
        }
    }

    #[test]
    fn external_references_go_through_the_locator() {
        let mut schemas = AHashMap::new();
        schemas.insert(
            "https://example.com/remote".to_string(),
            Value::from(json!({"type": "boolean"})),
        );
        let locator = MapLocator { schemas };
        let root = Draft::Draft202012.create_resource(Value::from(json!({
            "$id": "https://example.com/root",
            "$ref": "remote"
        })));
        let registry = Registry::try_from_resources_with_locator(
            [("https://example.com/root", root)].into_iter(),
            &locator,
        )
        .unwrap();
        let resolver = registry.try_resolver("https://example.com/root").unwrap();
        let resolved = resolver.lookup("remote").unwrap();
        assert_eq!(
            resolved.contents().get("type").and_then(Value::as_str),
            Some("boolean")
        );
    }

    #[test]
    fn locator_failures_surface() {
        let root = Draft::Draft202012.create_resource(Value::from(json!({
            "$ref": "https://example.com/absent"
        })));
        let result = Registry::try_new("https://example.com/root", root);
        assert!(matches!(result, Err(Error::Unretrievable { .. })));
    }

    #[test]
    fn dynamic_anchor_prefers_outermost_scope() {
        let root = Draft::Draft202012.create_resource(Value::from(json!({
            "$id": "https://example.com/outer",
            "$dynamicAnchor": "items",
            "type": "string",
            "$defs": {
                "inner": {
                    "$id": "inner",
                    "$dynamicAnchor": "items",
                    "type": "number"
                }
            }
        })));
        let registry = Registry::try_new("https://example.com/outer", root).unwrap();
        let resolver = registry.try_resolver("https://example.com/outer").unwrap();
        // Walk into the inner resource first so the outer one is on the
        // dynamic scope.
        let outer = resolver.lookup("").unwrap();
        let inner = outer.resolver().lookup("inner").unwrap();
        let resolved = inner.resolver().lookup("#items").unwrap();
        assert_eq!(
            resolved.contents().get("type").and_then(Value::as_str),
            Some("string")
        );
    }
}
