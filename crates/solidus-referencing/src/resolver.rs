use core::fmt;
use std::collections::VecDeque;

use fluent_uri::Uri;
use solidus_value::Value;

use crate::{uri, Error, Registry, ResourceRef};

/// A reference resolver: a base URI plus the dynamic scope accumulated on
/// the way to it, backed by a [`Registry`].
#[derive(Clone)]
pub struct Resolver<'r> {
    registry: &'r Registry,
    base_uri: Uri<String>,
    scope: VecDeque<Uri<String>>,
}

impl PartialEq for Resolver<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.base_uri == other.base_uri
    }
}
impl Eq for Resolver<'_> {}

impl fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("base_uri", &self.base_uri.as_str())
            .field(
                "scope",
                &self.scope.iter().map(|uri| uri.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<'r> Resolver<'r> {
    pub(crate) fn new(registry: &'r Registry, base_uri: Uri<String>) -> Self {
        Self {
            registry,
            base_uri,
            scope: VecDeque::new(),
        }
    }

    pub(crate) fn from_parts(
        registry: &'r Registry,
        base_uri: Uri<String>,
        scope: VecDeque<Uri<String>>,
    ) -> Self {
        Self {
            registry,
            base_uri,
            scope,
        }
    }

    #[must_use]
    pub fn base_uri(&self) -> Uri<&str> {
        self.base_uri.borrow()
    }

    pub(crate) fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Resolve a reference to the schema contents it addresses.
    pub fn lookup(&self, reference: &str) -> Result<Resolved<'r>, Error> {
        let (uri, fragment) = if let Some(fragment) = reference.strip_prefix('#') {
            (self.base_uri.clone(), fragment)
        } else {
            let (base, fragment) = match reference.rsplit_once('#') {
                Some((base, fragment)) => (base, fragment),
                None => (reference, ""),
            };
            (uri::resolve_against(&self.base_uri.borrow(), base)?, fragment)
        };

        let resource = self.registry.get(&uri)?;

        if fragment.starts_with('/') {
            let resolver = self.evolve(uri);
            return resource.pointer(fragment, resolver);
        }
        if !fragment.is_empty() {
            let anchor = self.registry.anchor(&uri, fragment)?;
            let resolver = self.evolve(uri);
            return anchor.resolve(resolver);
        }
        let resolver = self.evolve(uri);
        Ok(Resolved::new(resource.contents(), resolver))
    }

    /// Evolve into a subresource, re-basing on its `$id` when present.
    pub fn in_subresource(&self, subresource: ResourceRef<'_>) -> Result<Self, Error> {
        if let Some(id) = subresource.id() {
            let base_uri = uri::resolve_against(&self.base_uri.borrow(), id)?;
            Ok(self.evolve(base_uri))
        } else {
            Ok(self.clone())
        }
    }

    /// The dynamic scope: resource URIs from the most recently entered to
    /// the outermost.
    pub(crate) fn dynamic_scope(&self) -> impl Iterator<Item = &Uri<String>> {
        self.scope.iter()
    }

    /// Owned snapshot of the dynamic scope, newest first.
    #[must_use]
    pub fn scope_uris(&self) -> Vec<Uri<String>> {
        self.scope.iter().cloned().collect()
    }

    #[must_use]
    pub fn scope_snapshot(&self) -> VecDeque<Uri<String>> {
        self.scope.clone()
    }

    fn evolve(&self, base_uri: Uri<String>) -> Resolver<'r> {
        if !self.base_uri.as_str().is_empty()
            && (self.scope.is_empty() || base_uri != self.base_uri)
        {
            let mut scope = self.scope.clone();
            scope.push_front(self.base_uri.clone());
            Resolver {
                registry: self.registry,
                base_uri,
                scope,
            }
        } else {
            Resolver {
                registry: self.registry,
                base_uri,
                scope: self.scope.clone(),
            }
        }
    }
}

/// A reference resolved to its contents.
#[derive(Debug)]
pub struct Resolved<'r> {
    contents: &'r Value,
    resolver: Resolver<'r>,
}

impl<'r> Resolved<'r> {
    pub(crate) fn new(contents: &'r Value, resolver: Resolver<'r>) -> Self {
        Self { contents, resolver }
    }

    /// Resolved schema contents.
    #[must_use]
    pub fn contents(&self) -> &'r Value {
        self.contents
    }

    /// The resolver positioned at the resolved resource, usable for further
    /// lookups.
    #[must_use]
    pub fn resolver(&self) -> &Resolver<'r> {
        &self.resolver
    }

    #[must_use]
    pub fn into_inner(self) -> (&'r Value, Resolver<'r>) {
        (self.contents, self.resolver)
    }
}
