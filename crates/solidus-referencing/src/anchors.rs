use std::sync::Arc;

use solidus_value::Value;

use crate::{Draft, Error, Resolved, Resolver, Resource};

/// An anchor within a schema resource.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Anchor {
    /// A plain `$anchor`: resolves lexically.
    Default {
        name: String,
        resource: Arc<Resource>,
    },
    /// A `$dynamicAnchor`: resolution scans the dynamic scope for the
    /// outermost resource declaring the same name.
    Dynamic {
        name: String,
        resource: Arc<Resource>,
    },
}

impl Anchor {
    pub(crate) fn name(&self) -> &str {
        match self {
            Anchor::Default { name, .. } | Anchor::Dynamic { name, .. } => name,
        }
    }

    /// Resolve this anchor to its schema contents.
    pub(crate) fn resolve<'r>(&'r self, resolver: Resolver<'r>) -> Result<Resolved<'r>, Error> {
        match self {
            Anchor::Default { resource, .. } => {
                Ok(Resolved::new(resource.contents(), resolver))
            }
            Anchor::Dynamic { name, resource } => {
                // Walk the dynamic scope from the outermost resource in; the
                // first matching dynamic anchor wins. The lexical target is
                // the fallback.
                let mut last = resource;
                for uri in resolver.scope_uris() {
                    match resolver.registry().anchor(&uri, name) {
                        Ok(Anchor::Dynamic { resource, .. }) => last = resource,
                        Ok(Anchor::Default { .. }) => {}
                        Err(Error::NoSuchAnchor { .. }) => {}
                        Err(error) => return Err(error),
                    }
                }
                let resolver = resolver.in_subresource((**last).as_ref())?;
                Ok(Resolved::new(last.contents(), resolver))
            }
        }
    }
}

/// Anchors declared directly on a schema object.
pub(crate) fn anchors_of(draft: Draft, contents: &Value) -> impl Iterator<Item = Anchor> + '_ {
    contents.as_object().into_iter().flat_map(move |schema| {
        let named = |key: &'static str| {
            schema
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .and_then(|(_, v)| v.as_str())
        };
        let default = named("$anchor").map(|name| Anchor::Default {
            name: name.to_string(),
            resource: Arc::new(draft.create_resource(contents.clone())),
        });
        let dynamic = named("$dynamicAnchor").map(|name| Anchor::Dynamic {
            name: name.to_string(),
            resource: Arc::new(draft.create_resource(contents.clone())),
        });
        default.into_iter().chain(dynamic)
    })
}
