use std::borrow::Cow;

use solidus_value::Value;

use crate::{anchors, Anchor, Draft, Error, Resolved, Resolver};

/// One step of pointer evaluation inside a resource.
#[derive(Debug, Clone)]
pub(crate) enum Segment {
    Key(Cow<'static, str>),
    Index(usize),
}

/// A schema document with a concrete interpretation under a draft.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    contents: Value,
    draft: Draft,
}

impl Resource {
    pub(crate) fn new(contents: Value, draft: Draft) -> Self {
        Self { contents, draft }
    }

    /// Resource contents.
    #[must_use]
    pub fn contents(&self) -> &Value {
        &self.contents
    }

    /// The draft this resource is interpreted under.
    #[must_use]
    pub fn draft(&self) -> Draft {
        self.draft
    }

    /// Create a resource, detecting the applicable draft from `$schema`.
    pub fn from_contents(contents: Value) -> Result<Resource, Error> {
        Ok(Draft::default().detect(&contents)?.create_resource(contents))
    }

    /// Resource identifier.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.as_ref().id()
    }

    pub(crate) fn subresources(&self) -> impl Iterator<Item = Resource> + '_ {
        self.draft
            .subresources_of(&self.contents)
            .map(|contents| Resource::new(contents.clone(), self.draft))
    }

    pub(crate) fn anchors(&self) -> impl Iterator<Item = Anchor> + '_ {
        anchors::anchors_of(self.draft, &self.contents)
    }

    /// Evaluate a `/`-prefixed pointer fragment, evolving the resolver when
    /// traversal crosses into a nested resource.
    pub(crate) fn pointer<'r>(
        &'r self,
        pointer: &str,
        mut resolver: Resolver<'r>,
    ) -> Result<Resolved<'r>, Error> {
        let original = pointer;
        let decoded = percent_encoding::percent_decode_str(&pointer[1..])
            .decode_utf8()
            .map_err(|_| Error::invalid_percent_encoding(original))?;
        let mut contents = &self.contents;
        let mut segments: Vec<Segment> = Vec::new();
        for token in decoded.split('/') {
            let token = unescape_token(token);
            if let Some(array) = contents.as_array() {
                let index = token
                    .parse::<usize>()
                    .map_err(|_| Error::invalid_array_index(original, token.as_ref()))?;
                contents = array
                    .get(index)
                    .ok_or_else(|| Error::pointer_to_nowhere(original))?;
                segments.push(Segment::Index(index));
            } else {
                contents = contents
                    .get(token.as_ref())
                    .ok_or_else(|| Error::pointer_to_nowhere(original))?;
                segments.push(Segment::Key(Cow::Owned(token.into_owned())));
            }
            let previous = resolver.clone();
            resolver = self.draft.maybe_in_subresource(
                &segments,
                &resolver,
                self.draft.create_resource_ref(contents),
            )?;
            if resolver != previous {
                segments.clear();
            }
        }
        Ok(Resolved::new(contents, resolver))
    }

    /// Borrowed view together with the draft.
    #[must_use]
    pub fn as_ref(&self) -> ResourceRef<'_> {
        ResourceRef::new(&self.contents, self.draft)
    }
}

fn unescape_token(token: &str) -> Cow<'_, str> {
    if token.contains('~') {
        Cow::Owned(token.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(token)
    }
}

/// A borrowed schema document with a concrete draft interpretation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResourceRef<'a> {
    contents: &'a Value,
    draft: Draft,
}

impl<'a> ResourceRef<'a> {
    #[must_use]
    pub fn new(contents: &'a Value, draft: Draft) -> Self {
        ResourceRef { contents, draft }
    }

    /// Resource identifier, with any empty fragment removed.
    #[must_use]
    pub fn id(&self) -> Option<&'a str> {
        self.draft
            .id_of(self.contents)
            .map(|id| id.trim_end_matches('#'))
    }

    #[must_use]
    pub fn contents(&self) -> &'a Value {
        self.contents
    }

    #[must_use]
    pub fn draft(&self) -> Draft {
        self.draft
    }
}
