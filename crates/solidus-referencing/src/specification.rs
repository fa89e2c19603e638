//! Draft selection and keyword-placement rules.
//!
//! Draft 2020-12 is the baseline; the enum is non-exhaustive so future
//! drafts can slot in without breaking callers.
use solidus_value::Value;

use crate::{meta, resource::Segment, Error, Resolver, Resource, ResourceRef};

/// A JSON Schema specification version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Draft {
    #[default]
    Draft202012,
}

impl Draft {
    /// Detect the draft a schema document asks for via `$schema`.
    ///
    /// Absent `$schema` means the default draft; an unknown value is an
    /// error rather than a silent fallback.
    pub fn detect(self, contents: &Value) -> Result<Draft, Error> {
        match contents.get("$schema").and_then(Value::as_str) {
            None => Ok(self),
            Some(uri) => {
                let trimmed = uri.trim_end_matches('#');
                if meta::is_known_meta_schema(trimmed) {
                    Ok(Draft::Draft202012)
                } else {
                    Err(Error::unknown_meta_schema(uri))
                }
            }
        }
    }

    /// Interpret `contents` under this draft.
    #[must_use]
    pub fn create_resource(self, contents: Value) -> Resource {
        Resource::new(contents, self)
    }

    /// Interpret borrowed `contents` under this draft.
    #[must_use]
    pub fn create_resource_ref(self, contents: &Value) -> ResourceRef<'_> {
        ResourceRef::new(contents, self)
    }

    /// The resource identifier, if declared.
    #[must_use]
    pub fn id_of(self, contents: &Value) -> Option<&str> {
        contents.get("$id").and_then(Value::as_str)
    }

    /// Immediate subschema values of a schema object, in declaration order.
    pub fn subresources_of(self, contents: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
        let Some(schema) = contents.as_object() else {
            return Box::new(std::iter::empty());
        };
        Box::new(schema.iter().flat_map(|(key, value)| {
            let iter: Box<dyn Iterator<Item = &Value>> = match key.as_str() {
                Some(key) if IN_VALUE.contains(&key) => Box::new(std::iter::once(value)),
                Some(key) if IN_CHILD_OBJECT.contains(&key) => match value.as_object() {
                    Some(children) => Box::new(children.values()),
                    None => Box::new(std::iter::empty()),
                },
                Some(key) if IN_CHILD_ARRAY.contains(&key) => match value.as_array() {
                    Some(children) => Box::new(children.iter()),
                    None => Box::new(std::iter::empty()),
                },
                _ => Box::new(std::iter::empty()),
            };
            iter
        }))
    }

    /// Evolve `resolver` if pointer evaluation walked into a nested schema
    /// resource; stay put when the traversed path is not a schema position.
    pub(crate) fn maybe_in_subresource<'r>(
        self,
        segments: &[Segment],
        resolver: &Resolver<'r>,
        subresource: ResourceRef<'_>,
    ) -> Result<Resolver<'r>, Error> {
        let mut index = 0;
        while index < segments.len() {
            match &segments[index] {
                Segment::Key(key) => {
                    if IN_VALUE.contains(&key.as_ref()) {
                        index += 1;
                    } else if IN_CHILD_OBJECT.contains(&key.as_ref())
                        || IN_CHILD_ARRAY.contains(&key.as_ref())
                    {
                        if index + 1 >= segments.len() {
                            return Ok(resolver.clone());
                        }
                        index += 2;
                    } else {
                        return Ok(resolver.clone());
                    }
                }
                Segment::Index(_) => return Ok(resolver.clone()),
            }
        }
        resolver.in_subresource(subresource)
    }
}

/// Keywords whose value is a single schema.
const IN_VALUE: &[&str] = &[
    "additionalProperties",
    "contains",
    "contentSchema",
    "else",
    "if",
    "items",
    "not",
    "propertyNames",
    "then",
    "unevaluatedItems",
    "unevaluatedProperties",
];

/// Keywords whose value is an object of schemas.
const IN_CHILD_OBJECT: &[&str] = &[
    "$defs",
    "definitions",
    "dependentSchemas",
    "patternProperties",
    "properties",
];

/// Keywords whose value is an array of schemas.
const IN_CHILD_ARRAY: &[&str] = &["allOf", "anyOf", "oneOf", "prefixItems"];

/// One of the draft 2020-12 vocabularies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vocabulary {
    Core,
    Applicator,
    Unevaluated,
    Validation,
    MetaData,
    FormatAnnotation,
    FormatAssertion,
    Content,
}

impl Vocabulary {
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Vocabulary> {
        Some(match uri {
            "https://json-schema.org/draft/2020-12/vocab/core" => Vocabulary::Core,
            "https://json-schema.org/draft/2020-12/vocab/applicator" => Vocabulary::Applicator,
            "https://json-schema.org/draft/2020-12/vocab/unevaluated" => Vocabulary::Unevaluated,
            "https://json-schema.org/draft/2020-12/vocab/validation" => Vocabulary::Validation,
            "https://json-schema.org/draft/2020-12/vocab/meta-data" => Vocabulary::MetaData,
            "https://json-schema.org/draft/2020-12/vocab/format-annotation" => {
                Vocabulary::FormatAnnotation
            }
            "https://json-schema.org/draft/2020-12/vocab/format-assertion" => {
                Vocabulary::FormatAssertion
            }
            "https://json-schema.org/draft/2020-12/vocab/content" => Vocabulary::Content,
            _ => return None,
        })
    }

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// The set of vocabularies a meta-schema activates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VocabularySet {
    bits: u16,
}

impl VocabularySet {
    /// The standard 2020-12 set: everything except format-assertion.
    #[must_use]
    pub fn standard() -> VocabularySet {
        let mut set = VocabularySet { bits: 0 };
        for vocabulary in [
            Vocabulary::Core,
            Vocabulary::Applicator,
            Vocabulary::Unevaluated,
            Vocabulary::Validation,
            Vocabulary::MetaData,
            Vocabulary::FormatAnnotation,
            Vocabulary::Content,
        ] {
            set.insert(vocabulary);
        }
        set
    }

    #[must_use]
    pub fn empty() -> VocabularySet {
        VocabularySet { bits: 0 }
    }

    pub fn insert(&mut self, vocabulary: Vocabulary) {
        self.bits |= vocabulary.bit();
    }

    #[must_use]
    pub fn contains(&self, vocabulary: Vocabulary) -> bool {
        self.bits & vocabulary.bit() != 0
    }

    /// Build from a `$vocabulary` object. Unknown vocabularies marked
    /// required are an error; optional unknowns are skipped.
    pub fn from_value(value: &Value) -> Result<VocabularySet, Error> {
        let Some(entries) = value.as_object() else {
            return Ok(VocabularySet::standard());
        };
        let mut set = VocabularySet::empty();
        for (uri, required) in entries {
            let Some(uri) = uri.as_str() else { continue };
            match Vocabulary::from_uri(uri) {
                Some(vocabulary) => set.insert(vocabulary),
                None => {
                    if required.as_bool() == Some(true) {
                        return Err(Error::unknown_meta_schema(uri));
                    }
                }
            }
        }
        // Core is non-negotiable.
        set.insert(Vocabulary::Core);
        Ok(set)
    }
}

impl Default for VocabularySet {
    fn default() -> Self {
        VocabularySet::standard()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use solidus_value::Value;

    use super::{Draft, Vocabulary, VocabularySet};

    #[test]
    fn detects_known_meta_schema() {
        let schema = Value::from(json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema"
        }));
        assert_eq!(
            Draft::default().detect(&schema).unwrap(),
            Draft::Draft202012
        );
    }

    #[test]
    fn rejects_unknown_meta_schema() {
        let schema = Value::from(json!({"$schema": "https://example.com/custom"}));
        assert!(Draft::default().detect(&schema).is_err());
    }

    #[test]
    fn iterates_subresources_in_declaration_order() {
        let schema = Value::from(json!({
            "properties": {"a": {"type": "string"}, "b": true},
            "items": {"minimum": 0},
            "allOf": [{"required": []}],
            "title": "not a schema"
        }));
        let draft = Draft::default();
        assert_eq!(draft.subresources_of(&schema).count(), 4);
    }

    #[test]
    fn vocabulary_set_from_value() {
        let value = Value::from(json!({
            "https://json-schema.org/draft/2020-12/vocab/core": true,
            "https://json-schema.org/draft/2020-12/vocab/format-assertion": true,
            "https://example.com/vocab/custom": false
        }));
        let set = VocabularySet::from_value(&value).unwrap();
        assert!(set.contains(Vocabulary::Core));
        assert!(set.contains(Vocabulary::FormatAssertion));
        assert!(!set.contains(Vocabulary::Validation));

        let required_unknown = Value::from(json!({
            "https://example.com/vocab/custom": true
        }));
        assert!(VocabularySet::from_value(&required_unknown).is_err());
    }
}
