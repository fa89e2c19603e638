//! Configuration for schema compilation.
use std::{fmt, sync::Arc};

use ahash::AHashMap;
use solidus_referencing::{Resource, SchemaLocator, UnsupportedLocator};
use solidus_value::Value;

use crate::{
    compiler,
    content::{ContentEncoding, ContentMediaType},
    formats::Format,
    keywords::custom::KeywordFactory,
    validator::Schema,
    ValidationError,
};

/// What to do with keywords no active vocabulary recognizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownKeywords {
    /// Drop them silently.
    Ignore,
    /// Fail the build.
    Fail,
    /// Surface them as an annotation (the draft 2020-12 behavior).
    #[default]
    Annotate,
}

/// Options for building a [`Schema`].
#[derive(Clone)]
pub struct ValidationOptions {
    /// Additional resources addressable during reference resolution.
    pub(crate) resources: AHashMap<String, Resource>,
    /// Fetches resources the registry does not hold; defaults to failing.
    pub(crate) locator: Arc<dyn SchemaLocator>,
    formats: AHashMap<String, Arc<dyn Format>>,
    content_encodings: AHashMap<String, ContentEncoding>,
    content_media_types: AHashMap<String, ContentMediaType>,
    keywords: AHashMap<String, Arc<dyn KeywordFactory>>,
    validate_formats: Option<bool>,
    assert_content: bool,
    ignore_unknown_formats: bool,
    unknown_keywords: UnknownKeywords,
    pub(crate) validate_schema: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            resources: AHashMap::default(),
            locator: Arc::new(UnsupportedLocator),
            formats: AHashMap::default(),
            content_encodings: AHashMap::default(),
            content_media_types: AHashMap::default(),
            keywords: AHashMap::default(),
            validate_formats: None,
            assert_content: false,
            ignore_unknown_formats: true,
            unknown_keywords: UnknownKeywords::default(),
            validate_schema: true,
        }
    }
}

impl ValidationOptions {
    /// Build a schema using the current options.
    pub fn build(&self, schema: &Value) -> Result<Schema, ValidationError<'static>> {
        compiler::build_schema(self.clone(), schema)
    }

    /// Make an extra schema resource addressable under `uri`.
    pub fn with_resource(&mut self, uri: impl Into<String>, resource: Resource) -> &mut Self {
        self.resources.insert(uri.into(), resource);
        self
    }

    /// Use a host-provided locator for remote `$ref` targets.
    pub fn with_locator(&mut self, locator: Arc<dyn SchemaLocator>) -> &mut Self {
        self.locator = locator;
        self
    }

    /// Register a format for this build only.
    pub fn with_format<F>(&mut self, name: impl Into<String>, format: F) -> &mut Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.formats.insert(name.into(), Arc::new(format));
        self
    }

    /// Force `format` to assert (or only annotate). Unset, the decision
    /// falls to the active meta-schema's vocabularies.
    pub fn should_validate_formats(&mut self, validate: bool) -> &mut Self {
        self.validate_formats = Some(validate);
        self
    }

    /// Turn `contentEncoding`/`contentMediaType`/`contentSchema` into
    /// assertions. They only annotate by default.
    pub fn should_assert_content(&mut self, assert: bool) -> &mut Self {
        self.assert_content = assert;
        self
    }

    /// Treat formats without a registered check as errors instead of
    /// skipping them.
    pub fn should_ignore_unknown_formats(&mut self, ignore: bool) -> &mut Self {
        self.ignore_unknown_formats = ignore;
        self
    }

    /// Choose the policy for unrecognized keywords.
    pub fn with_unknown_keywords(&mut self, policy: UnknownKeywords) -> &mut Self {
        self.unknown_keywords = policy;
        self
    }

    /// Register a content encoding for this build only.
    pub fn with_content_encoding(
        &mut self,
        name: impl Into<String>,
        entry: ContentEncoding,
    ) -> &mut Self {
        self.content_encodings.insert(name.into(), entry);
        self
    }

    /// Register a content media type for this build only.
    pub fn with_content_media_type(
        &mut self,
        name: impl Into<String>,
        entry: ContentMediaType,
    ) -> &mut Self {
        self.content_media_types.insert(name.into(), entry);
        self
    }

    /// Register a custom keyword.
    pub fn with_keyword<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: KeywordFactory + 'static,
    {
        self.keywords.insert(name.into(), Arc::new(factory));
        self
    }

    /// Skip validating the schema document against its meta-schema.
    pub fn without_schema_validation(&mut self) -> &mut Self {
        self.validate_schema = false;
        self
    }

    pub(crate) fn validate_formats(&self) -> Option<bool> {
        self.validate_formats
    }

    pub(crate) fn asserts_content(&self) -> bool {
        self.assert_content
    }

    pub(crate) fn are_unknown_formats_ignored(&self) -> bool {
        self.ignore_unknown_formats
    }

    pub(crate) fn unknown_keywords(&self) -> UnknownKeywords {
        self.unknown_keywords
    }

    pub(crate) fn get_format(&self, name: &str) -> Option<Arc<dyn Format>> {
        self.formats
            .get(name)
            .cloned()
            .or_else(|| crate::formats::lookup(name))
    }

    pub(crate) fn get_content_encoding(&self, name: &str) -> Option<ContentEncoding> {
        self.content_encodings
            .get(name)
            .copied()
            .or_else(|| crate::content::content_encoding(name))
    }

    pub(crate) fn get_content_media_type(&self, name: &str) -> Option<ContentMediaType> {
        self.content_media_types
            .get(name)
            .copied()
            .or_else(|| crate::content::content_media_type(name))
    }

    pub(crate) fn get_keyword_factory(&self, name: &str) -> Option<&Arc<dyn KeywordFactory>> {
        self.keywords.get(name)
    }
}

impl fmt::Debug for ValidationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationOptions")
            .field("validate_formats", &self.validate_formats)
            .field("assert_content", &self.assert_content)
            .field("unknown_keywords", &self.unknown_keywords)
            .field("validate_schema", &self.validate_schema)
            .finish_non_exhaustive()
    }
}
