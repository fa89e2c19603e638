//! `contentEncoding`, `contentMediaType` and `contentSchema`.
//!
//! All three only annotate under plain draft 2020-12 semantics; switching
//! on content assertion makes them decode and validate for real.
use solidus_value::{Object, ObjectExt, Pointer, Value};

use crate::{
    compiler::{self, Context},
    content::{ContentEncoding, ContentMediaType},
    error::{error, no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    node::SchemaNode,
    output::Annotations,
    paths::LocationNode,
    validator::{PartialApplication, Validate},
};

pub(crate) struct ContentEncodingValidator {
    encoding: String,
    entry: ContentEncoding,
    assert: bool,
    location: Pointer,
}

impl Validate for ContentEncodingValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_str() {
            Some(text) if self.assert => (self.entry.check)(text),
            _ => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if self.is_valid(instance) {
            no_error()
        } else {
            error(ValidationError::content_encoding(
                self.location.clone(),
                location.into(),
                instance,
                &self.encoding,
            ))
        }
    }

    fn apply<'a>(&'a self, instance: &Value, location: &LocationNode) -> PartialApplication<'a> {
        if !self.is_valid(instance) {
            let mut result = PartialApplication::invalid_empty(vec![]);
            result.mark_errored(
                ValidationError::content_encoding(
                    self.location.clone(),
                    location.into(),
                    instance,
                    &self.encoding,
                )
                .into(),
            );
            return result;
        }
        let mut result = PartialApplication::valid_empty();
        result.annotate(Annotations::from(Value::from(self.encoding.as_str())));
        result
    }
}

pub(crate) struct ContentMediaTypeValidator {
    media_type: String,
    entry: ContentMediaType,
    /// Decodes through this first when the sibling declares an encoding.
    encoding: Option<ContentEncoding>,
    assert: bool,
    location: Pointer,
}

impl ContentMediaTypeValidator {
    fn check(&self, text: &str) -> bool {
        match &self.encoding {
            Some(encoding) => match (encoding.decode)(text) {
                Ok(decoded) => match String::from_utf8(decoded) {
                    Ok(decoded) => (self.entry.check)(&decoded),
                    Err(_) => false,
                },
                Err(_) => false,
            },
            None => (self.entry.check)(text),
        }
    }
}

impl Validate for ContentMediaTypeValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_str() {
            Some(text) if self.assert => self.check(text),
            _ => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if self.is_valid(instance) {
            no_error()
        } else {
            error(ValidationError::content_media_type(
                self.location.clone(),
                location.into(),
                instance,
                &self.media_type,
            ))
        }
    }

    fn apply<'a>(&'a self, instance: &Value, location: &LocationNode) -> PartialApplication<'a> {
        if !self.is_valid(instance) {
            let mut result = PartialApplication::invalid_empty(vec![]);
            result.mark_errored(
                ValidationError::content_media_type(
                    self.location.clone(),
                    location.into(),
                    instance,
                    &self.media_type,
                )
                .into(),
            );
            return result;
        }
        let mut result = PartialApplication::valid_empty();
        result.annotate(Annotations::from(Value::from(self.media_type.as_str())));
        result
    }
}

/// `contentSchema`: validates the decoded document when assertion mode is
/// on and the media type is decodable.
pub(crate) struct ContentSchemaValidator {
    node: SchemaNode,
    media_type: Option<ContentMediaType>,
    encoding: Option<ContentEncoding>,
    schema: Value,
    assert: bool,
    location: Pointer,
}

impl ContentSchemaValidator {
    fn decode(&self, text: &str) -> Option<Value> {
        let media_type = self.media_type.as_ref()?;
        let decoded_text = match &self.encoding {
            Some(encoding) => String::from_utf8((encoding.decode)(text).ok()?).ok()?,
            None => text.to_string(),
        };
        (media_type.decode)(&decoded_text)
    }
}

impl Validate for ContentSchemaValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_str() {
            Some(text) if self.assert => self
                .decode(text)
                .is_some_and(|decoded| self.node.is_valid(&decoded)),
            _ => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if self.is_valid(instance) {
            no_error()
        } else {
            error(ValidationError::content_schema(
                self.location.clone(),
                location.into(),
                instance,
            ))
        }
    }

    fn apply<'a>(&'a self, instance: &Value, location: &LocationNode) -> PartialApplication<'a> {
        if !self.is_valid(instance) {
            let mut result = PartialApplication::invalid_empty(vec![]);
            result.mark_errored(
                ValidationError::content_schema(self.location.clone(), location.into(), instance)
                    .into(),
            );
            return result;
        }
        let mut result = PartialApplication::valid_empty();
        result.annotate(Annotations::from(self.schema.clone()));
        result
    }
}

pub(crate) fn compile_content_encoding(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let location = ctx.location().join("contentEncoding");
    let Some(encoding) = schema.as_str() else {
        return Err(ValidationError::invalid_schema(
            location,
            schema.clone(),
            "'contentEncoding' must be a string",
        ));
    };
    let Some(entry) = ctx.config().get_content_encoding(encoding) else {
        // Unknown encodings are annotations at most.
        return Ok(None);
    };
    Ok(Some(Box::new(ContentEncodingValidator {
        encoding: encoding.to_string(),
        entry,
        assert: ctx.config().asserts_content(),
        location,
    })))
}

pub(crate) fn compile_content_media_type(
    ctx: &Context<'_>,
    parent: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let location = ctx.location().join("contentMediaType");
    let Some(media_type) = schema.as_str() else {
        return Err(ValidationError::invalid_schema(
            location,
            schema.clone(),
            "'contentMediaType' must be a string",
        ));
    };
    let Some(entry) = ctx.config().get_content_media_type(media_type) else {
        return Ok(None);
    };
    let encoding = parent
        .get_key("contentEncoding")
        .and_then(Value::as_str)
        .and_then(|name| ctx.config().get_content_encoding(name));
    Ok(Some(Box::new(ContentMediaTypeValidator {
        media_type: media_type.to_string(),
        entry,
        encoding,
        assert: ctx.config().asserts_content(),
        location,
    })))
}

pub(crate) fn compile_content_schema(
    ctx: &Context<'_>,
    parent: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let kctx = ctx.with_path("contentSchema");
    let node = compiler::compile(&kctx, kctx.as_resource_ref(schema))?;
    let media_type = parent
        .get_key("contentMediaType")
        .and_then(Value::as_str)
        .and_then(|name| ctx.config().get_content_media_type(name));
    let encoding = parent
        .get_key("contentEncoding")
        .and_then(Value::as_str)
        .and_then(|name| ctx.config().get_content_encoding(name));
    Ok(Some(Box::new(ContentSchemaValidator {
        node,
        media_type,
        encoding,
        schema: schema.clone(),
        assert: ctx.config().asserts_content(),
        location: ctx.location().join("contentSchema"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use solidus_value::Value;

    use crate::Schema;

    #[test]
    fn annotation_only_by_default() {
        let schema = Schema::new(&Value::from(json!({"contentEncoding": "base64"}))).unwrap();
        assert!(schema.is_valid(&Value::from("not base64!")));
    }

    #[test]
    fn asserts_when_enabled() {
        let schema = Schema::options()
            .should_assert_content(true)
            .build(&Value::from(json!({"contentEncoding": "base64"})))
            .unwrap();
        assert!(schema.is_valid(&Value::from("3q2+7w==")));
        assert!(!schema.is_valid(&Value::from("not base64!")));
    }

    #[test]
    fn media_type_decodes_through_the_encoding() {
        let schema = Schema::options()
            .should_assert_content(true)
            .build(&Value::from(json!({
                "contentEncoding": "base64",
                "contentMediaType": "application/json"
            })))
            .unwrap();
        // base64 of {"a": 1}
        assert!(schema.is_valid(&Value::from("eyJhIjogMX0=")));
        // base64 of not-json
        assert!(!schema.is_valid(&Value::from("bm90IGpzb24=")));
    }

    #[test]
    fn content_schema_validates_the_decoded_document() {
        let schema = Schema::options()
            .should_assert_content(true)
            .build(&Value::from(json!({
                "contentMediaType": "application/json",
                "contentSchema": {"type": "object", "required": ["id"]}
            })))
            .unwrap();
        assert!(schema.is_valid(&Value::from(r#"{"id": 1}"#)));
        assert!(!schema.is_valid(&Value::from(r#"{"name": "x"}"#)));
    }
}
