//! The `format` keyword: an annotation by default, an assertion when the
//! build (or the format-assertion vocabulary) says so.
use std::sync::Arc;

use solidus_value::{Object, Pointer, Value};

use crate::{
    compiler::Context,
    error::{error, no_error, ErrorIterator, ValidationError},
    formats::Format,
    keywords::BoxedCompilationResult,
    output::Annotations,
    paths::LocationNode,
    validator::{PartialApplication, Validate},
};

pub(crate) struct FormatValidator {
    name: String,
    format: Arc<dyn Format>,
    assert: bool,
    location: Pointer,
}

impl Validate for FormatValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        !self.assert || self.format.is_valid(instance)
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if self.is_valid(instance) {
            no_error()
        } else {
            error(ValidationError::format(
                self.location.clone(),
                location.into(),
                instance,
                self.name.clone(),
            ))
        }
    }

    fn apply<'a>(&'a self, instance: &Value, location: &LocationNode) -> PartialApplication<'a> {
        if self.assert && !self.format.is_valid(instance) {
            let mut result = PartialApplication::invalid_empty(vec![]);
            result.mark_errored(
                ValidationError::format(
                    self.location.clone(),
                    location.into(),
                    instance,
                    self.name.clone(),
                )
                .into(),
            );
            return result;
        }
        let mut result = PartialApplication::valid_empty();
        // The annotation is the format name, or the normalized value when
        // the format defines a conversion.
        let annotation = self
            .format
            .convert(instance)
            .unwrap_or_else(|| Value::from(self.name.as_str()));
        result.annotate(Annotations::from(annotation));
        result
    }
}

/// A format without a registered check only annotates its name.
pub(crate) struct UnknownFormat {
    name: String,
}

impl Validate for UnknownFormat {
    fn is_valid(&self, _: &Value) -> bool {
        true
    }

    fn validate<'i>(&self, _: &'i Value, _: &LocationNode) -> ErrorIterator<'i> {
        no_error()
    }

    fn apply<'a>(&'a self, _: &Value, _: &LocationNode) -> PartialApplication<'a> {
        let mut result = PartialApplication::valid_empty();
        result.annotate(Annotations::from(Value::from(self.name.as_str())));
        result
    }
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let location = ctx.location().join("format");
    let Some(name) = schema.as_str() else {
        return Err(ValidationError::invalid_schema(
            location,
            schema.clone(),
            "'format' must be a string",
        ));
    };
    let assert = ctx.validates_formats_by_default();
    match ctx.config().get_format(name) {
        Some(format) => Ok(Some(Box::new(FormatValidator {
            name: name.to_string(),
            format,
            assert,
            location: ctx.location().join("format"),
        }))),
        None if assert && !ctx.config().are_unknown_formats_ignored() => {
            Err(ValidationError::invalid_schema(
                ctx.location().join("format"),
                schema.clone(),
                format!("unknown format '{name}'"),
            ))
        }
        None => Ok(Some(Box::new(UnknownFormat {
            name: name.to_string(),
        }))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use solidus_value::Value;

    use crate::Schema;

    #[test]
    fn formats_annotate_by_default() {
        let schema = Schema::new(&Value::from(json!({"format": "ipv4"}))).unwrap();
        assert!(schema.is_valid(&Value::from("not an ip")));
    }

    #[test]
    fn formats_assert_when_enabled() {
        let schema = Schema::options()
            .should_validate_formats(true)
            .build(&Value::from(json!({"format": "ipv4"})))
            .unwrap();
        assert!(schema.is_valid(&Value::from("127.0.0.1")));
        assert!(!schema.is_valid(&Value::from("not an ip")));
        let instance = Value::from("2001:0db8:85a3:0000:0000:8a2e:0370:7334");
        let errors: Vec<_> = schema.iter_errors(&instance).collect();
        assert_eq!(
            errors[0].to_string(),
            r#""2001:0db8:85a3:0000:0000:8a2e:0370:7334" is not a "ipv4""#
        );
    }

    #[test]
    fn custom_formats_take_precedence() {
        let schema = Schema::options()
            .should_validate_formats(true)
            .with_format("currency", |value: &str| {
                value.parse::<f64>().is_ok() && value.contains('.')
            })
            .build(&Value::from(json!({"format": "currency"})))
            .unwrap();
        assert!(schema.is_valid(&Value::from("3.00")));
        assert!(!schema.is_valid(&Value::from("not a currency")));
    }

    #[test]
    fn non_strings_are_exempt() {
        let schema = Schema::options()
            .should_validate_formats(true)
            .build(&Value::from(json!({"format": "ipv4"})))
            .unwrap();
        assert!(schema.is_valid(&Value::from(42)));
    }
}
