//! Error types.
use std::{
    borrow::Cow,
    error,
    fmt::{self, Formatter, Write},
    iter::{empty, once},
};

use solidus_value::{Pointer, Value};

use crate::primitive_type::{PrimitiveType, PrimitiveTypesBitMap};

/// An error that occurred while building a schema or validating an instance.
#[derive(Debug)]
pub struct ValidationError<'a> {
    /// Value that failed validation.
    pub instance: Cow<'a, Value>,
    /// Type of validation error.
    pub kind: ValidationErrorKind,
    /// Path to the value that failed validation.
    pub instance_path: Pointer,
    /// Path to the schema keyword that failed.
    pub schema_path: Pointer,
}

/// An iterator over validation errors.
pub type ErrorIterator<'a> = Box<dyn Iterator<Item = ValidationError<'a>> + Sync + Send + 'a>;

// Empty iterator means no error happened
pub(crate) fn no_error<'a>() -> ErrorIterator<'a> {
    Box::new(empty())
}
// A wrapper for one error
pub(crate) fn error(instance: ValidationError) -> ErrorIterator {
    Box::new(once(instance))
}

/// Kinds of errors that may happen during building or validation.
#[derive(Debug)]
#[allow(missing_docs)]
pub enum ValidationErrorKind {
    /// The input value is not valid under any of the schemas listed in `anyOf`.
    AnyOf,
    /// The input value doesn't match the expected constant.
    Constant { expected_value: Value },
    /// The input array doesn't contain enough items conforming to the
    /// `contains` schema.
    Contains,
    /// The input value does not respect the defined `contentEncoding`.
    ContentEncoding { content_encoding: String },
    /// The input value does not respect the defined `contentMediaType`.
    ContentMediaType { content_media_type: String },
    /// The decoded content is not valid under `contentSchema`.
    ContentSchema,
    /// A `$ref` chain re-entered the same schema for the same instance
    /// location.
    CycleDetected { reference: String },
    /// Custom error message for user-defined validation.
    Custom { message: String },
    /// The input value doesn't match any of the specified options.
    Enum { options: Value },
    /// Value is too large.
    ExclusiveMaximum { limit: Value },
    /// Value is too small.
    ExclusiveMinimum { limit: Value },
    /// Everything is invalid for the `false` schema.
    FalseSchema,
    /// The input doesn't match the specified format.
    Format { format: String },
    /// An invalid regular expression in `pattern` or `patternProperties`.
    InvalidRegex { pattern: String },
    /// The schema document itself is malformed at the given location.
    InvalidSchema { detail: String },
    /// A `$ref` value is not valid.
    InvalidReference { reference: String },
    /// Too many items in an array.
    MaxItems { limit: u64 },
    /// Value is too large.
    Maximum { limit: Value },
    /// String is too long.
    MaxLength { limit: u64 },
    /// Too many properties in an object.
    MaxProperties { limit: u64 },
    /// Too few items in an array.
    MinItems { limit: u64 },
    /// Value is too small.
    Minimum { limit: Value },
    /// String is too short.
    MinLength { limit: u64 },
    /// Not enough properties in an object.
    MinProperties { limit: u64 },
    /// The number is not a multiple of the divisor.
    MultipleOf { multiple_of: Value },
    /// The negated schema failed validation.
    Not { schema: Value },
    /// The input is valid under more than one of the schemas listed in `oneOf`.
    OneOfMultipleValid,
    /// The input is not valid under any of the schemas listed in `oneOf`.
    OneOfNotValid,
    /// The input doesn't match the pattern.
    Pattern { pattern: String },
    /// An object property name is invalid.
    PropertyNames {
        error: Box<ValidationError<'static>>,
    },
    /// A required property is missing.
    Required { property: Value },
    /// The input value doesn't match one or several required types.
    Type { kind: TypeKind },
    /// Unevaluated items were found.
    UnevaluatedItems { unexpected: Vec<usize> },
    /// Unevaluated properties were found.
    UnevaluatedProperties { unexpected: Vec<String> },
    /// The input array has non-unique elements.
    UniqueItems,
    /// A keyword is not recognized and the build was configured to fail on
    /// unknown keywords.
    UnknownKeyword { keyword: String },
    /// Properties not covered by `properties`/`patternProperties` were found
    /// and `additionalProperties` forbids them.
    AdditionalProperties { unexpected: Vec<String> },
    /// Error during schema reference resolution.
    Referencing(solidus_referencing::Error),
}

#[derive(Debug)]
#[allow(missing_docs)]
pub enum TypeKind {
    Single(PrimitiveType),
    Multiple(PrimitiveTypesBitMap),
}

/// Shortcuts for creation of specific error kinds.
impl<'a> ValidationError<'a> {
    pub(crate) fn into_owned(self) -> ValidationError<'static> {
        ValidationError {
            instance_path: self.instance_path.clone(),
            instance: Cow::Owned(self.instance.into_owned()),
            kind: self.kind,
            schema_path: self.schema_path,
        }
    }

    pub(crate) const fn any_of(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::AnyOf,
            schema_path,
        }
    }
    pub(crate) const fn constant(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        expected_value: Value,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::Constant { expected_value },
            schema_path,
        }
    }
    pub(crate) const fn contains(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::Contains,
            schema_path,
        }
    }
    pub(crate) fn content_encoding(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        encoding: &str,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::ContentEncoding {
                content_encoding: encoding.to_string(),
            },
            schema_path,
        }
    }
    pub(crate) fn content_media_type(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        media_type: &str,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::ContentMediaType {
                content_media_type: media_type.to_string(),
            },
            schema_path,
        }
    }
    pub(crate) const fn content_schema(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::ContentSchema,
            schema_path,
        }
    }
    pub(crate) fn cycle_detected(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        reference: &str,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::CycleDetected {
                reference: reference.to_string(),
            },
            schema_path,
        }
    }
    pub(crate) fn custom(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        message: impl Into<String>,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::Custom {
                message: message.into(),
            },
            schema_path,
        }
    }
    pub(crate) const fn enumeration(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        options: Value,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::Enum { options },
            schema_path,
        }
    }
    pub(crate) const fn exclusive_maximum(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        limit: Value,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::ExclusiveMaximum { limit },
            schema_path,
        }
    }
    pub(crate) const fn exclusive_minimum(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        limit: Value,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::ExclusiveMinimum { limit },
            schema_path,
        }
    }
    pub(crate) const fn false_schema(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::FalseSchema,
            schema_path,
        }
    }
    pub(crate) fn format(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        format: impl Into<String>,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::Format {
                format: format.into(),
            },
            schema_path,
        }
    }
    pub(crate) fn invalid_regex(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        pattern: impl Into<String>,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::InvalidRegex {
                pattern: pattern.into(),
            },
            schema_path,
        }
    }
    pub(crate) fn invalid_schema(
        schema_path: Pointer,
        instance: Value,
        detail: impl Into<String>,
    ) -> ValidationError<'static> {
        ValidationError {
            instance_path: Pointer::root(),
            instance: Cow::Owned(instance),
            kind: ValidationErrorKind::InvalidSchema {
                detail: detail.into(),
            },
            schema_path,
        }
    }
    pub(crate) fn invalid_reference(
        schema_path: Pointer,
        instance: &'a Value,
        reference: impl Into<String>,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path: Pointer::root(),
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::InvalidReference {
                reference: reference.into(),
            },
            schema_path,
        }
    }
    pub(crate) const fn max_items(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        limit: u64,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::MaxItems { limit },
            schema_path,
        }
    }
    pub(crate) const fn maximum(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        limit: Value,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::Maximum { limit },
            schema_path,
        }
    }
    pub(crate) const fn max_length(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        limit: u64,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::MaxLength { limit },
            schema_path,
        }
    }
    pub(crate) const fn max_properties(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        limit: u64,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::MaxProperties { limit },
            schema_path,
        }
    }
    pub(crate) const fn min_items(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        limit: u64,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::MinItems { limit },
            schema_path,
        }
    }
    pub(crate) const fn minimum(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        limit: Value,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::Minimum { limit },
            schema_path,
        }
    }
    pub(crate) const fn min_length(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        limit: u64,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::MinLength { limit },
            schema_path,
        }
    }
    pub(crate) const fn min_properties(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        limit: u64,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::MinProperties { limit },
            schema_path,
        }
    }
    pub(crate) const fn multiple_of(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        multiple_of: Value,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::MultipleOf { multiple_of },
            schema_path,
        }
    }
    pub(crate) const fn not(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        schema: Value,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::Not { schema },
            schema_path,
        }
    }
    pub(crate) const fn one_of_multiple_valid(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::OneOfMultipleValid,
            schema_path,
        }
    }
    pub(crate) const fn one_of_not_valid(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::OneOfNotValid,
            schema_path,
        }
    }
    pub(crate) fn pattern(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        pattern: impl Into<String>,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::Pattern {
                pattern: pattern.into(),
            },
            schema_path,
        }
    }
    pub(crate) fn property_names(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        error: ValidationError<'_>,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::PropertyNames {
                error: Box::new(error.into_owned()),
            },
            schema_path,
        }
    }
    pub(crate) const fn required(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        property: Value,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::Required { property },
            schema_path,
        }
    }
    pub(crate) const fn single_type_error(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        type_name: PrimitiveType,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::Type {
                kind: TypeKind::Single(type_name),
            },
            schema_path,
        }
    }
    pub(crate) const fn multiple_type_error(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        types: PrimitiveTypesBitMap,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::Type {
                kind: TypeKind::Multiple(types),
            },
            schema_path,
        }
    }
    pub(crate) const fn unevaluated_items(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        unexpected: Vec<usize>,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::UnevaluatedItems { unexpected },
            schema_path,
        }
    }
    pub(crate) const fn unevaluated_properties(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        unexpected: Vec<String>,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::UnevaluatedProperties { unexpected },
            schema_path,
        }
    }
    pub(crate) const fn unique_items(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::UniqueItems,
            schema_path,
        }
    }
    pub(crate) fn unknown_keyword(
        schema_path: Pointer,
        instance: Value,
        keyword: impl Into<String>,
    ) -> ValidationError<'static> {
        ValidationError {
            instance_path: Pointer::root(),
            instance: Cow::Owned(instance),
            kind: ValidationErrorKind::UnknownKeyword {
                keyword: keyword.into(),
            },
            schema_path,
        }
    }
    pub(crate) const fn additional_properties(
        schema_path: Pointer,
        instance_path: Pointer,
        instance: &'a Value,
        unexpected: Vec<String>,
    ) -> ValidationError<'a> {
        ValidationError {
            instance_path,
            instance: Cow::Borrowed(instance),
            kind: ValidationErrorKind::AdditionalProperties { unexpected },
            schema_path,
        }
    }
}

impl From<solidus_referencing::Error> for ValidationError<'_> {
    fn from(error: solidus_referencing::Error) -> Self {
        ValidationError {
            instance_path: Pointer::root(),
            instance: Cow::Owned(Value::Null),
            kind: ValidationErrorKind::Referencing(error),
            schema_path: Pointer::root(),
        }
    }
}

impl error::Error for ValidationError<'_> {}

impl fmt::Display for ValidationError<'_> {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValidationErrorKind::AnyOf => write!(
                f,
                "{} is not valid under any of the schemas listed in the 'anyOf' keyword",
                self.instance
            ),
            ValidationErrorKind::Constant { expected_value } => {
                write!(f, "{expected_value} was expected")
            }
            ValidationErrorKind::Contains => write!(
                f,
                "None of {} are valid under the given schema",
                self.instance
            ),
            ValidationErrorKind::ContentEncoding { content_encoding } => {
                write!(f, "{} is not encoded with '{content_encoding}'", self.instance)
            }
            ValidationErrorKind::ContentMediaType { content_media_type } => {
                write!(f, "{} is not of media type '{content_media_type}'", self.instance)
            }
            ValidationErrorKind::ContentSchema => {
                write!(f, "the decoded content of {} is invalid", self.instance)
            }
            ValidationErrorKind::CycleDetected { reference } => {
                write!(f, "reference '{reference}' forms an infinite loop")
            }
            ValidationErrorKind::Custom { message } => f.write_str(message),
            ValidationErrorKind::Enum { options } => {
                write!(f, "{} is not one of {options}", self.instance)
            }
            ValidationErrorKind::ExclusiveMaximum { limit } => write!(
                f,
                "{} is greater than or equal to the maximum of {limit}",
                self.instance
            ),
            ValidationErrorKind::ExclusiveMinimum { limit } => write!(
                f,
                "{} is less than or equal to the minimum of {limit}",
                self.instance
            ),
            ValidationErrorKind::FalseSchema => {
                write!(f, "False schema does not allow {}", self.instance)
            }
            ValidationErrorKind::Format { format } => {
                write!(f, "{} is not a \"{format}\"", self.instance)
            }
            ValidationErrorKind::InvalidRegex { pattern } => {
                write!(f, "\"{pattern}\" is not a valid regular expression")
            }
            ValidationErrorKind::InvalidSchema { detail } => {
                write!(f, "invalid schema: {detail}")
            }
            ValidationErrorKind::InvalidReference { reference } => {
                write!(f, "invalid reference '{reference}'")
            }
            ValidationErrorKind::MaxItems { limit } => {
                write!(f, "{} has more than {limit} item", self.instance)?;
                if *limit != 1 {
                    f.write_char('s')?;
                }
                Ok(())
            }
            ValidationErrorKind::Maximum { limit } => {
                write!(f, "{} is greater than the maximum of {limit}", self.instance)
            }
            ValidationErrorKind::MaxLength { limit } => {
                write!(f, "{} is longer than {limit} character", self.instance)?;
                if *limit != 1 {
                    f.write_char('s')?;
                }
                Ok(())
            }
            ValidationErrorKind::MaxProperties { limit } => {
                write!(f, "{} has more than {limit} propert", self.instance)?;
                f.write_str(if *limit == 1 { "y" } else { "ies" })
            }
            ValidationErrorKind::MinItems { limit } => {
                write!(f, "{} has less than {limit} item", self.instance)?;
                if *limit != 1 {
                    f.write_char('s')?;
                }
                Ok(())
            }
            ValidationErrorKind::Minimum { limit } => {
                write!(f, "{} is less than the minimum of {limit}", self.instance)
            }
            ValidationErrorKind::MinLength { limit } => {
                write!(f, "{} is shorter than {limit} character", self.instance)?;
                if *limit != 1 {
                    f.write_char('s')?;
                }
                Ok(())
            }
            ValidationErrorKind::MinProperties { limit } => {
                write!(f, "{} has less than {limit} propert", self.instance)?;
                f.write_str(if *limit == 1 { "y" } else { "ies" })
            }
            ValidationErrorKind::MultipleOf { multiple_of } => {
                write!(f, "{} is not a multiple of {multiple_of}", self.instance)
            }
            ValidationErrorKind::Not { schema } => {
                write!(f, "{schema} is not allowed for {}", self.instance)
            }
            ValidationErrorKind::OneOfMultipleValid => write!(
                f,
                "{} is valid under more than one of the schemas listed in the 'oneOf' keyword",
                self.instance
            ),
            ValidationErrorKind::OneOfNotValid => write!(
                f,
                "{} is not valid under any of the schemas listed in the 'oneOf' keyword",
                self.instance
            ),
            ValidationErrorKind::Pattern { pattern } => {
                write!(f, "{} does not match \"{pattern}\"", self.instance)
            }
            ValidationErrorKind::PropertyNames { error } => error.fmt(f),
            ValidationErrorKind::Required { property } => {
                write!(f, "{property} is a required property")
            }
            ValidationErrorKind::Type { kind } => match kind {
                TypeKind::Single(type_name) => {
                    write!(f, "{} is not of type \"{type_name}\"", self.instance)
                }
                TypeKind::Multiple(types) => {
                    write!(f, "{} is not of types ", self.instance)?;
                    let mut remaining = types.iter().count();
                    for type_name in types.iter() {
                        write!(f, "\"{type_name}\"")?;
                        remaining -= 1;
                        if remaining > 0 {
                            f.write_str(", ")?;
                        }
                    }
                    Ok(())
                }
            },
            ValidationErrorKind::UnevaluatedItems { unexpected } => {
                write!(
                    f,
                    "Unevaluated items are not allowed ({} {} unexpected)",
                    unexpected
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                    if unexpected.len() == 1 { "was" } else { "were" }
                )
            }
            ValidationErrorKind::UnevaluatedProperties { unexpected } => {
                write!(
                    f,
                    "Unevaluated properties are not allowed ({} {} unexpected)",
                    unexpected
                        .iter()
                        .map(|property| format!("'{property}'"))
                        .collect::<Vec<_>>()
                        .join(", "),
                    if unexpected.len() == 1 { "was" } else { "were" }
                )
            }
            ValidationErrorKind::UniqueItems => {
                write!(f, "{} has non-unique elements", self.instance)
            }
            ValidationErrorKind::UnknownKeyword { keyword } => {
                write!(f, "unknown keyword '{keyword}'")
            }
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                write!(
                    f,
                    "Additional properties are not allowed ({} {} unexpected)",
                    unexpected
                        .iter()
                        .map(|property| format!("'{property}'"))
                        .collect::<Vec<_>>()
                        .join(", "),
                    if unexpected.len() == 1 { "was" } else { "were" }
                )
            }
            ValidationErrorKind::Referencing(error) => error.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use solidus_value::{Pointer, Value};

    use super::ValidationError;

    #[test]
    fn message_rendering() {
        let instance = Value::from(json!(3));
        let error = ValidationError::maximum(
            Pointer::root().join("maximum"),
            Pointer::root(),
            &instance,
            Value::from(2),
        );
        assert_eq!(error.to_string(), "3 is greater than the maximum of 2");
        assert_eq!(error.schema_path.to_string(), "/maximum");
    }

    #[test]
    fn owned_errors_are_static() {
        fn make() -> ValidationError<'static> {
            let instance = Value::from("x");
            ValidationError::single_type_error(
                Pointer::root(),
                Pointer::root(),
                &instance,
                crate::primitive_type::PrimitiveType::Number,
            )
            .into_owned()
        }
        assert_eq!(make().to_string(), "\"x\" is not of type \"number\"");
    }
}
