//! A JSON Schema draft 2020-12 validation engine over the universal value
//! model of `solidus-value`.
//!
//! # Validation
//!
//! For a one-off check use [`is_valid`]; to validate repeatedly, compile the
//! schema once:
//!
//! ```rust
//! use serde_json::json;
//! use solidus_value::Value;
//!
//! let schema = Value::from(json!({"type": "string", "pattern": "^[a-zA-Z]+$"}));
//! let validator = solidus::Schema::new(&schema).expect("Invalid schema");
//!
//! assert!(validator.is_valid(&Value::from("Alice")));
//! assert!(!validator.is_valid(&Value::from("Alice1")));
//!
//! for error in validator.iter_errors(&Value::from(42)) {
//!     println!("{error} at {}", error.instance_path);
//! }
//! ```
//!
//! # Output formats
//!
//! [`Schema::apply`] defers evaluation until one of the output formats is
//! picked: `flag`, `basic`, `detailed` or `verbose`, the last carrying
//! every applied keyword with its annotations for tooling and for the
//! schema-directed [`coding`] layer.
//!
//! # Configuration
//!
//! [`ValidationOptions`] controls format assertion, content assertion,
//! unknown-keyword policy, extra resources and the [`SchemaLocator`] used
//! for remote references:
//!
//! ```rust
//! use serde_json::json;
//! use solidus_value::Value;
//!
//! let schema = Value::from(json!({"format": "date"}));
//! let validator = solidus::options()
//!     .should_validate_formats(true)
//!     .build(&schema)
//!     .expect("Invalid schema");
//! assert!(!validator.is_valid(&Value::from("not a date")));
//! ```
pub mod coding;
mod compiler;
mod content;
mod ecma;
mod error;
mod formats;
mod keywords;
mod node;
mod options;
mod output;
mod paths;
mod primitive_type;
mod validator;

pub use content::{
    register_content_encoding, register_content_media_type, ContentEncoding, ContentMediaType,
};
pub use error::{ErrorIterator, TypeKind, ValidationError, ValidationErrorKind};
pub use formats::{register_format, Format};
pub use keywords::custom::{Keyword, KeywordFactory};
pub use options::{UnknownKeywords, ValidationOptions};
pub use output::{Annotations, BasicOutput, ErrorDescription, Output, OutputNode, OutputUnit};
pub use paths::{LocationNode, LocationSegment};
pub use primitive_type::{PrimitiveType, PrimitiveTypesBitMap};
pub use solidus_referencing::{
    Draft, Registry, Resource, SchemaLocator, UnsupportedLocator, Vocabulary, VocabularySet,
};
pub use validator::Schema;

use solidus_value::Value;

/// Compile a schema with default options.
pub fn schema_for(schema: &Value) -> Result<Schema, ValidationError<'static>> {
    Schema::new(schema)
}

/// Default options for configuring compilation.
#[must_use]
pub fn options() -> ValidationOptions {
    Schema::options()
}

/// One-off validation; compile the schema yourself when validating more
/// than once.
#[must_use]
pub fn is_valid(schema: &Value, instance: &Value) -> bool {
    Schema::new(schema)
        .map(|compiled| compiled.is_valid(instance))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use solidus_value::Value;

    #[test]
    fn one_off_validation() {
        let schema = Value::from(json!({"minimum": 5}));
        assert!(super::is_valid(&schema, &Value::from(6)));
        assert!(!super::is_valid(&schema, &Value::from(4)));
    }
}
