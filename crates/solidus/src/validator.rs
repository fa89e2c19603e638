//! The compiled schema and the behavior every keyword node implements.
//!
//! Compilation turns a schema document into a tree of keyword behaviors;
//! validation walks that tree against an instance. A behavior can assert
//! (`is_valid`/`validate`), annotate and apply child schemas (`apply`).
use std::sync::Arc;

use solidus_value::Value;

use crate::{
    error::{ErrorIterator, ValidationError},
    node::SchemaNode,
    options::ValidationOptions,
    output::{Annotations, ErrorDescription, Output, OutputUnit},
    paths::LocationNode,
};

/// The capability set of a compiled keyword behavior.
///
/// `is_valid` answers the boolean question cheaply; `validate` reports every
/// assertion failure; `apply` additionally surfaces annotations and child
/// results for the structured output formats. Behaviors without children
/// only implement the first two and inherit `apply`.
pub(crate) trait Validate: Send + Sync {
    fn is_valid(&self, instance: &Value) -> bool;

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i>;

    /// Apply the behavior, collecting annotations and child outcomes.
    ///
    /// Composite behaviors (applicators) override this to merge the results
    /// of their subschemas; for plain assertions the default implementation
    /// derives the outcome from `validate`.
    fn apply<'a>(&'a self, instance: &Value, location: &LocationNode) -> PartialApplication<'a> {
        let errors: Vec<ErrorDescription> = self
            .validate(instance, location)
            .map(ErrorDescription::from)
            .collect();
        if errors.is_empty() {
            PartialApplication::valid_empty()
        } else {
            PartialApplication::invalid_empty(errors)
        }
    }
}

pub(crate) type BoxedValidator = Box<dyn Validate + Send + Sync>;

/// The outcome of applying one behavior, before its position in the schema
/// is attached by the owning node.
pub(crate) enum PartialApplication<'a> {
    Valid {
        /// Annotation produced by this behavior itself.
        annotations: Option<Annotations<'a>>,
        /// Positioned outcomes of child behaviors.
        child_results: std::collections::VecDeque<OutputUnit<'a>>,
    },
    Invalid {
        /// Assertion failures of this behavior itself.
        errors: Vec<ErrorDescription>,
        /// Positioned outcomes of child behaviors.
        child_results: std::collections::VecDeque<OutputUnit<'a>>,
    },
}

impl<'a> PartialApplication<'a> {
    pub(crate) fn valid_empty() -> PartialApplication<'static> {
        PartialApplication::Valid {
            annotations: None,
            child_results: std::collections::VecDeque::new(),
        }
    }

    pub(crate) fn invalid_empty(errors: Vec<ErrorDescription>) -> PartialApplication<'static> {
        PartialApplication::Invalid {
            errors,
            child_results: std::collections::VecDeque::new(),
        }
    }

    #[must_use]
    pub(crate) const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// Attach an annotation to a valid outcome; no-op otherwise.
    pub(crate) fn annotate(&mut self, new: Annotations<'a>) {
        if let Self::Valid { annotations, .. } = self {
            *annotations = Some(new);
        }
    }

    /// Record an error, demoting a valid outcome.
    pub(crate) fn mark_errored(&mut self, error: ErrorDescription) {
        match self {
            Self::Invalid { errors, .. } => errors.push(error),
            Self::Valid { child_results, .. } => {
                let child_results = std::mem::take(child_results);
                *self = Self::Invalid {
                    errors: vec![error],
                    child_results,
                }
            }
        }
    }
}

/// A compiled schema, ready to validate instances.
///
/// Compiled schemas are immutable and `Send + Sync`; share them freely
/// between threads.
#[derive(Debug)]
pub struct Schema {
    pub(crate) root: SchemaNode,
    pub(crate) config: Arc<ValidationOptions>,
}

impl Schema {
    /// Compile `schema` with default options.
    pub fn new(schema: &Value) -> Result<Schema, ValidationError<'static>> {
        Self::options().build(schema)
    }

    /// Default [`ValidationOptions`] to configure compilation.
    #[must_use]
    pub fn options() -> ValidationOptions {
        ValidationOptions::default()
    }

    /// Validate and return an iterator over all assertion failures.
    #[inline]
    pub fn validate<'i>(&'i self, instance: &'i Value) -> Result<(), ErrorIterator<'i>> {
        let location = LocationNode::new();
        let mut errors = self.root.validate(instance, &location).peekable();
        if errors.peek().is_none() {
            Ok(())
        } else {
            Err(Box::new(errors))
        }
    }

    /// Iterate over all assertion failures; empty when valid.
    #[inline]
    pub fn iter_errors<'i>(&'i self, instance: &'i Value) -> ErrorIterator<'i> {
        let location = LocationNode::new();
        self.root.validate(instance, &location)
    }

    /// Boolean-only validation; the fastest path.
    #[must_use]
    #[inline]
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.root.is_valid(instance)
    }

    /// Apply the schema and pick an output format on the result.
    #[must_use]
    pub const fn apply<'a, 'b>(&'a self, instance: &'b Value) -> Output<'a, 'b> {
        Output::new(self, &self.root, instance)
    }

    /// The options this schema was built with.
    #[must_use]
    pub fn config(&self) -> Arc<ValidationOptions> {
        Arc::clone(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use solidus_value::Value;

    use super::Schema;

    #[test]
    fn schema_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Schema>();
    }

    #[test]
    fn validate_reports_every_error() {
        let schema =
            Schema::new(&Value::from(json!({"minProperties": 2, "propertyNames": {"minLength": 3}})))
                .unwrap();
        let instance = Value::from(json!({"a": 3}));
        let errors: Vec<_> = schema.iter_errors(&instance).collect();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].to_string(), r#"{"a":3} has less than 2 properties"#);
        assert_eq!(errors[1].to_string(), r#""a" is shorter than 3 characters"#);
    }
}
