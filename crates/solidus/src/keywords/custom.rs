//! User-defined keywords.
use solidus_value::{Object, Pointer, Value};

use crate::{
    error::{ErrorIterator, ValidationError},
    paths::LocationNode,
    validator::Validate,
};

/// The behavior of a custom keyword.
pub trait Keyword: Send + Sync {
    /// Report every failure of this keyword for the instance.
    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i>;

    /// The fast boolean check.
    fn is_valid(&self, instance: &Value) -> bool;
}

/// Builds a [`Keyword`] from the schema that declares it.
pub trait KeywordFactory: Send + Sync {
    fn init(
        &self,
        parent: &Object,
        value: &Value,
        path: Pointer,
    ) -> Result<Box<dyn Keyword>, ValidationError<'static>>;
}

impl<F> KeywordFactory for F
where
    F: for<'a> Fn(
            &'a Object,
            &'a Value,
            Pointer,
        ) -> Result<Box<dyn Keyword>, ValidationError<'static>>
        + Send
        + Sync,
{
    fn init(
        &self,
        parent: &Object,
        value: &Value,
        path: Pointer,
    ) -> Result<Box<dyn Keyword>, ValidationError<'static>> {
        self(parent, value, path)
    }
}

/// Adapter wiring a user keyword into the behavior tree.
pub(crate) struct CustomKeyword {
    inner: Box<dyn Keyword>,
}

impl CustomKeyword {
    pub(crate) fn new(inner: Box<dyn Keyword>) -> Self {
        Self { inner }
    }
}

impl Validate for CustomKeyword {
    fn is_valid(&self, instance: &Value) -> bool {
        self.inner.is_valid(instance)
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        self.inner.validate(instance, location)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use solidus_value::{Object, Pointer, Value};

    use super::Keyword;
    use crate::{
        error::{error, no_error, ErrorIterator, ValidationError},
        paths::LocationNode,
        Schema,
    };

    struct AsciiKeys;

    impl Keyword for AsciiKeys {
        fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
            if self.is_valid(instance) {
                no_error()
            } else {
                error(ValidationError::custom(
                    Pointer::root(),
                    location.into(),
                    instance,
                    "Key is not ASCII",
                ))
            }
        }

        fn is_valid(&self, instance: &Value) -> bool {
            match instance.as_object() {
                Some(object) => object
                    .keys()
                    .filter_map(Value::as_str)
                    .all(|key| key.is_ascii()),
                None => true,
            }
        }
    }

    fn ascii_keys_factory(
        _: &Object,
        value: &Value,
        path: Pointer,
    ) -> Result<Box<dyn Keyword>, ValidationError<'static>> {
        if value.as_str() == Some("ascii-keys") {
            Ok(Box::new(AsciiKeys))
        } else {
            Err(ValidationError::invalid_schema(
                path,
                value.clone(),
                "expected 'ascii-keys'",
            ))
        }
    }

    #[test]
    fn custom_keyword_participates_in_validation() {
        let schema = Schema::options()
            .with_keyword("custom-object-type", ascii_keys_factory)
            .build(&Value::from(json!({
                "custom-object-type": "ascii-keys",
                "minProperties": 1
            })))
            .unwrap();

        assert!(!schema.is_valid(&Value::from(json!({}))));
        assert!(schema.is_valid(&Value::from(json!({"a": 1}))));
        let instance = Value::from(json!({"å": 1}));
        let errors: Vec<_> = schema.iter_errors(&instance).collect();
        assert_eq!(errors[0].to_string(), "Key is not ASCII");
    }

    #[test]
    fn factory_errors_fail_the_build() {
        let result = Schema::options()
            .with_keyword("custom-object-type", ascii_keys_factory)
            .build(&Value::from(json!({"custom-object-type": "wrong"})));
        assert!(result.is_err());
    }
}
