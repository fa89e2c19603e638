use solidus_value::{Object, Pointer, Value};

use crate::{
    compiler::Context,
    error::{error, no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    paths::LocationNode,
    validator::Validate,
};

/// Structural equality against a fixed value; numbers compare by their
/// decimal value, so `const: 1.0` accepts `1`.
pub(crate) struct ConstValidator {
    expected: Value,
    location: Pointer,
}

impl Validate for ConstValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        *instance == self.expected
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if self.is_valid(instance) {
            no_error()
        } else {
            error(ValidationError::constant(
                self.location.clone(),
                location.into(),
                instance,
                self.expected.clone(),
            ))
        }
    }
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    Ok(Some(Box::new(ConstValidator {
        expected: schema.clone(),
        location: ctx.location().join("const"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"const": 2}), &json!(2))]
    #[test_case(&json!({"const": 2.0}), &json!(2); "numeric equivalence")]
    #[test_case(&json!({"const": {"a": [1.0]}}), &json!({"a": [1]}))]
    #[test_case(&json!({"const": null}), &json!(null))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"const": 2}), &json!(5))]
    #[test_case(&json!({"const": "a"}), &json!("b"))]
    #[test_case(&json!({"const": {"a": 1}}), &json!({"a": 2}))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
