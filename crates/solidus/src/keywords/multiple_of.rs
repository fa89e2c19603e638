use solidus_value::{Number, Object, Pointer, Value};

use crate::{
    compiler::Context,
    error::{error, no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    paths::LocationNode,
    validator::Validate,
};

/// Exact-decimal `multipleOf`: the quotient must reduce to an integer, so
/// `0.3` is a multiple of `0.1` even though their binary floats disagree.
pub(crate) struct MultipleOfValidator {
    divisor: Number,
    schema: Value,
    location: Pointer,
}

impl Validate for MultipleOfValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_number() {
            Some(number) => number.is_multiple_of(&self.divisor),
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if instance.as_number().is_none() || self.is_valid(instance) {
            no_error()
        } else {
            error(ValidationError::multiple_of(
                self.location.clone(),
                location.into(),
                instance,
                self.schema.clone(),
            ))
        }
    }
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let Some(divisor) = schema.as_number() else {
        return Err(super::numeric_schema_error(ctx, "multipleOf", schema));
    };
    Ok(Some(Box::new(MultipleOfValidator {
        divisor: divisor.clone(),
        schema: schema.clone(),
        location: ctx.location().join("multipleOf"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"multipleOf": 2}), &json!(4))]
    #[test_case(&json!({"multipleOf": 1.0}), &json!(4.0))]
    #[test_case(&json!({"multipleOf": 1.5}), &json!(4.5))]
    #[test_case(&json!({"multipleOf": 0.1}), &json!(0.3); "exact decimal arithmetic")]
    #[test_case(&json!({"multipleOf": 0.01}), &json!(1.07))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"multipleOf": 2}), &json!(7))]
    #[test_case(&json!({"multipleOf": 1.0}), &json!(4.5))]
    #[test_case(&json!({"multipleOf": 0.1}), &json!(0.35))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test_case(&json!({"multipleOf": 2}), &json!(3), "/multipleOf")]
    fn location(schema: &Value, instance: &Value, expected: &str) {
        tests_util::assert_schema_location(schema, instance, expected);
    }
}
