use std::cmp::Ordering;

use solidus_value::{Number, Object, Pointer, Value};

use crate::{
    compiler::Context,
    error::{error, no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    paths::LocationNode,
    validator::Validate,
};

pub(crate) struct MinimumValidator {
    limit: Number,
    schema: Value,
    location: Pointer,
}

impl Validate for MinimumValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_number() {
            Some(number) => matches!(
                number.partial_cmp(&self.limit),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if instance.as_number().is_none() || self.is_valid(instance) {
            no_error()
        } else {
            error(ValidationError::minimum(
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
    let Some(limit) = schema.as_number() else {
        return Err(super::numeric_schema_error(ctx, "minimum", schema));
    };
    Ok(Some(Box::new(MinimumValidator {
        limit: limit.clone(),
        schema: schema.clone(),
        location: ctx.location().join("minimum"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"minimum": 1.1}), &json!(1.1))]
    #[test_case(&json!({"minimum": 1}), &json!(1.0))]
    #[test_case(&json!({"minimum": -5}), &json!(0))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"minimum": 1.1}), &json!(0.6))]
    #[test_case(&json!({"minimum": 3}), &json!(2.5))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
