use std::cmp::Ordering;

use solidus_value::{Number, Object, Pointer, Value};

use crate::{
    compiler::Context,
    error::{error, no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    paths::LocationNode,
    validator::Validate,
};

pub(crate) struct ExclusiveMaximumValidator {
    limit: Number,
    schema: Value,
    location: Pointer,
}

impl Validate for ExclusiveMaximumValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_number() {
            Some(number) => matches!(number.partial_cmp(&self.limit), Some(Ordering::Less)),
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if instance.as_number().is_none() || self.is_valid(instance) {
            no_error()
        } else {
            error(ValidationError::exclusive_maximum(
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
        return Err(super::numeric_schema_error(ctx, "exclusiveMaximum", schema));
    };
    Ok(Some(Box::new(ExclusiveMaximumValidator {
        limit: limit.clone(),
        schema: schema.clone(),
        location: ctx.location().join("exclusiveMaximum"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"exclusiveMaximum": 3}), &json!(2.9))]
    #[test_case(&json!({"exclusiveMaximum": 3}), &json!("x"))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"exclusiveMaximum": 3}), &json!(3.0))]
    #[test_case(&json!({"exclusiveMaximum": 3.0}), &json!(4))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
