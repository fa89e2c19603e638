use solidus_value::{Object, Pointer, Value};

use crate::{
    compiler::Context,
    error::{error, no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    paths::LocationNode,
    validator::Validate,
};

pub(crate) struct MinItemsValidator {
    limit: u64,
    location: Pointer,
}

impl Validate for MinItemsValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_array() {
            Some(items) => items.len() as u64 >= self.limit,
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if self.is_valid(instance) {
            no_error()
        } else {
            error(ValidationError::min_items(
                self.location.clone(),
                location.into(),
                instance,
                self.limit,
            ))
        }
    }
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let limit = super::parse_limit(ctx, "minItems", schema)?;
    Ok(Some(Box::new(MinItemsValidator {
        limit,
        location: ctx.location().join("minItems"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::keywords::tests_util;

    #[test]
    fn bounds() {
        tests_util::is_valid(&json!({"minItems": 1}), &json!([1]));
        tests_util::is_not_valid(&json!({"minItems": 1}), &json!([]));
    }
}
