use solidus_value::{Object, Pointer, Value};

use crate::{
    compiler::Context,
    error::{error, no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    paths::LocationNode,
    validator::Validate,
};

pub(crate) struct MaxItemsValidator {
    limit: u64,
    location: Pointer,
}

impl Validate for MaxItemsValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_array() {
            Some(items) => items.len() as u64 <= self.limit,
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if self.is_valid(instance) {
            no_error()
        } else {
            error(ValidationError::max_items(
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
    let limit = super::parse_limit(ctx, "maxItems", schema)?;
    Ok(Some(Box::new(MaxItemsValidator {
        limit,
        location: ctx.location().join("maxItems"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::keywords::tests_util;

    #[test]
    fn bounds() {
        tests_util::is_valid(&json!({"maxItems": 2}), &json!([1, 2]));
        tests_util::is_not_valid(&json!({"maxItems": 2}), &json!([1, 2, 3]));
        tests_util::is_valid(&json!({"maxItems": 0}), &json!("not an array"));
    }
}
