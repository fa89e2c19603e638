use ahash::AHashSet;
use solidus_value::{Object, Pointer, Value};

use crate::{
    compiler::Context,
    error::{error, no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    paths::LocationNode,
    validator::Validate,
};

pub(crate) struct UniqueItemsValidator {
    location: Pointer,
}

/// Uniqueness uses structural equality, so `1` and `1.0` collide.
pub(crate) fn is_unique(items: &[Value]) -> bool {
    match items.len() {
        0 | 1 => true,
        2 => items[0] != items[1],
        _ => {
            let mut seen = AHashSet::with_capacity(items.len());
            items.iter().all(|item| seen.insert(item))
        }
    }
}

impl Validate for UniqueItemsValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_array() {
            Some(items) => is_unique(items),
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if self.is_valid(instance) {
            no_error()
        } else {
            error(ValidationError::unique_items(
                self.location.clone(),
                location.into(),
                instance,
            ))
        }
    }
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    match schema.as_bool() {
        Some(true) => Ok(Some(Box::new(UniqueItemsValidator {
            location: ctx.location().join("uniqueItems"),
        }))),
        Some(false) => Ok(None),
        None => Err(ValidationError::invalid_schema(
            ctx.location().join("uniqueItems"),
            schema.clone(),
            "'uniqueItems' must be a boolean",
        )),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"uniqueItems": true}), &json!([1, 2, 3]))]
    #[test_case(&json!({"uniqueItems": false}), &json!([1, 1]))]
    #[test_case(&json!({"uniqueItems": true}), &json!([{"a": 1}, {"a": 2}]))]
    #[test_case(&json!({"uniqueItems": true}), &json!([[1], [2]]))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"uniqueItems": true}), &json!([1, 1]))]
    #[test_case(&json!({"uniqueItems": true}), &json!([1, 1.0]); "numeric equivalence")]
    #[test_case(&json!({"uniqueItems": true}), &json!([{"a": 1}, {"a": 1.0}]))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
