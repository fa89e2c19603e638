use solidus_value::{Object, Pointer, Value};

use crate::{
    compiler::Context,
    error::{error, no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    paths::LocationNode,
    validator::Validate,
};

pub(crate) struct MaxLengthValidator {
    limit: u64,
    location: Pointer,
}

impl Validate for MaxLengthValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_str() {
            // Length counts Unicode scalars, not bytes.
            Some(text) => bytecount::num_chars(text.as_bytes()) as u64 <= self.limit,
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if self.is_valid(instance) {
            no_error()
        } else {
            error(ValidationError::max_length(
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
    let limit = super::parse_limit(ctx, "maxLength", schema)?;
    Ok(Some(Box::new(MaxLengthValidator {
        limit,
        location: ctx.location().join("maxLength"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"maxLength": 2}), &json!("ab"))]
    #[test_case(&json!({"maxLength": 2}), &json!("é↑"); "unicode scalars")]
    #[test_case(&json!({"maxLength": 2}), &json!(100))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"maxLength": 2}), &json!("foo"))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
