use solidus_value::{Object, Pointer, Value};

use crate::{
    compiler::Context,
    error::{error, no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    paths::LocationNode,
    validator::Validate,
};

pub(crate) struct EnumValidator {
    options: Vec<Value>,
    /// The original array, kept for error messages.
    schema: Value,
    location: Pointer,
}

impl Validate for EnumValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        self.options.iter().any(|option| option == instance)
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if self.is_valid(instance) {
            no_error()
        } else {
            error(ValidationError::enumeration(
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
    let Some(options) = schema.as_array() else {
        return Err(ValidationError::invalid_schema(
            ctx.location().join("enum"),
            schema.clone(),
            "'enum' must be an array",
        ));
    };
    Ok(Some(Box::new(EnumValidator {
        options: options.clone(),
        schema: schema.clone(),
        location: ctx.location().join("enum"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"enum": [1, 2, 3]}), &json!(2))]
    #[test_case(&json!({"enum": [0.0]}), &json!(0); "numeric equivalence")]
    #[test_case(&json!({"enum": [[1.0]]}), &json!([1]))]
    #[test_case(&json!({"enum": ["a", null]}), &json!(null))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"enum": [1, 2, 3]}), &json!(4))]
    #[test_case(&json!({"enum": []}), &json!(null))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
