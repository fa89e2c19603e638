use solidus_value::{Object, Pointer, Value};

use crate::{
    compiler::{self, Context},
    error::{no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    node::SchemaNode,
    paths::LocationNode,
    validator::Validate,
};

/// Applies a schema to every member name, viewed as a string value.
pub(crate) struct PropertyNamesValidator {
    node: SchemaNode,
    location: Pointer,
}

impl Validate for PropertyNamesValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_object() {
            Some(object) => object.keys().all(|key| self.node.is_valid(key)),
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        let Some(object) = instance.as_object() else {
            return no_error();
        };
        let mut errors: Vec<ValidationError<'i>> = vec![];
        for key in object.keys() {
            for inner in self.node.validate(key, location) {
                errors.push(ValidationError::property_names(
                    self.location.clone(),
                    location.into(),
                    instance,
                    inner,
                ));
            }
        }
        Box::new(errors.into_iter())
    }
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let kctx = ctx.with_path("propertyNames");
    Ok(Some(Box::new(PropertyNamesValidator {
        node: compiler::compile(&kctx, kctx.as_resource_ref(schema))?,
        location: ctx.location().join("propertyNames"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"propertyNames": {"maxLength": 3}}), &json!({"ab": 1}))]
    #[test_case(&json!({"propertyNames": {"maxLength": 3}}), &json!([1, 2]); "non-objects pass")]
    #[test_case(&json!({"propertyNames": false}), &json!({}))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"propertyNames": {"maxLength": 3}}), &json!({"abcd": 1}))]
    #[test_case(&json!({"propertyNames": false}), &json!({"a": 1}))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
