use solidus_value::{Object, Pointer, Value};

use crate::{
    compiler::{self, Context},
    error::{error, no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    node::SchemaNode,
    paths::LocationNode,
    validator::{PartialApplication, Validate},
};

pub(crate) struct NotValidator {
    node: SchemaNode,
    original: Value,
    location: Pointer,
}

impl Validate for NotValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        !self.node.is_valid(instance)
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if self.is_valid(instance) {
            no_error()
        } else {
            error(ValidationError::not(
                self.location.clone(),
                location.into(),
                instance,
                self.original.clone(),
            ))
        }
    }

    fn apply<'a>(&'a self, instance: &Value, location: &LocationNode) -> PartialApplication<'a> {
        // Whatever the inner schema produced is discarded either way: its
        // annotations on success would come from a schema that makes `not`
        // fail, and on failure they belong to a failed branch.
        if self.is_valid(instance) {
            PartialApplication::valid_empty()
        } else {
            let mut result = PartialApplication::invalid_empty(vec![]);
            result.mark_errored(
                ValidationError::not(
                    self.location.clone(),
                    location.into(),
                    instance,
                    self.original.clone(),
                )
                .into(),
            );
            result
        }
    }
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let kctx = ctx.with_path("not");
    Ok(Some(Box::new(NotValidator {
        node: compiler::compile(&kctx, kctx.as_resource_ref(schema))?,
        original: schema.clone(),
        location: ctx.location().join("not"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"not": {"type": "integer"}}), &json!("x"))]
    #[test_case(&json!({"not": false}), &json!(null))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"not": {"type": "integer"}}), &json!(1))]
    #[test_case(&json!({"not": true}), &json!(null))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
