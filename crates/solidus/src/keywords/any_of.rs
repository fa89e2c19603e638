use solidus_value::{Object, Pointer, Value};

use crate::{
    compiler::Context,
    error::{error, no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    node::SchemaNode,
    paths::LocationNode,
    validator::{PartialApplication, Validate},
};

pub(crate) struct AnyOfValidator {
    branches: Vec<SchemaNode>,
    location: Pointer,
}

impl Validate for AnyOfValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        self.branches.iter().any(|branch| branch.is_valid(instance))
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if self.is_valid(instance) {
            no_error()
        } else {
            error(ValidationError::any_of(
                self.location.clone(),
                location.into(),
                instance,
            ))
        }
    }

    fn apply<'a>(&'a self, instance: &Value, location: &LocationNode) -> PartialApplication<'a> {
        // Merge only successful branches; annotations of failed siblings
        // never surface.
        let mut successes = Vec::new();
        for branch in &self.branches {
            let output = branch.apply_rooted(instance, location);
            if output.is_valid() {
                successes.push(output);
            }
        }
        if successes.is_empty() {
            let mut result = PartialApplication::invalid_empty(vec![]);
            result.mark_errored(
                ValidationError::any_of(self.location.clone(), location.into(), instance).into(),
            );
            result
        } else {
            successes.into_iter().collect()
        }
    }
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let branches = super::compile_branches(ctx, "anyOf", schema)?;
    Ok(Some(Box::new(AnyOfValidator {
        branches,
        location: ctx.location().join("anyOf"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"anyOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1))]
    #[test_case(&json!({"anyOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(2.5))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"anyOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1.5))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
