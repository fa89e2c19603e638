use solidus_value::{Object, Value};

use crate::{
    compiler::{self, Context},
    error::{ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    node::SchemaNode,
    paths::LocationNode,
    validator::{PartialApplication, Validate},
};

pub(crate) struct AllOfValidator {
    branches: Vec<SchemaNode>,
}

impl Validate for AllOfValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        self.branches.iter().all(|branch| branch.is_valid(instance))
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        let errors: Vec<ValidationError<'i>> = self
            .branches
            .iter()
            .flat_map(|branch| branch.validate(instance, location))
            .collect();
        Box::new(errors.into_iter())
    }

    fn apply<'a>(&'a self, instance: &Value, location: &LocationNode) -> PartialApplication<'a> {
        self.branches
            .iter()
            .map(|branch| branch.apply_rooted(instance, location))
            .collect()
    }
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let branches = super::compile_branches(ctx, "allOf", schema)?;
    Ok(Some(Box::new(AllOfValidator { branches })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"allOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(3))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"allOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1))]
    #[test_case(&json!({"allOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(2.5))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
