use solidus_value::{Object, Pointer, Value};

use crate::{
    compiler::Context,
    error::{error, no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    node::SchemaNode,
    paths::LocationNode,
    validator::{PartialApplication, Validate},
};

pub(crate) struct OneOfValidator {
    branches: Vec<SchemaNode>,
    location: Pointer,
}

impl OneOfValidator {
    /// The index of the single valid branch, or `None` for zero or more
    /// than one.
    fn exactly_one(&self, instance: &Value) -> Option<usize> {
        let mut selected = None;
        for (index, branch) in self.branches.iter().enumerate() {
            if branch.is_valid(instance) {
                if selected.is_some() {
                    return None;
                }
                selected = Some(index);
            }
        }
        selected
    }

    fn any_valid(&self, instance: &Value) -> bool {
        self.branches.iter().any(|branch| branch.is_valid(instance))
    }
}

impl Validate for OneOfValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        self.exactly_one(instance).is_some()
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if self.exactly_one(instance).is_some() {
            no_error()
        } else if self.any_valid(instance) {
            error(ValidationError::one_of_multiple_valid(
                self.location.clone(),
                location.into(),
                instance,
            ))
        } else {
            error(ValidationError::one_of_not_valid(
                self.location.clone(),
                location.into(),
                instance,
            ))
        }
    }

    fn apply<'a>(&'a self, instance: &Value, location: &LocationNode) -> PartialApplication<'a> {
        match self.exactly_one(instance) {
            Some(index) => self.branches[index].apply_rooted(instance, location).into(),
            None => {
                let mut result = PartialApplication::invalid_empty(vec![]);
                let kind = if self.any_valid(instance) {
                    ValidationError::one_of_multiple_valid(
                        self.location.clone(),
                        location.into(),
                        instance,
                    )
                } else {
                    ValidationError::one_of_not_valid(
                        self.location.clone(),
                        location.into(),
                        instance,
                    )
                };
                result.mark_errored(kind.into());
                result
            }
        }
    }
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let branches = super::compile_branches(ctx, "oneOf", schema)?;
    Ok(Some(Box::new(OneOfValidator {
        branches,
        location: ctx.location().join("oneOf"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1))]
    #[test_case(&json!({"oneOf": [{"type": "string"}, {"type": "string", "maxLength": 1}]}), &json!("aa"); "exclusivity")]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(3); "both branches")]
    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1.1); "no branch")]
    #[test_case(&json!({"oneOf": [{"type": "string"}, {"type": "string", "maxLength": 1}]}), &json!("a"))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
