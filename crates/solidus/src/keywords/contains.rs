use solidus_value::{Object, ObjectExt, Pointer, Value};

use crate::{
    compiler::{self, Context},
    error::{error, no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    node::SchemaNode,
    output::Annotations,
    paths::LocationNode,
    validator::{PartialApplication, Validate},
};

/// `contains` with the sibling `minContains`/`maxContains` bounds folded
/// in. `minContains: 0` makes the keyword always pass.
pub(crate) struct ContainsValidator {
    node: SchemaNode,
    min_contains: u64,
    max_contains: Option<u64>,
    location: Pointer,
}

impl ContainsValidator {
    fn count_matches(&self, items: &[Value]) -> u64 {
        items
            .iter()
            .filter(|item| self.node.is_valid(item))
            .count() as u64
    }

    fn within_bounds(&self, matches: u64) -> bool {
        matches >= self.min_contains
            && self.max_contains.map_or(true, |limit| matches <= limit)
    }
}

impl Validate for ContainsValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_array() {
            Some(items) => self.within_bounds(self.count_matches(items)),
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        let Some(items) = instance.as_array() else {
            return no_error();
        };
        let matches = self.count_matches(items);
        if self.within_bounds(matches) {
            no_error()
        } else {
            error(ValidationError::contains(
                self.location.clone(),
                location.into(),
                instance,
            ))
        }
    }

    fn apply<'a>(&'a self, instance: &Value, location: &LocationNode) -> PartialApplication<'a> {
        let Some(items) = instance.as_array() else {
            return PartialApplication::valid_empty();
        };
        let matched: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| self.node.is_valid(item))
            .map(|(index, _)| index)
            .collect();
        if self.within_bounds(matched.len() as u64) {
            let mut result = PartialApplication::valid_empty();
            // Annotation: the indices the contains schema matched, or
            // `true` when it matched every item.
            result.annotate(Annotations::from(if matched.len() == items.len() {
                Value::Bool(true)
            } else {
                Value::Array(matched.into_iter().map(Value::from).collect())
            }));
            result
        } else {
            let mut result = PartialApplication::invalid_empty(vec![]);
            result.mark_errored(
                ValidationError::contains(self.location.clone(), location.into(), instance).into(),
            );
            result
        }
    }
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    parent: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let kctx = ctx.with_path("contains");
    let node = compiler::compile(&kctx, kctx.as_resource_ref(schema))?;
    let min_contains = match parent.get_key("minContains") {
        Some(value) => super::parse_limit(ctx, "minContains", value)?,
        None => 1,
    };
    let max_contains = match parent.get_key("maxContains") {
        Some(value) => Some(super::parse_limit(ctx, "maxContains", value)?),
        None => None,
    };
    Ok(Some(Box::new(ContainsValidator {
        node,
        min_contains,
        max_contains,
        location: ctx.location().join("contains"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"contains": {"const": 7}}), &json!([1, 7, 3]))]
    #[test_case(&json!({"contains": {"const": 7}, "minContains": 2}), &json!([1, 7, 3, 7]))]
    #[test_case(&json!({"contains": {"const": 7}, "minContains": 0}), &json!([]))]
    #[test_case(&json!({"contains": {"const": 7}, "maxContains": 1}), &json!([7, 1]))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"contains": {"const": 7}}), &json!([1, 2, 3]))]
    #[test_case(&json!({"contains": {"const": 7}, "minContains": 2}), &json!([1, 7, 3]))]
    #[test_case(&json!({"contains": {"const": 7}, "maxContains": 1}), &json!([7, 7]))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn error_message_lists_the_instance() {
        let schema = solidus_value::Value::from(json!({"contains": {"minimum": 5}}));
        let compiled = crate::Schema::new(&schema).unwrap();
        let instance = solidus_value::Value::from(json!([2, 3, 4]));
        let errors: Vec<_> = compiled.iter_errors(&instance).collect();
        assert_eq!(
            errors[0].to_string(),
            "None of [2,3,4] are valid under the given schema"
        );
    }
}
