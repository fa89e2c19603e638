use solidus_value::{Object, ObjectExt, Value};

use crate::{
    compiler::{self, Context},
    error::{no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    node::SchemaNode,
    output::{Annotations, BasicOutput},
    paths::LocationNode,
    validator::{PartialApplication, Validate},
};

/// The 2020-12 `items`: applies beyond the sibling `prefixItems`.
pub(crate) struct ItemsValidator {
    node: SchemaNode,
    prefix_length: usize,
}

impl Validate for ItemsValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_array() {
            Some(items) => items
                .iter()
                .skip(self.prefix_length)
                .all(|item| self.node.is_valid(item)),
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        let Some(items) = instance.as_array() else {
            return no_error();
        };
        let mut errors: Vec<ValidationError<'i>> = vec![];
        for (index, item) in items.iter().enumerate().skip(self.prefix_length) {
            let item_location = location.push(index);
            errors.extend(self.node.validate(item, &item_location));
        }
        Box::new(errors.into_iter())
    }

    fn apply<'a>(&'a self, instance: &Value, location: &LocationNode) -> PartialApplication<'a> {
        let Some(items) = instance.as_array() else {
            return PartialApplication::valid_empty();
        };
        let mut output = BasicOutput::default();
        let mut applied = false;
        for (index, item) in items.iter().enumerate().skip(self.prefix_length) {
            let item_location = location.push(index);
            output += self.node.apply_rooted(item, &item_location);
            applied = true;
        }
        let mut result: PartialApplication = output.into();
        if applied {
            result.annotate(Annotations::from(Value::Bool(true)));
        }
        result
    }
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    parent: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let kctx = ctx.with_path("items");
    let node = compiler::compile(&kctx, kctx.as_resource_ref(schema))?;
    let prefix_length = parent
        .get_key("prefixItems")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    Ok(Some(Box::new(ItemsValidator {
        node,
        prefix_length,
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"items": {"type": "integer"}}), &json!([1, 2, 3]))]
    #[test_case(&json!({"items": {"type": "integer"}}), &json!([]))]
    #[test_case(&json!({"prefixItems": [{}], "items": {"type": "integer"}}), &json!(["skip", 2]))]
    #[test_case(&json!({"items": false}), &json!([]))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"items": {"type": "integer"}}), &json!([1, "x"]))]
    #[test_case(&json!({"prefixItems": [{}], "items": {"type": "integer"}}), &json!([null, 2, "x"]))]
    #[test_case(&json!({"prefixItems": [{}, {}, {}], "items": false}), &json!([1, 2, 3, 4]))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn error_mentions_the_false_schema() {
        let schema = solidus_value::Value::from(
            json!({"prefixItems": [{}, {}, {}], "items": false}),
        );
        let compiled = crate::Schema::new(&schema).unwrap();
        let instance = solidus_value::Value::from(json!([1, 2, 3, 4]));
        let errors: Vec<_> = compiled.iter_errors(&instance).collect();
        assert_eq!(errors[0].to_string(), "False schema does not allow 4");
    }
}
