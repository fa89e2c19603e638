use solidus_value::{Object, Value};

use crate::{
    compiler::{self, Context},
    error::{no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    node::SchemaNode,
    output::{Annotations, BasicOutput},
    paths::LocationNode,
    validator::{PartialApplication, Validate},
};

pub(crate) struct PrefixItemsValidator {
    schemas: Vec<SchemaNode>,
}

impl Validate for PrefixItemsValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_array() {
            Some(items) => self
                .schemas
                .iter()
                .zip(items)
                .all(|(node, item)| node.is_valid(item)),
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        let Some(items) = instance.as_array() else {
            return no_error();
        };
        let mut errors: Vec<ValidationError<'i>> = vec![];
        for (index, (node, item)) in self.schemas.iter().zip(items).enumerate() {
            let item_location = location.push(index);
            errors.extend(node.validate(item, &item_location));
        }
        Box::new(errors.into_iter())
    }

    fn apply<'a>(&'a self, instance: &Value, location: &LocationNode) -> PartialApplication<'a> {
        let Some(items) = instance.as_array() else {
            return PartialApplication::valid_empty();
        };
        let mut output = BasicOutput::default();
        let applied = self.schemas.len().min(items.len());
        for (index, (node, item)) in self.schemas.iter().zip(items).enumerate() {
            let item_location = location.push(index);
            output += node.apply_rooted(item, &item_location);
        }
        let mut result: PartialApplication = output.into();
        if applied > 0 {
            // Annotation: the largest prefix index applied, or `true` when
            // every item was covered.
            result.annotate(Annotations::from(if applied == items.len() {
                Value::Bool(true)
            } else {
                Value::from(applied - 1)
            }));
        }
        result
    }
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let Some(items) = schema.as_array() else {
        return Err(ValidationError::invalid_schema(
            ctx.location().join("prefixItems"),
            schema.clone(),
            "'prefixItems' must be an array of schemas",
        ));
    };
    let kctx = ctx.with_path("prefixItems");
    let schemas = items
        .iter()
        .enumerate()
        .map(|(index, subschema)| compiler::compile_subschema(&kctx, subschema, index))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(Box::new(PrefixItemsValidator { schemas })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"prefixItems": [{"type": "integer"}, {"type": "string"}]}), &json!([1, "a"]))]
    #[test_case(&json!({"prefixItems": [{"type": "integer"}]}), &json!([1, "anything"]))]
    #[test_case(&json!({"prefixItems": [{"type": "integer"}]}), &json!([]))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"prefixItems": [{"type": "integer"}]}), &json!(["a"]))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
