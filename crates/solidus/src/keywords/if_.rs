use solidus_value::{Object, ObjectExt, Value};

use crate::{
    compiler::{self, Context},
    error::{no_error, ErrorIterator},
    keywords::BoxedCompilationResult,
    node::SchemaNode,
    paths::LocationNode,
    validator::{PartialApplication, Validate},
};

/// `if`/`then`/`else` as one behavior; `then` and `else` compile to nothing
/// on their own.
pub(crate) struct IfThenElseValidator {
    condition: SchemaNode,
    success: Option<SchemaNode>,
    failure: Option<SchemaNode>,
}

impl Validate for IfThenElseValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        if self.condition.is_valid(instance) {
            self.success
                .as_ref()
                .map_or(true, |node| node.is_valid(instance))
        } else {
            self.failure
                .as_ref()
                .map_or(true, |node| node.is_valid(instance))
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if self.condition.is_valid(instance) {
            match &self.success {
                Some(node) => node.validate(instance, location),
                None => no_error(),
            }
        } else {
            match &self.failure {
                Some(node) => node.validate(instance, location),
                None => no_error(),
            }
        }
    }

    fn apply<'a>(&'a self, instance: &Value, location: &LocationNode) -> PartialApplication<'a> {
        let condition = self.condition.apply_rooted(instance, location);
        if condition.is_valid() {
            let mut output = condition;
            if let Some(node) = &self.success {
                output += node.apply_rooted(instance, location);
            }
            output.into()
        } else {
            // The failed condition contributes nothing: its annotations are
            // dropped and its errors do not fail the schema.
            match &self.failure {
                Some(node) => node.apply_rooted(instance, location).into(),
                None => PartialApplication::valid_empty(),
            }
        }
    }
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    parent: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let cctx = ctx.with_path("if");
    let condition = compiler::compile(&cctx, cctx.as_resource_ref(schema))?;
    let success = match parent.get_key("then") {
        Some(subschema) => Some(compiler::compile_subschema(ctx, subschema, "then")?),
        None => None,
    };
    let failure = match parent.get_key("else") {
        Some(subschema) => Some(compiler::compile_subschema(ctx, subschema, "else")?),
        None => None,
    };
    Ok(Some(Box::new(IfThenElseValidator {
        condition,
        success,
        failure,
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"if": {"type": "string"}, "then": {"minLength": 2}}), &json!("ab"))]
    #[test_case(&json!({"if": {"type": "string"}, "then": {"minLength": 2}}), &json!(7); "condition fails, no else")]
    #[test_case(
        &json!({"if": {"type": "string"}, "then": {"minLength": 2}, "else": {"minimum": 0}}),
        &json!(7)
    )]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"if": {"type": "string"}, "then": {"minLength": 2}}), &json!("a"))]
    #[test_case(
        &json!({"if": {"type": "string"}, "then": {"minLength": 2}, "else": {"minimum": 0}}),
        &json!(-1)
    )]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
