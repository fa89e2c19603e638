use fancy_regex::Regex;
use solidus_value::{Object, Pointer, Value};

use crate::{
    compiler::{self, Context},
    ecma,
    error::{no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    node::SchemaNode,
    output::{Annotations, BasicOutput},
    paths::LocationNode,
    validator::{PartialApplication, Validate},
};

pub(crate) struct PatternPropertiesValidator {
    patterns: Vec<(Regex, SchemaNode)>,
    location: Pointer,
}

impl Validate for PatternPropertiesValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_object() {
            Some(object) => object.iter().all(|(key, value)| {
                let Some(name) = key.as_str() else {
                    return true;
                };
                self.patterns.iter().all(|(pattern, node)| {
                    !pattern.is_match(name).unwrap_or(false) || node.is_valid(value)
                })
            }),
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        let Some(object) = instance.as_object() else {
            return no_error();
        };
        let mut errors: Vec<ValidationError<'i>> = vec![];
        for (key, value) in object {
            let Some(name) = key.as_str() else { continue };
            for (pattern, node) in &self.patterns {
                if pattern.is_match(name).unwrap_or(false) {
                    let property_location = location.push(name);
                    errors.extend(node.validate(value, &property_location));
                }
            }
        }
        Box::new(errors.into_iter())
    }

    fn apply<'a>(&'a self, instance: &Value, location: &LocationNode) -> PartialApplication<'a> {
        let Some(object) = instance.as_object() else {
            return PartialApplication::valid_empty();
        };
        let mut matched = Vec::new();
        let mut output = BasicOutput::default();
        for (key, value) in object {
            let Some(name) = key.as_str() else { continue };
            let mut any = false;
            for (pattern, node) in &self.patterns {
                if pattern.is_match(name).unwrap_or(false) {
                    any = true;
                    let property_location = location.push(name);
                    output += node.apply_rooted(value, &property_location);
                }
            }
            if any {
                matched.push(Value::from(name));
            }
        }
        let mut result: PartialApplication = output.into();
        result.annotate(Annotations::from(Value::Array(matched)));
        result
    }
}

fn compile_patterns(
    ctx: &Context<'_>,
    map: &Object,
) -> Result<Vec<(Regex, SchemaNode)>, ValidationError<'static>> {
    let kctx = ctx.with_path("patternProperties");
    let mut patterns = Vec::with_capacity(map.len());
    for (key, subschema) in map {
        let Some(source) = key.as_str() else {
            return Err(ValidationError::invalid_schema(
                kctx.location().clone(),
                Value::Object(map.clone()),
                "pattern keys must be strings",
            ));
        };
        let Ok(pattern) = Regex::new(&ecma::to_rust_regex(source)) else {
            return Err(ValidationError::invalid_regex(
                Pointer::root(),
                kctx.location().clone(),
                &Value::Null,
                source,
            )
            .into_owned());
        };
        let node = compiler::compile_subschema(&kctx, subschema, source)?;
        patterns.push((pattern, node));
    }
    Ok(patterns)
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let Some(map) = schema.as_object() else {
        return Err(ValidationError::invalid_schema(
            ctx.location().join("patternProperties"),
            schema.clone(),
            "'patternProperties' must be an object",
        ));
    };
    Ok(Some(Box::new(PatternPropertiesValidator {
        patterns: compile_patterns(ctx, map)?,
        location: ctx.location().join("patternProperties"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"patternProperties": {"^f": {"type": "integer"}}}), &json!({"foo": 1}))]
    #[test_case(&json!({"patternProperties": {"^f": {"type": "integer"}}}), &json!({"bar": "x"}))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"patternProperties": {"^f": {"type": "integer"}}}), &json!({"foo": "x"}))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
