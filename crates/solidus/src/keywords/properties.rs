use solidus_value::{Object, ObjectExt, Pointer, Value};

use crate::{
    compiler::{self, Context},
    error::{no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    node::SchemaNode,
    output::{Annotations, BasicOutput},
    paths::LocationNode,
    validator::{PartialApplication, Validate},
};

pub(crate) struct PropertiesValidator {
    properties: Vec<(String, SchemaNode)>,
    location: Pointer,
}

impl Validate for PropertiesValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_object() {
            Some(object) => self.properties.iter().all(|(name, node)| {
                object
                    .get_key(name)
                    .map_or(true, |value| node.is_valid(value))
            }),
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        let Some(object) = instance.as_object() else {
            return no_error();
        };
        let mut errors: Vec<ValidationError<'i>> = vec![];
        for (name, node) in &self.properties {
            if let Some(value) = object.get_key(name) {
                let property_location = location.push(name.as_str());
                errors.extend(node.validate(value, &property_location));
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
        for (name, node) in &self.properties {
            if let Some(value) = object.get_key(name) {
                let property_location = location.push(name.as_str());
                output += node.apply_rooted(value, &property_location);
                matched.push(Value::from(name.as_str()));
            }
        }
        let mut result: PartialApplication = output.into();
        // The annotation is the set of property names this keyword saw.
        result.annotate(Annotations::from(Value::Array(matched)));
        result
    }
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let Some(map) = schema.as_object() else {
        return Err(ValidationError::invalid_schema(
            ctx.location().join("properties"),
            schema.clone(),
            "'properties' must be an object",
        ));
    };
    let kctx = ctx.with_path("properties");
    let mut properties = Vec::with_capacity(map.len());
    for (key, subschema) in map {
        let Some(name) = key.as_str() else {
            return Err(ValidationError::invalid_schema(
                kctx.location().clone(),
                schema.clone(),
                "property names must be strings",
            ));
        };
        properties.push((
            name.to_string(),
            compiler::compile_subschema(&kctx, subschema, name)?,
        ));
    }
    Ok(Some(Box::new(PropertiesValidator {
        properties,
        location: ctx.location().join("properties"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"properties": {"a": {"type": "integer"}}}), &json!({"a": 3}))]
    #[test_case(&json!({"properties": {"a": {"type": "integer"}}}), &json!({"b": "x"}); "absent properties are fine")]
    #[test_case(&json!({"properties": {"a": {"type": "integer"}}}), &json!(12); "non-objects pass")]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"properties": {"a": {"type": "integer"}}}), &json!({"a": "x"}))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn error_location_points_into_the_subschema() {
        tests_util::assert_schema_location(
            &json!({"properties": {"a": {"type": "integer"}}}),
            &json!({"a": "x"}),
            "/properties/a/type",
        );
    }
}
