//! `dependentRequired` and `dependentSchemas`.
use solidus_value::{Object, ObjectExt, Pointer, Value};

use crate::{
    compiler::{self, Context},
    error::{no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    node::SchemaNode,
    output::BasicOutput,
    paths::LocationNode,
    validator::{PartialApplication, Validate},
};

pub(crate) struct DependentRequiredValidator {
    dependencies: Vec<(String, Vec<String>)>,
    location: Pointer,
}

impl Validate for DependentRequiredValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_object() {
            Some(object) => self.dependencies.iter().all(|(trigger, required)| {
                !object.contains_str_key(trigger)
                    || required
                        .iter()
                        .all(|property| object.contains_str_key(property))
            }),
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        let Some(object) = instance.as_object() else {
            return no_error();
        };
        let mut errors: Vec<ValidationError<'i>> = vec![];
        for (trigger, required) in &self.dependencies {
            if !object.contains_str_key(trigger) {
                continue;
            }
            for property in required {
                if !object.contains_str_key(property) {
                    errors.push(ValidationError::required(
                        self.location.clone(),
                        location.into(),
                        instance,
                        Value::from(property.as_str()),
                    ));
                }
            }
        }
        Box::new(errors.into_iter())
    }
}

pub(crate) fn compile_dependent_required(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let location = ctx.location().join("dependentRequired");
    let Some(map) = schema.as_object() else {
        return Err(invalid(ctx, "dependentRequired", schema));
    };
    let mut dependencies = Vec::with_capacity(map.len());
    for (key, value) in map {
        let (Some(trigger), Some(items)) = (key.as_str(), value.as_array()) else {
            return Err(invalid(ctx, "dependentRequired", schema));
        };
        let mut required = Vec::with_capacity(items.len());
        for item in items {
            let Some(name) = item.as_str() else {
                return Err(invalid(ctx, "dependentRequired", schema));
            };
            required.push(name.to_string());
        }
        dependencies.push((trigger.to_string(), required));
    }
    Ok(Some(Box::new(DependentRequiredValidator {
        dependencies,
        location,
    })))
}

pub(crate) struct DependentSchemasValidator {
    dependencies: Vec<(String, SchemaNode)>,
}

impl Validate for DependentSchemasValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_object() {
            Some(object) => self.dependencies.iter().all(|(trigger, node)| {
                !object.contains_str_key(trigger) || node.is_valid(instance)
            }),
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        let Some(object) = instance.as_object() else {
            return no_error();
        };
        let mut errors: Vec<ValidationError<'i>> = vec![];
        for (trigger, node) in &self.dependencies {
            if object.contains_str_key(trigger) {
                errors.extend(node.validate(instance, location));
            }
        }
        Box::new(errors.into_iter())
    }

    fn apply<'a>(&'a self, instance: &Value, location: &LocationNode) -> PartialApplication<'a> {
        let Some(object) = instance.as_object() else {
            return PartialApplication::valid_empty();
        };
        let mut output = BasicOutput::default();
        for (trigger, node) in &self.dependencies {
            if object.contains_str_key(trigger) {
                output += node.apply_rooted(instance, location);
            }
        }
        output.into()
    }
}

pub(crate) fn compile_dependent_schemas(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let Some(map) = schema.as_object() else {
        return Err(invalid(ctx, "dependentSchemas", schema));
    };
    let kctx = ctx.with_path("dependentSchemas");
    let mut dependencies = Vec::with_capacity(map.len());
    for (key, value) in map {
        let Some(trigger) = key.as_str() else {
            return Err(invalid(ctx, "dependentSchemas", schema));
        };
        dependencies.push((
            trigger.to_string(),
            compiler::compile_subschema(&kctx, value, trigger)?,
        ));
    }
    Ok(Some(Box::new(DependentSchemasValidator { dependencies })))
}

fn invalid(ctx: &Context<'_>, keyword: &str, schema: &Value) -> ValidationError<'static> {
    ValidationError::invalid_schema(
        ctx.location().join(keyword),
        schema.clone(),
        format!("'{keyword}' must be an object"),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"dependentRequired": {"a": ["b"]}}), &json!({"a": 1, "b": 2}))]
    #[test_case(&json!({"dependentRequired": {"a": ["b"]}}), &json!({"c": 1}))]
    #[test_case(&json!({"dependentSchemas": {"a": {"minProperties": 2}}}), &json!({"a": 1, "b": 2}))]
    #[test_case(&json!({"dependentSchemas": {"a": {"minProperties": 2}}}), &json!({"b": 1}))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"dependentRequired": {"a": ["b"]}}), &json!({"a": 1}))]
    #[test_case(&json!({"dependentSchemas": {"a": {"minProperties": 2}}}), &json!({"a": 1}))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
