use fancy_regex::Regex;
use solidus_value::{Object, ObjectExt, Pointer, Value};

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

/// Applies a schema to every property not already claimed by sibling
/// `properties` or `patternProperties`, which are resolved at build time.
pub(crate) struct AdditionalPropertiesValidator {
    node: SchemaNode,
    named: Vec<String>,
    patterns: Vec<Regex>,
    /// `additionalProperties: false` gets the dedicated error message.
    forbids: bool,
    location: Pointer,
}

impl AdditionalPropertiesValidator {
    fn is_additional(&self, name: &str) -> bool {
        !self.named.iter().any(|known| known == name)
            && !self
                .patterns
                .iter()
                .any(|pattern| pattern.is_match(name).unwrap_or(false))
    }
}

impl Validate for AdditionalPropertiesValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_object() {
            Some(object) => object.iter().all(|(key, value)| {
                key.as_str().map_or(true, |name| {
                    !self.is_additional(name) || self.node.is_valid(value)
                })
            }),
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        let Some(object) = instance.as_object() else {
            return no_error();
        };
        if self.forbids {
            let unexpected: Vec<String> = object
                .keys()
                .filter_map(Value::as_str)
                .filter(|name| self.is_additional(name))
                .map(ToString::to_string)
                .collect();
            return if unexpected.is_empty() {
                no_error()
            } else {
                crate::error::error(ValidationError::additional_properties(
                    self.location.clone(),
                    location.into(),
                    instance,
                    unexpected,
                ))
            };
        }
        let mut errors: Vec<ValidationError<'i>> = vec![];
        for (key, value) in object {
            let Some(name) = key.as_str() else { continue };
            if self.is_additional(name) {
                let property_location = location.push(name);
                errors.extend(self.node.validate(value, &property_location));
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
            if self.is_additional(name) {
                let property_location = location.push(name);
                output += self.node.apply_rooted(value, &property_location);
                matched.push(Value::from(name));
            }
        }
        if self.forbids && !matched.is_empty() {
            let unexpected = matched
                .iter()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect();
            let mut result = PartialApplication::invalid_empty(vec![]);
            result.mark_errored(
                ValidationError::additional_properties(
                    self.location.clone(),
                    location.into(),
                    instance,
                    unexpected,
                )
                .into(),
            );
            return result;
        }
        let mut result: PartialApplication = output.into();
        result.annotate(Annotations::from(Value::Array(matched)));
        result
    }
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    parent: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let kctx = ctx.with_path("additionalProperties");
    let node = compiler::compile(&kctx, kctx.as_resource_ref(schema))?;
    let named = parent
        .get_key("properties")
        .and_then(Value::as_object)
        .map(|map| {
            map.keys()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default();
    let mut patterns = Vec::new();
    if let Some(map) = parent.get_key("patternProperties").and_then(Value::as_object) {
        for key in map.keys() {
            let Some(source) = key.as_str() else { continue };
            let Ok(pattern) = Regex::new(&ecma::to_rust_regex(source)) else {
                return Err(ValidationError::invalid_regex(
                    Pointer::root(),
                    kctx.location().clone(),
                    &Value::Null,
                    source,
                )
                .into_owned());
            };
            patterns.push(pattern);
        }
    }
    Ok(Some(Box::new(AdditionalPropertiesValidator {
        node,
        named,
        patterns,
        forbids: schema.as_bool() == Some(false),
        location: ctx.location().join("additionalProperties"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"additionalProperties": false}), &json!({}))]
    #[test_case(&json!({"additionalProperties": false, "properties": {"a": true}}), &json!({"a": 1}))]
    #[test_case(
        &json!({"additionalProperties": {"type": "string"}, "properties": {"a": true}}),
        &json!({"a": 1, "b": "x"})
    )]
    #[test_case(
        &json!({"additionalProperties": false, "patternProperties": {"^f": {}}}),
        &json!({"foo": 1})
    )]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"additionalProperties": false}), &json!({"a": 1}))]
    #[test_case(
        &json!({"additionalProperties": {"type": "string"}, "properties": {"a": true}}),
        &json!({"a": 1, "b": 2})
    )]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn unexpected_properties_are_listed() {
        let schema = solidus_value::Value::from(json!({
            "properties": {"foo": {}, "bar": {}},
            "patternProperties": {"^v": {}},
            "additionalProperties": false
        }));
        let compiled = crate::Schema::new(&schema).unwrap();
        let instance = solidus_value::Value::from(json!({"foo": 1, "bar": 2, "quux": "boom"}));
        let errors: Vec<_> = compiled.iter_errors(&instance).collect();
        assert_eq!(
            errors[0].to_string(),
            "Additional properties are not allowed ('quux' was unexpected)"
        );
    }
}
