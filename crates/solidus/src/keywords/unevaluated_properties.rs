//! `unevaluatedProperties`.
//!
//! Unlike `additionalProperties`, this keyword sees through in-place
//! applicators: a property counts as evaluated when `properties`,
//! `patternProperties`, `additionalProperties`, a passing `if`/`then`/
//! `else` branch, `dependentSchemas`, `allOf`/`anyOf`/`oneOf` branches or a
//! reference target evaluated it — and only when that schema actually
//! succeeded, since annotations from failing schemas are dropped. The
//! sibling structure is resolved at build time into a [`PropertyCoverage`]
//! tree; validity of each branch is re-checked per instance.
use ahash::AHashSet;
use fancy_regex::Regex;
use solidus_value::{Object, ObjectExt, Pointer, Value};

use crate::{
    compiler::{self, Context},
    ecma,
    error::{error, no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    node::SchemaNode,
    output::{Annotations, BasicOutput},
    paths::LocationNode,
    validator::{PartialApplication, Validate},
};

pub(crate) struct PropertyCoverage {
    /// Gate: this schema's own validity for the instance. `None` for the
    /// top-level parent, whose validity is implicit.
    validity: Option<SchemaNode>,
    named: Vec<String>,
    patterns: Vec<Regex>,
    /// `additionalProperties` present: every property is evaluated.
    additional: bool,
    /// A nested `unevaluatedProperties` evaluates whatever is left.
    covers_all: bool,
    conditional: Option<Box<Conditional>>,
    dependent: Vec<(String, PropertyCoverage)>,
    references: Vec<PropertyCoverage>,
    branches: Vec<PropertyCoverage>,
}

struct Conditional {
    condition: PropertyCoverage,
    then: Option<PropertyCoverage>,
    otherwise: Option<PropertyCoverage>,
}

impl PropertyCoverage {
    /// Coverage of the object holding the `unevaluatedProperties` keyword.
    fn from_parent(
        ctx: &Context<'_>,
        parent: &Object,
        seen: &mut AHashSet<String>,
    ) -> Result<PropertyCoverage, ValidationError<'static>> {
        let mut coverage = PropertyCoverage {
            validity: None,
            named: Vec::new(),
            patterns: Vec::new(),
            additional: false,
            covers_all: false,
            conditional: None,
            dependent: Vec::new(),
            references: Vec::new(),
            branches: Vec::new(),
        };
        coverage.fill(ctx, parent, seen, true)?;
        Ok(coverage)
    }

    /// Coverage of a nested subschema (branch, reference target, ...),
    /// gated by its own validity.
    fn from_value(
        ctx: &Context<'_>,
        value: &Value,
        seen: &mut AHashSet<String>,
    ) -> Result<PropertyCoverage, ValidationError<'static>> {
        let validity = compiler::compile(ctx, ctx.as_resource_ref(value))?;
        let mut coverage = PropertyCoverage {
            validity: Some(validity),
            named: Vec::new(),
            patterns: Vec::new(),
            additional: false,
            covers_all: false,
            conditional: None,
            dependent: Vec::new(),
            references: Vec::new(),
            branches: Vec::new(),
        };
        if let Some(object) = value.as_object() {
            coverage.fill(ctx, object, seen, false)?;
        }
        Ok(coverage)
    }

    fn fill(
        &mut self,
        ctx: &Context<'_>,
        schema: &Object,
        seen: &mut AHashSet<String>,
        top: bool,
    ) -> Result<(), ValidationError<'static>> {
        if let Some(map) = schema.get_key("properties").and_then(Value::as_object) {
            self.named = map
                .keys()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect();
        }
        if let Some(map) = schema.get_key("patternProperties").and_then(Value::as_object) {
            for key in map.keys() {
                if let Some(source) = key.as_str() {
                    if let Ok(pattern) = Regex::new(&ecma::to_rust_regex(source)) {
                        self.patterns.push(pattern);
                    }
                }
            }
        }
        self.additional = schema.contains_str_key("additionalProperties");
        if !top {
            self.covers_all = schema.contains_str_key("unevaluatedProperties");
        }
        if let Some(condition) = schema.get_key("if") {
            self.conditional = Some(Box::new(Conditional {
                condition: PropertyCoverage::from_value(ctx, condition, seen)?,
                then: match schema.get_key("then") {
                    Some(value) => Some(PropertyCoverage::from_value(ctx, value, seen)?),
                    None => None,
                },
                otherwise: match schema.get_key("else") {
                    Some(value) => Some(PropertyCoverage::from_value(ctx, value, seen)?),
                    None => None,
                },
            }));
        }
        if let Some(map) = schema.get_key("dependentSchemas").and_then(Value::as_object) {
            for (key, value) in map {
                if let Some(trigger) = key.as_str() {
                    self.dependent.push((
                        trigger.to_string(),
                        PropertyCoverage::from_value(ctx, value, seen)?,
                    ));
                }
            }
        }
        for keyword in ["$ref", "$dynamicRef"] {
            if let Some(reference) = schema.get_key(keyword).and_then(Value::as_str) {
                let key = format!(
                    "{}#{reference}",
                    ctx.base_uri().map(|uri| uri.to_string()).unwrap_or_default()
                );
                if !seen.insert(key.clone()) {
                    continue;
                }
                if let Ok(resolved) = ctx.lookup(reference) {
                    let (contents, resolver) = resolved.into_inner();
                    let rctx = ctx.with_resolver(resolver);
                    self.references
                        .push(PropertyCoverage::from_value(&rctx, contents, seen)?);
                }
                seen.remove(&key);
            }
        }
        for keyword in ["allOf", "anyOf", "oneOf"] {
            if let Some(branches) = schema.get_key(keyword).and_then(Value::as_array) {
                for branch in branches {
                    self.branches
                        .push(PropertyCoverage::from_value(ctx, branch, seen)?);
                }
            }
        }
        Ok(())
    }

    fn applies(&self, instance: &Value) -> bool {
        self.validity
            .as_ref()
            .map_or(true, |node| node.is_valid(instance))
    }

    fn evaluates(&self, instance: &Value, name: &str) -> bool {
        if self.covers_all
            || self.additional
            || self.named.iter().any(|known| known == name)
            || self
                .patterns
                .iter()
                .any(|pattern| pattern.is_match(name).unwrap_or(false))
        {
            return true;
        }
        if let Some(conditional) = &self.conditional {
            if conditional.condition.applies(instance) {
                if conditional.condition.evaluates(instance, name) {
                    return true;
                }
                if let Some(then) = &conditional.then {
                    if then.applies(instance) && then.evaluates(instance, name) {
                        return true;
                    }
                }
            } else if let Some(otherwise) = &conditional.otherwise {
                if otherwise.applies(instance) && otherwise.evaluates(instance, name) {
                    return true;
                }
            }
        }
        if self.dependent.iter().any(|(trigger, coverage)| {
            instance
                .as_object()
                .is_some_and(|object| object.contains_str_key(trigger))
                && coverage.applies(instance)
                && coverage.evaluates(instance, name)
        }) {
            return true;
        }
        self.references
            .iter()
            .chain(&self.branches)
            .any(|coverage| coverage.applies(instance) && coverage.evaluates(instance, name))
    }
}

pub(crate) struct UnevaluatedPropertiesValidator {
    node: SchemaNode,
    coverage: PropertyCoverage,
    forbids: bool,
    location: Pointer,
}

impl UnevaluatedPropertiesValidator {
    fn unevaluated<'o>(&self, instance: &Value, object: &'o Object) -> Vec<(&'o str, &'o Value)> {
        object
            .iter()
            .filter_map(|(key, value)| key.as_str().map(|name| (name, value)))
            .filter(|(name, _)| !self.coverage.evaluates(instance, name))
            .collect()
    }
}

impl Validate for UnevaluatedPropertiesValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_object() {
            Some(object) => self
                .unevaluated(instance, object)
                .iter()
                .all(|(_, value)| self.node.is_valid(value)),
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        let Some(object) = instance.as_object() else {
            return no_error();
        };
        let unevaluated = self.unevaluated(instance, object);
        if self.forbids {
            let unexpected: Vec<String> = unevaluated
                .iter()
                .map(|(name, _)| (*name).to_string())
                .collect();
            return if unexpected.is_empty() {
                no_error()
            } else {
                error(ValidationError::unevaluated_properties(
                    self.location.clone(),
                    location.into(),
                    instance,
                    unexpected,
                ))
            };
        }
        let mut errors: Vec<ValidationError<'i>> = vec![];
        for (name, value) in unevaluated {
            let property_location = location.push(name);
            errors.extend(self.node.validate(value, &property_location));
        }
        Box::new(errors.into_iter())
    }

    fn apply<'a>(&'a self, instance: &Value, location: &LocationNode) -> PartialApplication<'a> {
        let Some(object) = instance.as_object() else {
            return PartialApplication::valid_empty();
        };
        let unevaluated = self.unevaluated(instance, object);
        if self.forbids && !unevaluated.is_empty() {
            let unexpected = unevaluated
                .iter()
                .map(|(name, _)| (*name).to_string())
                .collect();
            let mut result = PartialApplication::invalid_empty(vec![]);
            result.mark_errored(
                ValidationError::unevaluated_properties(
                    self.location.clone(),
                    location.into(),
                    instance,
                    unexpected,
                )
                .into(),
            );
            return result;
        }
        let mut matched = Vec::new();
        let mut output = BasicOutput::default();
        for (name, value) in unevaluated {
            let property_location = location.push(name);
            output += self.node.apply_rooted(value, &property_location);
            matched.push(Value::from(name));
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
    let kctx = ctx.with_path("unevaluatedProperties");
    let node = compiler::compile(&kctx, kctx.as_resource_ref(schema))?;
    let mut seen = AHashSet::new();
    let coverage = PropertyCoverage::from_parent(ctx, parent, &mut seen)?;
    Ok(Some(Box::new(UnevaluatedPropertiesValidator {
        node,
        coverage,
        forbids: schema.as_bool() == Some(false),
        location: ctx.location().join("unevaluatedProperties"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(
        &json!({"properties": {"a": true}, "unevaluatedProperties": false}),
        &json!({"a": 1})
    )]
    #[test_case(
        &json!({
            "allOf": [{"properties": {"a": true}}],
            "unevaluatedProperties": false
        }),
        &json!({"a": 1});
        "allOf branches count"
    )]
    #[test_case(
        &json!({
            "if": {"properties": {"a": {"const": 1}}, "required": ["a"]},
            "then": {"properties": {"b": true}},
            "unevaluatedProperties": false
        }),
        &json!({"a": 1, "b": 2});
        "then branch counts when the condition holds"
    )]
    #[test_case(
        &json!({
            "$ref": "#/$defs/base",
            "$defs": {"base": {"properties": {"a": true}}},
            "unevaluatedProperties": false
        }),
        &json!({"a": 1});
        "reference targets count"
    )]
    #[test_case(
        &json!({"unevaluatedProperties": {"type": "integer"}}),
        &json!({"a": 1, "b": 2})
    )]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(
        &json!({"properties": {"a": true}, "unevaluatedProperties": false}),
        &json!({"a": 1, "b": 2})
    )]
    #[test_case(
        &json!({
            "if": {"properties": {"a": {"const": 1}}, "required": ["a"]},
            "then": {"properties": {"b": true}},
            "unevaluatedProperties": false
        }),
        &json!({"a": 2, "b": 2});
        "then branch ignored when the condition fails"
    )]
    #[test_case(
        &json!({
            "anyOf": [
                {"properties": {"a": {"type": "integer"}}, "required": ["a"]},
                {"properties": {"b": true}, "required": ["b"]}
            ],
            "unevaluatedProperties": false
        }),
        &json!({"a": "not an integer", "b": 1, "c": 2});
        "failing anyOf branch does not evaluate"
    )]
    #[test_case(
        &json!({"unevaluatedProperties": {"type": "integer"}}),
        &json!({"a": "x"})
    )]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn failing_anyof_branch_counts_only_when_it_passes() {
        // "c" is evaluated by the second branch only when that branch is
        // valid for the whole object.
        let schema = json!({
            "anyOf": [
                {"required": ["a"]},
                {"properties": {"c": true}, "required": ["c"]}
            ],
            "unevaluatedProperties": false
        });
        tests_util::is_valid(&schema, &json!({"c": 1}));
        tests_util::is_not_valid(&schema, &json!({"a": 1, "c": 1}) );
    }
}
