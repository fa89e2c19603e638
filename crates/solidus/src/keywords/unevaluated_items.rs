//! `unevaluatedItems`, the array counterpart of `unevaluatedProperties`.
//!
//! An index counts as evaluated when `prefixItems`, `items`, `contains`, a
//! passing conditional or combinator branch, or a reference target covered
//! it, with each contributing schema gated on its own validity.
use ahash::AHashSet;
use solidus_value::{Object, ObjectExt, Pointer, Value};

use crate::{
    compiler::{self, Context},
    error::{error, no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    node::SchemaNode,
    output::{Annotations, BasicOutput},
    paths::LocationNode,
    validator::{PartialApplication, Validate},
};

pub(crate) struct ItemCoverage {
    validity: Option<SchemaNode>,
    prefix: usize,
    /// `items` present: everything beyond the prefix is evaluated.
    items_beyond_prefix: bool,
    contains: Option<SchemaNode>,
    covers_all: bool,
    conditional: Option<Box<Conditional>>,
    references: Vec<ItemCoverage>,
    branches: Vec<ItemCoverage>,
}

struct Conditional {
    condition: ItemCoverage,
    then: Option<ItemCoverage>,
    otherwise: Option<ItemCoverage>,
}

impl ItemCoverage {
    fn from_parent(
        ctx: &Context<'_>,
        parent: &Object,
        seen: &mut AHashSet<String>,
    ) -> Result<ItemCoverage, ValidationError<'static>> {
        let mut coverage = ItemCoverage::empty(None);
        coverage.fill(ctx, parent, seen, true)?;
        Ok(coverage)
    }

    fn from_value(
        ctx: &Context<'_>,
        value: &Value,
        seen: &mut AHashSet<String>,
    ) -> Result<ItemCoverage, ValidationError<'static>> {
        let validity = compiler::compile(ctx, ctx.as_resource_ref(value))?;
        let mut coverage = ItemCoverage::empty(Some(validity));
        if let Some(object) = value.as_object() {
            coverage.fill(ctx, object, seen, false)?;
        }
        Ok(coverage)
    }

    fn empty(validity: Option<SchemaNode>) -> ItemCoverage {
        ItemCoverage {
            validity,
            prefix: 0,
            items_beyond_prefix: false,
            contains: None,
            covers_all: false,
            conditional: None,
            references: Vec::new(),
            branches: Vec::new(),
        }
    }

    fn fill(
        &mut self,
        ctx: &Context<'_>,
        schema: &Object,
        seen: &mut AHashSet<String>,
        top: bool,
    ) -> Result<(), ValidationError<'static>> {
        self.prefix = schema
            .get_key("prefixItems")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        self.items_beyond_prefix = schema.contains_str_key("items");
        if let Some(contains) = schema.get_key("contains") {
            let cctx = ctx.with_path("contains");
            self.contains = Some(compiler::compile(&cctx, cctx.as_resource_ref(contains))?);
        }
        if !top {
            self.covers_all = schema.contains_str_key("unevaluatedItems");
        }
        if let Some(condition) = schema.get_key("if") {
            self.conditional = Some(Box::new(Conditional {
                condition: ItemCoverage::from_value(ctx, condition, seen)?,
                then: match schema.get_key("then") {
                    Some(value) => Some(ItemCoverage::from_value(ctx, value, seen)?),
                    None => None,
                },
                otherwise: match schema.get_key("else") {
                    Some(value) => Some(ItemCoverage::from_value(ctx, value, seen)?),
                    None => None,
                },
            }));
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
                        .push(ItemCoverage::from_value(&rctx, contents, seen)?);
                }
                seen.remove(&key);
            }
        }
        for keyword in ["allOf", "anyOf", "oneOf"] {
            if let Some(branches) = schema.get_key(keyword).and_then(Value::as_array) {
                for branch in branches {
                    self.branches
                        .push(ItemCoverage::from_value(ctx, branch, seen)?);
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

    fn evaluates(&self, instance: &Value, index: usize, item: &Value) -> bool {
        if self.covers_all
            || index < self.prefix
            || (self.items_beyond_prefix && index >= self.prefix)
        {
            return true;
        }
        if let Some(contains) = &self.contains {
            if contains.is_valid(item) {
                return true;
            }
        }
        if let Some(conditional) = &self.conditional {
            if conditional.condition.applies(instance) {
                if conditional.condition.evaluates(instance, index, item) {
                    return true;
                }
                if let Some(then) = &conditional.then {
                    if then.applies(instance) && then.evaluates(instance, index, item) {
                        return true;
                    }
                }
            } else if let Some(otherwise) = &conditional.otherwise {
                if otherwise.applies(instance) && otherwise.evaluates(instance, index, item) {
                    return true;
                }
            }
        }
        self.references
            .iter()
            .chain(&self.branches)
            .any(|coverage| coverage.applies(instance) && coverage.evaluates(instance, index, item))
    }
}

pub(crate) struct UnevaluatedItemsValidator {
    node: SchemaNode,
    coverage: ItemCoverage,
    forbids: bool,
    location: Pointer,
}

impl UnevaluatedItemsValidator {
    fn unevaluated<'v>(&self, instance: &Value, items: &'v [Value]) -> Vec<(usize, &'v Value)> {
        items
            .iter()
            .enumerate()
            .filter(|(index, item)| !self.coverage.evaluates(instance, *index, item))
            .collect()
    }
}

impl Validate for UnevaluatedItemsValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_array() {
            Some(items) => self
                .unevaluated(instance, items)
                .iter()
                .all(|(_, item)| self.node.is_valid(item)),
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        let Some(items) = instance.as_array() else {
            return no_error();
        };
        let unevaluated = self.unevaluated(instance, items);
        if self.forbids {
            let unexpected: Vec<usize> = unevaluated.iter().map(|(index, _)| *index).collect();
            return if unexpected.is_empty() {
                no_error()
            } else {
                error(ValidationError::unevaluated_items(
                    self.location.clone(),
                    location.into(),
                    instance,
                    unexpected,
                ))
            };
        }
        let mut errors: Vec<ValidationError<'i>> = vec![];
        for (index, item) in unevaluated {
            let item_location = location.push(index);
            errors.extend(self.node.validate(item, &item_location));
        }
        Box::new(errors.into_iter())
    }

    fn apply<'a>(&'a self, instance: &Value, location: &LocationNode) -> PartialApplication<'a> {
        let Some(items) = instance.as_array() else {
            return PartialApplication::valid_empty();
        };
        let unevaluated = self.unevaluated(instance, items);
        if self.forbids && !unevaluated.is_empty() {
            let unexpected = unevaluated.iter().map(|(index, _)| *index).collect();
            let mut result = PartialApplication::invalid_empty(vec![]);
            result.mark_errored(
                ValidationError::unevaluated_items(
                    self.location.clone(),
                    location.into(),
                    instance,
                    unexpected,
                )
                .into(),
            );
            return result;
        }
        let mut output = BasicOutput::default();
        let applied = !unevaluated.is_empty();
        for (index, item) in unevaluated {
            let item_location = location.push(index);
            output += self.node.apply_rooted(item, &item_location);
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
    let kctx = ctx.with_path("unevaluatedItems");
    let node = compiler::compile(&kctx, kctx.as_resource_ref(schema))?;
    let mut seen = AHashSet::new();
    let coverage = ItemCoverage::from_parent(ctx, parent, &mut seen)?;
    Ok(Some(Box::new(UnevaluatedItemsValidator {
        node,
        coverage,
        forbids: schema.as_bool() == Some(false),
        location: ctx.location().join("unevaluatedItems"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(
        &json!({"prefixItems": [true], "unevaluatedItems": false}),
        &json!([1])
    )]
    #[test_case(
        &json!({"prefixItems": [true], "items": true, "unevaluatedItems": false}),
        &json!([1, 2, 3]);
        "items evaluates the rest"
    )]
    #[test_case(
        &json!({
            "allOf": [{"prefixItems": [true, true]}],
            "unevaluatedItems": false
        }),
        &json!([1, 2])
    )]
    #[test_case(
        &json!({"contains": {"type": "string"}, "unevaluatedItems": {"type": "integer"}}),
        &json!([1, "text", 2]);
        "contains matches are evaluated"
    )]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(
        &json!({"prefixItems": [true], "unevaluatedItems": false}),
        &json!([1, 2])
    )]
    #[test_case(
        &json!({"contains": {"type": "string"}, "unevaluatedItems": {"type": "integer"}}),
        &json!(["text", null])
    )]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
