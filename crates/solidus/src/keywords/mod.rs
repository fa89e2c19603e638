pub(crate) mod additional_properties;
pub(crate) mod all_of;
pub(crate) mod any_of;
pub(crate) mod boolean;
pub(crate) mod const_;
pub(crate) mod contains;
pub(crate) mod content;
pub(crate) mod custom;
pub(crate) mod dependent;
pub(crate) mod enum_;
pub(crate) mod exclusive_maximum;
pub(crate) mod exclusive_minimum;
pub(crate) mod format;
pub(crate) mod if_;
pub(crate) mod items;
pub(crate) mod max_items;
pub(crate) mod max_length;
pub(crate) mod max_properties;
pub(crate) mod maximum;
pub(crate) mod min_items;
pub(crate) mod min_length;
pub(crate) mod min_properties;
pub(crate) mod minimum;
pub(crate) mod multiple_of;
pub(crate) mod not;
pub(crate) mod one_of;
pub(crate) mod pattern;
pub(crate) mod pattern_properties;
pub(crate) mod prefix_items;
pub(crate) mod properties;
pub(crate) mod property_names;
pub(crate) mod ref_;
pub(crate) mod required;
pub(crate) mod type_;
pub(crate) mod unevaluated_items;
pub(crate) mod unevaluated_properties;
pub(crate) mod unique_items;

use solidus_referencing::Vocabulary;
use solidus_value::{Object, Value};

use crate::{compiler::Context, error::ValidationError, validator::BoxedValidator};

/// The result of compiling one keyword: a behavior, or nothing when the
/// keyword is handled by a sibling (`then`, `else`, `minContains`, ...).
pub(crate) type BoxedCompilationResult =
    Result<Option<BoxedValidator>, ValidationError<'static>>;

type CompileFunc = fn(&Context<'_>, &Object, &Value) -> BoxedCompilationResult;

/// Dispatch a keyword to its behavior factory, honoring the vocabularies
/// the active meta-schema declares. `None` means nobody recognizes it.
pub(crate) fn compile_keyword(
    ctx: &Context<'_>,
    keyword: &str,
    parent: &Object,
    value: &Value,
) -> Option<BoxedCompilationResult> {
    let applicator = ctx.has_vocabulary(Vocabulary::Applicator);
    let validation = ctx.has_vocabulary(Vocabulary::Validation);
    let unevaluated = ctx.has_vocabulary(Vocabulary::Unevaluated);
    let content = ctx.has_vocabulary(Vocabulary::Content);
    let format = ctx.has_vocabulary(Vocabulary::FormatAnnotation)
        || ctx.has_vocabulary(Vocabulary::FormatAssertion);
    let compile: CompileFunc = match keyword {
        "$ref" => ref_::compile_ref,
        "$dynamicRef" => ref_::compile_dynamic_ref,
        "additionalProperties" if applicator => additional_properties::compile,
        "allOf" if applicator => all_of::compile,
        "anyOf" if applicator => any_of::compile,
        "const" if validation => const_::compile,
        "contains" if applicator => contains::compile,
        "contentEncoding" if content => content::compile_content_encoding,
        "contentMediaType" if content => content::compile_content_media_type,
        "contentSchema" if content => content::compile_content_schema,
        "dependentRequired" if validation => dependent::compile_dependent_required,
        "dependentSchemas" if applicator => dependent::compile_dependent_schemas,
        "enum" if validation => enum_::compile,
        "exclusiveMaximum" if validation => exclusive_maximum::compile,
        "exclusiveMinimum" if validation => exclusive_minimum::compile,
        "format" if format => format::compile,
        "if" if applicator => if_::compile,
        "items" if applicator => items::compile,
        "maxContains" | "minContains" if validation => noop,
        "maxItems" if validation => max_items::compile,
        "maxLength" if validation => max_length::compile,
        "maxProperties" if validation => max_properties::compile,
        "maximum" if validation => maximum::compile,
        "minItems" if validation => min_items::compile,
        "minLength" if validation => min_length::compile,
        "minProperties" if validation => min_properties::compile,
        "minimum" if validation => minimum::compile,
        "multipleOf" if validation => multiple_of::compile,
        "not" if applicator => not::compile,
        "oneOf" if applicator => one_of::compile,
        "pattern" if validation => pattern::compile,
        "patternProperties" if applicator => pattern_properties::compile,
        "prefixItems" if applicator => prefix_items::compile,
        "properties" if applicator => properties::compile,
        "propertyNames" if applicator => property_names::compile,
        "required" if validation => required::compile,
        "then" | "else" if applicator => noop,
        "type" if validation => type_::compile,
        "unevaluatedItems" if unevaluated => unevaluated_items::compile,
        "unevaluatedProperties" if unevaluated => unevaluated_properties::compile,
        "uniqueItems" if validation => unique_items::compile,
        _ => return None,
    };
    Some(compile(ctx, parent, value))
}

/// Handled by a sibling keyword; nothing to compile here.
fn noop(_: &Context<'_>, _: &Object, _: &Value) -> BoxedCompilationResult {
    Ok(None)
}

/// Compile the branch list of `allOf`/`anyOf`/`oneOf`.
pub(crate) fn compile_branches(
    ctx: &Context<'_>,
    keyword: &str,
    schema: &Value,
) -> Result<Vec<crate::node::SchemaNode>, ValidationError<'static>> {
    let Some(items) = schema.as_array() else {
        return Err(ValidationError::invalid_schema(
            ctx.location().join(keyword),
            schema.clone(),
            format!("'{keyword}' must be an array of schemas"),
        ));
    };
    let kctx = ctx.with_path(keyword);
    items
        .iter()
        .enumerate()
        .map(|(index, subschema)| crate::compiler::compile_subschema(&kctx, subschema, index))
        .collect()
}

pub(crate) fn numeric_schema_error(
    ctx: &Context<'_>,
    keyword: &str,
    schema: &Value,
) -> ValidationError<'static> {
    ValidationError::invalid_schema(
        ctx.location().join(keyword),
        schema.clone(),
        format!("'{keyword}' must be a number"),
    )
}

/// Parse the non-negative integer limits (`maxLength`, `minItems`, ...).
pub(crate) fn parse_limit(
    ctx: &Context<'_>,
    keyword: &str,
    schema: &Value,
) -> Result<u64, ValidationError<'static>> {
    schema.as_u64().ok_or_else(|| {
        ValidationError::invalid_schema(
            ctx.location().join(keyword),
            schema.clone(),
            format!("'{keyword}' must be a non-negative integer"),
        )
    })
}

/// Total execution order of behaviors within one schema object. Stable
/// sorting preserves declaration order within a class, giving the
/// `(order, declaration index)` total order.
pub(crate) fn execution_order(keyword: &str) -> u8 {
    match keyword {
        "$ref" | "$dynamicRef" => 0,
        "type" | "const" | "enum" => 1,
        // In-place applicators come before the structural ones so their
        // outcomes are available to `unevaluated*`.
        "allOf" | "anyOf" | "oneOf" | "not" | "if" | "dependentSchemas" => 3,
        "prefixItems" | "properties" | "propertyNames" => 4,
        "items" | "patternProperties" => 5,
        "additionalProperties" | "contains" => 6,
        "unevaluatedItems" | "unevaluatedProperties" => 7,
        // Plain assertions, content keywords and custom keywords.
        _ => 2,
    }
}

#[cfg(test)]
pub(crate) mod tests_util {
    use serde_json::Value as JsonValue;
    use solidus_value::Value;

    use crate::Schema;

    pub(crate) fn is_valid(schema: &JsonValue, instance: &JsonValue) {
        let compiled = Schema::new(&Value::from(schema)).expect("Invalid schema");
        let instance = Value::from(instance);
        assert!(
            compiled.is_valid(&instance),
            "{instance} should be valid under {schema}"
        );
        assert!(compiled.validate(&instance).is_ok());
    }

    pub(crate) fn is_not_valid(schema: &JsonValue, instance: &JsonValue) {
        let compiled = Schema::new(&Value::from(schema)).expect("Invalid schema");
        let instance = Value::from(instance);
        assert!(
            !compiled.is_valid(&instance),
            "{instance} should not be valid under {schema}"
        );
        assert!(compiled.validate(&instance).is_err());
    }

    pub(crate) fn assert_schema_location(
        schema: &JsonValue,
        instance: &JsonValue,
        expected: &str,
    ) {
        let compiled = Schema::new(&Value::from(schema)).expect("Invalid schema");
        let instance = Value::from(instance);
        let error = compiled
            .iter_errors(&instance)
            .next()
            .expect("Should fail");
        assert_eq!(error.schema_path.to_string(), expected);
    }
}
