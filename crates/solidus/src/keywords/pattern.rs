use fancy_regex::Regex;
use solidus_value::{Object, Pointer, Value};

use crate::{
    compiler::Context,
    ecma,
    error::{error, no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    paths::LocationNode,
    validator::Validate,
};

pub(crate) struct PatternValidator {
    original: String,
    pattern: Regex,
    location: Pointer,
}

impl Validate for PatternValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_str() {
            // A backtracking blow-up is treated as a non-match.
            Some(text) => self.pattern.is_match(text).unwrap_or(false),
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if self.is_valid(instance) {
            no_error()
        } else {
            error(ValidationError::pattern(
                self.location.clone(),
                location.into(),
                instance,
                self.original.clone(),
            ))
        }
    }
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let location = ctx.location().join("pattern");
    let Some(text) = schema.as_str() else {
        return Err(ValidationError::invalid_schema(
            location,
            schema.clone(),
            "'pattern' must be a string",
        ));
    };
    let translated = ecma::to_rust_regex(text);
    let Ok(pattern) = Regex::new(&translated) else {
        return Err(ValidationError::invalid_regex(
            Pointer::root(),
            location,
            &Value::Null,
            text,
        )
        .into_owned());
    };
    Ok(Some(Box::new(PatternValidator {
        original: text.to_string(),
        pattern,
        location: ctx.location().join("pattern"),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"pattern": "^[a-zA-Z]+$"}), &json!("Alice"))]
    #[test_case(&json!({"pattern": "ab+c"}), &json!("xabbcx"); "unanchored search")]
    #[test_case(&json!({"pattern": "\\d{2}"}), &json!("42"))]
    #[test_case(&json!({"pattern": "^a*$"}), &json!(5); "non-strings pass")]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"pattern": "^[a-zA-Z]+$"}), &json!("Alice1"))]
    #[test_case(&json!({"pattern": "^a*$"}), &json!("abc"))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn invalid_pattern_fails_the_build() {
        let schema = solidus_value::Value::from(json!({"pattern": "a{2,1}"}));
        assert!(crate::Schema::new(&schema).is_err());
    }
}
