use solidus_value::{Object, ObjectExt, Pointer, Value};

use crate::{
    compiler::Context,
    error::{no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    paths::LocationNode,
    validator::Validate,
};

pub(crate) struct RequiredValidator {
    required: Vec<String>,
    location: Pointer,
}

impl Validate for RequiredValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        match instance.as_object() {
            Some(object) => self
                .required
                .iter()
                .all(|property| object.contains_str_key(property)),
            None => true,
        }
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        let Some(object) = instance.as_object() else {
            return no_error();
        };
        let mut errors = vec![];
        for property in &self.required {
            if !object.contains_str_key(property) {
                errors.push(ValidationError::required(
                    self.location.clone(),
                    location.into(),
                    instance,
                    Value::from(property.as_str()),
                ));
            }
        }
        Box::new(errors.into_iter())
    }
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let location = ctx.location().join("required");
    let Some(items) = schema.as_array() else {
        return Err(ValidationError::invalid_schema(
            location,
            schema.clone(),
            "'required' must be an array of strings",
        ));
    };
    let mut required = Vec::with_capacity(items.len());
    for item in items {
        let Some(name) = item.as_str() else {
            return Err(ValidationError::invalid_schema(
                location.clone(),
                schema.clone(),
                "'required' must be an array of strings",
            ));
        };
        required.push(name.to_string());
    }
    Ok(Some(Box::new(RequiredValidator { required, location })))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::keywords::tests_util;

    #[test]
    fn membership() {
        tests_util::is_valid(&json!({"required": ["a"]}), &json!({"a": null}));
        tests_util::is_not_valid(&json!({"required": ["a"]}), &json!({"b": 1}));
        tests_util::is_valid(&json!({"required": ["a"]}), &json!([1]));
    }

    #[test]
    fn all_missing_properties_are_reported() {
        let schema = solidus_value::Value::from(json!({"required": ["foo", "bar"]}));
        let compiled = crate::Schema::new(&schema).unwrap();
        let instance = solidus_value::Value::from(json!({}));
        let errors: Vec<_> = compiled.iter_errors(&instance).collect();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].to_string(), r#""foo" is a required property"#);
        assert_eq!(errors[1].to_string(), r#""bar" is a required property"#);
    }
}
