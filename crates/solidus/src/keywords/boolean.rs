use solidus_value::{Pointer, Value};

use crate::{
    error::{error, ErrorIterator, ValidationError},
    paths::LocationNode,
    validator::{BoxedValidator, Validate},
};

/// The `false` schema: nothing is valid.
pub(crate) struct FalseValidator {
    location: Pointer,
}

impl FalseValidator {
    pub(crate) fn compile(location: Pointer) -> BoxedValidator {
        Box::new(FalseValidator { location })
    }
}

impl Validate for FalseValidator {
    fn is_valid(&self, _: &Value) -> bool {
        false
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        error(ValidationError::false_schema(
            self.location.clone(),
            location.into(),
            instance,
        ))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::keywords::tests_util;

    #[test]
    fn false_schema_rejects_everything() {
        for instance in [json!(null), json!(1), json!("x"), json!({}), json!([])] {
            tests_util::is_not_valid(&json!(false), &instance);
            tests_util::is_valid(&json!(true), &instance);
        }
    }
}
