use solidus_value::{Object, Pointer, Value};

use crate::{
    compiler::Context,
    error::{error, no_error, ErrorIterator, ValidationError},
    keywords::BoxedCompilationResult,
    paths::LocationNode,
    primitive_type::{PrimitiveType, PrimitiveTypesBitMap},
    validator::Validate,
};

pub(crate) struct SingleTypeValidator {
    type_name: PrimitiveType,
    location: Pointer,
}

impl Validate for SingleTypeValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        self.type_name.matches(instance)
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if self.is_valid(instance) {
            no_error()
        } else {
            error(ValidationError::single_type_error(
                self.location.clone(),
                location.into(),
                instance,
                self.type_name,
            ))
        }
    }
}

pub(crate) struct MultipleTypesValidator {
    types: PrimitiveTypesBitMap,
    location: Pointer,
}

impl Validate for MultipleTypesValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        self.types
            .iter()
            .any(|type_name| type_name.matches(instance))
    }

    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        if self.is_valid(instance) {
            no_error()
        } else {
            error(ValidationError::multiple_type_error(
                self.location.clone(),
                location.into(),
                instance,
                self.types,
            ))
        }
    }
}

pub(crate) fn compile(
    ctx: &Context<'_>,
    _: &Object,
    schema: &Value,
) -> BoxedCompilationResult {
    let location = ctx.location().join("type");
    match schema.untagged() {
        Value::String(name) => {
            let type_name = parse_type(ctx, name, schema)?;
            Ok(Some(Box::new(SingleTypeValidator {
                type_name,
                location,
            })))
        }
        Value::Array(names) => {
            let mut types = PrimitiveTypesBitMap::new();
            for name in names {
                let Some(name) = name.as_str() else {
                    return Err(invalid(ctx, schema));
                };
                types = types.add_type(parse_type(ctx, name, schema)?);
            }
            Ok(Some(Box::new(MultipleTypesValidator { types, location })))
        }
        _ => Err(invalid(ctx, schema)),
    }
}

fn parse_type(
    ctx: &Context<'_>,
    name: &str,
    schema: &Value,
) -> Result<PrimitiveType, ValidationError<'static>> {
    PrimitiveType::from_keyword(name).ok_or_else(|| invalid(ctx, schema))
}

fn invalid(ctx: &Context<'_>, schema: &Value) -> ValidationError<'static> {
    ValidationError::invalid_schema(
        ctx.location().join("type"),
        schema.clone(),
        "'type' must be a known type name or an array of them",
    )
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::keywords::tests_util;

    #[test_case(&json!({"type": "string"}), &json!("x"))]
    #[test_case(&json!({"type": "number"}), &json!(42))]
    #[test_case(&json!({"type": "number"}), &json!(42.5))]
    #[test_case(&json!({"type": "integer"}), &json!(42.0); "integral float is an integer")]
    #[test_case(&json!({"type": ["integer", "string"]}), &json!("x"))]
    #[test_case(&json!({"type": ["integer", "string"]}), &json!(7))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"type": "string"}), &json!(1))]
    #[test_case(&json!({"type": "integer"}), &json!(1.5))]
    #[test_case(&json!({"type": ["integer", "string"]}), &json!(null))]
    #[test_case(&json!({"type": "object"}), &json!([]))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }
}
