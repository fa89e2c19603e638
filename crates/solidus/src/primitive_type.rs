//! Type names recognized by the `type` keyword.
use std::fmt;

use solidus_value::Value;

/// A primitive type of the data model. `Integer` matches any number whose
/// decimal value is a mathematical integer; `Bytes` covers byte strings,
/// which only binary formats can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Array,
    Boolean,
    Bytes,
    Integer,
    Null,
    Number,
    Object,
    String,
}

impl PrimitiveType {
    #[must_use]
    pub fn from_keyword(name: &str) -> Option<PrimitiveType> {
        Some(match name {
            "array" => PrimitiveType::Array,
            "boolean" => PrimitiveType::Boolean,
            "bytes" => PrimitiveType::Bytes,
            "integer" => PrimitiveType::Integer,
            "null" => PrimitiveType::Null,
            "number" => PrimitiveType::Number,
            "object" => PrimitiveType::Object,
            "string" => PrimitiveType::String,
            _ => return None,
        })
    }

    #[must_use]
    pub fn matches(self, instance: &Value) -> bool {
        match self {
            PrimitiveType::Array => instance.as_array().is_some(),
            PrimitiveType::Boolean => instance.as_bool().is_some(),
            PrimitiveType::Bytes => instance.as_bytes().is_some(),
            PrimitiveType::Integer => instance
                .as_number()
                .is_some_and(solidus_value::Number::is_integer),
            PrimitiveType::Null => instance.is_null(),
            PrimitiveType::Number => instance.as_number().is_some(),
            PrimitiveType::Object => instance.as_object().is_some(),
            PrimitiveType::String => instance.as_str().is_some(),
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrimitiveType::Array => "array",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Bytes => "bytes",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Null => "null",
            PrimitiveType::Number => "number",
            PrimitiveType::Object => "object",
            PrimitiveType::String => "string",
        })
    }
}

/// A compact set of primitive types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrimitiveTypesBitMap {
    bits: u8,
}

impl PrimitiveTypesBitMap {
    #[must_use]
    pub const fn new() -> PrimitiveTypesBitMap {
        PrimitiveTypesBitMap { bits: 0 }
    }

    #[must_use]
    pub const fn add_type(mut self, primitive_type: PrimitiveType) -> PrimitiveTypesBitMap {
        self.bits |= primitive_type.bit();
        self
    }

    #[must_use]
    pub const fn contains_type(self, primitive_type: PrimitiveType) -> bool {
        self.bits & primitive_type.bit() != 0
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    pub fn iter(self) -> impl Iterator<Item = PrimitiveType> {
        [
            PrimitiveType::Array,
            PrimitiveType::Boolean,
            PrimitiveType::Bytes,
            PrimitiveType::Integer,
            PrimitiveType::Null,
            PrimitiveType::Number,
            PrimitiveType::Object,
            PrimitiveType::String,
        ]
        .into_iter()
        .filter(move |primitive_type| self.contains_type(*primitive_type))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use solidus_value::Value;
    use test_case::test_case;

    use super::PrimitiveType;

    #[test_case("integer", &Value::from(json!(12)), true)]
    #[test_case("integer", &Value::from(json!(12.0)), true; "integral float")]
    #[test_case("integer", &Value::from(json!(12.5)), false)]
    #[test_case("number", &Value::from(json!(12)), true)]
    #[test_case("string", &Value::from(json!("x")), true)]
    #[test_case("bytes", &Value::Bytes(vec![1]), true)]
    #[test_case("null", &Value::Null, true)]
    fn type_matching(name: &str, instance: &Value, expected: bool) {
        assert_eq!(
            PrimitiveType::from_keyword(name).unwrap().matches(instance),
            expected
        );
    }
}
