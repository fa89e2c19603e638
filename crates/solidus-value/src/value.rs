//! The universal value model.
//!
//! [`Value`] is a superset of the JSON data model: it adds byte strings,
//! tagged values and exact-decimal numbers, and its objects preserve
//! insertion order while allowing arbitrary values as keys.
use std::hash::{Hash, Hasher};

use base64::{engine::general_purpose::STANDARD, Engine};
use indexmap::IndexMap;

use crate::{
    error::PointerError,
    number::Number,
    pointer::{Pointer, ReferenceToken},
};

/// Ordered map used for the `object` variant. Keys are whole values,
/// distinct by structural equality, iterated in insertion order.
pub type Object = IndexMap<Value, Value, ahash::RandomState>;

/// A universal structured-data value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<Value>),
    Object(Object),
    /// A value decorated with a tag (a YAML tag, a CBOR tag number, ...).
    /// Accessors are transparent through tags; equality is not.
    Tagged(Box<TaggedValue>),
}

/// The payload of [`Value::Tagged`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedValue {
    pub tag: Value,
    pub value: Value,
}

/// Discriminant of a [`Value`], used in error messages and type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    Bytes,
    String,
    Array,
    Object,
    Tagged,
}

impl ValueKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Number => "number",
            ValueKind::Bytes => "bytes",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
            ValueKind::Tagged => "tagged",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Hash discriminants. `StrKey` below relies on the exact string scheme.
const HASH_NULL: u8 = 0;
const HASH_BOOL: u8 = 1;
const HASH_NUMBER: u8 = 2;
const HASH_BYTES: u8 = 3;
const HASH_STRING: u8 = 4;
const HASH_ARRAY: u8 = 5;
const HASH_OBJECT: u8 = 6;
const HASH_TAGGED: u8 = 7;

impl Value {
    /// Build a tagged value.
    #[must_use]
    pub fn tagged(tag: Value, value: Value) -> Value {
        Value::Tagged(Box::new(TaggedValue { tag, value }))
    }

    /// The outermost variant kind; tags are *not* skipped.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
            Value::Tagged(_) => ValueKind::Tagged,
        }
    }

    /// The value with all enclosing tags removed (not recursive).
    #[must_use]
    pub fn untagged(&self) -> &Value {
        let mut current = self;
        while let Value::Tagged(tagged) = current {
            current = &tagged.value;
        }
        current
    }

    /// The outermost tag, if any.
    #[must_use]
    pub fn tag(&self) -> Option<&Value> {
        match self {
            Value::Tagged(tagged) => Some(&tagged.tag),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self.untagged(), Value::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.untagged() {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self.untagged() {
            Value::Number(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.as_number().and_then(Number::as_u64)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self.untagged() {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self.untagged() {
            Value::Bytes(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self.untagged() {
            Value::Array(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self.untagged() {
            Value::Object(value) => Some(value),
            _ => None,
        }
    }

    /// Index into an object by string key or into an array by position.
    #[must_use]
    pub fn get<I: ValueIndex>(&self, index: I) -> Option<&Value> {
        index.index_into(self)
    }

    /// Evaluate an RFC 6901 pointer against this value.
    ///
    /// The append token `-` never matches on reads.
    #[must_use]
    pub fn pointer(&self, pointer: &Pointer) -> Option<&Value> {
        let mut current = self;
        for token in pointer.tokens() {
            current = match (current.untagged(), token) {
                (Value::Object(object), token) => object.get(&StrKey(token.as_text().as_ref()))?,
                (Value::Array(array), ReferenceToken::Index(index)) => array.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Return a copy of this value with the pointer target replaced.
    ///
    /// Intermediate locations must exist; the final token may be a new
    /// object member or the append token `-` on an array.
    pub fn with(&self, pointer: &Pointer, new_value: Value) -> Result<Value, PointerError> {
        fn update(
            current: &Value,
            tokens: &[ReferenceToken],
            pointer: &Pointer,
            new_value: Value,
        ) -> Result<Value, PointerError> {
            let Some((token, rest)) = tokens.split_first() else {
                return Ok(new_value);
            };
            let missing = || PointerError::MissingValue {
                pointer: pointer.to_string(),
            };
            match current.untagged() {
                Value::Object(object) => {
                    let mut object = object.clone();
                    let key = Value::String(token.as_text().into_owned());
                    if let Some(existing) = object.get(&key) {
                        let updated = update(existing, rest, pointer, new_value)?;
                        object.insert(key, updated);
                    } else if rest.is_empty() {
                        object.insert(key, new_value);
                    } else {
                        return Err(missing());
                    }
                    Ok(Value::Object(object))
                }
                Value::Array(array) => {
                    let mut array = array.clone();
                    match token {
                        ReferenceToken::Index(index) if *index < array.len() => {
                            array[*index] = update(&array[*index], rest, pointer, new_value)?;
                        }
                        ReferenceToken::Index(index) if *index == array.len() && rest.is_empty() => {
                            array.push(new_value);
                        }
                        ReferenceToken::Append if rest.is_empty() => array.push(new_value),
                        _ => return Err(missing()),
                    }
                    Ok(Value::Array(array))
                }
                _ => Err(missing()),
            }
        }
        update(self, pointer.tokens(), pointer, new_value)
    }

    /// Deep copy with every tag removed.
    #[must_use]
    pub fn strip_tags(&self) -> Value {
        match self {
            Value::Tagged(tagged) => tagged.value.strip_tags(),
            Value::Array(items) => Value::Array(items.iter().map(Value::strip_tags).collect()),
            Value::Object(object) => Value::Object(
                object
                    .iter()
                    .map(|(key, value)| (key.strip_tags(), value.strip_tags()))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => state.write_u8(HASH_NULL),
            Value::Bool(value) => {
                state.write_u8(HASH_BOOL);
                value.hash(state);
            }
            Value::Number(value) => {
                state.write_u8(HASH_NUMBER);
                value.hash(state);
            }
            Value::Bytes(value) => {
                state.write_u8(HASH_BYTES);
                value.hash(state);
            }
            Value::String(value) => {
                state.write_u8(HASH_STRING);
                value.hash(state);
            }
            Value::Array(items) => {
                state.write_u8(HASH_ARRAY);
                state.write_usize(items.len());
                for item in items {
                    item.hash(state);
                }
            }
            Value::Object(object) => {
                // Object equality ignores entry order, so the digest must be
                // commutative over entries.
                state.write_u8(HASH_OBJECT);
                state.write_usize(object.len());
                let mut combined: u64 = 0;
                for (key, value) in object {
                    let mut entry = ahash::AHasher::default();
                    key.hash(&mut entry);
                    value.hash(&mut entry);
                    combined ^= entry.finish();
                }
                state.write_u64(combined);
            }
            Value::Tagged(tagged) => {
                state.write_u8(HASH_TAGGED);
                tagged.tag.hash(state);
                tagged.value.hash(state);
            }
        }
    }
}

/// Borrowed object key that hashes exactly like `Value::String`, so string
/// lookups avoid building a scratch `Value`.
pub(crate) struct StrKey<'a>(pub(crate) &'a str);

impl Hash for StrKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(HASH_STRING);
        self.0.hash(state);
    }
}

impl indexmap::Equivalent<Value> for StrKey<'_> {
    fn equivalent(&self, key: &Value) -> bool {
        matches!(key, Value::String(s) if s == self.0)
    }
}

/// String-keyed access to [`Object`]s, which otherwise key by [`Value`].
pub trait ObjectExt {
    fn get_key(&self, key: &str) -> Option<&Value>;
    fn contains_str_key(&self, key: &str) -> bool {
        self.get_key(key).is_some()
    }
}

impl ObjectExt for Object {
    fn get_key(&self, key: &str) -> Option<&Value> {
        self.get(&StrKey(key))
    }
}

/// Types usable with [`Value::get`].
pub trait ValueIndex {
    fn index_into<'v>(&self, value: &'v Value) -> Option<&'v Value>;
}

impl ValueIndex for &str {
    fn index_into<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        value.as_object()?.get(&StrKey(self))
    }
}

impl ValueIndex for usize {
    fn index_into<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        value.as_array()?.get(*self)
    }
}

impl ValueIndex for &Value {
    fn index_into<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        match value.untagged() {
            Value::Object(object) => object.get(*self),
            Value::Array(array) => array.get(self.as_u64()? as usize),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::from_i64(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(Number::from_i64(i64::from(value)))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Number(Number::from_u64(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Number(Number::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::from_f64(value))
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(
                // Route through the text form to keep the decimal exact.
                Number::parse(&n.to_string()).expect("serde_json numbers are valid decimals"),
            ),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (Value::String(key.clone()), Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::from(&value)
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => {
                if let Some(value) = n.as_i64() {
                    serde_json::Value::from(value)
                } else if let Some(value) = n.as_u64() {
                    serde_json::Value::from(value)
                } else if n.is_finite() {
                    serde_json::Number::from_f64(n.to_f64_lossy())
                        .map_or_else(|| serde_json::Value::String(n.to_string()), Into::into)
                } else {
                    serde_json::Value::String(n.to_string())
                }
            }
            Value::Bytes(bytes) => serde_json::Value::String(STANDARD.encode(bytes)),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Value::Object(object) => serde_json::Value::Object(
                object
                    .iter()
                    .map(|(key, value)| {
                        let key = key
                            .as_str()
                            .map_or_else(|| key.to_string(), ToString::to_string);
                        (key, serde_json::Value::from(value))
                    })
                    .collect(),
            ),
            Value::Tagged(tagged) => serde_json::Value::from(&tagged.value),
        }
    }
}

impl serde::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serde_json::Value::from(self).serialize(serializer)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&crate::json::to_string(self))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Object, Value};
    use crate::pointer::Pointer;

    #[test]
    fn accessors_see_through_tags() {
        let value = Value::tagged(Value::from("tag:example"), Value::from("payload"));
        assert_eq!(value.as_str(), Some("payload"));
        assert_ne!(value, Value::from("payload"));
        assert_eq!(value.strip_tags(), Value::from("payload"));
    }

    #[test]
    fn object_keys_preserve_insertion_order() {
        let mut object = Object::default();
        object.insert(Value::from("b"), Value::from(1));
        object.insert(Value::from("a"), Value::from(2));
        let keys: Vec<_> = object.keys().map(|key| key.as_str().unwrap()).collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[test]
    fn numeric_and_string_keys_are_distinct() {
        let mut object = Object::default();
        object.insert(Value::from("0"), Value::from("text"));
        object.insert(Value::from(0), Value::from("number"));
        assert_eq!(object.len(), 2);
    }

    #[test]
    fn pointer_access() {
        let value = Value::from(json!({"cmd": ["ls", "-lh", "/home"]}));
        let pointer = Pointer::parse("/cmd/2").unwrap();
        assert_eq!(value.pointer(&pointer), Some(&Value::from("/home")));
        assert_eq!(value.pointer(&Pointer::parse("/cmd/3").unwrap()), None);
    }

    #[test]
    fn with_replaces_and_appends() {
        let value = Value::from(json!({"items": [1, 2]}));
        let replaced = value
            .with(&Pointer::parse("/items/0").unwrap(), Value::from(9))
            .unwrap();
        assert_eq!(replaced, Value::from(json!({"items": [9, 2]})));
        let appended = value
            .with(&Pointer::parse("/items/-").unwrap(), Value::from(3))
            .unwrap();
        assert_eq!(appended, Value::from(json!({"items": [1, 2, 3]})));
        assert!(value
            .with(&Pointer::parse("/missing/0").unwrap(), Value::Null)
            .is_err());
    }

    #[test]
    fn with_identity_round_trip() {
        let value = Value::from(json!({"a": {"b": [1, {"c": true}]}}));
        let pointer = Pointer::parse("/a/b/1/c").unwrap();
        let target = value.pointer(&pointer).unwrap().clone();
        assert_eq!(value.with(&pointer, target).unwrap(), value);
    }

    #[test]
    fn json_interop_preserves_numbers() {
        let value = Value::from(json!({"n": 1.5}));
        assert_eq!(
            value.get("n").unwrap().as_number().unwrap().to_string(),
            "1.5"
        );
        assert_eq!(serde_json::Value::from(&value), json!({"n": 1.5}));
    }
}
