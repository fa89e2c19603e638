use ahash::AHashMap;
use solidus_value::{FormatWriter, Object, Pointer, ReferenceToken, Value};

use crate::{coding::SchemaEncode, Schema};

use super::{CodingError, Representation};

/// Encodes user types against a compiled schema.
pub struct SchemaEncoder<'s> {
    schema: &'s Schema,
    representation: Representation,
}

impl<'s> SchemaEncoder<'s> {
    #[must_use]
    pub fn new(schema: &'s Schema, representation: Representation) -> SchemaEncoder<'s> {
        SchemaEncoder {
            schema,
            representation,
        }
    }

    /// Build the value tree for `value`, validated and transformed for the
    /// target representation.
    pub fn to_value<T: SchemaEncode>(&mut self, value: &T) -> Result<Value, CodingError> {
        let mut record = RecordEncoder::new();
        value.encode(&mut record)?;
        self.transform(record.finish())
    }

    /// Encode `value` into `writer`.
    pub fn encode<T: SchemaEncode, W: FormatWriter>(
        &mut self,
        value: &T,
        writer: &mut W,
    ) -> Result<(), CodingError> {
        let tree = self.to_value(value)?;
        writer.write_value(&tree)?;
        Ok(())
    }

    /// Validate the raw tree, then rewrite byte strings for text formats
    /// using the `contentEncoding` annotations the validation produced.
    fn transform(&self, tree: Value) -> Result<Value, CodingError> {
        let encodings = collect_encodings(self.schema, &tree)?;
        if self.representation == Representation::Binary {
            return Ok(tree);
        }
        let transformed = rewrite_bytes(tree, &Pointer::root(), &encodings)?;
        if !self.schema.is_valid(&transformed) {
            return Err(validation_error(self.schema, &transformed));
        }
        Ok(transformed)
    }
}

/// The annotations of interest: `contentEncoding` names keyed by instance
/// location.
pub(super) fn collect_encodings(
    schema: &Schema,
    tree: &Value,
) -> Result<AHashMap<String, String>, CodingError> {
    let output = schema.apply(tree).basic();
    if !output.is_valid() {
        return Err(validation_error(schema, tree));
    }
    let mut encodings = AHashMap::new();
    for unit in output.annotations() {
        if unit.keyword().as_deref() == Some("contentEncoding") {
            if let Some(annotation) = unit.annotations() {
                if let Some(name) = annotation.as_str() {
                    encodings.insert(unit.instance_location().to_string(), name.to_string());
                }
            }
        }
    }
    Ok(encodings)
}

pub(super) fn validation_error(schema: &Schema, tree: &Value) -> CodingError {
    let detail = schema
        .iter_errors(tree)
        .next()
        .map_or_else(|| "unknown error".to_string(), |error| error.to_string());
    CodingError::Validation { detail }
}

fn rewrite_bytes(
    value: Value,
    location: &Pointer,
    encodings: &AHashMap<String, String>,
) -> Result<Value, CodingError> {
    match value {
        Value::Bytes(bytes) => match encodings.get(&location.to_string()) {
            Some(name) => {
                let entry = crate::content::content_encoding(name).ok_or_else(|| {
                    CodingError::Encoding(solidus_value::EncodingError::UnsupportedEncoding {
                        encoding: name.clone(),
                    })
                })?;
                Ok(Value::String((entry.encode)(&bytes)))
            }
            None => Err(CodingError::MissingContentEncoding {
                pointer: location.clone(),
            }),
        },
        Value::Array(items) => Ok(Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| rewrite_bytes(item, &location.join(index), encodings))
                .collect::<Result<_, _>>()?,
        )),
        Value::Object(object) => {
            let mut rewritten = Object::default();
            for (key, item) in object {
                let token = key
                    .as_str()
                    .map_or_else(|| key.to_string(), ToString::to_string);
                let item = rewrite_bytes(item, &location.join(token.as_str()), encodings)?;
                rewritten.insert(key, item);
            }
            Ok(Value::Object(rewritten))
        }
        other => Ok(other),
    }
}

/// Collects a record's fields into a value tree, addressed by pointer.
pub struct RecordEncoder {
    root: Value,
}

impl RecordEncoder {
    #[must_use]
    pub fn new() -> RecordEncoder {
        RecordEncoder {
            root: Value::Object(Object::default()),
        }
    }

    /// Set the field at `pointer`, creating intermediate objects as needed.
    pub fn field(
        &mut self,
        pointer: &Pointer,
        value: impl Into<Value>,
    ) -> Result<(), CodingError> {
        let root = std::mem::take(&mut self.root);
        self.root = insert_at(root, pointer.tokens(), value.into());
        Ok(())
    }

    /// Encode a nested record at `pointer` using its own schema-directed
    /// encoding.
    pub fn nested<T: SchemaEncode>(
        &mut self,
        pointer: &Pointer,
        value: &T,
    ) -> Result<(), CodingError> {
        let mut record = RecordEncoder::new();
        value.encode(&mut record)?;
        self.field(pointer, record.finish())
    }

    #[must_use]
    pub fn finish(self) -> Value {
        self.root
    }
}

impl Default for RecordEncoder {
    fn default() -> Self {
        RecordEncoder::new()
    }
}

fn insert_at(current: Value, tokens: &[ReferenceToken], value: Value) -> Value {
    let Some((token, rest)) = tokens.split_first() else {
        return value;
    };
    match current {
        Value::Array(mut items) => {
            match token {
                ReferenceToken::Index(index) if *index < items.len() => {
                    let existing = std::mem::take(&mut items[*index]);
                    items[*index] = insert_at(existing, rest, value);
                }
                ReferenceToken::Append | ReferenceToken::Index(_) => {
                    items.push(insert_at(Value::Object(Object::default()), rest, value));
                }
                ReferenceToken::Name(_) => {
                    // Mixed addressing: replace with an object.
                    return insert_at(Value::Object(Object::default()), tokens, value);
                }
            }
            Value::Array(items)
        }
        Value::Object(mut object) => {
            let key = Value::String(token.as_text().into_owned());
            let existing = object.shift_remove(&key).unwrap_or_else(|| {
                if rest.first().is_some_and(|next| {
                    matches!(next, ReferenceToken::Index(0) | ReferenceToken::Append)
                }) {
                    Value::Array(Vec::new())
                } else {
                    Value::Object(Object::default())
                }
            });
            object.insert(key, insert_at(existing, rest, value));
            Value::Object(object)
        }
        _ => insert_at(Value::Object(Object::default()), tokens, value),
    }
}
