use ahash::AHashMap;
use solidus_value::{FormatReader, Pointer, Value};

use crate::{coding::SchemaDecode, Schema};

use super::CodingError;

/// Decodes documents into user types against a compiled schema.
pub struct SchemaDecoder<'s> {
    schema: &'s Schema,
}

impl<'s> SchemaDecoder<'s> {
    #[must_use]
    pub fn new(schema: &'s Schema) -> SchemaDecoder<'s> {
        SchemaDecoder { schema }
    }

    /// Read one value from `reader` and decode it.
    pub fn decode<T: SchemaDecode, R: FormatReader>(
        &self,
        reader: &mut R,
    ) -> Result<T, CodingError> {
        let document = reader.read_value()?;
        self.decode_value(document)
    }

    /// Decode an already-parsed document.
    pub fn decode_value<T: SchemaDecode>(&self, document: Value) -> Result<T, CodingError> {
        let encodings = super::encoder::collect_encodings(self.schema, &document)?;
        let record = RecordDecoder {
            root: document,
            encodings,
            _lifetime: std::marker::PhantomData,
        };
        T::decode(&record)
    }
}

/// Pointer-addressed access to a validated document.
pub struct RecordDecoder<'a> {
    root: Value,
    encodings: AHashMap<String, String>,
    _lifetime: std::marker::PhantomData<&'a ()>,
}

impl RecordDecoder<'_> {
    /// The raw value at `pointer`.
    pub fn field(&self, pointer: &Pointer) -> Result<&Value, CodingError> {
        self.root
            .pointer(pointer)
            .ok_or_else(|| CodingError::MissingValue {
                pointer: pointer.clone(),
            })
    }

    /// The value at `pointer`, or `None` when absent.
    #[must_use]
    pub fn optional_field(&self, pointer: &Pointer) -> Option<&Value> {
        self.root.pointer(pointer)
    }

    pub fn string_field(&self, pointer: &Pointer) -> Result<&str, CodingError> {
        self.field(pointer)?
            .as_str()
            .ok_or_else(|| CodingError::TypeMismatch {
                pointer: pointer.clone(),
                expected: "a string",
            })
    }

    pub fn bool_field(&self, pointer: &Pointer) -> Result<bool, CodingError> {
        self.field(pointer)?
            .as_bool()
            .ok_or_else(|| CodingError::TypeMismatch {
                pointer: pointer.clone(),
                expected: "a boolean",
            })
    }

    pub fn i64_field(&self, pointer: &Pointer) -> Result<i64, CodingError> {
        let value = self.field(pointer)?;
        let number = value.as_number().ok_or_else(|| CodingError::TypeMismatch {
            pointer: pointer.clone(),
            expected: "a number",
        })?;
        number.as_i64().ok_or_else(|| CodingError::NumericRange {
            pointer: pointer.clone(),
        })
    }

    pub fn u64_field(&self, pointer: &Pointer) -> Result<u64, CodingError> {
        let value = self.field(pointer)?;
        let number = value.as_number().ok_or_else(|| CodingError::TypeMismatch {
            pointer: pointer.clone(),
            expected: "a number",
        })?;
        number.as_u64().ok_or_else(|| CodingError::NumericRange {
            pointer: pointer.clone(),
        })
    }

    pub fn f64_field(&self, pointer: &Pointer) -> Result<f64, CodingError> {
        let value = self.field(pointer)?;
        let number = value.as_number().ok_or_else(|| CodingError::TypeMismatch {
            pointer: pointer.clone(),
            expected: "a number",
        })?;
        Ok(number.to_f64_lossy())
    }

    /// Bytes at `pointer`: native byte strings pass through; text decodes
    /// via the `contentEncoding` the schema declared for this location.
    pub fn bytes_field(&self, pointer: &Pointer) -> Result<Vec<u8>, CodingError> {
        match self.field(pointer)?.untagged() {
            Value::Bytes(bytes) => Ok(bytes.clone()),
            Value::String(text) => {
                let Some(name) = self.encodings.get(&pointer.to_string()) else {
                    return Err(CodingError::TypeMismatch {
                        pointer: pointer.clone(),
                        expected: "bytes",
                    });
                };
                let entry = crate::content::content_encoding(name).ok_or_else(|| {
                    CodingError::Encoding(solidus_value::EncodingError::UnsupportedEncoding {
                        encoding: name.clone(),
                    })
                })?;
                Ok((entry.decode)(text)?)
            }
            _ => Err(CodingError::TypeMismatch {
                pointer: pointer.clone(),
                expected: "bytes",
            }),
        }
    }

    /// Decode a nested record rooted at `pointer`.
    pub fn nested<T: SchemaDecode>(&self, pointer: &Pointer) -> Result<T, CodingError> {
        let value = self.field(pointer)?.clone();
        let prefix = pointer.to_string();
        let encodings = self
            .encodings
            .iter()
            .filter_map(|(location, name)| {
                location
                    .strip_prefix(&prefix)
                    .map(|rest| (rest.to_string(), name.clone()))
            })
            .collect();
        let record = RecordDecoder {
            root: value,
            encodings,
            _lifetime: std::marker::PhantomData,
        };
        T::decode(&record)
    }
}
