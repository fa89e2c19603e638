//! Schema-directed encoding and decoding of user record types.
//!
//! An [`encoder::SchemaEncoder`] / [`decoder::SchemaDecoder`] pair is
//! parameterised by a compiled [`crate::Schema`] and a format writer or
//! reader. Fields are addressed by [`Pointer`]; a verbose validation pass
//! supplies the annotations that drive representation choices, most
//! notably applying `contentEncoding` when a byte string has to travel
//! through a text format.
mod decoder;
mod encoder;

use std::fmt;

use solidus_value::{EncodingError, Pointer, ReadError, WriteError};

pub use decoder::{RecordDecoder, SchemaDecoder};
pub use encoder::{RecordEncoder, SchemaEncoder};

/// Whether the target format is textual or binary; drives which
/// representation the encoder prefers when a schema admits alternatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// JSON, YAML: byte strings must become text.
    Text,
    /// CBOR: byte strings stay bytes.
    Binary,
}

/// A type that can encode itself against a schema.
pub trait SchemaEncode {
    fn encode(&self, record: &mut RecordEncoder) -> Result<(), CodingError>;
}

/// A type that can decode itself against a schema.
pub trait SchemaDecode: Sized {
    fn decode(record: &RecordDecoder<'_>) -> Result<Self, CodingError>;
}

/// Errors shared by the coding layer and the validator.
#[derive(Debug)]
pub enum CodingError {
    /// A pointer addressed nothing in the decoded document.
    MissingValue { pointer: Pointer },
    /// The value at a pointer has the wrong shape for the requested type.
    TypeMismatch {
        pointer: Pointer,
        expected: &'static str,
    },
    /// A number exists but does not fit the requested representation.
    NumericRange { pointer: Pointer },
    /// The document does not validate against the schema.
    Validation { detail: String },
    /// A byte string cannot travel through a text format without a
    /// `contentEncoding` in the schema.
    MissingContentEncoding { pointer: Pointer },
    Encoding(EncodingError),
    Write(WriteError),
    Read(ReadError),
}

impl fmt::Display for CodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodingError::MissingValue { pointer } => {
                write!(f, "no value at '{pointer}'")
            }
            CodingError::TypeMismatch { pointer, expected } => {
                write!(f, "the value at '{pointer}' is not {expected}")
            }
            CodingError::NumericRange { pointer } => {
                write!(f, "the number at '{pointer}' does not fit the requested type")
            }
            CodingError::Validation { detail } => {
                write!(f, "the document is invalid: {detail}")
            }
            CodingError::MissingContentEncoding { pointer } => write!(
                f,
                "bytes at '{pointer}' need a contentEncoding to travel through a text format"
            ),
            CodingError::Encoding(error) => error.fmt(f),
            CodingError::Write(error) => error.fmt(f),
            CodingError::Read(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for CodingError {}

impl From<EncodingError> for CodingError {
    fn from(error: EncodingError) -> Self {
        CodingError::Encoding(error)
    }
}

impl From<WriteError> for CodingError {
    fn from(error: WriteError) -> Self {
        CodingError::Write(error)
    }
}

impl From<ReadError> for CodingError {
    fn from(error: ReadError) -> Self {
        CodingError::Read(error)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use solidus_value::{json as json_format, FormatWriter, Pointer, Value};

    use super::{
        CodingError, RecordDecoder, RecordEncoder, Representation, SchemaDecode, SchemaEncode,
        SchemaDecoder, SchemaEncoder,
    };
    use crate::Schema;

    #[derive(Debug, PartialEq)]
    struct Packet {
        name: String,
        payload: Vec<u8>,
    }

    impl SchemaEncode for Packet {
        fn encode(&self, record: &mut RecordEncoder) -> Result<(), CodingError> {
            record.field(&Pointer::parse("/name").unwrap(), self.name.as_str())?;
            record.field(
                &Pointer::parse("/payload").unwrap(),
                Value::Bytes(self.payload.clone()),
            )?;
            Ok(())
        }
    }

    impl SchemaDecode for Packet {
        fn decode(record: &RecordDecoder<'_>) -> Result<Self, CodingError> {
            Ok(Packet {
                name: record
                    .string_field(&Pointer::parse("/name").unwrap())?
                    .to_string(),
                payload: record.bytes_field(&Pointer::parse("/payload").unwrap())?,
            })
        }
    }

    fn packet_schema() -> Schema {
        Schema::new(&Value::from(json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "payload": {"type": ["string", "bytes"], "contentEncoding": "base64"}
            },
            "required": ["name", "payload"]
        })))
        .unwrap()
    }

    #[test]
    fn bytes_travel_as_base64_through_text_formats() {
        let schema = packet_schema();
        let packet = Packet {
            name: "probe".to_string(),
            payload: vec![0xDE, 0xAD, 0xBE, 0xEF],
        };
        let mut writer = json_format::JsonWriter::new();
        let mut encoder = SchemaEncoder::new(&schema, Representation::Text);
        encoder.encode(&packet, &mut writer).unwrap();
        writer.finish().unwrap();
        let text = writer.into_string();
        assert_eq!(text, r#"{"name":"probe","payload":"3q2+7w=="}"#);

        let document = json_format::from_str(&text).unwrap();
        let decoder = SchemaDecoder::new(&schema);
        let decoded: Packet = decoder.decode_value(document).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn bytes_stay_binary_in_binary_formats() {
        let schema = packet_schema();
        let packet = Packet {
            name: "probe".to_string(),
            payload: vec![1, 2, 3],
        };
        let mut encoder = SchemaEncoder::new(&schema, Representation::Binary);
        let value = encoder.to_value(&packet).unwrap();
        assert_eq!(
            value.get("payload").unwrap(),
            &Value::Bytes(vec![1, 2, 3])
        );
    }

    #[test]
    fn invalid_documents_are_rejected_on_decode() {
        let schema = packet_schema();
        let decoder = SchemaDecoder::new(&schema);
        let document = Value::from(json!({"name": 42, "payload": "3q0="}));
        let result: Result<Packet, _> = decoder.decode_value(document);
        assert!(matches!(result, Err(CodingError::Validation { .. })));
    }

    #[test]
    fn missing_fields_are_reported_by_pointer() {
        let schema = Schema::new(&Value::from(json!({"type": "object"}))).unwrap();
        let decoder = SchemaDecoder::new(&schema);
        let document = Value::from(json!({}));
        struct NeedsField;
        impl SchemaDecode for NeedsField {
            fn decode(record: &RecordDecoder<'_>) -> Result<Self, CodingError> {
                record.string_field(&Pointer::parse("/absent").unwrap())?;
                Ok(NeedsField)
            }
        }
        let result: Result<NeedsField, _> = decoder.decode_value(document);
        assert!(matches!(
            result,
            Err(CodingError::MissingValue { .. })
        ));
    }
}
