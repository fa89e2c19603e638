//! End-to-end validation scenarios.
use serde_json::json;
use solidus::coding::{
    CodingError, RecordDecoder, RecordEncoder, Representation, SchemaDecode, SchemaDecoder,
    SchemaEncode, SchemaEncoder,
};
use solidus::Schema;
use solidus_value::{Pointer, Value};

#[test]
fn type_and_pattern() {
    let schema = Schema::new(&Value::from(json!({
        "type": "string",
        "pattern": "^[a-zA-Z]+$"
    })))
    .unwrap();
    assert!(schema.is_valid(&Value::from("Alice")));
    assert!(!schema.is_valid(&Value::from("Alice1")));
}

#[test]
fn multiple_of_uses_exact_decimals() {
    let schema = Schema::new(&Value::from(json!({
        "type": "number",
        "multipleOf": 0.1
    })))
    .unwrap();
    assert!(schema.is_valid(&Value::from(json!(0.3))));
    assert!(!schema.is_valid(&Value::from(json!(0.35))));
}

#[test]
fn contains_with_min_contains() {
    let schema = Schema::new(&Value::from(json!({
        "type": "array",
        "contains": {"const": 7},
        "minContains": 2
    })))
    .unwrap();
    assert!(schema.is_valid(&Value::from(json!([1, 7, 3, 7]))));
    assert!(!schema.is_valid(&Value::from(json!([1, 7, 3]))));
}

#[test]
fn one_of_is_exclusive() {
    let schema = Schema::new(&Value::from(json!({
        "oneOf": [
            {"type": "string"},
            {"type": "string", "maxLength": 1}
        ]
    })))
    .unwrap();
    assert!(!schema.is_valid(&Value::from("a")));
    assert!(schema.is_valid(&Value::from("aa")));
}

#[derive(Debug, PartialEq)]
struct Blob {
    data: Vec<u8>,
}

impl SchemaEncode for Blob {
    fn encode(&self, record: &mut RecordEncoder) -> Result<(), CodingError> {
        record.field(
            &Pointer::parse("/data").unwrap(),
            Value::Bytes(self.data.clone()),
        )
    }
}

impl SchemaDecode for Blob {
    fn decode(record: &RecordDecoder<'_>) -> Result<Self, CodingError> {
        Ok(Blob {
            data: record.bytes_field(&Pointer::parse("/data").unwrap())?,
        })
    }
}

#[test]
fn content_encoding_round_trips_through_text() {
    let schema = Schema::new(&Value::from(json!({
        "type": "object",
        "properties": {
            "data": {"type": ["string", "bytes"], "contentEncoding": "base64"}
        }
    })))
    .unwrap();
    let blob = Blob {
        data: vec![0xDE, 0xAD, 0xBE, 0xEF],
    };
    let mut encoder = SchemaEncoder::new(&schema, Representation::Text);
    let encoded = encoder.to_value(&blob).unwrap();
    assert_eq!(encoded.get("data").unwrap(), &Value::from("3q2+7w=="));

    let decoder = SchemaDecoder::new(&schema);
    let decoded: Blob = decoder.decode_value(encoded).unwrap();
    assert_eq!(decoded, blob);
}

#[test]
fn dynamic_anchor_resolves_to_the_outermost_scope() {
    let child = json!({
        "$id": "https://example.com/child",
        "$defs": {
            "fallback": {"$dynamicAnchor": "T", "type": "number"}
        },
        "$dynamicRef": "#T"
    });
    let parent = json!({
        "$id": "https://example.com/parent",
        "$defs": {
            "anchor": {"$dynamicAnchor": "T", "type": "string"}
        },
        "$ref": "child"
    });

    // Entered through the parent, "#T" resolves to the parent's string
    // schema and 42 fails with a type error under the reference.
    let schema = solidus::options()
        .with_resource(
            "https://example.com/child",
            solidus::Draft::default().create_resource(Value::from(child.clone())),
        )
        .build(&Value::from(parent))
        .unwrap();
    let instance = Value::from(42);
    assert!(!schema.is_valid(&instance));
    let errors: Vec<_> = schema.iter_errors(&instance).collect();
    assert!(
        errors[0]
            .schema_path
            .to_string()
            .ends_with("/$dynamicRef/type"),
        "unexpected path {}",
        errors[0].schema_path
    );
    assert!(schema.is_valid(&Value::from("text")));

    // Standalone, the child falls back to its lexical anchor.
    let child_only = Schema::new(&Value::from(child)).unwrap();
    assert!(child_only.is_valid(&Value::from(42)));
    assert!(!child_only.is_valid(&Value::from("text")));
}

#[test]
fn schema_documents_are_validated_by_default() {
    // `multipleOf` must be a number per the meta-schema.
    let result = Schema::new(&Value::from(json!({"multipleOf": "two"})));
    assert!(result.is_err());
    let relaxed = solidus::options()
        .without_schema_validation()
        .build(&Value::from(json!({"minLength": 1})));
    assert!(relaxed.is_ok());
}

#[test]
fn unknown_keyword_policies() {
    let schema_value = Value::from(json!({"x-vendor": 1, "type": "integer"}));
    // The default surfaces the unknown keyword as an annotation.
    let annotated = Schema::new(&schema_value).unwrap();
    assert!(annotated.is_valid(&Value::from(3)));

    let failing = solidus::options()
        .with_unknown_keywords(solidus::UnknownKeywords::Fail)
        .build(&schema_value);
    assert!(failing.is_err());

    let ignoring = solidus::options()
        .with_unknown_keywords(solidus::UnknownKeywords::Ignore)
        .build(&schema_value)
        .unwrap();
    assert!(ignoring.is_valid(&Value::from(3)));
}

#[test]
fn bytes_are_a_first_class_type() {
    let schema = Schema::new(&Value::from(json!({"type": "bytes"}))).unwrap();
    assert!(schema.is_valid(&Value::Bytes(vec![1, 2])));
    assert!(!schema.is_valid(&Value::from("text")));
}
