//! Cross-format round-trip properties over a shared corpus.
use serde_json::json;
use solidus_value::{cbor, json as json_format, yaml, Number, Object, Value};

fn corpus() -> Vec<Value> {
    let mut values = vec![
        Value::Null,
        Value::from(true),
        Value::from(0),
        Value::from(-42),
        Value::from(json!([1, 2.5, "three", null, {"nested": [true]}])),
        Value::from(json!({"z": 1, "a": 2, "deep": {"deeper": {"deepest": []}}})),
        Value::Number(Number::parse("123456789012345678901234567890.000001").unwrap()),
        Value::from("plain text"),
        Value::from("needs: quoting # everywhere"),
        Value::from(""),
    ];
    // Numeric and string keys stay distinct members.
    let mut object = Object::default();
    object.insert(Value::from("0"), Value::from("string key"));
    object.insert(Value::from(0), Value::from("number key"));
    values.push(Value::Object(object));
    values
}

#[test]
fn json_round_trips() {
    for value in corpus() {
        let text = json_format::write_to_string(&value).unwrap();
        let reread = json_format::from_str(&text).unwrap();
        // JSON object keys are text; the numeric-key sample maps onto its
        // string spelling and the two members stay distinct.
        if value.as_object().is_some_and(|object| {
            object.keys().any(|key| key.as_str().is_none())
        }) {
            assert_eq!(reread.as_object().unwrap().len(), value.as_object().unwrap().len());
        } else {
            assert_eq!(reread, value, "json: {text}");
        }
    }
}

#[test]
fn cbor_round_trips() {
    for value in corpus() {
        let bytes = cbor::to_vec(&value);
        assert_eq!(cbor::from_slice(&bytes).unwrap(), value);
    }
    // Bytes and tags are native to CBOR.
    let tagged = Value::tagged(Value::from(42_u64), Value::Bytes(vec![1, 2, 3]));
    assert_eq!(cbor::from_slice(&cbor::to_vec(&tagged)).unwrap(), tagged);
}

#[test]
fn yaml_round_trips() {
    for value in corpus() {
        if value
            .as_object()
            .is_some_and(|object| object.keys().any(|key| key.as_str().is_none()))
        {
            continue; // numeric keys render as their scalar spelling
        }
        let text = yaml::to_string(&value).unwrap();
        assert_eq!(yaml::from_str(&text).unwrap(), value, "yaml: {text}");
    }
}

#[test]
fn yaml_preserves_bytes_through_binary_tag() {
    let value = Value::from(json!({"payload": null}));
    let mut object = value.as_object().unwrap().clone();
    object.insert(Value::from("payload"), Value::Bytes(vec![0xCA, 0xFE]));
    let value = Value::Object(object);
    let text = yaml::to_string(&value).unwrap();
    assert_eq!(yaml::from_str(&text).unwrap(), value);
}

#[test]
fn key_order_is_preserved_everywhere() {
    let value = Value::from(json!({"z": 1, "m": 2, "a": 3}));
    let keys = |value: &Value| -> Vec<String> {
        value
            .as_object()
            .unwrap()
            .keys()
            .map(|key| key.as_str().unwrap().to_string())
            .collect()
    };
    let json_text = json_format::write_to_string(&value).unwrap();
    assert_eq!(keys(&json_format::from_str(&json_text).unwrap()), ["z", "m", "a"]);
    assert_eq!(
        keys(&cbor::from_slice(&cbor::to_vec(&value)).unwrap()),
        ["z", "m", "a"]
    );
    let yaml_text = yaml::to_string(&value).unwrap();
    assert_eq!(keys(&yaml::from_str(&yaml_text).unwrap()), ["z", "m", "a"]);
}

#[test]
fn tags_strip_where_the_format_cannot_carry_them() {
    let tagged = Value::tagged(Value::from("!custom"), Value::from(json!({"a": 1})));
    // JSON drops tags entirely.
    let text = json_format::write_to_string(&tagged).unwrap();
    assert_eq!(
        json_format::from_str(&text).unwrap(),
        tagged.strip_tags()
    );
    // YAML keeps local tags.
    let text = yaml::to_string(&tagged).unwrap();
    assert_eq!(yaml::from_str(&text).unwrap(), tagged);
}
