//! Output-format behavior: basic, detailed, verbose, annotation scoping
//! and keyword execution order.
use serde_json::json;
use solidus::Schema;
use solidus_value::Value;

fn compile(schema: serde_json::Value) -> Schema {
    Schema::new(&Value::from(schema)).expect("Invalid schema")
}

#[test]
fn basic_output_serializes_like_the_spec() {
    let schema = compile(json!({"title": "string value", "type": "string"}));
    let instance = Value::from("some string");
    let output = schema.apply(&instance).basic();
    assert_eq!(
        serde_json::to_value(&output).unwrap(),
        json!({
            "valid": true,
            "annotations": [
                {
                    "keywordLocation": "",
                    "instanceLocation": "",
                    "annotations": {"title": "string value"}
                }
            ]
        })
    );
}

#[test]
fn invalid_basic_output_lists_errors_with_locations() {
    let schema = compile(json!({"properties": {"a": {"type": "integer"}}}));
    let instance = Value::from(json!({"a": "x"}));
    let output = schema.apply(&instance).basic();
    assert!(!output.is_valid());
    let errors: Vec<_> = output.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].keyword_location().to_string(), "/properties/a/type");
    assert_eq!(errors[0].instance_location().to_string(), "/a");
}

#[test]
fn flag_matches_is_valid() {
    let schema = compile(json!({"minimum": 2}));
    assert!(schema.apply(&Value::from(3)).flag());
    assert!(!schema.apply(&Value::from(1)).flag());
}

#[test]
fn verbose_preserves_every_applied_keyword() {
    let schema = compile(json!({
        "type": "object",
        "properties": {"a": {"type": "integer", "minimum": 0}}
    }));
    let instance = Value::from(json!({"a": 3}));
    let tree = schema.apply(&instance).verbose();
    assert!(tree.valid);
    let mut locations = Vec::new();
    tree.walk(&mut |node| {
        if let Some(unit) = &node.unit {
            locations.push(unit.keyword_location().to_string());
        }
    });
    // Passing assertions appear even without annotations.
    assert!(locations.contains(&"/type".to_string()));
    assert!(locations.contains(&"/properties/a/minimum".to_string()));
}

#[test]
fn detailed_prunes_silent_passes() {
    let schema = compile(json!({
        "type": "object",
        "properties": {"a": {"type": "integer"}}
    }));
    let instance = Value::from(json!({"a": 3}));
    let detailed = schema.apply(&instance).detailed();
    let mut passes = 0;
    detailed.walk(&mut |node| {
        if let Some(unit) = &node.unit {
            if unit.annotations().is_none() && unit.error_description().is_none() {
                passes += 1;
            }
        }
    });
    assert_eq!(passes, 0, "detailed keeps only informative units");
}

#[test]
fn annotations_from_failed_branches_never_surface() {
    let schema = compile(json!({
        "oneOf": [
            {"title": "object branch", "type": "object"},
            {"title": "string branch", "type": "string"}
        ]
    }));
    let instance = Value::from("text");
    let rendered = serde_json::to_string(&schema.apply(&instance).basic()).unwrap();
    assert!(rendered.contains("string branch"));
    assert!(!rendered.contains("object branch"));
}

#[test]
fn annotations_vanish_when_the_whole_schema_fails() {
    let schema = compile(json!({
        "title": "top",
        "type": "object",
        "required": ["missing"]
    }));
    let instance = Value::from(json!({}));
    let output = schema.apply(&instance).basic();
    assert!(!output.is_valid());
    assert_eq!(output.annotations().count(), 0);
}

#[test]
fn assertions_run_before_structural_applicators() {
    // Declared out of order on purpose: the execution order still puts
    // `type` first and `unevaluatedProperties` last.
    let schema = compile(json!({
        "unevaluatedProperties": false,
        "properties": {"a": true},
        "type": "object"
    }));
    let instance = Value::from(json!({"a": 1}));
    let output = schema.apply(&instance).basic();
    let keywords: Vec<String> = output
        .iter_units()
        .filter_map(|unit| unit.keyword())
        .filter(|keyword| unit_is_top_level(keyword))
        .collect();
    let type_index = keywords.iter().position(|k| k == "type").unwrap();
    let properties_index = keywords.iter().position(|k| k == "properties").unwrap();
    let unevaluated_index = keywords
        .iter()
        .position(|k| k == "unevaluatedProperties")
        .unwrap();
    assert!(type_index < properties_index);
    assert!(properties_index < unevaluated_index);
}

fn unit_is_top_level(keyword: &str) -> bool {
    matches!(keyword, "type" | "properties" | "unevaluatedProperties")
}

#[test]
fn additional_properties_sees_sibling_matches_regardless_of_order() {
    let schema = compile(json!({
        "additionalProperties": false,
        "properties": {"a": true}
    }));
    assert!(schema.is_valid(&Value::from(json!({"a": 1}))));
    assert!(!schema.is_valid(&Value::from(json!({"b": 1}))));
}

#[test]
fn absolute_keyword_locations_use_the_canonical_id() {
    let schema = compile(json!({
        "$id": "https://example.com/root",
        "properties": {"a": {"type": "integer"}}
    }));
    let instance = Value::from(json!({"a": "x"}));
    let output = schema.apply(&instance).basic();
    let error = output.errors().next().unwrap();
    let absolute = error.absolute_keyword_location().unwrap();
    assert!(absolute.as_str().starts_with("https://example.com/root"));
    assert!(absolute.as_str().contains("properties"));
}
