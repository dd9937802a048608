//! Tests for flatten module

use super::*;
use crate::schema::{flatten_schema, StreamPlan};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn plan_for(schema: Value, separator: &str, normalize: bool) -> StreamPlan {
    let fields = flatten_schema("test", &schema, separator, normalize).unwrap();
    StreamPlan::new("test", fields, Vec::new(), Vec::new(), Vec::new())
}

fn record(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().unwrap().clone()
}

#[test]
fn test_flatten_nested_object() {
    let plan = plan_for(
        json!({"properties": {
            "a": {"type": ["null", "object"], "properties": {
                "b": {"type": ["null", "integer"]}
            }}
        }}),
        "_",
        false,
    );
    let flattener = RecordFlattener::new("_", false);

    let row = flattener
        .flatten(&plan, &record(json!({"a": {"b": 1}})))
        .unwrap();

    assert_eq!(plan.fields[0].name, "a_b");
    assert_eq!(row, vec![json!(1)]);
}

#[test]
fn test_flatten_deep_nesting_with_default_separator() {
    let plan = plan_for(
        json!({"properties": {
            "key_1": {"type": ["null", "integer"]},
            "key_2": {"type": ["null", "object"], "properties": {
                "key_3": {"type": ["null", "string"]},
                "key_4": {"type": ["null", "object"], "properties": {
                    "key_5": {"type": ["null", "integer"]},
                    "key_6": {"type": ["null", "array"]}
                }}
            }}
        }}),
        "__",
        false,
    );
    let flattener = RecordFlattener::new("__", false);

    let names: Vec<&str> = plan.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "key_1",
            "key_2__key_3",
            "key_2__key_4__key_5",
            "key_2__key_4__key_6"
        ]
    );

    let row = flattener
        .flatten(
            &plan,
            &record(json!({
                "key_1": 1,
                "key_2": {"key_3": "two", "key_4": {"key_5": 3, "key_6": ["10", "11"]}}
            })),
        )
        .unwrap();

    assert_eq!(
        row,
        vec![
            json!(1),
            json!("two"),
            json!(3),
            json!("[\"10\",\"11\"]")
        ]
    );
}

#[test]
fn test_missing_fields_are_null() {
    let plan = plan_for(
        json!({"properties": {
            "a": {"type": ["null", "integer"]},
            "b": {"type": ["null", "string"]}
        }}),
        "__",
        false,
    );
    let flattener = RecordFlattener::new("__", false);

    let row = flattener.flatten(&plan, &record(json!({"a": 7}))).unwrap();
    assert_eq!(row, vec![json!(7), Value::Null]);
}

#[test]
fn test_undeclared_fields_ignored() {
    let plan = plan_for(
        json!({"properties": {"a": {"type": ["integer"]}}}),
        "__",
        false,
    );
    let flattener = RecordFlattener::new("__", false);

    let row = flattener
        .flatten(&plan, &record(json!({"a": 1, "surprise": "ignored"})))
        .unwrap();
    assert_eq!(row, vec![json!(1)]);
}

#[test]
fn test_scalar_coercions_to_string() {
    let plan = plan_for(
        json!({"properties": {
            "s": {"type": ["null", "string"]}
        }}),
        "__",
        false,
    );
    let flattener = RecordFlattener::new("__", false);

    let row = flattener.flatten(&plan, &record(json!({"s": 42}))).unwrap();
    assert_eq!(row, vec![json!("42")]);

    let row = flattener
        .flatten(&plan, &record(json!({"s": true})))
        .unwrap();
    assert_eq!(row, vec![json!("true")]);
}

#[test]
fn test_object_where_scalar_expected_is_flatten_error() {
    let plan = plan_for(
        json!({"properties": {"n": {"type": ["null", "number"]}}}),
        "__",
        false,
    );
    let flattener = RecordFlattener::new("__", false);

    let err = flattener
        .flatten(&plan, &record(json!({"n": [1, 2]})))
        .unwrap_err();
    assert!(!err.is_fatal());
    let message = err.to_string();
    assert!(message.contains("test"));
    assert!(message.contains('n'));
}

#[test]
fn test_fractional_number_for_integer_field_is_error() {
    let plan = plan_for(
        json!({"properties": {"count": {"type": ["null", "integer"]}}}),
        "__",
        false,
    );
    let flattener = RecordFlattener::new("__", false);

    let err = flattener
        .flatten(&plan, &record(json!({"count": 1.5})))
        .unwrap_err();
    assert!(err.to_string().contains("count"));
}

#[test]
fn test_snake_case_normalization() {
    let plan = plan_for(
        json!({"properties": {"Key 1 > #1": {"type": ["null", "string"]}}}),
        "__",
        true,
    );
    let flattener = RecordFlattener::new("__", true);

    assert_eq!(plan.fields[0].name, "key_1_1");

    let row = flattener
        .flatten(&plan, &record(json!({"Key 1 > #1": "hit"})))
        .unwrap();
    assert_eq!(row, vec![json!("hit")]);
}

#[test]
fn test_extra_values_injected() {
    let fields = flatten_schema(
        "test",
        &json!({"properties": {"a": {"type": ["integer"]}}}),
        "__",
        false,
    )
    .unwrap();
    let mut fields = fields;
    fields.push(crate::schema::FlatField {
        name: "env".to_string(),
        kind: crate::schema::FieldKind::String,
        nullable: false,
    });
    let plan = StreamPlan::new(
        "test",
        fields,
        vec![(1, json!("prod"))],
        Vec::new(),
        Vec::new(),
    );
    let flattener = RecordFlattener::new("__", false);

    let row = flattener.flatten(&plan, &record(json!({"a": 1}))).unwrap();
    assert_eq!(row, vec![json!(1), json!("prod")]);
}
