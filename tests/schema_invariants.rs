//! Schema Invariant Tests
//!
//! Behaviour of a constructed schema:
//! - Keys and table name are stored as configured
//! - Timestamps are injected and typed as DATE
//! - Index declarations are checked and partitioned
//! - Type inference mirrors the attribute tree
//! - Validation reports instead of failing
//! - Defaults fill absent attributes, including nested ones

use dynoschema::schema::{IndexKind, SchemaError};
use dynoschema::{
    binary_set, number_set, string_set, time_uuid, uuid, Attribute, AttributeSpec, IndexConfig,
    Schema, SchemaConfig, TableName, TimestampName, TypeCode, ValidationOptions,
};
use serde_json::{json, Value};
use std::sync::Arc;

// =============================================================================
// Helper Functions
// =============================================================================

fn datatypes(schema: &Schema) -> Value {
    serde_json::to_value(schema.datatypes()).unwrap()
}

fn attribute_names(schema: &Schema) -> Vec<&str> {
    schema.attributes().keys().map(String::as_str).collect()
}

fn with_id(config: SchemaConfig) -> SchemaConfig {
    config.attribute("id", Attribute::string())
}

// =============================================================================
// Setup Tests
// =============================================================================

#[test]
fn test_sets_hash_key() {
    let schema = Schema::new(SchemaConfig::new("id")).unwrap();
    assert_eq!(schema.hash_key(), "id");
    assert_eq!(schema.range_key(), None);
}

#[test]
fn test_sets_hash_and_range_key() {
    let schema = Schema::new(SchemaConfig::new("id").range_key("date")).unwrap();
    assert_eq!(schema.hash_key(), "id");
    assert_eq!(schema.range_key(), Some("date"));
}

#[test]
fn test_table_name_string() {
    let schema = Schema::new(SchemaConfig::new("id").table_name("test-table")).unwrap();
    match schema.table_name() {
        Some(TableName::Literal(name)) => assert_eq!(name, "test-table"),
        other => panic!("expected literal, got {:?}", other),
    }
}

#[test]
fn test_table_name_function_not_resolved_at_construction() {
    let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let schema = Schema::new(SchemaConfig::new("id").table_name_with(move || {
        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        "test-table".to_string()
    }))
    .unwrap();

    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(schema.table_name().unwrap().resolve(), "test-table");
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn test_adds_timestamps() {
    let schema = Schema::new(with_id(SchemaConfig::new("id").timestamps(true))).unwrap();
    assert!(schema.timestamps());
    assert_eq!(attribute_names(&schema), vec!["createdAt", "id", "updatedAt"]);
    assert_eq!(
        datatypes(&schema),
        json!({ "id": "S", "createdAt": "DATE", "updatedAt": "DATE" })
    );
}

#[test]
fn test_adds_timestamps_with_custom_names() {
    let config = with_id(
        SchemaConfig::new("id")
            .timestamps(true)
            .created_at(TimestampName::Named("created".into()))
            .updated_at(TimestampName::Named("updated".into())),
    );
    let schema = Schema::new(config).unwrap();
    assert_eq!(schema.created_at(), Some("created"));
    assert_eq!(schema.updated_at(), Some("updated"));
    assert_eq!(
        datatypes(&schema),
        json!({ "id": "S", "created": "DATE", "updated": "DATE" })
    );
}

#[test]
fn test_only_created_at() {
    let config = with_id(
        SchemaConfig::new("id")
            .timestamps(true)
            .updated_at(TimestampName::Disabled),
    );
    let schema = Schema::new(config).unwrap();
    assert!(schema.timestamps());
    assert_eq!(datatypes(&schema), json!({ "id": "S", "createdAt": "DATE" }));
    assert_eq!(schema.updated_at(), None);
}

#[test]
fn test_only_updated_at() {
    let config = with_id(
        SchemaConfig::new("id")
            .timestamps(true)
            .created_at(TimestampName::Disabled),
    );
    let schema = Schema::new(config).unwrap();
    assert_eq!(datatypes(&schema), json!({ "id": "S", "updatedAt": "DATE" }));
}

#[test]
fn test_only_custom_created_timestamp() {
    let config = with_id(
        SchemaConfig::new("id")
            .timestamps(true)
            .created_at(TimestampName::Named("fooCreate".into()))
            .updated_at(TimestampName::Disabled),
    );
    let schema = Schema::new(config).unwrap();
    assert_eq!(attribute_names(&schema), vec!["fooCreate", "id"]);
    assert_eq!(datatypes(&schema), json!({ "id": "S", "fooCreate": "DATE" }));
}

#[test]
fn test_timestamp_names_ignored_when_disabled() {
    let config = with_id(
        SchemaConfig::new("id").created_at(TimestampName::Named("created".into())),
    );
    let schema = Schema::new(config).unwrap();
    assert!(!schema.timestamps());
    assert_eq!(datatypes(&schema), json!({ "id": "S" }));
}

#[test]
fn test_missing_hash_key_fails() {
    let config = SchemaConfig::default().range_key("foo");
    assert_eq!(Schema::new(config).unwrap_err(), SchemaError::MissingHashKey);
}

// =============================================================================
// Index Tests
// =============================================================================

#[test]
fn test_local_index_with_hash_and_range_key() {
    let config = SchemaConfig::new("foo")
        .index(IndexConfig::local("LocalBarIndex", "bar").with_hash_key("foo"));
    let schema = Schema::new(config).unwrap();
    assert!(schema.secondary_indexes().contains_key("LocalBarIndex"));
    assert!(schema.global_indexes().is_empty());
}

#[test]
fn test_local_index_with_only_range_key() {
    let config = SchemaConfig::new("foo").index(IndexConfig::local("LocalBarIndex", "bar"));
    let schema = Schema::new(config).unwrap();
    let index = &schema.secondary_indexes()["LocalBarIndex"];
    assert_eq!(index.hash_key, "foo");
    assert_eq!(index.kind, IndexKind::Local);
    assert!(schema.global_indexes().is_empty());
}

#[test]
fn test_local_index_without_range_key_fails() {
    let raw = IndexConfig {
        name: Some("LocalBarIndex".into()),
        index_type: "local".into(),
        hash_key: Some("foo".into()),
        ..IndexConfig::default()
    };
    let err = Schema::new(SchemaConfig::new("foo").index(raw)).unwrap_err();
    assert_eq!(
        err,
        SchemaError::MissingIndexRangeKey {
            index: "LocalBarIndex".into()
        }
    );
    assert!(err.to_string().contains("rangeKey is missing"));
}

#[test]
fn test_local_index_hash_key_mismatch_fails() {
    let config = SchemaConfig::new("foo")
        .index(IndexConfig::local("LocalDateIndex", "date").with_hash_key("bar"));
    let err = Schema::new(config).unwrap_err();
    assert_eq!(err.code(), "DYNO_INDEX_HASH_KEY_MISMATCH");
    assert_eq!(err.index_name(), Some("LocalDateIndex"));
}

#[test]
fn test_global_index() {
    let config = SchemaConfig::new("foo").index(IndexConfig::global("GlobalBarIndex", "bar"));
    let schema = Schema::new(config).unwrap();
    assert_eq!(schema.global_indexes()["GlobalBarIndex"].hash_key, "bar");
    assert!(schema.secondary_indexes().is_empty());
}

#[test]
fn test_global_index_without_hash_key_fails() {
    let raw = IndexConfig {
        name: Some("GlobalDateIndex".into()),
        index_type: "global".into(),
        range_key: Some("date".into()),
        ..IndexConfig::default()
    };
    let err = Schema::new(SchemaConfig::new("foo").index(raw)).unwrap_err();
    assert_eq!(err.code(), "DYNO_MISSING_INDEX_HASH_KEY");
}

#[test]
fn test_index_collections_are_disjoint() {
    let config = SchemaConfig::new("foo")
        .index(IndexConfig::local("ByDate", "date"))
        .index(IndexConfig::global("ByBar", "bar").with_range_key("date"));
    let schema = Schema::new(config).unwrap();

    for name in schema.secondary_indexes().keys() {
        assert!(!schema.global_indexes().contains_key(name));
    }
    assert_eq!(schema.secondary_indexes().len(), 1);
    assert_eq!(schema.global_indexes().len(), 1);
}

#[test]
fn test_unknown_index_type_fails() {
    let raw = IndexConfig {
        name: Some("X".into()),
        index_type: "regional".into(),
        hash_key: Some("bar".into()),
        ..IndexConfig::default()
    };
    let err = Schema::new(SchemaConfig::new("foo").index(raw)).unwrap_err();
    assert_eq!(err.code(), "DYNO_INVALID_INDEX_TYPE");
}

// =============================================================================
// Type Inference Tests
// =============================================================================

#[test]
fn test_parses_schema_data_types() {
    let config = SchemaConfig::new("foo")
        .attribute("foo", Attribute::string().default_value("foobar"))
        .attribute("date", Attribute::date().default_now())
        .attribute("count", Attribute::number())
        .attribute("flag", Attribute::boolean())
        .attribute(
            "nums",
            Attribute::array()
                .items(Attribute::number())
                .dynamo_type(TypeCode::NumberSet),
        )
        .attribute("items", Attribute::array())
        .attribute(
            "data",
            AttributeSpec::map([
                ("stuff", Attribute::array().dynamo_type(TypeCode::StringSet).into()),
                (
                    "nested",
                    AttributeSpec::map([
                        ("first", Attribute::string().into()),
                        ("last", Attribute::string().into()),
                        ("nicks", Attribute::array().dynamo_type(TypeCode::StringSet).into()),
                        (
                            "ages",
                            Attribute::array()
                                .dynamo_type(TypeCode::StringSet)
                                .dynamo_type(TypeCode::NumberSet)
                                .into(),
                        ),
                        ("pics", Attribute::array().dynamo_type(TypeCode::BinarySet).into()),
                        ("bin", Attribute::binary().into()),
                    ]),
                ),
            ]),
        );

    let schema = Schema::new(config).unwrap();
    assert_eq!(
        datatypes(&schema),
        json!({
            "foo": "S",
            "date": "DATE",
            "count": "N",
            "flag": "BOOL",
            "nums": "NS",
            "items": "L",
            "data": {
                "nested": {
                    "ages": "NS",
                    "first": "S",
                    "last": "S",
                    "nicks": "SS",
                    "pics": "BS",
                    "bin": "B"
                },
                "stuff": "SS"
            }
        })
    );
    assert_eq!(
        schema.attribute_type("data.nested.pics").and_then(|t| t.as_code()),
        Some(TypeCode::BinarySet)
    );
}

#[test]
fn test_string_set() {
    let config = SchemaConfig::new("email")
        .attribute("email", Attribute::string().email())
        .attribute("names", string_set());
    let schema = Schema::new(config).unwrap();
    assert_eq!(datatypes(&schema), json!({ "email": "S", "names": "SS" }));
}

#[test]
fn test_number_set() {
    let config = SchemaConfig::new("email")
        .attribute("email", Attribute::string().email())
        .attribute("nums", number_set());
    let schema = Schema::new(config).unwrap();
    assert_eq!(datatypes(&schema), json!({ "email": "S", "nums": "NS" }));
}

#[test]
fn test_binary_set() {
    let config = SchemaConfig::new("email")
        .attribute("email", Attribute::string().email())
        .attribute("pics", binary_set());
    let schema = Schema::new(config).unwrap();
    assert_eq!(datatypes(&schema), json!({ "email": "S", "pics": "BS" }));
}

#[test]
fn test_object_leaf_is_generic_map() {
    let config = SchemaConfig::new("id").attribute("blob", Attribute::object());
    let schema = Schema::new(config).unwrap();
    assert_eq!(datatypes(&schema), json!({ "blob": "M" }));
}

// =============================================================================
// Generated Identifier Tests
// =============================================================================

#[test]
fn test_uuid_default() {
    let schema = Schema::new(SchemaConfig::new("id").attribute("id", uuid())).unwrap();
    let record = schema.apply_defaults(&json!({}));
    assert!(!record["id"].as_str().unwrap().is_empty());
    assert!(schema.validate(&record).is_valid());
}

#[test]
fn test_time_uuid_default() {
    let schema = Schema::new(SchemaConfig::new("id").attribute("id", time_uuid())).unwrap();
    let record = schema.apply_defaults(&json!({}));
    assert!(!record["id"].as_str().unwrap().is_empty());
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_validate_string() {
    let schema = Schema::new(
        SchemaConfig::new("email").attribute("email", Attribute::string().email().required()),
    )
    .unwrap();
    assert!(schema.validate(&json!({ "email": "foo@bar.com" })).error.is_none());
}

#[test]
fn test_validate_date() {
    let schema =
        Schema::new(SchemaConfig::new("created").attribute("created", Attribute::date())).unwrap();
    assert!(schema
        .validate(&json!({ "created": "2015-07-04T12:30:00.000Z" }))
        .error
        .is_none());
    assert!(schema.validate(&json!({ "created": 1436013000000i64 })).error.is_none());
}

#[test]
fn test_validation_options_pass_through() {
    let config = SchemaConfig::new("name")
        .attribute("name", Attribute::string())
        .validation(ValidationOptions {
            allow_unknown: true,
            ..ValidationOptions::default()
        });
    let schema = Schema::new(config).unwrap();
    assert!(schema.validate(&json!({ "name": "foo", "age": 1 })).error.is_none());
}

#[test]
fn test_validation_is_deterministic() {
    let schema = Schema::new(
        SchemaConfig::new("email").attribute("email", Attribute::string().required()),
    )
    .unwrap();
    let bad = json!({ "name": "x" });
    let first = schema.validate(&bad).error.unwrap();
    for _ in 0..100 {
        assert_eq!(schema.validate(&bad).error.unwrap(), first);
    }
}

// =============================================================================
// Defaults Tests
// =============================================================================

#[test]
fn test_apply_default_values() {
    let config = SchemaConfig::new("email")
        .attribute("email", Attribute::string())
        .attribute("name", Attribute::string().default_value("Foo Bar"))
        .attribute("age", Attribute::number().default_value(3));
    let schema = Schema::new(config).unwrap();

    let record = schema.apply_defaults(&json!({ "email": "foo@bar.com" }));
    assert_eq!(record, json!({ "email": "foo@bar.com", "name": "Foo Bar", "age": 3 }));
}

#[test]
fn test_apply_default_functions() {
    let config = SchemaConfig::new("email")
        .attribute("email", Attribute::string())
        .attribute("created", Attribute::number().default_with(|| json!(1436013000000i64)))
        .attribute(
            "data",
            AttributeSpec::map([
                ("name", Attribute::string().default_value("Tim Tester").into()),
                ("nick", Attribute::string().default_with(|| json!("foo bar")).into()),
            ]),
        );
    let schema = Schema::new(config).unwrap();

    let expected = json!({
        "email": "foo@bar.com",
        "created": 1436013000000i64,
        "data": { "name": "Tim Tester", "nick": "foo bar" }
    });
    assert_eq!(schema.apply_defaults(&json!({ "email": "foo@bar.com", "data": {} })), expected);
    assert_eq!(schema.apply_defaults(&json!({ "email": "foo@bar.com" })), expected);
}

#[test]
fn test_timestamps_applied_together() {
    let schema = Schema::new(with_id(SchemaConfig::new("id").timestamps(true))).unwrap();
    let record = schema.apply_defaults(&json!({ "id": "a" }));
    assert_eq!(record["createdAt"], record["updatedAt"]);
    assert!(schema.validate(&record).is_valid());
}

#[test]
fn test_apply_defaults_does_not_touch_schema() {
    let schema = Schema::new(
        SchemaConfig::new("id").attribute("n", Attribute::number().default_value(1)),
    )
    .unwrap();
    let before = datatypes(&schema);
    let _ = schema.apply_defaults(&json!({}));
    let _ = schema.validate(&json!({ "n": "bad" }));
    assert_eq!(datatypes(&schema), before);
}

#[test]
fn test_shared_across_threads() {
    let schema = Arc::new(
        Schema::new(
            SchemaConfig::new("id")
                .attribute("id", uuid())
                .attribute("n", Attribute::number().default_value(7)),
        )
        .unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let schema = Arc::clone(&schema);
            std::thread::spawn(move || {
                let record = schema.apply_defaults(&json!({}));
                assert!(schema.validate(&record).is_valid());
                record["id"].as_str().unwrap().to_string()
            })
        })
        .collect();

    let mut ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}
