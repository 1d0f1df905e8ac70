//! Default-value resolution
//!
//! Walks the attribute tree alongside a record. Absent leaves with a default
//! are filled in; supplied values are never replaced. Nested maps are rebuilt
//! even when absent from the record, as long as some child has a default.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::types::{AttributeSpec, AttributeTree, DefaultValue};

/// Returns `record` with defaults applied.
///
/// The clock is read once per call, so every `DefaultValue::Now` leaf in
/// the record gets the same instant. A non-object record is returned as is.
pub fn apply_defaults(tree: &AttributeTree, record: &Value) -> Value {
    let now = Utc::now();
    match record {
        Value::Object(obj) => Value::Object(apply_to_object(tree, Some(obj), &now)),
        other => other.clone(),
    }
}

fn apply_to_object(tree: &AttributeTree, obj: Option<&Map<String, Value>>, now: &DateTime<Utc>) -> Map<String, Value> {
    let mut out = obj.cloned().unwrap_or_default();

    for (name, spec) in tree {
        match spec {
            AttributeSpec::Leaf(attr) => {
                if out.contains_key(name) {
                    continue;
                }
                if let Some(default) = &attr.default {
                    out.insert(name.clone(), resolve_default(default, now));
                }
            }
            AttributeSpec::Map(children) => {
                let nested = match out.get(name) {
                    Some(Value::Object(child)) => Some(apply_to_object(children, Some(child), now)),
                    Some(_) => None,
                    None => Some(apply_to_object(children, None, now)).filter(|m| !m.is_empty()),
                };
                if let Some(nested) = nested {
                    out.insert(name.clone(), Value::Object(nested));
                }
            }
        }
    }

    out
}

fn resolve_default(default: &DefaultValue, now: &DateTime<Utc>) -> Value {
    match default {
        DefaultValue::Constant(value) => value.clone(),
        DefaultValue::Provider(f) => f(),
        DefaultValue::Now => Value::String(format_date(now)),
    }
}

/// Date attribute wire format: RFC 3339, UTC, millisecond precision
pub fn format_date(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
