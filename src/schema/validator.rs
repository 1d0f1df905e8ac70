//! Record validation against an attribute tree
//!
//! Validation semantics:
//! - Required attributes must be present
//! - Undeclared attributes are rejected unless `allow_unknown` is set
//! - Values must match the leaf kind; null is never accepted
//! - String formats (email, guid) and array item rules are enforced
//! - Dates are RFC 3339, `YYYY-MM-DD[THH:MM:SS[.fff]]`, or integer epoch
//!   milliseconds
//!
//! Failures are reported in the returned `Validation`, never as `Err`.
//! With `convert`, numeric and boolean strings are coerced in the returned
//! value; the input record is never mutated.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::sync::OnceLock;
use uuid::Uuid;

use super::config::ValidationOptions;
use super::errors::{ValidationDetails, ValidationError};
use super::types::{Attribute, AttributeSpec, AttributeTree, BaseKind, StringFormat};

static EMAIL_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

/// Outcome of validating one record
#[derive(Debug, Clone)]
pub struct Validation {
    /// `None` when the record is valid
    pub error: Option<ValidationError>,
    /// The record after conversion
    pub value: Value,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Validates `record` against `tree`.
pub fn validate_record(tree: &AttributeTree, record: &Value, options: &ValidationOptions) -> Validation {
    let mut walker = RecordValidator {
        options,
        details: Vec::new(),
    };

    let value = match record.as_object() {
        Some(obj) => Value::Object(walker.validate_object(obj, tree, "")),
        None => {
            walker.report(ValidationDetails::type_mismatch("$root", "object", json_type_name(record)));
            record.clone()
        }
    };

    Validation {
        error: ValidationError::new(walker.details),
        value,
    }
}

struct RecordValidator<'a> {
    options: &'a ValidationOptions,
    details: Vec<ValidationDetails>,
}

impl RecordValidator<'_> {
    fn report(&mut self, details: ValidationDetails) {
        self.details.push(details);
    }

    fn done(&self) -> bool {
        self.options.abort_early && !self.details.is_empty()
    }

    /// Validates an object against a map node, returning the converted object.
    fn validate_object(
        &mut self,
        obj: &Map<String, Value>,
        fields: &AttributeTree,
        path_prefix: &str,
    ) -> Map<String, Value> {
        let mut out = Map::new();

        for (key, value) in obj {
            if fields.contains_key(key) {
                continue;
            }
            if !self.options.allow_unknown {
                self.report(ValidationDetails::extra_field(make_path(path_prefix, key)));
                if self.done() {
                    return out;
                }
            }
            out.insert(key.clone(), value.clone());
        }

        for (name, spec) in fields {
            if self.done() {
                break;
            }
            let field_path = make_path(path_prefix, name);

            match (obj.get(name), spec) {
                (Some(value), AttributeSpec::Leaf(attr)) => {
                    let converted = self.validate_value(value, attr, &field_path);
                    out.insert(name.clone(), converted);
                }
                (Some(Value::Object(child)), AttributeSpec::Map(children)) => {
                    let converted = self.validate_object(child, children, &field_path);
                    out.insert(name.clone(), Value::Object(converted));
                }
                (Some(Value::Null), AttributeSpec::Map(_)) => {
                    self.report(ValidationDetails::null_value(&field_path));
                }
                (Some(other), AttributeSpec::Map(_)) => {
                    self.report(ValidationDetails::type_mismatch(
                        &field_path,
                        "object",
                        json_type_name(other),
                    ));
                }
                (None, AttributeSpec::Leaf(attr)) if attr.required => {
                    self.report(ValidationDetails::missing_field(&field_path));
                }
                (None, _) => {}
            }
        }

        out
    }

    /// Validates a value against a leaf rule, returning the converted value.
    fn validate_value(&mut self, value: &Value, attr: &Attribute, field_path: &str) -> Value {
        if value.is_null() {
            self.report(ValidationDetails::null_value(field_path));
            return value.clone();
        }

        match attr.kind {
            BaseKind::String => {
                let Some(s) = value.as_str() else {
                    return self.mismatch(field_path, attr.kind, value);
                };
                if let Some(format) = attr.format {
                    if !matches_format(s, format) {
                        self.report(ValidationDetails::bad_format(field_path, format.format_name()));
                    }
                }
                value.clone()
            }
            BaseKind::Number => match value {
                Value::Number(_) => value.clone(),
                Value::String(s) if self.options.convert => match parse_number(s) {
                    Some(n) => Value::Number(n),
                    None => self.mismatch(field_path, attr.kind, value),
                },
                _ => self.mismatch(field_path, attr.kind, value),
            },
            BaseKind::Boolean => match value {
                Value::Bool(_) => value.clone(),
                Value::String(s) if self.options.convert && (s == "true" || s == "false") => {
                    Value::Bool(s == "true")
                }
                _ => self.mismatch(field_path, attr.kind, value),
            },
            BaseKind::Date => {
                let valid = match value {
                    Value::String(s) => is_date_string(s),
                    Value::Number(n) => n.is_i64() || n.is_u64(),
                    _ => false,
                };
                if !valid {
                    return self.mismatch(field_path, attr.kind, value);
                }
                value.clone()
            }
            BaseKind::Binary => {
                let valid = value.as_str().is_some_and(|s| STANDARD.decode(s).is_ok());
                if !valid {
                    return self.mismatch(field_path, attr.kind, value);
                }
                value.clone()
            }
            BaseKind::Array => {
                let Some(arr) = value.as_array() else {
                    return self.mismatch(field_path, attr.kind, value);
                };
                let Some(item) = attr.items.as_deref() else {
                    return value.clone();
                };

                let mut out = Vec::with_capacity(arr.len());
                for (i, elem) in arr.iter().enumerate() {
                    if self.done() {
                        break;
                    }
                    let elem_path = format!("{}[{}]", field_path, i);
                    out.push(self.validate_value(elem, item, &elem_path));
                }
                Value::Array(out)
            }
            BaseKind::Object => {
                if !value.is_object() {
                    return self.mismatch(field_path, attr.kind, value);
                }
                value.clone()
            }
        }
    }

    fn mismatch(&mut self, field_path: &str, expected: BaseKind, actual: &Value) -> Value {
        self.report(ValidationDetails::type_mismatch(
            field_path,
            expected.kind_name(),
            json_type_name(actual),
        ));
        actual.clone()
    }
}

fn matches_format(s: &str, format: StringFormat) -> bool {
    match format {
        StringFormat::Email => {
            let pattern = EMAIL_PATTERN.get_or_init(|| {
                Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$").ok()
            });
            pattern.as_ref().is_some_and(|re| re.is_match(s))
        }
        StringFormat::Guid => Uuid::try_parse(s).is_ok(),
    }
}

/// RFC 3339, or an ISO 8601 date / local datetime without an offset
fn is_date_string(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || s.parse::<NaiveDateTime>().is_ok()
        || s.parse::<NaiveDate>().is_ok()
}

fn parse_number(s: &str) -> Option<Number> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Creates a field path from prefix and field name.
fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}
