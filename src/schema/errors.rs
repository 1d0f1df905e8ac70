//! Schema error types
//!
//! Construction errors abort `Schema::new`:
//! - DYNO_MISSING_HASH_KEY
//! - DYNO_MISSING_INDEX_NAME
//! - DYNO_INVALID_INDEX_TYPE
//! - DYNO_MISSING_INDEX_RANGE_KEY
//! - DYNO_INDEX_HASH_KEY_MISMATCH
//! - DYNO_MISSING_INDEX_HASH_KEY
//! - DYNO_DUPLICATE_INDEX_NAME
//! - DYNO_INDEX_CAPACITY_NOT_ALLOWED
//! - DYNO_MALFORMED_DEFINITION
//!
//! Record validation never produces a `SchemaError`; it reports a
//! `ValidationError` inside the returned `Validation`.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Fatal schema construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("hashKey is required")]
    MissingHashKey,

    #[error("index name is required (index #{position})")]
    MissingIndexName { position: usize },

    #[error("index '{index}': type must be one of [local, global], got '{found}'")]
    InvalidIndexType { index: String, found: String },

    #[error("index '{index}': rangeKey is missing; local indexes require a rangeKey")]
    MissingIndexRangeKey { index: String },

    #[error("index '{index}': hashKey '{found}' must match table hashKey '{expected}'")]
    IndexHashKeyMismatch {
        index: String,
        expected: String,
        found: String,
    },

    #[error("index '{index}': hashKey is required for global indexes")]
    MissingIndexHashKey { index: String },

    #[error("index '{index}' is declared more than once")]
    DuplicateIndexName { index: String },

    #[error("index '{index}': read/write capacity is only allowed on global indexes")]
    IndexCapacityNotAllowed { index: String },

    #[error("malformed table definition '{source_name}': {reason}")]
    MalformedDefinition { source_name: String, reason: String },
}

impl SchemaError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::MissingHashKey => "DYNO_MISSING_HASH_KEY",
            SchemaError::MissingIndexName { .. } => "DYNO_MISSING_INDEX_NAME",
            SchemaError::InvalidIndexType { .. } => "DYNO_INVALID_INDEX_TYPE",
            SchemaError::MissingIndexRangeKey { .. } => "DYNO_MISSING_INDEX_RANGE_KEY",
            SchemaError::IndexHashKeyMismatch { .. } => "DYNO_INDEX_HASH_KEY_MISMATCH",
            SchemaError::MissingIndexHashKey { .. } => "DYNO_MISSING_INDEX_HASH_KEY",
            SchemaError::DuplicateIndexName { .. } => "DYNO_DUPLICATE_INDEX_NAME",
            SchemaError::IndexCapacityNotAllowed { .. } => "DYNO_INDEX_CAPACITY_NOT_ALLOWED",
            SchemaError::MalformedDefinition { .. } => "DYNO_MALFORMED_DEFINITION",
        }
    }

    /// Returns the offending index name, if the error concerns one
    pub fn index_name(&self) -> Option<&str> {
        match self {
            SchemaError::InvalidIndexType { index, .. }
            | SchemaError::MissingIndexRangeKey { index }
            | SchemaError::IndexHashKeyMismatch { index, .. }
            | SchemaError::MissingIndexHashKey { index }
            | SchemaError::DuplicateIndexName { index }
            | SchemaError::IndexCapacityNotAllowed { index } => Some(index),
            _ => None,
        }
    }

    pub(crate) fn malformed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::MalformedDefinition {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for schema construction
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Category of a record validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// Required attribute absent
    Required,
    /// Attribute not declared in the schema
    Unknown,
    /// Value of the wrong kind
    TypeMismatch,
    /// Null where a value is expected
    NullValue,
    /// String failed its format check
    Format,
}

impl ValidationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationErrorKind::Required => "required",
            ValidationErrorKind::Unknown => "unknown",
            ValidationErrorKind::TypeMismatch => "type_mismatch",
            ValidationErrorKind::NullValue => "null_value",
            ValidationErrorKind::Format => "format",
        }
    }
}

/// One validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDetails {
    pub kind: ValidationErrorKind,
    /// Attribute path (e.g., "data.nested.first", "tags[1]")
    pub path: String,
    pub message: String,
}

impl ValidationDetails {
    pub fn new(kind: ValidationErrorKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn missing_field(path: impl Into<String>) -> Self {
        let path = path.into();
        let message = format!("\"{}\" is required", path);
        Self::new(ValidationErrorKind::Required, path, message)
    }

    pub fn extra_field(path: impl Into<String>) -> Self {
        let path = path.into();
        let message = format!("\"{}\" is not allowed", path);
        Self::new(ValidationErrorKind::Unknown, path, message)
    }

    pub fn type_mismatch(path: impl Into<String>, expected: &str, actual: &str) -> Self {
        let path = path.into();
        let message = format!("\"{}\" must be a {}, got {}", path, expected, actual);
        Self::new(ValidationErrorKind::TypeMismatch, path, message)
    }

    pub fn null_value(path: impl Into<String>) -> Self {
        let path = path.into();
        let message = format!("\"{}\" must not be null", path);
        Self::new(ValidationErrorKind::NullValue, path, message)
    }

    pub fn bad_format(path: impl Into<String>, format: &str) -> Self {
        let path = path.into();
        let message = format!("\"{}\" must be a valid {}", path, format);
        Self::new(ValidationErrorKind::Format, path, message)
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Validation failure report; always holds at least one detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    details: Vec<ValidationDetails>,
}

impl ValidationError {
    pub(crate) fn new(details: Vec<ValidationDetails>) -> Option<Self> {
        if details.is_empty() {
            None
        } else {
            Some(Self { details })
        }
    }

    /// First failure found
    pub fn first(&self) -> &ValidationDetails {
        &self.details[0]
    }

    pub fn details(&self) -> &[ValidationDetails] {
        &self.details
    }

    pub fn kind(&self) -> ValidationErrorKind {
        self.first().kind
    }

    pub fn path(&self) -> &str {
        &self.first().path
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<_> = self.details.iter().map(|d| d.message.as_str()).collect();
        write!(f, "{}", messages.join(". "))
    }
}

impl std::error::Error for ValidationError {}
