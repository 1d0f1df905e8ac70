//! Table schema definition and validation
//!
//! A `Schema` is built once from a `SchemaConfig` and is immutable afterwards.
//!
//! # Construction pipeline
//!
//! 1. Timestamp attributes are injected into the attribute tree
//! 2. Hash/range key and secondary indexes are checked
//! 3. Store type codes are inferred for every attribute
//!
//! Any configuration error aborts construction; no partial schema escapes.
//!
//! # Runtime
//!
//! `validate` and `apply_defaults` read the schema and never mutate it, so
//! one schema can be shared freely across threads.

mod config;
mod defaults;
mod errors;
mod inference;
mod keys;
mod loader;
mod timestamps;
mod types;
mod validator;
pub mod virtual_types;

use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::observability::{Event, Logger};

pub use config::{IndexConfig, SchemaConfig, TableName, TimestampName, ValidationOptions};
pub use defaults::format_date;
pub use errors::{
    SchemaError, SchemaResult, ValidationDetails, ValidationError, ValidationErrorKind,
};
pub use inference::infer_leaf;
pub use keys::{
    IndexDefinition, IndexKind, IndexMap, KeyDefinition, Projection, ProjectionType,
};
pub use loader::{parse_definition, SchemaLoader};
pub use timestamps::{DEFAULT_CREATED_AT, DEFAULT_UPDATED_AT};
pub use types::{
    Attribute, AttributeSpec, AttributeTree, BaseKind, DefaultFn, DefaultValue, StringFormat,
    TypeCode, TypeMap, TypeNode,
};
pub use validator::Validation;

/// Resolved table schema
#[derive(Debug, Clone)]
pub struct Schema {
    key: KeyDefinition,
    table_name: Option<TableName>,
    timestamps: bool,
    created_at: Option<String>,
    updated_at: Option<String>,
    attributes: AttributeTree,
    datatypes: TypeMap,
    secondary_indexes: IndexMap,
    global_indexes: IndexMap,
    validation: ValidationOptions,
}

impl Schema {
    /// Builds a schema from a table definition.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if the hash key is missing or any index
    /// declaration is invalid.
    pub fn new(config: SchemaConfig) -> SchemaResult<Self> {
        match Self::build(config) {
            Ok(schema) => {
                schema.log_built();
                Ok(schema)
            }
            Err(err) => {
                let message = err.to_string();
                Logger::error(
                    Event::SchemaRejected,
                    &[("code", err.code()), ("message", message.as_str())],
                );
                Err(err)
            }
        }
    }

    fn build(config: SchemaConfig) -> SchemaResult<Self> {
        let SchemaConfig {
            hash_key,
            range_key,
            table_name,
            schema: mut attributes,
            timestamps: enabled,
            created_at,
            updated_at,
            indexes,
            validation,
        } = config;

        let declared = !attributes.is_empty();
        let stamps = timestamps::inject_timestamps(&mut attributes, enabled, &created_at, &updated_at);
        let resolved = keys::resolve_keys(hash_key.as_deref(), range_key.as_deref(), &indexes)?;
        let datatypes = inference::infer_types(&attributes);

        let schema = Self {
            key: resolved.key,
            table_name,
            timestamps: enabled,
            created_at: stamps.created_at,
            updated_at: stamps.updated_at,
            attributes,
            datatypes,
            secondary_indexes: resolved.secondary_indexes,
            global_indexes: resolved.global_indexes,
            validation,
        };

        if declared {
            schema.warn_undeclared_keys();
        }

        Ok(schema)
    }

    /// Partition key attribute name
    pub fn hash_key(&self) -> &str {
        &self.key.hash_key
    }

    /// Sort key attribute name
    pub fn range_key(&self) -> Option<&str> {
        self.key.range_key.as_deref()
    }

    pub fn key(&self) -> &KeyDefinition {
        &self.key
    }

    /// Table name exactly as configured; resolution is left to the caller
    pub fn table_name(&self) -> Option<&TableName> {
        self.table_name.as_ref()
    }

    pub fn timestamps(&self) -> bool {
        self.timestamps
    }

    /// Name of the generated creation timestamp, if enabled
    pub fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    /// Name of the generated update timestamp, if enabled
    pub fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }

    /// Finalized attribute tree, timestamps included
    pub fn attributes(&self) -> &AttributeTree {
        &self.attributes
    }

    /// Inferred store type of every attribute
    pub fn datatypes(&self) -> &TypeMap {
        &self.datatypes
    }

    /// Inferred type at a dotted path such as `data.nested.first`
    pub fn attribute_type(&self, path: &str) -> Option<&TypeNode> {
        inference::lookup(&self.datatypes, path)
    }

    /// Local secondary indexes by name
    pub fn secondary_indexes(&self) -> &IndexMap {
        &self.secondary_indexes
    }

    /// Global secondary indexes by name
    pub fn global_indexes(&self) -> &IndexMap {
        &self.global_indexes
    }

    pub fn validation_options(&self) -> &ValidationOptions {
        &self.validation
    }

    /// Type codes of every declared table and index key attribute.
    ///
    /// Keys the attribute tree does not declare, or that resolve to a nested
    /// map, are left out.
    pub fn key_types(&self) -> BTreeMap<String, TypeCode> {
        let names = std::iter::once(self.key.hash_key.as_str())
            .chain(self.key.range_key.as_deref())
            .chain(
                self.secondary_indexes
                    .values()
                    .chain(self.global_indexes.values())
                    .flat_map(|index| {
                        std::iter::once(index.hash_key.as_str()).chain(index.range_key.as_deref())
                    }),
            );

        names
            .filter_map(|name| {
                let code = self.datatypes.get(name)?.as_code()?;
                Some((name.to_string(), code))
            })
            .collect()
    }

    /// Validates a record with the configured options.
    ///
    /// Never fails: problems are reported in `Validation::error`.
    pub fn validate(&self, record: &Value) -> Validation {
        validator::validate_record(&self.attributes, record, &self.validation)
    }

    /// Validates a record with caller-supplied options
    pub fn validate_with(&self, record: &Value, options: &ValidationOptions) -> Validation {
        validator::validate_record(&self.attributes, record, options)
    }

    /// Returns a copy of `record` with defaults resolved for absent
    /// attributes, including inside absent nested maps.
    pub fn apply_defaults(&self, record: &Value) -> Value {
        defaults::apply_defaults(&self.attributes, record)
    }

    /// JSON summary of keys, types and indexes
    pub fn describe(&self) -> Value {
        json!({
            "hashKey": self.key.hash_key,
            "rangeKey": self.key.range_key,
            "tableName": self.table_name.as_ref().map(TableName::resolve),
            "timestamps": self.timestamps,
            "createdAt": self.created_at,
            "updatedAt": self.updated_at,
            "datatypes": self.datatypes,
            "secondaryIndexes": self.secondary_indexes,
            "globalIndexes": self.global_indexes,
        })
    }

    fn log_built(&self) {
        let attributes = self.attributes.len().to_string();
        let secondary = self.secondary_indexes.len().to_string();
        let global = self.global_indexes.len().to_string();
        Logger::info(
            Event::SchemaBuilt,
            &[
                ("hash_key", self.hash_key()),
                ("range_key", self.range_key().unwrap_or("")),
                ("attributes", attributes.as_str()),
                ("secondary_indexes", secondary.as_str()),
                ("global_indexes", global.as_str()),
                ("timestamps", if self.timestamps { "true" } else { "false" }),
            ],
        );
    }

    fn warn_undeclared_keys(&self) {
        let keys = std::iter::once(("hash_key", self.hash_key()))
            .chain(self.range_key().map(|name| ("range_key", name)));
        for (role, name) in keys {
            if !self.attributes.contains_key(name) {
                Logger::warn(Event::KeyAttributeUndeclared, &[("attribute", name), ("role", role)]);
            }
        }
    }
}
