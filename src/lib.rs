//! dynoschema - table schemas for a key-value/document store
//!
//! Declares, once per table, the hash and range keys, secondary indexes,
//! generated timestamps and per-attribute validation rules and defaults.
//! The resulting `Schema` exposes the inferred store type of every attribute
//! and validates and fills in records at runtime.
//!
//! ```
//! use dynoschema::{string_set, Attribute, IndexConfig, Schema, SchemaConfig};
//! use serde_json::json;
//!
//! let schema = Schema::new(
//!     SchemaConfig::new("email")
//!         .attribute("email", Attribute::string().email().required())
//!         .attribute("name", Attribute::string().default_value("Foo Bar"))
//!         .attribute("tags", string_set())
//!         .index(IndexConfig::global("ByName", "name")),
//! )
//! .unwrap();
//!
//! let record = schema.apply_defaults(&json!({ "email": "foo@bar.com" }));
//! assert_eq!(record["name"], "Foo Bar");
//! assert!(schema.validate(&record).error.is_none());
//! ```

pub mod cli;
pub mod observability;
pub mod schema;

pub use schema::virtual_types::{binary_set, number_set, string_set, time_uuid, uuid};
pub use schema::{
    Attribute, AttributeSpec, AttributeTree, IndexConfig, Schema, SchemaConfig, SchemaError,
    SchemaResult, TableName, TimestampName, TypeCode, TypeMap, TypeNode, Validation,
    ValidationOptions,
};
