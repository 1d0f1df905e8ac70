//! Table definition input
//!
//! `SchemaConfig` is both a builder and the serde target for the declarative
//! options of a table definition (camelCase keys). The attribute tree is
//! attached programmatically or by `SchemaLoader`.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::sync::Arc;

use super::keys::Projection;
use super::types::{AttributeSpec, AttributeTree};

/// Table name: a literal or a function resolved lazily by the storage layer
#[derive(Clone)]
pub enum TableName {
    Literal(String),
    Provider(Arc<dyn Fn() -> String + Send + Sync>),
}

impl TableName {
    /// Resolves the current table name
    pub fn resolve(&self) -> String {
        match self {
            TableName::Literal(name) => name.clone(),
            TableName::Provider(f) => f(),
        }
    }
}

impl fmt::Debug for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableName::Literal(name) => f.debug_tuple("Literal").field(name).finish(),
            TableName::Provider(_) => f.write_str("Provider(<fn>)"),
        }
    }
}

impl<'de> Deserialize<'de> for TableName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(TableName::Literal)
    }
}

/// Naming of one generated timestamp attribute
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TimestampName {
    /// `createdAt` / `updatedAt`
    #[default]
    Default,
    Named(String),
    Disabled,
}

impl TimestampName {
    /// Resolves against the default name; `None` when disabled
    pub fn resolve(&self, default_name: &str) -> Option<String> {
        match self {
            TimestampName::Default => Some(default_name.to_string()),
            TimestampName::Named(name) => Some(name.clone()),
            TimestampName::Disabled => None,
        }
    }
}

impl<'de> Deserialize<'de> for TimestampName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Name(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Flag(false) => TimestampName::Disabled,
            Raw::Flag(true) => TimestampName::Default,
            Raw::Name(name) => TimestampName::Named(name),
        })
    }
}

/// Options forwarded to record validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOptions {
    /// Tolerate attributes the schema does not declare
    #[serde(default)]
    pub allow_unknown: bool,

    /// Stop at the first failure instead of collecting all of them
    #[serde(default = "default_abort_early")]
    pub abort_early: bool,

    /// Coerce numeric and boolean strings in the returned value
    #[serde(default = "default_convert")]
    pub convert: bool,
}

fn default_abort_early() -> bool {
    true
}

fn default_convert() -> bool {
    true
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            allow_unknown: false,
            abort_early: default_abort_early(),
            convert: default_convert(),
        }
    }
}

/// Raw secondary index declaration, checked by `keys::resolve_keys`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexConfig {
    #[serde(default)]
    pub name: Option<String>,

    /// "local" or "global"
    #[serde(rename = "type", default)]
    pub index_type: String,

    #[serde(default)]
    pub hash_key: Option<String>,

    #[serde(default)]
    pub range_key: Option<String>,

    #[serde(default)]
    pub projection: Option<Projection>,

    #[serde(default)]
    pub read_capacity: Option<u64>,

    #[serde(default)]
    pub write_capacity: Option<u64>,
}

impl IndexConfig {
    /// Local index sorted on `range_key`, partitioned on the table hash key
    pub fn local(name: impl Into<String>, range_key: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            index_type: "local".into(),
            range_key: Some(range_key.into()),
            ..Self::default()
        }
    }

    /// Global index partitioned on `hash_key`
    pub fn global(name: impl Into<String>, hash_key: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            index_type: "global".into(),
            hash_key: Some(hash_key.into()),
            ..Self::default()
        }
    }

    pub fn with_hash_key(mut self, hash_key: impl Into<String>) -> Self {
        self.hash_key = Some(hash_key.into());
        self
    }

    pub fn with_range_key(mut self, range_key: impl Into<String>) -> Self {
        self.range_key = Some(range_key.into());
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn with_capacity(mut self, read: u64, write: u64) -> Self {
        self.read_capacity = Some(read);
        self.write_capacity = Some(write);
        self
    }
}

/// Schema construction input
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaConfig {
    #[serde(default)]
    pub hash_key: Option<String>,

    #[serde(default)]
    pub range_key: Option<String>,

    #[serde(default)]
    pub table_name: Option<TableName>,

    /// Declared attributes; not part of the serde surface
    #[serde(skip)]
    pub schema: AttributeTree,

    #[serde(default)]
    pub timestamps: bool,

    #[serde(default)]
    pub created_at: TimestampName,

    #[serde(default)]
    pub updated_at: TimestampName,

    #[serde(default)]
    pub indexes: Vec<IndexConfig>,

    #[serde(default)]
    pub validation: ValidationOptions,
}

impl SchemaConfig {
    /// Starts a configuration partitioned on `hash_key`
    pub fn new(hash_key: impl Into<String>) -> Self {
        Self {
            hash_key: Some(hash_key.into()),
            ..Self::default()
        }
    }

    pub fn range_key(mut self, range_key: impl Into<String>) -> Self {
        self.range_key = Some(range_key.into());
        self
    }

    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(TableName::Literal(name.into()));
        self
    }

    pub fn table_name_with<F>(mut self, f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.table_name = Some(TableName::Provider(Arc::new(f)));
        self
    }

    /// Declares (or replaces) one top-level attribute
    pub fn attribute(mut self, name: impl Into<String>, spec: impl Into<AttributeSpec>) -> Self {
        self.schema.insert(name.into(), spec.into());
        self
    }

    /// Replaces the whole attribute tree
    pub fn schema(mut self, tree: AttributeTree) -> Self {
        self.schema = tree;
        self
    }

    pub fn timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    pub fn created_at(mut self, name: TimestampName) -> Self {
        self.created_at = name;
        self
    }

    pub fn updated_at(mut self, name: TimestampName) -> Self {
        self.updated_at = name;
        self
    }

    pub fn index(mut self, index: IndexConfig) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn validation(mut self, options: ValidationOptions) -> Self {
        self.validation = options;
        self
    }
}
