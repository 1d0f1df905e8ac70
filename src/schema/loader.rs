//! JSON table definitions
//!
//! A definition file holds the options of `SchemaConfig` plus a `schema`
//! section. Inside `schema`, an object whose `type` is a string declares a
//! leaf; any other object declares a nested map:
//!
//! ```json
//! {
//!   "hashKey": "email",
//!   "timestamps": true,
//!   "schema": {
//!     "email": { "type": "string", "format": "email", "required": true },
//!     "tags": { "type": "stringSet" },
//!     "data": { "nested": { "first": { "type": "string", "default": "n/a" } } }
//!   }
//! }
//! ```
//!
//! Leaf types: string, number, boolean, date, binary, array, object,
//! stringSet, numberSet, binarySet, uuid, timeUUID. A date leaf with
//! `"default": "now"` defaults to the current time.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::observability::{Event, Logger};

use super::config::{SchemaConfig, TableName};
use super::errors::{SchemaError, SchemaResult};
use super::types::{Attribute, AttributeSpec, AttributeTree, BaseKind, StringFormat, TypeCode};
use super::virtual_types;
use super::Schema;

/// Registry of schemas loaded from a directory of `*.json` definitions.
pub struct SchemaLoader {
    definitions_dir: PathBuf,
    /// Schemas by table name (or file stem when the name is not literal)
    schemas: BTreeMap<String, Schema>,
}

impl SchemaLoader {
    pub fn new(definitions_dir: &Path) -> Self {
        Self {
            definitions_dir: definitions_dir.to_path_buf(),
            schemas: BTreeMap::new(),
        }
    }

    pub fn definitions_dir(&self) -> &Path {
        &self.definitions_dir
    }

    /// Loads every `*.json` definition in the directory.
    ///
    /// A missing directory loads nothing; any malformed definition aborts.
    pub fn load_all(&mut self) -> SchemaResult<usize> {
        if !self.definitions_dir.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(&self.definitions_dir).map_err(|e| {
            SchemaError::malformed(
                self.definitions_dir.display().to_string(),
                format!("failed to read directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed(
                    self.definitions_dir.display().to_string(),
                    format!("failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        // Deterministic load order
        paths.sort();

        for path in &paths {
            let schema = Self::load_file(path)?;
            let name = match schema.table_name() {
                Some(TableName::Literal(name)) => name.clone(),
                _ => file_stem(path),
            };
            self.register(name, schema)?;
        }

        Ok(paths.len())
    }

    /// Registers a schema under a table name; names are unique.
    pub fn register(&mut self, name: impl Into<String>, schema: Schema) -> SchemaResult<()> {
        let name = name.into();
        if self.schemas.contains_key(&name) {
            return Err(SchemaError::malformed(
                name,
                "a table with this name is already registered",
            ));
        }
        self.schemas.insert(name, schema);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Reads and builds one definition file
    pub fn load_file(path: &Path) -> SchemaResult<Schema> {
        let source_name = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| SchemaError::malformed(&source_name, format!("failed to read file: {}", e)))?;
        Schema::new(parse_definition(&content, &source_name)?)
    }
}

/// Parses a JSON table definition into a `SchemaConfig`
pub fn parse_definition(content: &str, source_name: &str) -> SchemaResult<SchemaConfig> {
    let mut document: Value = serde_json::from_str(content)
        .map_err(|e| SchemaError::malformed(source_name, format!("invalid JSON: {}", e)))?;

    let root = document
        .as_object_mut()
        .ok_or_else(|| SchemaError::malformed(source_name, "definition must be a JSON object"))?;
    let declared = root.remove("schema");

    let mut config: SchemaConfig = serde_json::from_value(document)
        .map_err(|e| SchemaError::malformed(source_name, e.to_string()))?;

    if let Some(declared) = declared {
        let tree = declared
            .as_object()
            .ok_or_else(|| SchemaError::malformed(source_name, "'schema' must be an object"))?;
        config.schema = parse_tree(tree, "", source_name)?;
    }

    let attributes = config.schema.len().to_string();
    Logger::trace(
        Event::DefinitionLoaded,
        &[("source", source_name), ("attributes", attributes.as_str())],
    );

    Ok(config)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct LeafDecl {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    default: Option<Value>,
    #[serde(default)]
    format: Option<StringFormat>,
    #[serde(default)]
    dynamo_type: Option<String>,
    #[serde(default)]
    items: Option<Value>,
    #[serde(default)]
    keys: Option<Map<String, Value>>,
}

impl LeafDecl {
    /// First leaf-only rule set on this declaration; a keyed object has
    /// nowhere to keep it
    fn map_rule(&self) -> Option<&'static str> {
        if self.required {
            Some("required")
        } else if self.default.is_some() {
            Some("default")
        } else if self.format.is_some() {
            Some("format")
        } else if self.dynamo_type.is_some() {
            Some("dynamoType")
        } else if self.items.is_some() {
            Some("items")
        } else {
            None
        }
    }
}

fn parse_tree(decls: &Map<String, Value>, prefix: &str, source_name: &str) -> SchemaResult<AttributeTree> {
    let mut tree = AttributeTree::new();
    for (name, decl) in decls {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };
        tree.insert(name.clone(), parse_node(decl, &path, source_name)?);
    }
    Ok(tree)
}

fn parse_node(decl: &Value, path: &str, source_name: &str) -> SchemaResult<AttributeSpec> {
    let obj = decl.as_object().ok_or_else(|| {
        SchemaError::malformed(source_name, format!("'{}' must be declared with an object", path))
    })?;

    if !obj.get("type").is_some_and(Value::is_string) {
        return Ok(AttributeSpec::Map(parse_tree(obj, path, source_name)?));
    }

    let leaf: LeafDecl = serde_json::from_value(decl.clone())
        .map_err(|e| SchemaError::malformed(source_name, format!("'{}': {}", path, e)))?;

    if let Some(keys) = &leaf.keys {
        if leaf.kind != "object" {
            return Err(SchemaError::malformed(
                source_name,
                format!("'{}': only object attributes may declare keys", path),
            ));
        }
        if let Some(rule) = leaf.map_rule() {
            return Err(SchemaError::malformed(
                source_name,
                format!("'{}': '{}' is not supported on an object with keys", path, rule),
            ));
        }
        return Ok(AttributeSpec::Map(parse_tree(keys, path, source_name)?));
    }

    parse_leaf(leaf, path, source_name).map(AttributeSpec::Leaf)
}

fn parse_leaf(leaf: LeafDecl, path: &str, source_name: &str) -> SchemaResult<Attribute> {
    let mut attr = match leaf.kind.as_str() {
        "string" => Attribute::new(BaseKind::String),
        "number" => Attribute::new(BaseKind::Number),
        "boolean" => Attribute::new(BaseKind::Boolean),
        "date" => Attribute::new(BaseKind::Date),
        "binary" => Attribute::new(BaseKind::Binary),
        "array" => Attribute::new(BaseKind::Array),
        "object" => Attribute::new(BaseKind::Object),
        "stringSet" => virtual_types::string_set(),
        "numberSet" => virtual_types::number_set(),
        "binarySet" => virtual_types::binary_set(),
        "uuid" => virtual_types::uuid(),
        "timeUUID" => virtual_types::time_uuid(),
        other => {
            return Err(SchemaError::malformed(
                source_name,
                format!("'{}': unknown attribute type '{}'", path, other),
            ))
        }
    };

    if leaf.required {
        attr = attr.required();
    }
    if let Some(format) = leaf.format {
        attr.format = Some(format);
    }
    match leaf.default {
        Some(Value::String(s)) if attr.kind == BaseKind::Date && s == "now" => {
            attr = attr.default_now();
        }
        Some(value) => attr = attr.default_value(value),
        None => {}
    }
    if let Some(raw) = leaf.dynamo_type {
        let code = TypeCode::from_code(&raw).ok_or_else(|| {
            SchemaError::malformed(source_name, format!("'{}': unknown dynamoType '{}'", path, raw))
        })?;
        attr = attr.dynamo_type(code);
    }
    if let Some(items) = leaf.items {
        let item_path = format!("{}[]", path);
        match parse_node(&items, &item_path, source_name)? {
            AttributeSpec::Leaf(item) => attr = attr.items(item),
            AttributeSpec::Map(_) => {
                return Err(SchemaError::malformed(
                    source_name,
                    format!("'{}': items must be a leaf declaration", item_path),
                ))
            }
        }
    }

    Ok(attr)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
