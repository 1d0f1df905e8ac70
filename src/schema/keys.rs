//! Table key and secondary index resolution
//!
//! Rules:
//! - hashKey is required
//! - local indexes require a rangeKey and share the table hashKey
//! - global indexes require their own hashKey
//! - index names are unique across both collections
//! - read/write capacity is only meaningful on global indexes

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::config::IndexConfig;
use super::errors::{SchemaError, SchemaResult};

/// Table primary key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDefinition {
    pub hash_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Local,
    Global,
}

impl IndexKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "local" => Some(IndexKind::Local),
            "global" => Some(IndexKind::Global),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectionType {
    #[default]
    All,
    KeysOnly,
    Include,
}

/// Attributes copied into an index
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Projection {
    #[serde(rename = "ProjectionType", default)]
    pub projection_type: ProjectionType,
    #[serde(rename = "NonKeyAttributes", default, skip_serializing_if = "Vec::is_empty")]
    pub non_key_attributes: Vec<String>,
}

impl Projection {
    pub fn keys_only() -> Self {
        Self {
            projection_type: ProjectionType::KeysOnly,
            non_key_attributes: Vec::new(),
        }
    }

    pub fn include<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            projection_type: ProjectionType::Include,
            non_key_attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Resolved secondary index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDefinition {
    pub name: String,
    pub kind: IndexKind,
    pub hash_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_key: Option<String>,
    pub projection: Projection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_capacity: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_capacity: Option<u64>,
}

/// Index name → definition
pub type IndexMap = BTreeMap<String, IndexDefinition>;

/// Output of key resolution
#[derive(Debug, Clone)]
pub struct ResolvedKeys {
    pub key: KeyDefinition,
    pub secondary_indexes: IndexMap,
    pub global_indexes: IndexMap,
}

/// Validates the table key and partitions index declarations into local
/// and global collections.
pub fn resolve_keys(
    hash_key: Option<&str>,
    range_key: Option<&str>,
    indexes: &[IndexConfig],
) -> SchemaResult<ResolvedKeys> {
    let hash_key = hash_key.ok_or(SchemaError::MissingHashKey)?;
    let key = KeyDefinition {
        hash_key: hash_key.to_string(),
        range_key: range_key.map(str::to_string),
    };

    let mut secondary_indexes = IndexMap::new();
    let mut global_indexes = IndexMap::new();

    for (position, raw) in indexes.iter().enumerate() {
        let index = resolve_index(&key, position, raw)?;

        if secondary_indexes.contains_key(&index.name) || global_indexes.contains_key(&index.name) {
            return Err(SchemaError::DuplicateIndexName { index: index.name });
        }

        let target = match index.kind {
            IndexKind::Local => &mut secondary_indexes,
            IndexKind::Global => &mut global_indexes,
        };
        target.insert(index.name.clone(), index);
    }

    Ok(ResolvedKeys {
        key,
        secondary_indexes,
        global_indexes,
    })
}

fn resolve_index(
    table_key: &KeyDefinition,
    position: usize,
    raw: &IndexConfig,
) -> SchemaResult<IndexDefinition> {
    let name = raw
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .ok_or(SchemaError::MissingIndexName { position })?;

    let kind = IndexKind::parse(&raw.index_type).ok_or_else(|| SchemaError::InvalidIndexType {
        index: name.clone(),
        found: raw.index_type.clone(),
    })?;

    let hash_key = match kind {
        IndexKind::Local => {
            if raw.range_key.is_none() {
                return Err(SchemaError::MissingIndexRangeKey { index: name });
            }
            if raw.read_capacity.is_some() || raw.write_capacity.is_some() {
                return Err(SchemaError::IndexCapacityNotAllowed { index: name });
            }
            match &raw.hash_key {
                Some(given) if *given != table_key.hash_key => {
                    return Err(SchemaError::IndexHashKeyMismatch {
                        index: name,
                        expected: table_key.hash_key.clone(),
                        found: given.clone(),
                    });
                }
                _ => table_key.hash_key.clone(),
            }
        }
        IndexKind::Global => raw
            .hash_key
            .clone()
            .ok_or_else(|| SchemaError::MissingIndexHashKey { index: name.clone() })?,
    };

    Ok(IndexDefinition {
        name,
        kind,
        hash_key,
        range_key: raw.range_key.clone(),
        projection: raw.projection.clone().unwrap_or_default(),
        read_capacity: raw.read_capacity,
        write_capacity: raw.write_capacity,
    })
}
