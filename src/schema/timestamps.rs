//! Generated timestamp attributes
//!
//! With timestamps enabled, `createdAt` and `updatedAt` date leaves are added
//! to the attribute tree. Each can be renamed or disabled independently.

use super::config::TimestampName;
use super::types::{Attribute, AttributeSpec, AttributeTree};

pub const DEFAULT_CREATED_AT: &str = "createdAt";
pub const DEFAULT_UPDATED_AT: &str = "updatedAt";

/// Resolved timestamp attribute names; `None` when disabled
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimestampNames {
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Adds the enabled timestamp leaves to `tree` and returns their names.
///
/// A leaf is a date defaulting to the current time. Never fails.
pub fn inject_timestamps(
    tree: &mut AttributeTree,
    enabled: bool,
    created_at: &TimestampName,
    updated_at: &TimestampName,
) -> TimestampNames {
    if !enabled {
        return TimestampNames::default();
    }

    let names = TimestampNames {
        created_at: created_at.resolve(DEFAULT_CREATED_AT),
        updated_at: updated_at.resolve(DEFAULT_UPDATED_AT),
    };

    for name in names.created_at.iter().chain(names.updated_at.iter()) {
        tree.insert(name.clone(), AttributeSpec::Leaf(timestamp_attribute()));
    }

    names
}

fn timestamp_attribute() -> Attribute {
    Attribute::date().default_now()
}
