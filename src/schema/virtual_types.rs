//! Pre-built leaves with forced type codes or generated defaults

use serde_json::Value;
use uuid::Uuid;

use super::types::{Attribute, TypeCode};

/// Array of strings stored as `SS`
pub fn string_set() -> Attribute {
    Attribute::array()
        .items(Attribute::string())
        .dynamo_type(TypeCode::StringSet)
}

/// Array of numbers stored as `NS`
pub fn number_set() -> Attribute {
    Attribute::array()
        .items(Attribute::number())
        .dynamo_type(TypeCode::NumberSet)
}

/// Array of base64 binaries stored as `BS`
pub fn binary_set() -> Attribute {
    Attribute::array()
        .items(Attribute::binary())
        .dynamo_type(TypeCode::BinarySet)
}

/// String defaulting to a random (v4) UUID
pub fn uuid() -> Attribute {
    Attribute::string()
        .guid()
        .default_with(|| Value::String(Uuid::new_v4().to_string()))
}

/// String defaulting to a time-ordered (v1) UUID with a random node id
pub fn time_uuid() -> Attribute {
    Attribute::string().guid().default_with(|| {
        let node_id: [u8; 6] = rand::random();
        Value::String(Uuid::now_v1(&node_id).to_string())
    })
}
