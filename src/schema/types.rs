//! Attribute type catalog
//!
//! Store-native type codes:
//! - S, N, B, BOOL: scalars
//! - SS, NS, BS: sets
//! - L, M: list and map documents
//! - DATE: timestamp, stored as an RFC 3339 string
//!
//! An attribute tree is a closed `AttributeSpec` union. Leaves carry the
//! validation rule and an optional forced type code; maps carry children.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Store-native wire type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeCode {
    #[serde(rename = "S")]
    String,
    #[serde(rename = "N")]
    Number,
    #[serde(rename = "B")]
    Binary,
    #[serde(rename = "BOOL")]
    Bool,
    #[serde(rename = "SS")]
    StringSet,
    #[serde(rename = "NS")]
    NumberSet,
    #[serde(rename = "BS")]
    BinarySet,
    #[serde(rename = "L")]
    List,
    #[serde(rename = "M")]
    Map,
    #[serde(rename = "DATE")]
    Date,
}

impl TypeCode {
    /// Returns the wire tag
    pub fn code(&self) -> &'static str {
        match self {
            TypeCode::String => "S",
            TypeCode::Number => "N",
            TypeCode::Binary => "B",
            TypeCode::Bool => "BOOL",
            TypeCode::StringSet => "SS",
            TypeCode::NumberSet => "NS",
            TypeCode::BinarySet => "BS",
            TypeCode::List => "L",
            TypeCode::Map => "M",
            TypeCode::Date => "DATE",
        }
    }

    /// Parses a wire tag
    pub fn from_code(code: &str) -> Option<Self> {
        let parsed = match code {
            "S" => TypeCode::String,
            "N" => TypeCode::Number,
            "B" => TypeCode::Binary,
            "BOOL" => TypeCode::Bool,
            "SS" => TypeCode::StringSet,
            "NS" => TypeCode::NumberSet,
            "BS" => TypeCode::BinarySet,
            "L" => TypeCode::List,
            "M" => TypeCode::Map,
            "DATE" => TypeCode::Date,
            _ => return None,
        };
        Some(parsed)
    }

    /// Whether this is one of the set codes
    pub fn is_set(&self) -> bool {
        matches!(
            self,
            TypeCode::StringSet | TypeCode::NumberSet | TypeCode::BinarySet
        )
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Base kind of a leaf validation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseKind {
    String,
    Number,
    Boolean,
    Date,
    Binary,
    Array,
    Object,
}

impl BaseKind {
    /// Returns the kind name for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            BaseKind::String => "string",
            BaseKind::Number => "number",
            BaseKind::Boolean => "boolean",
            BaseKind::Date => "date",
            BaseKind::Binary => "binary",
            BaseKind::Array => "array",
            BaseKind::Object => "object",
        }
    }
}

/// Extra constraints on string leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringFormat {
    /// RFC 5322-ish address, `local@domain.tld`
    Email,
    /// Hyphenated UUID of any version
    Guid,
}

impl StringFormat {
    pub fn format_name(&self) -> &'static str {
        match self {
            StringFormat::Email => "email",
            StringFormat::Guid => "guid",
        }
    }
}

/// Zero-argument default-value function
pub type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// Default value attached to a leaf, resolved by `apply_defaults`.
#[derive(Clone)]
pub enum DefaultValue {
    /// Used verbatim
    Constant(Value),
    /// Invoked once per resolution
    Provider(DefaultFn),
    /// Current wall-clock time, captured once per `apply_defaults` call
    Now,
}

impl DefaultValue {
    /// Wraps a closure as a provider
    pub fn provider<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        DefaultValue::Provider(Arc::new(f))
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            DefaultValue::Provider(_) => f.write_str("Provider(<fn>)"),
            DefaultValue::Now => f.write_str("Now"),
        }
    }
}

/// Leaf validation rule
#[derive(Debug, Clone)]
pub struct Attribute {
    /// Base kind
    pub kind: BaseKind,
    /// Whether the attribute must be present
    pub required: bool,
    /// Optional default
    pub default: Option<DefaultValue>,
    /// Optional string format check
    pub format: Option<StringFormat>,
    /// Element rule for arrays
    pub items: Option<Box<Attribute>>,
    /// Forced type code; the last one applied wins
    pub type_override: Option<TypeCode>,
}

impl Attribute {
    /// Creates an optional leaf of the given kind with no default
    pub fn new(kind: BaseKind) -> Self {
        Self {
            kind,
            required: false,
            default: None,
            format: None,
            items: None,
            type_override: None,
        }
    }

    pub fn string() -> Self {
        Self::new(BaseKind::String)
    }

    pub fn number() -> Self {
        Self::new(BaseKind::Number)
    }

    pub fn boolean() -> Self {
        Self::new(BaseKind::Boolean)
    }

    pub fn date() -> Self {
        Self::new(BaseKind::Date)
    }

    pub fn binary() -> Self {
        Self::new(BaseKind::Binary)
    }

    pub fn array() -> Self {
        Self::new(BaseKind::Array)
    }

    /// Opaque object leaf with no declared children
    pub fn object() -> Self {
        Self::new(BaseKind::Object)
    }

    /// Marks the attribute as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets a constant default
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Constant(value.into()));
        self
    }

    /// Sets a function default, invoked at defaults-application time
    pub fn default_with<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::provider(f));
        self
    }

    /// Defaults to the current time
    pub fn default_now(mut self) -> Self {
        self.default = Some(DefaultValue::Now);
        self
    }

    pub fn email(mut self) -> Self {
        self.format = Some(StringFormat::Email);
        self
    }

    pub fn guid(mut self) -> Self {
        self.format = Some(StringFormat::Guid);
        self
    }

    /// Sets the element rule for an array leaf
    pub fn items(mut self, item: Attribute) -> Self {
        self.items = Some(Box::new(item));
        self
    }

    /// Forces the inferred type code. Applying again replaces the earlier
    /// annotation.
    pub fn dynamo_type(mut self, code: TypeCode) -> Self {
        self.type_override = Some(code);
        self
    }
}

/// Node of the attribute-description tree
#[derive(Debug, Clone)]
pub enum AttributeSpec {
    Leaf(Attribute),
    Map(AttributeTree),
}

impl AttributeSpec {
    /// Builds a nested map node from `(name, spec)` pairs
    pub fn map<I, K>(children: I) -> Self
    where
        I: IntoIterator<Item = (K, AttributeSpec)>,
        K: Into<String>,
    {
        AttributeSpec::Map(children.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_leaf(&self) -> Option<&Attribute> {
        match self {
            AttributeSpec::Leaf(attr) => Some(attr),
            AttributeSpec::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&AttributeTree> {
        match self {
            AttributeSpec::Leaf(_) => None,
            AttributeSpec::Map(children) => Some(children),
        }
    }
}

impl From<Attribute> for AttributeSpec {
    fn from(attr: Attribute) -> Self {
        AttributeSpec::Leaf(attr)
    }
}

/// Attribute name → node. Ordered so traversal and output are deterministic.
pub type AttributeTree = BTreeMap<String, AttributeSpec>;

/// Inferred type of one attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TypeNode {
    Code(TypeCode),
    Nested(TypeMap),
}

impl TypeNode {
    pub fn as_code(&self) -> Option<TypeCode> {
        match self {
            TypeNode::Code(code) => Some(*code),
            TypeNode::Nested(_) => None,
        }
    }
}

/// Tree of inferred type codes, isomorphic to the attribute tree
pub type TypeMap = BTreeMap<String, TypeNode>;
