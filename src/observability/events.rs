//! Observable schema events
//!
//! Events are explicit and typed.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Table definition parsed from JSON
    DefinitionLoaded,
    /// Schema constructed
    SchemaBuilt,
    /// Schema construction failed
    SchemaRejected,
    /// A key attribute is not declared in a non-empty attribute tree
    KeyAttributeUndeclared,
}

impl Event {
    /// Returns the event name as written to the log
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::DefinitionLoaded => "DEFINITION_LOADED",
            Event::SchemaBuilt => "SCHEMA_BUILT",
            Event::SchemaRejected => "SCHEMA_REJECTED",
            Event::KeyAttributeUndeclared => "KEY_ATTRIBUTE_UNDECLARED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
