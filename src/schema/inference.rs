//! Type inference over the attribute tree
//!
//! Produces a `TypeMap` with the same shape as the tree. A forced type
//! override on a leaf always wins; no cross-check against the base kind or
//! item rule is made.

use super::types::{Attribute, AttributeSpec, AttributeTree, BaseKind, TypeCode, TypeMap, TypeNode};

/// Infers the type map for a whole tree
pub fn infer_types(tree: &AttributeTree) -> TypeMap {
    tree.iter()
        .map(|(name, spec)| (name.clone(), infer_node(spec)))
        .collect()
}

fn infer_node(spec: &AttributeSpec) -> TypeNode {
    match spec {
        AttributeSpec::Leaf(attr) => TypeNode::Code(infer_leaf(attr)),
        AttributeSpec::Map(children) => TypeNode::Nested(infer_types(children)),
    }
}

/// Type code of a single leaf
pub fn infer_leaf(attr: &Attribute) -> TypeCode {
    if let Some(code) = attr.type_override {
        return code;
    }

    match attr.kind {
        BaseKind::String => TypeCode::String,
        BaseKind::Number => TypeCode::Number,
        BaseKind::Boolean => TypeCode::Bool,
        BaseKind::Binary => TypeCode::Binary,
        BaseKind::Date => TypeCode::Date,
        BaseKind::Array => TypeCode::List,
        BaseKind::Object => TypeCode::Map,
    }
}

/// Looks up a dotted path (e.g. "data.nested.first") in a type map
pub fn lookup<'a>(types: &'a TypeMap, path: &str) -> Option<&'a TypeNode> {
    let mut segments = path.split('.');
    let mut node = types.get(segments.next()?)?;
    for segment in segments {
        match node {
            TypeNode::Nested(children) => node = children.get(segment)?,
            TypeNode::Code(_) => return None,
        }
    }
    Some(node)
}
