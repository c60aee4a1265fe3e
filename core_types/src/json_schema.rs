//! Structured document schema
//!
//! A [`JsonTree`] maps field names to either a nested tree or a [`JsonType`]
//! bit set. Dotted keys (`"box.addition.x"`) walk nested trees. A `*` field
//! name matches any single field at that level.

use crate::identifier::WILDCARD;
use serde_json::Value;
use std::collections::BTreeMap;

bitflags::bitflags! {
    /// JSON value types allowed at a schema leaf
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct JsonType: u8 {
        const NULL = 1 << 0;
        const BOOLEAN = 1 << 1;
        const STRING = 1 << 2;
        const NUMBER = 1 << 3;
        const ARRAY = 1 << 4;
        const OBJECT = 1 << 5;
        const ANY = Self::NULL.bits()
            | Self::BOOLEAN.bits()
            | Self::STRING.bits()
            | Self::NUMBER.bits()
            | Self::ARRAY.bits()
            | Self::OBJECT.bits();
    }
}

impl JsonType {
    /// Returns the type bit of a concrete value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonType::NULL,
            Value::Bool(_) => JsonType::BOOLEAN,
            Value::Number(_) => JsonType::NUMBER,
            Value::String(_) => JsonType::STRING,
            Value::Array(_) => JsonType::ARRAY,
            Value::Object(_) => JsonType::OBJECT,
        }
    }

    /// Returns true if `value` may be stored under this type
    pub fn admits(self, value: &Value) -> bool {
        self.intersects(Self::of(value))
    }
}

/// A schema node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonNode {
    Type(JsonType),
    Tree(JsonTree),
}

/// What the schema says about one dotted key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSchema<'a> {
    /// The key is a typed leaf
    Type(JsonType),
    /// The key is a nested object with its own schema
    Tree(&'a JsonTree),
}

impl FieldSchema<'_> {
    /// Types admitted when a whole value is written at this key
    pub fn allowed(&self) -> JsonType {
        match self {
            FieldSchema::Type(ty) => *ty,
            FieldSchema::Tree(_) => JsonType::OBJECT,
        }
    }
}

/// Schema tree for a structured document
///
/// Two trees are equal when they have the same key set and the same leaf
/// types, recursively.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonTree {
    fields: BTreeMap<String, JsonNode>,
}

impl JsonTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a typed leaf
    pub fn field(mut self, name: impl Into<String>, ty: JsonType) -> Self {
        self.fields.insert(name.into(), JsonNode::Type(ty));
        self
    }

    /// Adds a nested tree
    pub fn nested(mut self, name: impl Into<String>, tree: JsonTree) -> Self {
        self.fields.insert(name.into(), JsonNode::Tree(tree));
        self
    }

    pub fn get(&self, name: &str) -> Option<&JsonNode> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonNode)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks up a dotted key
    ///
    /// Exact field names win over `*`. A leaf that admits objects accepts
    /// any deeper key as [`JsonType::ANY`].
    pub fn lookup(&self, key: &str) -> Option<FieldSchema<'_>> {
        let mut current = self;
        let mut parts = key.split('.').peekable();

        while let Some(part) = parts.next() {
            let node = current.fields.get(part).or_else(|| current.fields.get(WILDCARD))?;
            let last = parts.peek().is_none();

            match node {
                JsonNode::Tree(tree) if last => return Some(FieldSchema::Tree(tree)),
                JsonNode::Tree(tree) => current = tree,
                JsonNode::Type(ty) if last => return Some(FieldSchema::Type(*ty)),
                JsonNode::Type(ty) if ty.contains(JsonType::OBJECT) => {
                    return Some(FieldSchema::Type(JsonType::ANY))
                }
                JsonNode::Type(_) => return None,
            }
        }

        None
    }
}
