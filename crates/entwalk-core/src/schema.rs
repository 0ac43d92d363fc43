//! # Schema Nodes
//!
//! The shape descriptors the walker and the resolver follow. A schema node is
//! an explicit sum type, so illegal shapes cannot be represented and every
//! dispatch over node kinds is exhaustive.
//!
//! ## Reading JSON Schema Documents
//!
//! [`SchemaNode::from_value`] reads the structural subset of a JSON Schema
//! document: `type`, `properties`, `items`, `additionalItems` and `readOnly`.
//! Every other keyword is left to the validator.
//!
//! - `type: "object"` reads `properties` (absent means no declared fields).
//! - `type: "array"` reads `items` as one schema for every element, or as a
//!   list of per-position schemas with `additionalItems` as the fallback.
//! - Any other `type`, a type union such as `["string", "null"]`, a missing
//!   `type`, and the boolean schemas `true`/`false` all become primitive
//!   leaves. Unknown tags leave [`PrimitiveSchema::kind`] empty.
//!
//! Malformed nodes are rejected with a [`SchemaShapeError`] carrying the JSON
//! Pointer of the offending node. Nodes are immutable once built.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SchemaShapeError;

/// Scalar `type` tags a primitive node may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl PrimitiveType {
    /// The JSON Schema tag for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "null" => Some(Self::Null),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schema node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum SchemaNode {
    /// `type: "object"`.
    Object(ObjectSchema),
    /// `type: "array"`.
    Array(ArraySchema),
    /// Scalar types, unknown types, and untyped nodes.
    Primitive(PrimitiveSchema),
}

/// An object node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    /// Declared fields. Keys present on a value but absent here are still
    /// walked, under the untyped schema.
    pub properties: BTreeMap<String, SchemaNode>,
    /// `readOnly` marker.
    pub read_only: bool,
}

impl ObjectSchema {
    /// The declared schema for `key`, if any.
    pub fn property(&self, key: &str) -> Option<&SchemaNode> {
        self.properties.get(key)
    }

    /// The schema the walker uses for `key`: the declared one or the untyped
    /// leaf.
    pub fn field_schema(&self, key: &str) -> &SchemaNode {
        self.property(key).unwrap_or(SchemaNode::untyped())
    }
}

/// Element schemas of an array node.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ArrayItems {
    /// No `items`: every element is untyped.
    #[default]
    Any,
    /// `items` is a single schema applied to every element.
    Uniform(Box<SchemaNode>),
    /// `items` is a list of per-position schemas.
    Positional {
        /// Schema for each leading position.
        items: Vec<SchemaNode>,
        /// `additionalItems`: schema for positions past the end of `items`.
        additional: Option<Box<SchemaNode>>,
    },
}

/// An array node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArraySchema {
    /// Element schemas.
    pub items: ArrayItems,
    /// `readOnly` marker.
    pub read_only: bool,
}

impl ArraySchema {
    /// The schema governing the element at `index`.
    ///
    /// Positional schemas fall back to `additionalItems`, then to the
    /// untyped leaf.
    pub fn item_schema(&self, index: usize) -> &SchemaNode {
        match &self.items {
            ArrayItems::Any => SchemaNode::untyped(),
            ArrayItems::Uniform(item) => &**item,
            ArrayItems::Positional { items, additional } => items
                .get(index)
                .or(additional.as_deref())
                .unwrap_or(SchemaNode::untyped()),
        }
    }
}

/// A leaf node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimitiveSchema {
    /// Scalar type, or `None` for untyped and unrecognized nodes.
    pub kind: Option<PrimitiveType>,
    /// `readOnly` marker.
    pub read_only: bool,
}

static UNTYPED: SchemaNode = SchemaNode::Primitive(PrimitiveSchema {
    kind: None,
    read_only: false,
});

impl SchemaNode {
    /// The shared empty schema `{}`.
    pub fn untyped() -> &'static SchemaNode {
        &UNTYPED
    }

    /// Read a schema document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaShapeError`] for the first malformed node found,
    /// depth-first.
    pub fn from_value(value: &Value) -> Result<Self, SchemaShapeError> {
        parse_node(value, "")
    }

    /// Object node over the given declared fields.
    pub fn object<K: Into<String>>(properties: impl IntoIterator<Item = (K, SchemaNode)>) -> Self {
        Self::Object(ObjectSchema {
            properties: properties
                .into_iter()
                .map(|(key, node)| (key.into(), node))
                .collect(),
            read_only: false,
        })
    }

    /// Array node with one schema for every element.
    pub fn array(items: SchemaNode) -> Self {
        Self::Array(ArraySchema {
            items: ArrayItems::Uniform(Box::new(items)),
            read_only: false,
        })
    }

    /// Array node with per-position schemas.
    pub fn tuple(items: Vec<SchemaNode>, additional: Option<SchemaNode>) -> Self {
        Self::Array(ArraySchema {
            items: ArrayItems::Positional {
                items,
                additional: additional.map(Box::new),
            },
            read_only: false,
        })
    }

    /// Typed leaf.
    pub fn primitive(kind: PrimitiveType) -> Self {
        Self::Primitive(PrimitiveSchema {
            kind: Some(kind),
            read_only: false,
        })
    }

    /// Set the `readOnly` marker.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        match &mut self {
            Self::Object(object) => object.read_only = read_only,
            Self::Array(array) => array.read_only = read_only,
            Self::Primitive(primitive) => primitive.read_only = read_only,
        }
        self
    }

    /// The `readOnly` marker.
    pub fn is_read_only(&self) -> bool {
        match self {
            Self::Object(object) => object.read_only,
            Self::Array(array) => array.read_only,
            Self::Primitive(primitive) => primitive.read_only,
        }
    }

    /// The JSON Schema `type` tag, or `None` for untyped nodes.
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            Self::Object(_) => Some("object"),
            Self::Array(_) => Some("array"),
            Self::Primitive(primitive) => primitive.kind.map(|kind| kind.as_str()),
        }
    }

    /// Returns true for the empty schema and unknown types.
    pub fn is_untyped(&self) -> bool {
        self.type_name().is_none()
    }
}

impl TryFrom<&Value> for SchemaNode {
    type Error = SchemaShapeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl TryFrom<Value> for SchemaNode {
    type Error = SchemaShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

fn parse_node(value: &Value, pointer: &str) -> Result<SchemaNode, SchemaShapeError> {
    let fields = match value {
        Value::Object(fields) => fields,
        Value::Bool(_) => return Ok(SchemaNode::Primitive(PrimitiveSchema::default())),
        other => {
            return Err(SchemaShapeError::new(
                pointer,
                format!("expected a schema object, found {}", describe(other)),
            ))
        }
    };

    let read_only = match fields.get("readOnly") {
        None => false,
        Some(Value::Bool(flag)) => *flag,
        Some(other) => {
            return Err(SchemaShapeError::new(
                &format!("{pointer}/readOnly"),
                format!("expected a boolean, found {}", describe(other)),
            ))
        }
    };

    let tag = match fields.get("type") {
        None | Some(Value::Array(_)) => None,
        Some(Value::String(tag)) => Some(tag.as_str()),
        Some(other) => {
            return Err(SchemaShapeError::new(
                &format!("{pointer}/type"),
                format!("expected a string or a list of strings, found {}", describe(other)),
            ))
        }
    };

    match tag {
        Some("object") => Ok(SchemaNode::Object(ObjectSchema {
            properties: parse_properties(fields, pointer)?,
            read_only,
        })),
        Some("array") => Ok(SchemaNode::Array(ArraySchema {
            items: parse_items(fields, pointer)?,
            read_only,
        })),
        Some(tag) => {
            let kind = PrimitiveType::from_tag(tag);
            if kind.is_none() {
                tracing::debug!(pointer, schema_type = tag, "unrecognized schema type, treating node as untyped");
            }
            Ok(SchemaNode::Primitive(PrimitiveSchema { kind, read_only }))
        }
        None => Ok(SchemaNode::Primitive(PrimitiveSchema {
            kind: None,
            read_only,
        })),
    }
}

fn parse_properties(
    fields: &Map<String, Value>,
    pointer: &str,
) -> Result<BTreeMap<String, SchemaNode>, SchemaShapeError> {
    let pointer = format!("{pointer}/properties");
    match fields.get("properties") {
        None => Ok(BTreeMap::new()),
        Some(Value::Object(properties)) => properties
            .iter()
            .map(|(key, node)| {
                let child = format!("{pointer}/{}", escape_pointer(key));
                Ok((key.clone(), parse_node(node, &child)?))
            })
            .collect(),
        Some(other) => Err(SchemaShapeError::new(
            &pointer,
            format!("expected an object of schemas, found {}", describe(other)),
        )),
    }
}

fn parse_items(fields: &Map<String, Value>, pointer: &str) -> Result<ArrayItems, SchemaShapeError> {
    let items_pointer = format!("{pointer}/items");
    match fields.get("items") {
        None => Ok(ArrayItems::Any),
        Some(Value::Array(list)) => {
            let items = list
                .iter()
                .enumerate()
                .map(|(i, node)| parse_node(node, &format!("{items_pointer}/{i}")))
                .collect::<Result<Vec<_>, _>>()?;
            let additional = match fields.get("additionalItems") {
                None => None,
                Some(node) => Some(Box::new(parse_node(node, &format!("{pointer}/additionalItems"))?)),
            };
            Ok(ArrayItems::Positional { items, additional })
        }
        Some(node @ (Value::Object(_) | Value::Bool(_))) => {
            Ok(ArrayItems::Uniform(Box::new(parse_node(node, &items_pointer)?)))
        }
        Some(other) => Err(SchemaShapeError::new(
            &items_pointer,
            format!("expected a schema or a list of schemas, found {}", describe(other)),
        )),
    }
}

/// RFC 6901 escaping for a single reference token.
fn escape_pointer(token: &str) -> Cow<'_, str> {
    if token.contains(['~', '/']) {
        Cow::Owned(token.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(token)
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_nested_object() {
        let node = SchemaNode::from_value(&json!({
            "type": "object",
            "properties": {
                "numeric": {"type": "number", "readOnly": true},
                "sub": {
                    "type": "object",
                    "properties": {"foo": {"type": "string"}}
                }
            }
        }))
        .unwrap();

        let SchemaNode::Object(object) = &node else {
            panic!("expected object node, got {node:?}");
        };
        assert!(!object.read_only);
        let numeric = object.property("numeric").unwrap();
        assert!(numeric.is_read_only());
        assert_eq!(numeric.type_name(), Some("number"));
        let SchemaNode::Object(sub) = object.property("sub").unwrap() else {
            panic!("expected object node for sub");
        };
        assert_eq!(
            sub.property("foo"),
            Some(&SchemaNode::primitive(PrimitiveType::String))
        );
    }

    #[test]
    fn test_parse_object_without_properties() {
        let node = SchemaNode::from_value(&json!({"type": "object"})).unwrap();
        assert_eq!(node, SchemaNode::Object(ObjectSchema::default()));
    }

    #[test]
    fn test_parse_uniform_items() {
        let node = SchemaNode::from_value(&json!({"type": "array", "items": {"type": "string"}})).unwrap();
        assert_eq!(node, SchemaNode::array(SchemaNode::primitive(PrimitiveType::String)));
    }

    #[test]
    fn test_parse_positional_items_with_additional() {
        let node = SchemaNode::from_value(&json!({
            "type": "array",
            "items": [{"type": "string"}, {"type": "integer"}],
            "additionalItems": {"type": "boolean"}
        }))
        .unwrap();
        let SchemaNode::Array(array) = &node else {
            panic!("expected array node");
        };
        assert_eq!(array.item_schema(0).type_name(), Some("string"));
        assert_eq!(array.item_schema(1).type_name(), Some("integer"));
        assert_eq!(array.item_schema(2).type_name(), Some("boolean"));
        assert_eq!(array.item_schema(99).type_name(), Some("boolean"));
    }

    #[test]
    fn test_positional_items_without_additional_fall_back_to_untyped() {
        let node = SchemaNode::tuple(vec![SchemaNode::primitive(PrimitiveType::String)], None);
        let SchemaNode::Array(array) = &node else {
            panic!("expected array node");
        };
        assert!(array.item_schema(1).is_untyped());
    }

    #[test]
    fn test_array_without_items_is_untyped_per_element() {
        let node = SchemaNode::from_value(&json!({"type": "array"})).unwrap();
        let SchemaNode::Array(array) = &node else {
            panic!("expected array node");
        };
        assert_eq!(array.items, ArrayItems::Any);
        assert!(array.item_schema(0).is_untyped());
    }

    #[test]
    fn test_unknown_and_missing_types_are_untyped() {
        for raw in [json!({}), json!({"type": "date"}), json!({"type": ["string", "null"]}), json!(true)] {
            let node = SchemaNode::from_value(&raw).unwrap();
            assert!(node.is_untyped(), "{raw} should be untyped");
        }
    }

    #[test]
    fn test_untyped_keeps_read_only() {
        let node = SchemaNode::from_value(&json!({"readOnly": true})).unwrap();
        assert!(node.is_untyped());
        assert!(node.is_read_only());
    }

    #[test]
    fn test_reject_items_scalar() {
        let err = SchemaNode::from_value(&json!({
            "type": "object",
            "properties": {"list": {"type": "array", "items": 42}}
        }))
        .unwrap_err();
        assert_eq!(err.pointer, "/properties/list/items");
    }

    #[test]
    fn test_reject_non_boolean_read_only() {
        let err = SchemaNode::from_value(&json!({"type": "string", "readOnly": "yes"})).unwrap_err();
        assert_eq!(err.pointer, "/readOnly");
    }

    #[test]
    fn test_reject_properties_list() {
        let err = SchemaNode::from_value(&json!({"type": "object", "properties": []})).unwrap_err();
        assert_eq!(err.pointer, "/properties");
    }

    #[test]
    fn test_pointer_escapes_property_names() {
        let err = SchemaNode::from_value(&json!({
            "type": "object",
            "properties": {"a/b": 7}
        }))
        .unwrap_err();
        assert_eq!(err.pointer, "/properties/a~1b");
    }

    #[test]
    fn test_deserialize_through_serde() {
        let node: SchemaNode = serde_json::from_value(json!({"type": "integer", "readOnly": true})).unwrap();
        assert_eq!(node, SchemaNode::primitive(PrimitiveType::Integer).with_read_only(true));
    }

    #[test]
    fn test_deserialize_reports_shape_error() {
        let result: Result<SchemaNode, _> = serde_json::from_value(json!({"type": 3}));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("/type"), "unexpected error: {err}");
    }
}
