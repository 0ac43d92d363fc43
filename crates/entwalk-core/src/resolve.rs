//! # Path Schema Resolution
//!
//! Answers "which schema governs the value at this path?" from the schema
//! alone, without a value instance.
//!
//! Resolution descends one segment at a time:
//!
//! - **Object:** the segment's key form selects a declared property. An
//!   undeclared property fails the whole resolution.
//! - **Array:** any segment selects the single `items` schema, since every
//!   element shares it. Arrays without `items`, and arrays with per-position
//!   `items` lists, are not addressable and fail.
//! - **Primitive:** no further descent is possible, so the primitive node is
//!   returned even if segments remain.
//!
//! The empty path resolves to the schema itself.

use crate::path::{EntityPath, PathSegment};
use crate::schema::{ArrayItems, SchemaNode};

/// Resolve the schema governing `segments` below `schema`.
pub fn resolve<'s>(schema: &'s SchemaNode, segments: &[PathSegment]) -> Option<&'s SchemaNode> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(schema);
    };
    let next = match schema {
        SchemaNode::Object(object) => object.property(head.as_key().as_ref())?,
        SchemaNode::Array(array) => match &array.items {
            ArrayItems::Uniform(item) => &**item,
            ArrayItems::Any | ArrayItems::Positional { .. } => return None,
        },
        SchemaNode::Primitive(_) => return Some(schema),
    };
    resolve(next, rest)
}

/// Resolve the schema governing a dotted path such as `collection.0.fo`.
pub fn resolve_path<'s>(schema: &'s SchemaNode, path: &str) -> Option<&'s SchemaNode> {
    resolve(schema, EntityPath::parse(path).segments())
}

impl SchemaNode {
    /// The schema governing `path` below this node. See [`resolve`].
    pub fn path_schema(&self, path: &EntityPath) -> Option<&SchemaNode> {
        resolve(self, path.segments())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ObjectSchema, PrimitiveType};
    use serde_json::json;

    fn fixture() -> SchemaNode {
        SchemaNode::from_value(&json!({
            "type": "object",
            "properties": {
                "numeric": {"type": "number", "readOnly": true},
                "text": {"type": "string"},
                "sub": {
                    "type": "object",
                    "properties": {
                        "foo": {"type": "string", "readOnly": true},
                        "bar": {"type": "number", "readOnly": true}
                    }
                },
                "list": {"type": "array", "items": {"type": "string"}},
                "collection": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "fo": {"type": "string"},
                            "ba": {"type": "object", "properties": {"baba": {"type": "string"}}}
                        }
                    }
                }
            }
        }))
        .unwrap()
    }

    fn properties(node: &SchemaNode) -> &ObjectSchema {
        match node {
            SchemaNode::Object(object) => object,
            other => panic!("expected object node, got {other:?}"),
        }
    }

    fn items(node: &SchemaNode) -> &SchemaNode {
        match node {
            SchemaNode::Array(array) => array.item_schema(0),
            other => panic!("expected array node, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_top_level_properties() {
        let schema = fixture();
        let root = properties(&schema);
        for name in ["text", "sub", "list", "collection"] {
            assert_eq!(resolve_path(&schema, name), root.property(name), "path {name}");
        }
    }

    #[test]
    fn test_resolve_nested_property() {
        let schema = fixture();
        let expected = properties(properties(&schema).property("sub").unwrap()).property("foo");
        assert_eq!(resolve_path(&schema, "sub.foo"), expected);
    }

    #[test]
    fn test_resolve_through_array_items() {
        let schema = fixture();
        let element = items(properties(&schema).property("collection").unwrap());
        assert_eq!(resolve_path(&schema, "collection.0.fo"), properties(element).property("fo"));

        let baba = properties(properties(element).property("ba").unwrap()).property("baba");
        assert_eq!(resolve_path(&schema, "collection.2.ba.baba"), baba);
    }

    #[test]
    fn test_resolve_array_index_is_not_range_checked() {
        let schema = fixture();
        let item = resolve_path(&schema, "list.9999").unwrap();
        assert_eq!(item, &SchemaNode::primitive(PrimitiveType::String));
        // Any segment addresses the shared item schema.
        assert_eq!(resolve_path(&schema, "list.first"), Some(item));
    }

    #[test]
    fn test_resolve_undeclared_property_fails() {
        let schema = fixture();
        assert_eq!(resolve_path(&schema, "missing"), None);
        assert_eq!(resolve_path(&schema, "sub.missing"), None);
        assert_eq!(resolve_path(&schema, "collection.0.missing.deeper"), None);
    }

    #[test]
    fn test_resolve_past_primitive_returns_primitive() {
        let schema = fixture();
        let text = resolve_path(&schema, "text").unwrap();
        assert_eq!(resolve_path(&schema, "text.length.more"), Some(text));
    }

    #[test]
    fn test_resolve_numeric_property_name() {
        let schema = SchemaNode::object([("200", SchemaNode::primitive(PrimitiveType::Integer))]);
        assert_eq!(resolve_path(&schema, "200").and_then(SchemaNode::type_name), Some("integer"));
    }

    #[test]
    fn test_resolve_positional_items_is_unsupported() {
        let schema = SchemaNode::object([(
            "pair",
            SchemaNode::tuple(vec![SchemaNode::primitive(PrimitiveType::String)], None),
        )]);
        assert_eq!(resolve_path(&schema, "pair.0"), None);
        let untyped_items = SchemaNode::from_value(&json!({"type": "array"})).unwrap();
        assert_eq!(resolve_path(&untyped_items, "0"), None);
    }

    #[test]
    fn test_resolve_empty_path_is_self() {
        let schema = fixture();
        assert_eq!(resolve(&schema, &[]), Some(&schema));
        assert_eq!(schema.path_schema(&EntityPath::root()), Some(&schema));
    }

    #[test]
    fn test_path_schema_matches_segment_form() {
        let schema = fixture();
        let path = EntityPath::root().child("collection").child(3usize).child("fo");
        assert_eq!(schema.path_schema(&path), resolve_path(&schema, "collection.3.fo"));
    }
}
