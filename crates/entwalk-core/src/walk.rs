//! # Schema Walker
//!
//! Walks a schema tree and a value tree in lockstep, calling a visitor once
//! for every value that has a corresponding schema node.
//!
//! ## Traversal Order
//!
//! - **Depth-first, parent before children.** The visitor sees a whole object
//!   or array before any of its members.
//! - **Value order, not schema order.** Object fields are visited in the
//!   insertion order of the value's own keys; fields the schema does not
//!   declare are visited under the untyped schema. Array elements are visited
//!   by index.
//! - **Shape mismatch stops descent.** An object schema paired with a
//!   non-object value, or an array schema paired with a non-array value, is
//!   visited once as a whole and not descended into.
//!
//! ## Modes
//!
//! | Mode        | Visitor result | Output                                    |
//! |-------------|----------------|-------------------------------------------|
//! | `Observe`   | ignored        | none; the input is only read              |
//! | `Transform` | [`Rewrite`]    | a new value tree built from the rewrites  |
//!
//! In transform mode the walker descends into the *rewritten* container, so
//! members added by a whole-container rewrite are visited too. A
//! [`Rewrite::Remove`] drops an object field entirely but leaves `null` in an
//! array slot: arrays never change length through removal.
//!
//! Transform mode never mutates its input. Every rebuilt level is a fresh
//! container.
//!
//! ## Errors
//!
//! The first visitor error aborts the walk and is returned as-is. There is no
//! partial result.

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::path::{EntityPath, PathSegment};
use crate::schema::SchemaNode;

/// Whether a traversal only observes values or rebuilds them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalMode {
    /// Visitor results are ignored and the input is passed through.
    Observe,
    /// Visitor results replace the visited values.
    Transform,
}

/// What a transform visitor wants done with the visited value.
#[derive(Debug, Clone, PartialEq)]
pub enum Rewrite {
    /// Continue with the visited value unchanged.
    Keep,
    /// Continue with this value instead.
    Replace(Value),
    /// Drop the value: the field disappears from its object, an array slot
    /// becomes `null`, a removed root yields no output.
    Remove,
}

impl From<Option<Value>> for Rewrite {
    fn from(value: Option<Value>) -> Self {
        match value {
            Some(value) => Self::Replace(value),
            None => Self::Remove,
        }
    }
}

impl From<Value> for Rewrite {
    fn from(value: Value) -> Self {
        Self::Replace(value)
    }
}

/// Positional context handed to the visitor at every node.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    /// Schema governing `value`.
    pub schema: &'a SchemaNode,
    /// The visited value. In transform mode, a container's members are the
    /// members of its rewritten form.
    pub value: &'a Value,
    /// Address of `value` relative to the traversal root.
    pub path: &'a EntityPath,
    /// The entity the traversal started from. Constant across one walk.
    pub root: &'a Value,
}

impl<'a> Visit<'a> {
    /// Key or index of `value` within its parent; `None` at the root.
    pub fn key(&self) -> Option<&'a PathSegment> {
        self.path.last()
    }
}

/// Walk `entity` under `schema` in the given mode.
///
/// Observe mode returns a copy of `entity`; transform mode returns the
/// rebuilt value, or `None` if the root itself was removed.
///
/// # Errors
///
/// Returns the first error produced by `visit`.
pub fn traverse<E, F>(
    schema: &SchemaNode,
    entity: &Value,
    mode: TraversalMode,
    visit: F,
) -> Result<Option<Value>, E>
where
    F: FnMut(Visit<'_>) -> Result<Rewrite, E>,
{
    let mut walker = Walker::new(entity, visit);
    match mode {
        TraversalMode::Observe => {
            walker.observe(schema, entity)?;
            Ok(Some(entity.clone()))
        }
        TraversalMode::Transform => walker.transform(schema, entity),
    }
}

/// Visit every schema-described value of `entity` without changing anything.
///
/// # Errors
///
/// Returns the first error produced by `visit`.
pub fn for_deep<E, F>(schema: &SchemaNode, entity: &Value, mut visit: F) -> Result<(), E>
where
    F: FnMut(Visit<'_>) -> Result<(), E>,
{
    Walker::new(entity, |node: Visit<'_>| visit(node).map(|()| Rewrite::Keep)).observe(schema, entity)
}

/// Build a new entity by applying `visit` to every schema-described value.
///
/// Returns `None` only if the visitor removed the root.
///
/// # Errors
///
/// Returns the first error produced by `visit`.
pub fn map_deep<E, F>(schema: &SchemaNode, entity: &Value, visit: F) -> Result<Option<Value>, E>
where
    F: FnMut(Visit<'_>) -> Result<Rewrite, E>,
{
    Walker::new(entity, visit).transform(schema, entity)
}

struct Walker<'r, F> {
    root: &'r Value,
    path: EntityPath,
    visit: F,
}

impl<'r, F, E> Walker<'r, F>
where
    F: FnMut(Visit<'_>) -> Result<Rewrite, E>,
{
    fn new(root: &'r Value, visit: F) -> Self {
        Self {
            root,
            path: EntityPath::root(),
            visit,
        }
    }

    fn call(&mut self, schema: &SchemaNode, value: &Value) -> Result<Rewrite, E> {
        tracing::trace!(path = %self.path, schema_type = schema.type_name(), "visit");
        (self.visit)(Visit {
            schema,
            value,
            path: &self.path,
            root: self.root,
        })
    }

    fn descend<T>(
        &mut self,
        segment: PathSegment,
        step: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        self.path.push(segment);
        let result = step(self);
        self.path.pop();
        result
    }

    fn observe(&mut self, schema: &SchemaNode, value: &Value) -> Result<(), E> {
        self.call(schema, value)?;
        match (schema, value) {
            (SchemaNode::Object(object), Value::Object(fields)) => {
                for (key, field) in fields {
                    let field_schema = object.field_schema(key);
                    self.descend(PathSegment::Key(key.clone()), |walker| {
                        walker.observe(field_schema, field)
                    })?;
                }
            }
            (SchemaNode::Array(array), Value::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    let item_schema = array.item_schema(index);
                    self.descend(PathSegment::Index(index), |walker| {
                        walker.observe(item_schema, item)
                    })?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn transform(&mut self, schema: &SchemaNode, value: &Value) -> Result<Option<Value>, E> {
        let current = match self.call(schema, value)? {
            Rewrite::Keep => Cow::Borrowed(value),
            Rewrite::Replace(replacement) => Cow::Owned(replacement),
            Rewrite::Remove => return Ok(None),
        };

        let rebuilt = match (schema, current.as_ref()) {
            (SchemaNode::Object(object), Value::Object(fields)) => {
                let mut rebuilt = Map::with_capacity(fields.len());
                for (key, field) in fields {
                    let field_schema = object.field_schema(key);
                    let result = self.descend(PathSegment::Key(key.clone()), |walker| {
                        walker.transform(field_schema, field)
                    })?;
                    if let Some(result) = result {
                        rebuilt.insert(key.clone(), result);
                    }
                }
                Some(Value::Object(rebuilt))
            }
            (SchemaNode::Array(array), Value::Array(items)) => {
                let mut rebuilt = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let item_schema = array.item_schema(index);
                    let result = self.descend(PathSegment::Index(index), |walker| {
                        walker.transform(item_schema, item)
                    })?;
                    rebuilt.push(result.unwrap_or(Value::Null));
                }
                Some(Value::Array(rebuilt))
            }
            _ => None,
        };

        Ok(Some(rebuilt.unwrap_or_else(|| current.into_owned())))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::schema::{PrimitiveType, SchemaNode};
    use proptest::prelude::*;
    use std::convert::Infallible;

    /// Arbitrary JSON values without floats, a few levels deep.
    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            "[a-z ]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                    .prop_map(|fields| Value::Object(fields.into_iter().collect())),
            ]
        })
    }

    /// A schema that describes every node of `value`.
    fn mirror_schema(value: &Value) -> SchemaNode {
        match value {
            Value::Object(fields) => SchemaNode::object(fields.iter().map(|(k, v)| (k.clone(), mirror_schema(v)))),
            Value::Array(items) => SchemaNode::tuple(items.iter().map(mirror_schema).collect(), None),
            Value::String(_) => SchemaNode::primitive(PrimitiveType::String),
            Value::Bool(_) => SchemaNode::primitive(PrimitiveType::Boolean),
            Value::Number(_) => SchemaNode::primitive(PrimitiveType::Integer),
            Value::Null => SchemaNode::primitive(PrimitiveType::Null),
        }
    }

    fn node_count(value: &Value) -> usize {
        1 + match value {
            Value::Object(fields) => fields.values().map(node_count).sum(),
            Value::Array(items) => items.iter().map(node_count).sum(),
            _ => 0,
        }
    }

    proptest! {
        /// Keeping every value rebuilds an equal tree.
        #[test]
        fn keep_everywhere_is_identity(value in json_value()) {
            let schema = mirror_schema(&value);
            let out = map_deep(&schema, &value, |_| Ok::<_, Infallible>(Rewrite::Keep)).unwrap();
            prop_assert_eq!(out, Some(value));
        }

        /// Replacing every value with itself rebuilds an equal tree.
        #[test]
        fn replace_with_self_is_identity(value in json_value()) {
            let schema = mirror_schema(&value);
            let out = map_deep(&schema, &value, |visit| {
                Ok::<_, Infallible>(Rewrite::Replace(visit.value.clone()))
            })
            .unwrap();
            prop_assert_eq!(out, Some(value));
        }

        /// Every node is visited exactly once, each after its parent.
        #[test]
        fn observe_covers_each_node_once(value in json_value()) {
            let schema = mirror_schema(&value);
            let mut paths: Vec<EntityPath> = Vec::new();
            for_deep(&schema, &value, |visit| {
                paths.push(visit.path.clone());
                Ok::<_, Infallible>(())
            })
            .unwrap();

            prop_assert_eq!(paths.len(), node_count(&value));
            for (i, path) in paths.iter().enumerate() {
                prop_assert!(path.lookup(&value).is_some(), "{} does not address a value", path);
                if let Some(parent) = path.parent() {
                    prop_assert!(paths[..i].contains(&parent), "{} visited before its parent", path);
                }
            }
            let mut unique = paths.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), paths.len());
        }

        /// Removing every scalar strips object fields but preserves array
        /// lengths.
        #[test]
        fn remove_preserves_array_length(value in json_value()) {
            let schema = mirror_schema(&value);
            let out = map_deep(&schema, &value, |visit| {
                Ok::<_, Infallible>(match visit.value {
                    Value::Object(_) | Value::Array(_) => Rewrite::Keep,
                    _ => Rewrite::Remove,
                })
            })
            .unwrap();

            fn check(before: &Value, after: Option<&Value>) -> bool {
                match (before, after) {
                    (Value::Array(items), Some(Value::Array(rebuilt))) => {
                        items.len() == rebuilt.len()
                            && items.iter().zip(rebuilt).all(|(b, a)| match b {
                                Value::Object(_) | Value::Array(_) => check(b, Some(a)),
                                _ => a.is_null(),
                            })
                    }
                    (Value::Object(fields), Some(Value::Object(rebuilt))) => fields.iter().all(|(k, b)| match b {
                        Value::Object(_) | Value::Array(_) => check(b, rebuilt.get(k)),
                        _ => !rebuilt.contains_key(k),
                    }),
                    (Value::Object(_) | Value::Array(_), _) => false,
                    (_, after) => after.is_none(),
                }
            }
            prop_assert!(check(&value, out.as_ref()));
        }
    }
}
