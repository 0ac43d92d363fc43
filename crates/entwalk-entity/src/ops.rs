//! # Entity Operations
//!
//! Named operations over an entity and its schema, composed from the walker
//! in `entwalk-core` and the validator in `entwalk-schema`.
//!
//! ## Read-Only Reset
//!
//! [`reset_read_only`] rebuilds an entity with every `readOnly` value, at any
//! depth, taken from a source entity at the identical path instead of from the
//! subject. A read-only value the source does not have is removed: the field
//! disappears from its object, or an array slot becomes `null`. Without a
//! source every read-only field is stripped. Non-read-only values pass
//! through unchanged.
//!
//! Source lookups index the plain source value (see
//! [`EntityPath::lookup`](entwalk_core::EntityPath::lookup)), not the schema.

use std::convert::Infallible;

use entwalk_core::{map_deep, Rewrite, SchemaNode};
use entwalk_schema::{EntitySchema, SchemaValidationError, ValidationViolations};
use serde_json::Value;

pub use entwalk_core::{for_deep, traverse, TraversalMode};

/// Check `entity` against `schema`, handing it back when valid.
///
/// # Errors
///
/// Returns `SchemaValidationError::ValidationFailed` listing every
/// violation.
pub fn assert_valid<'e>(schema: &EntitySchema, entity: &'e Value) -> Result<&'e Value, SchemaValidationError> {
    schema.validate(entity)?;
    Ok(entity)
}

/// Check `entity` against `schema`, returning the violations if any.
pub fn validate(schema: &EntitySchema, entity: &Value) -> Option<ValidationViolations> {
    let violations = schema.violations(entity);
    (!violations.is_empty()).then_some(violations)
}

/// Shallow copy of an object without its `null` fields.
///
/// Nested objects are copied as-is; non-object values are returned
/// unchanged.
pub fn clean(props: &Value) -> Value {
    match props {
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Rebuild `entity` with read-only values reset from `source`.
///
/// Returns `None` only when the root schema itself is read-only and no
/// source is given. A read-only root with a source is replaced by the whole
/// source. In neither case is the root collapsed to an empty object.
pub fn reset_read_only(schema: &SchemaNode, entity: &Value, source: Option<&Value>) -> Option<Value> {
    let reset = map_deep(schema, entity, |visit| {
        if !visit.schema.is_read_only() {
            return Ok::<_, Infallible>(Rewrite::Keep);
        }
        let restored = source.and_then(|source| visit.path.lookup(source));
        tracing::debug!(path = %visit.path, restored = restored.is_some(), "reset read-only value");
        Ok(restored.cloned().into())
    });
    match reset {
        Ok(entity) => entity,
        Err(never) => match never {},
    }
}
