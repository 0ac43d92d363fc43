//! # Error Types
//!
//! Errors surfaced by entity operations. Validation diagnostics come from
//! the validator untouched; this layer adds no formatting of its own.

use entwalk_schema::{SchemaValidationError, ValidationViolations};
use thiserror::Error;

/// Error raised by an entity operation.
#[derive(Error, Debug)]
pub enum EntityError {
    /// Validation failed, or a schema could not be loaded or compiled.
    #[error(transparent)]
    Schema(#[from] SchemaValidationError),

    /// A partial-schema operation was requested on an entity type that was
    /// configured without one.
    #[error("entity type '{schema_name}' has no partial schema")]
    MissingPartialSchema {
        /// Name of the full schema of the entity type.
        schema_name: String,
    },
}

impl EntityError {
    /// The violations, if this error is a failed validation.
    pub fn violations(&self) -> Option<&ValidationViolations> {
        match self {
            Self::Schema(SchemaValidationError::ValidationFailed { violations, .. }) => Some(violations),
            _ => None,
        }
    }
}
