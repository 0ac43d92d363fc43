//! # Error Types
//!
//! Errors raised while reading a raw schema document into a tree of
//! [`SchemaNode`](crate::SchemaNode)s.
//!
//! The walker and the resolver themselves cannot fail: an ill-shaped schema
//! is rejected when it is parsed, and callback errors are generic and pass
//! through the walker untouched.

use thiserror::Error;

/// A schema document that cannot be read as a tree of schema nodes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed schema at '{pointer}': {reason}")]
pub struct SchemaShapeError {
    /// JSON Pointer to the offending node within the schema document.
    /// Empty for the document root.
    pub pointer: String,
    /// What is wrong with the node.
    pub reason: String,
}

impl SchemaShapeError {
    pub(crate) fn new(pointer: &str, reason: impl Into<String>) -> Self {
        Self {
            pointer: pointer.to_string(),
            reason: reason.into(),
        }
    }
}
