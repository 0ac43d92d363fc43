//! # Entity Schemas
//!
//! An [`EntitySchema`] pairs a raw schema document with the [`SchemaNode`]
//! tree the walker follows and the validator that checks instances against
//! the full document. The three always describe the same document.
//!
//! Entity schemas are cheap to clone and safe to share across threads.

use std::fmt;
use std::sync::Arc;

use entwalk_core::SchemaNode;
use serde_json::Value;

use crate::config::ValidatorConfig;
use crate::validate::{
    EntityValidator, JsonSchemaValidator, LocalSchemaRetriever, SchemaValidationError, ValidationViolations,
};

/// A schema document ready for traversal and validation.
#[derive(Clone)]
pub struct EntitySchema {
    name: Arc<str>,
    raw: Arc<Value>,
    node: Arc<SchemaNode>,
    validator: Arc<dyn EntityValidator>,
}

impl EntitySchema {
    /// Compile a standalone schema document with the `jsonschema` validator.
    ///
    /// `$ref`s to other documents are not resolved; use
    /// [`SchemaRegistry::entity_schema`](crate::SchemaRegistry::entity_schema)
    /// for that.
    ///
    /// # Errors
    ///
    /// Returns `Shape` if the structural keywords are malformed and
    /// `ValidatorBuildError` if the document does not compile.
    pub fn compile(
        name: &str,
        raw: Value,
        config: &ValidatorConfig,
    ) -> Result<Self, SchemaValidationError> {
        Self::compile_with(name, raw, config, LocalSchemaRetriever::new(config.base_uri.clone()))
    }

    /// Compile with `$ref`s resolved through `retriever`. The structural
    /// tree is read first, so a malformed shape is reported as `Shape` even
    /// when the document would also fail to compile.
    pub(crate) fn compile_with(
        name: &str,
        raw: Value,
        config: &ValidatorConfig,
        retriever: LocalSchemaRetriever,
    ) -> Result<Self, SchemaValidationError> {
        let node = parse_node(name, &raw)?;
        let validator = JsonSchemaValidator::compile(name, &raw, config, retriever)?;
        Ok(Self::from_parts(name, raw, node, validator))
    }

    /// Pair a schema document with any validator.
    ///
    /// # Errors
    ///
    /// Returns `Shape` if the structural keywords are malformed.
    pub fn with_validator(
        name: &str,
        raw: Value,
        validator: impl EntityValidator + 'static,
    ) -> Result<Self, SchemaValidationError> {
        let node = parse_node(name, &raw)?;
        Ok(Self::from_parts(name, raw, node, validator))
    }

    fn from_parts(name: &str, raw: Value, node: SchemaNode, validator: impl EntityValidator + 'static) -> Self {
        Self {
            name: name.into(),
            raw: Arc::new(raw),
            node: Arc::new(node),
            validator: Arc::new(validator),
        }
    }

    /// Schema name, typically its file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The schema document as given.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The structural tree the walker follows.
    pub fn node(&self) -> &SchemaNode {
        &self.node
    }

    /// All violations of `instance`; empty when valid.
    pub fn violations(&self, instance: &Value) -> ValidationViolations {
        self.validator.violations(instance).into()
    }

    /// Check `instance` against the schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidationFailed` listing every
    /// violation.
    pub fn validate(&self, instance: &Value) -> Result<(), SchemaValidationError> {
        let violations = self.violations(instance);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError::ValidationFailed {
                schema_name: self.name.to_string(),
                violations,
            })
        }
    }
}

fn parse_node(name: &str, raw: &Value) -> Result<SchemaNode, SchemaValidationError> {
    SchemaNode::from_value(raw).map_err(|source| SchemaValidationError::Shape {
        schema_name: name.to_string(),
        source,
    })
}

impl AsRef<SchemaNode> for EntitySchema {
    fn as_ref(&self) -> &SchemaNode {
        &self.node
    }
}

impl fmt::Debug for EntitySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySchema")
            .field("name", &self.name)
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}
