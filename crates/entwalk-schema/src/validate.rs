//! # Entity Validation
//!
//! The validation capability the entity layer delegates to. The traversal
//! core never validates; it only follows a schema's declared shape.
//!
//! ## Seam
//!
//! [`EntityValidator`] is the pluggable boundary: anything that can list the
//! violations of an instance can back an
//! [`EntitySchema`](crate::EntitySchema). The default implementation,
//! [`JsonSchemaValidator`], compiles the schema document with the
//! `jsonschema` crate.
//!
//! ## Schema Resolution
//!
//! Cross-schema `$ref`s are resolved locally by [`LocalSchemaRetriever`]
//! from schemas the caller has already loaded. URIs that match nothing
//! resolve to the permissive schema `{}`, so compiling never reaches the
//! network.
//!
//! ## Diagnostics
//!
//! A failed validation carries one [`Violation`] per failing constraint, with
//! the JSON Pointer of the failing instance value, the JSON Pointer of the
//! schema keyword, and a readable message.

use std::collections::HashMap;
use std::fmt;

use entwalk_core::SchemaShapeError;
use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;
use thiserror::Error;

use crate::config::ValidatorConfig;

/// Failure to turn a schema document into an [`EntitySchema`](crate::EntitySchema),
/// or an entity that the schema rejects.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The entity breaks one or more constraints of its schema.
    #[error("entity does not satisfy '{schema_name}':\n{violations}")]
    ValidationFailed {
        schema_name: String,
        violations: ValidationViolations,
    },

    /// A schema is missing from the registry or its file does not parse.
    #[error("cannot load schema '{schema_name}': {reason}")]
    SchemaLoadError { schema_name: String, reason: String },

    /// A JSON or YAML document on disk does not read or parse.
    #[error("cannot load document {path}: {reason}")]
    DocumentLoadError { path: String, reason: String },

    /// `jsonschema` refused the document under the configured draft.
    #[error("cannot compile schema '{schema_name}': {reason}")]
    ValidatorBuildError { schema_name: String, reason: String },

    /// `type`, `properties`, `items` or `readOnly` has a shape the walker
    /// cannot follow.
    #[error("schema '{schema_name}' cannot be walked: {source}")]
    Shape {
        schema_name: String,
        #[source]
        source: SchemaShapeError,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// One failed constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the offending value within the entity; empty for the
    /// entity itself.
    pub instance_path: String,
    /// JSON Pointer to the failing keyword within the schema document.
    pub schema_path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = if self.instance_path.is_empty() {
            "(root)"
        } else {
            self.instance_path.as_str()
        };
        write!(f, "  {at}: {}", self.message)
    }
}

/// Every failed constraint of one entity, in validator order. Empty means
/// the entity is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl From<Vec<Violation>> for ValidationViolations {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

/// One violation per line.
impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = self.violations.iter();
        if let Some(first) = lines.next() {
            write!(f, "{first}")?;
        }
        for violation in lines {
            write!(f, "\n{violation}")?;
        }
        Ok(())
    }
}

/// The external validation capability: list every way `instance` fails.
///
/// Implementations must be shareable across threads; an empty list means
/// the instance is valid.
pub trait EntityValidator: Send + Sync {
    /// All violations of `instance`, in the implementation's order.
    fn violations(&self, instance: &Value) -> Vec<Violation>;
}

/// An [`EntityValidator`] backed by a compiled `jsonschema` validator.
pub struct JsonSchemaValidator {
    validator: Validator,
}

impl JsonSchemaValidator {
    /// Compile `schema` with the draft from `config`.
    ///
    /// `$ref`s resolve through `retriever` only.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidatorBuildError` if the document is
    /// not a valid schema for the configured draft.
    pub fn compile(
        schema_name: &str,
        schema: &Value,
        config: &ValidatorConfig,
        retriever: LocalSchemaRetriever,
    ) -> Result<Self, SchemaValidationError> {
        let mut opts = jsonschema::options();
        opts.with_draft(config.draft.into());
        opts.with_retriever(retriever);

        let validator = opts.build(schema).map_err(|e| SchemaValidationError::ValidatorBuildError {
            schema_name: schema_name.to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(schema = schema_name, draft = ?config.draft, "compiled validator");
        Ok(Self { validator })
    }
}

impl EntityValidator for JsonSchemaValidator {
    fn violations(&self, instance: &Value) -> Vec<Violation> {
        self.validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect()
    }
}

impl fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaValidator").finish_non_exhaustive()
    }
}

/// Local retriever that resolves `$ref` URIs to schemas held in memory.
///
/// Lookup order: the full URI, then the URI's last path component as a file
/// name under the configured base URI, then the bare file name. Anything
/// else resolves to `{}`.
#[derive(Debug, Clone, Default)]
pub struct LocalSchemaRetriever {
    base_uri: String,
    schemas_by_uri: HashMap<String, Value>,
}

impl LocalSchemaRetriever {
    /// An empty retriever addressing file names under `base_uri`.
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            schemas_by_uri: HashMap::new(),
        }
    }

    /// Register `schema` under its file name, under `base_uri` + file name,
    /// and under its own `$id` if it has one.
    pub fn register(&mut self, file_name: &str, schema: &Value) {
        self.schemas_by_uri
            .insert(format!("{}{file_name}", self.base_uri), schema.clone());
        if let Some(id) = schema.get("$id").and_then(Value::as_str) {
            self.schemas_by_uri.insert(id.to_string(), schema.clone());
        }
        self.schemas_by_uri.insert(file_name.to_string(), schema.clone());
    }

    fn lookup(&self, uri: &str) -> Option<&Value> {
        if let Some(value) = self.schemas_by_uri.get(uri) {
            return Some(value);
        }
        let without_fragment = uri.split('#').next().unwrap_or(uri);
        let file_name = without_fragment.rsplit('/').next().unwrap_or(without_fragment);
        self.schemas_by_uri
            .get(&format!("{}{file_name}", self.base_uri))
            .or_else(|| self.schemas_by_uri.get(file_name))
    }
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        match self.lookup(uri.as_str()) {
            Some(value) => Ok(value.clone()),
            None => {
                tracing::debug!(uri = uri.as_str(), "unresolved $ref, using permissive schema");
                Ok(serde_json::json!({}))
            }
        }
    }
}
