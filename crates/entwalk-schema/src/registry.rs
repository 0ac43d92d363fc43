//! # Schema Registry
//!
//! Loads entity schema documents from a directory and compiles them into
//! [`EntitySchema`]s with every other registered document available for
//! `$ref` resolution.
//!
//! Schema files are recognized by suffix: `*.schema.json`, `*.schema.yaml`,
//! and `*.schema.yml`. YAML documents are converted to JSON values; since
//! YAML allows non-string mapping keys, scalar keys are stringified.
//! Documents are indexed by file name.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::config::ValidatorConfig;
use crate::entity::EntitySchema;
use crate::validate::{LocalSchemaRetriever, SchemaValidationError};

const SCHEMA_SUFFIXES: [&str; 3] = [".schema.json", ".schema.yaml", ".schema.yml"];

/// An in-memory set of schema documents keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Value>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every schema document found directly inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoadError` if the directory
    /// cannot be read or a schema file is not valid JSON/YAML.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, SchemaValidationError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| SchemaValidationError::SchemaLoadError {
            schema_name: dir.display().to_string(),
            reason: format!("cannot read schema directory: {e}"),
        })?;

        let mut registry = Self::new();
        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !SCHEMA_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
                continue;
            }
            let schema = read_document(&path).map_err(|e| match e {
                SchemaValidationError::DocumentLoadError { reason, .. } => SchemaValidationError::SchemaLoadError {
                    schema_name: name.to_string(),
                    reason,
                },
                other => other,
            })?;
            tracing::debug!(schema = name, dir = %dir.display(), "loaded schema");
            registry.insert(name, schema);
        }
        Ok(registry)
    }

    /// Add or replace a schema document.
    pub fn insert(&mut self, name: impl Into<String>, schema: Value) -> Option<Value> {
        self.schemas.insert(name.into(), schema)
    }

    /// Look up a schema document by file name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Returns the names of all loaded schemas, sorted alphabetically.
    pub fn names(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    /// Returns the number of loaded schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true if no schema is loaded.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// A retriever over every registered document.
    pub fn retriever(&self, config: &ValidatorConfig) -> LocalSchemaRetriever {
        let mut retriever = LocalSchemaRetriever::new(config.base_uri.clone());
        for (name, schema) in &self.schemas {
            retriever.register(name, schema);
        }
        retriever
    }

    /// Compile the named schema into an [`EntitySchema`].
    ///
    /// # Errors
    ///
    /// Returns `SchemaLoadError` if `name` is not registered, `Shape` if its
    /// structural keywords are malformed, and `ValidatorBuildError` if it
    /// does not compile.
    pub fn entity_schema(
        &self,
        name: &str,
        config: &ValidatorConfig,
    ) -> Result<EntitySchema, SchemaValidationError> {
        let raw = self.get(name).ok_or_else(|| SchemaValidationError::SchemaLoadError {
            schema_name: name.to_string(),
            reason: format!("not one of the {} registered schemas", self.len()),
        })?;
        EntitySchema::compile_with(name, raw.clone(), config, self.retriever(config))
    }
}

/// Read a JSON or YAML document, choosing the format by file extension.
///
/// # Errors
///
/// Returns `SchemaValidationError::DocumentLoadError` if the file cannot be
/// read or parsed.
pub fn read_document(path: &Path) -> Result<Value, SchemaValidationError> {
    let load_error = |reason: String| SchemaValidationError::DocumentLoadError {
        path: path.display().to_string(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| load_error(format!("cannot read file: {e}")))?;

    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "yaml" | "yml" => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(&content).map_err(|e| load_error(format!("invalid YAML: {e}")))?;
            yaml_to_json_value(&yaml).map_err(|e| load_error(format!("YAML-to-JSON conversion failed: {e}")))
        }
        _ => serde_json::from_str(&content).map_err(|e| load_error(format!("invalid JSON: {e}"))),
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Tags are dropped; scalar mapping keys are stringified; non-scalar keys
/// and non-finite floats are rejected.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(i.into()))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(u.into()))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut fields = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                fields.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(fields))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
