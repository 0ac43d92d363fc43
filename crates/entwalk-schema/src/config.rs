//! # Validator Configuration
//!
//! Settings for compiling schema documents into validators. The types are
//! serde-deserializable so they can sit inside a caller's own configuration
//! file; every field has a default.

use serde::{Deserialize, Serialize};

/// Base URI under which registry schemas are addressable by file name.
pub const DEFAULT_BASE_URI: &str = "https://schemas.entwalk.dev/";

/// JSON Schema draft used to interpret schema documents.
///
/// Defaults to draft-07, the newest draft where a list-form `items` with an
/// `additionalItems` fallback is a legal array schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SchemaDraft {
    #[serde(rename = "draft-04")]
    Draft4,
    #[serde(rename = "draft-06")]
    Draft6,
    #[default]
    #[serde(rename = "draft-07")]
    Draft7,
    #[serde(rename = "2019-09")]
    Draft201909,
    #[serde(rename = "2020-12")]
    Draft202012,
}

impl From<SchemaDraft> for jsonschema::Draft {
    fn from(draft: SchemaDraft) -> Self {
        match draft {
            SchemaDraft::Draft4 => jsonschema::Draft::Draft4,
            SchemaDraft::Draft6 => jsonschema::Draft::Draft6,
            SchemaDraft::Draft7 => jsonschema::Draft::Draft7,
            SchemaDraft::Draft201909 => jsonschema::Draft::Draft201909,
            SchemaDraft::Draft202012 => jsonschema::Draft::Draft202012,
        }
    }
}

/// How schema documents are compiled into validators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ValidatorConfig {
    /// Draft used for every compiled schema.
    pub draft: SchemaDraft,
    /// Prefix under which `$ref` URIs address registry schemas by file name.
    /// Must end with `/`.
    pub base_uri: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            draft: SchemaDraft::default(),
            base_uri: DEFAULT_BASE_URI.to_string(),
        }
    }
}
