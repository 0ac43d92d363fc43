//! # entwalk-schema — Schema Loading & Validation
//!
//! The validation capability the entity layer delegates to, and the loading
//! path that turns schema documents on disk into [`EntitySchema`]s.
//!
//! ## Validation (`validate`)
//!
//! [`EntityValidator`] is the seam for the external validator.
//! [`JsonSchemaValidator`] implements it with the `jsonschema` crate and
//! reports structured [`Violation`]s. `$ref`s resolve locally through
//! [`LocalSchemaRetriever`]; nothing is fetched over the network.
//!
//! ## Loading (`registry`, `config`)
//!
//! [`SchemaRegistry::load_dir`] reads `*.schema.json` and `*.schema.yaml`
//! documents from a directory. [`ValidatorConfig`] selects the draft and the
//! base URI for cross-document references.
//!
//! ## Crate Policy
//!
//! - Depends only on `entwalk-core` internally.
//! - Invalid instances are reported with the instance path, the schema path,
//!   and a message for every violation.

pub mod config;
pub mod entity;
pub mod registry;
pub mod validate;

pub use config::{SchemaDraft, ValidatorConfig, DEFAULT_BASE_URI};
pub use entity::EntitySchema;
pub use registry::{read_document, SchemaRegistry};
pub use validate::{
    EntityValidator, JsonSchemaValidator, LocalSchemaRetriever, SchemaValidationError, ValidationViolations,
    Violation,
};
