//! # entwalk-entity — Entity Operations
//!
//! Named operations over an entity and its schema, built from the walker in
//! `entwalk-core` and the validator in `entwalk-schema`.
//!
//! ## Operations (`ops`)
//!
//! - [`assert_valid`] and [`validate`] delegate to the schema's validator.
//! - [`clean`] drops `null` fields from an object, one level deep.
//! - [`reset_read_only`] strips or restores every `readOnly` value at any
//!   depth from a source entity.
//!
//! ## Bundles (`functions`, `hooks`)
//!
//! [`EntityFunctions`] binds the operations to one entity type's schema and
//! optional partial schema. [`LifecycleHooks`] holds the nine create, update,
//! and delete hooks, each the identity function unless overridden.
//!
//! ## Crate Policy
//!
//! - Inputs are never mutated; every rebuilt entity is a new value.
//! - Validation diagnostics are passed through from the validator unchanged.

pub mod error;
pub mod functions;
pub mod hooks;
pub mod ops;

pub use error::EntityError;
pub use functions::EntityFunctions;
pub use hooks::{Hook, LifecycleHooks, LifecycleStage};
pub use ops::{assert_valid, clean, reset_read_only, validate};
