//! # entwalk-core — Schema-Driven Entity Traversal
//!
//! The dependency-free core of the entwalk stack: schema nodes, entity
//! paths, the lockstep schema/value walker, and the static path resolver.
//!
//! ## Walking (`walk`)
//!
//! - [`for_deep`] visits every value of an entity that has a schema node,
//!   parent before children, in the value's own key order.
//! - [`map_deep`] does the same but rebuilds the entity from the visitor's
//!   [`Rewrite`]s, descending into rewritten containers.
//! - [`traverse`] dispatches on a [`TraversalMode`].
//!
//! ## Resolving (`resolve`)
//!
//! [`resolve`] and [`resolve_path`] find the schema node governing a path
//! without looking at any value.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `entwalk-*` crates.
//! - Inputs are never mutated; transform mode always builds new containers.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod path;
pub mod resolve;
pub mod schema;
pub mod walk;

// Re-export primary types for ergonomic imports.
pub use error::SchemaShapeError;
pub use path::{EntityPath, PathSegment};
pub use resolve::{resolve, resolve_path};
pub use schema::{ArrayItems, ArraySchema, ObjectSchema, PrimitiveSchema, PrimitiveType, SchemaNode};
pub use walk::{for_deep, map_deep, traverse, Rewrite, TraversalMode, Visit};
