//! # Entity Functions
//!
//! [`EntityFunctions`] bundles every entity operation bound to one schema
//! (and optionally a partial schema for update payloads), together with the
//! lifecycle hooks. It is the value a data-access layer holds per entity
//! type.

use entwalk_core::{Rewrite, Visit};
use entwalk_schema::{EntitySchema, SchemaRegistry, ValidationViolations, ValidatorConfig};
use serde_json::Value;

use crate::error::EntityError;
use crate::hooks::{LifecycleHooks, LifecycleStage};
use crate::ops;

/// Entity operations bound to a schema.
#[derive(Debug, Clone)]
pub struct EntityFunctions {
    schema: EntitySchema,
    partial: Option<EntitySchema>,
    hooks: LifecycleHooks,
}

impl EntityFunctions {
    /// Operations for `schema`, with no partial schema and identity hooks.
    pub fn new(schema: EntitySchema) -> Self {
        Self {
            schema,
            partial: None,
            hooks: LifecycleHooks::new(),
        }
    }

    /// Attach the schema used by [`assert_valid_partial`](Self::assert_valid_partial).
    pub fn with_partial(mut self, partial: EntitySchema) -> Self {
        self.partial = Some(partial);
        self
    }

    /// Replace the lifecycle hooks.
    pub fn with_hooks(mut self, hooks: LifecycleHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Compile `name` (and `partial_name`, if given) from `registry`.
    ///
    /// # Errors
    ///
    /// Returns `EntityError::Schema` if either schema is unknown or does
    /// not compile.
    pub fn from_registry(
        registry: &SchemaRegistry,
        name: &str,
        partial_name: Option<&str>,
        config: &ValidatorConfig,
    ) -> Result<Self, EntityError> {
        let mut functions = Self::new(registry.entity_schema(name, config)?);
        if let Some(partial_name) = partial_name {
            functions.partial = Some(registry.entity_schema(partial_name, config)?);
        }
        Ok(functions)
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    pub fn partial_schema(&self) -> Option<&EntitySchema> {
        self.partial.as_ref()
    }

    pub fn hooks(&self) -> &LifecycleHooks {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut LifecycleHooks {
        &mut self.hooks
    }

    /// Check `entity` against the full schema.
    ///
    /// # Errors
    ///
    /// Returns `EntityError::Schema` wrapping `ValidationFailed`.
    pub fn assert_valid<'e>(&self, entity: &'e Value) -> Result<&'e Value, EntityError> {
        Ok(ops::assert_valid(&self.schema, entity)?)
    }

    /// Check `entity` against the partial schema.
    ///
    /// # Errors
    ///
    /// Returns `EntityError::MissingPartialSchema` if no partial schema is
    /// attached, or `EntityError::Schema` wrapping `ValidationFailed`.
    pub fn assert_valid_partial<'e>(&self, entity: &'e Value) -> Result<&'e Value, EntityError> {
        let partial = self.partial.as_ref().ok_or_else(|| EntityError::MissingPartialSchema {
            schema_name: self.schema.name().to_string(),
        })?;
        Ok(ops::assert_valid(partial, entity)?)
    }

    /// Violations of `entity` against the full schema, if any.
    pub fn validate(&self, entity: &Value) -> Option<ValidationViolations> {
        ops::validate(&self.schema, entity)
    }

    /// Visit every schema-described value of `entity`.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error from `visit`.
    pub fn for_deep<E, F>(&self, entity: &Value, visit: F) -> Result<(), E>
    where
        F: FnMut(Visit<'_>) -> Result<(), E>,
    {
        entwalk_core::for_deep(self.schema.node(), entity, visit)
    }

    /// Rebuild `entity`, rewriting each schema-described value.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error from `rewrite`.
    pub fn map_deep<E, F>(&self, entity: &Value, rewrite: F) -> Result<Option<Value>, E>
    where
        F: FnMut(Visit<'_>) -> Result<Rewrite, E>,
    {
        entwalk_core::map_deep(self.schema.node(), entity, rewrite)
    }

    /// See [`ops::clean`].
    pub fn clean(&self, props: &Value) -> Value {
        ops::clean(props)
    }

    /// See [`ops::reset_read_only`].
    pub fn reset_read_only(&self, entity: &Value, source: Option<&Value>) -> Option<Value> {
        ops::reset_read_only(self.schema.node(), entity, source)
    }

    /// Run the hook for `stage`.
    pub fn run_hook(&self, stage: LifecycleStage, value: Value) -> Value {
        self.hooks.run(stage, value)
    }
}
