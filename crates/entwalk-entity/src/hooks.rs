//! # Lifecycle Hooks
//!
//! Named composition points around entity creation, update, and deletion.
//! Every stage defaults to the identity function; callers override only the
//! stages they care about. There is no hook framework: a stage is a key and
//! its hook is a plain function from value to value.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A point in an entity's lifecycle where a hook runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStage {
    ShouldCreate,
    WillCreate,
    DidCreate,
    ShouldUpdate,
    WillUpdate,
    DidUpdate,
    ShouldDelete,
    WillDelete,
    DidDelete,
}

impl LifecycleStage {
    /// Every stage, in lifecycle order.
    pub const ALL: [LifecycleStage; 9] = [
        Self::ShouldCreate,
        Self::WillCreate,
        Self::DidCreate,
        Self::ShouldUpdate,
        Self::WillUpdate,
        Self::DidUpdate,
        Self::ShouldDelete,
        Self::WillDelete,
        Self::DidDelete,
    ];

    /// The stage name in snake case.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShouldCreate => "should_create",
            Self::WillCreate => "will_create",
            Self::DidCreate => "did_create",
            Self::ShouldUpdate => "should_update",
            Self::WillUpdate => "will_update",
            Self::DidUpdate => "did_update",
            Self::ShouldDelete => "should_delete",
            Self::WillDelete => "will_delete",
            Self::DidDelete => "did_delete",
        }
    }
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle hook.
pub type Hook = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Hooks for every lifecycle stage, identity unless overridden.
#[derive(Clone, Default)]
pub struct LifecycleHooks {
    overrides: HashMap<LifecycleStage, Hook>,
}

impl LifecycleHooks {
    /// All stages set to identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    pub fn with_hook(mut self, stage: LifecycleStage, hook: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.set(stage, hook);
        self
    }

    /// Override the hook for `stage`.
    pub fn set(&mut self, stage: LifecycleStage, hook: impl Fn(Value) -> Value + Send + Sync + 'static) {
        self.overrides.insert(stage, Arc::new(hook));
    }

    /// Restore identity for `stage`.
    pub fn reset(&mut self, stage: LifecycleStage) {
        self.overrides.remove(&stage);
    }

    /// Returns true if `stage` has a non-default hook.
    pub fn is_overridden(&self, stage: LifecycleStage) -> bool {
        self.overrides.contains_key(&stage)
    }

    /// Run the hook for `stage`.
    pub fn run(&self, stage: LifecycleStage, value: Value) -> Value {
        match self.overrides.get(&stage) {
            Some(hook) => {
                tracing::trace!(%stage, "running lifecycle hook");
                hook(value)
            }
            None => value,
        }
    }
}

impl fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut overridden: Vec<_> = self.overrides.keys().collect();
        overridden.sort();
        f.debug_struct("LifecycleHooks")
            .field("overridden", &overridden)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_stage_defaults_to_identity() {
        let hooks = LifecycleHooks::new();
        let value = json!({"title": "x", "tags": [1, 2]});
        for stage in LifecycleStage::ALL {
            assert!(!hooks.is_overridden(stage));
            assert_eq!(hooks.run(stage, value.clone()), value, "stage {stage}");
        }
    }

    #[test]
    fn test_override_one_stage() {
        let hooks = LifecycleHooks::new().with_hook(LifecycleStage::WillCreate, |mut value| {
            value["created"] = json!(true);
            value
        });
        assert!(hooks.is_overridden(LifecycleStage::WillCreate));
        assert_eq!(
            hooks.run(LifecycleStage::WillCreate, json!({"title": "x"})),
            json!({"title": "x", "created": true})
        );
        assert_eq!(hooks.run(LifecycleStage::WillUpdate, json!({"title": "x"})), json!({"title": "x"}));
    }

    #[test]
    fn test_reset_restores_identity() {
        let mut hooks = LifecycleHooks::new().with_hook(LifecycleStage::DidDelete, |_| Value::Null);
        hooks.reset(LifecycleStage::DidDelete);
        assert_eq!(hooks.run(LifecycleStage::DidDelete, json!(1)), json!(1));
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(LifecycleStage::ShouldUpdate.to_string(), "should_update");
        assert_eq!(serde_json::to_value(LifecycleStage::DidCreate).unwrap(), json!("did_create"));
        let stage: LifecycleStage = serde_json::from_value(json!("will_delete")).unwrap();
        assert_eq!(stage, LifecycleStage::WillDelete);
    }

    #[test]
    fn test_debug_lists_overrides() {
        let hooks = LifecycleHooks::new().with_hook(LifecycleStage::DidUpdate, |v| v);
        assert!(format!("{hooks:?}").contains("DidUpdate"));
    }
}
