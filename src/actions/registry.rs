//! Named action registry.

use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::actions::Action;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("action {0:?} registered twice")]
    DuplicateName(String),
}

/// Mapping from unique action name to action.
///
/// Built once at startup, then frozen behind an `Arc` by the dispatcher.
#[derive(Default, Clone)]
pub struct ActionRegistry {
    actions: BTreeMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` under `name`. `None` is skipped, so optional
    /// back-ends can be passed straight through when unconfigured.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        action: Option<Arc<dyn Action>>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        let Some(action) = action else {
            tracing::info!(action = %name, "Skipping action due to absent configuration");
            return Ok(());
        };

        if self.actions.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        tracing::info!(action = %name, "Registered action");
        self.actions.insert(name, action);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.actions.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Action>)> {
        self.actions.iter().map(|(name, action)| (name.as_str(), action))
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}
