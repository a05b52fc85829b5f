//! Concurrent fanout of one trigger to every registered action.
//!
//! # Responsibilities
//! - Spawn one task per action for each trigger
//! - Contain action errors and panics inside that task
//! - Log and record each action's outcome and latency
//!
//! # Design Decisions
//! - `dispatch` returns as soon as the tasks are spawned; the returned
//!   [`Dispatch`] may be dropped without cancelling anything
//! - Outcomes are not aggregated; each stands alone

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::actions::{Action, ActionError, ActionRegistry};
use crate::health::CheckError;
use crate::observability::metrics;

/// Result of one action invocation.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub name: String,
    pub result: Result<(), ActionError>,
    pub elapsed: Duration,
}

/// Handles to the tasks started by one dispatch.
///
/// Dropping it detaches the tasks.
#[must_use = "drop explicitly to fire and forget"]
pub struct Dispatch {
    tasks: Vec<(String, JoinHandle<ActionOutcome>)>,
}

impl Dispatch {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every action started by this dispatch.
    pub async fn join(self) -> Vec<ActionOutcome> {
        let mut outcomes = Vec::with_capacity(self.tasks.len());
        for (name, task) in self.tasks {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) => ActionOutcome {
                    name,
                    result: Err(ActionError::Panicked(e.to_string())),
                    elapsed: Duration::ZERO,
                },
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}

/// Broadcasts trigger events to an immutable set of actions.
#[derive(Clone, Debug)]
pub struct FanoutDispatcher {
    registry: Arc<ActionRegistry>,
}

impl FanoutDispatcher {
    pub fn new(registry: ActionRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Start every action with its own copy of `cause` and return immediately.
    pub fn dispatch(&self, cause: CheckError) -> Dispatch {
        tracing::info!(actions = self.registry.len(), "Async fanning out actions");

        let tasks = self
            .registry
            .iter()
            .map(|(name, action)| {
                let task = tokio::spawn(run_action(
                    name.to_string(),
                    action.clone(),
                    cause.clone(),
                ));
                (name.to_string(), task)
            })
            .collect();

        Dispatch { tasks }
    }
}

async fn run_action(name: String, action: Arc<dyn Action>, cause: CheckError) -> ActionOutcome {
    let start = Instant::now();

    let result = match AssertUnwindSafe(action.trigger(cause)).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(ActionError::Panicked(panic_message(&*panic))),
    };
    let elapsed = start.elapsed();

    match &result {
        Ok(()) => tracing::info!(action = %name, elapsed = ?elapsed, "Action completed"),
        Err(e) => tracing::error!(action = %name, elapsed = ?elapsed, error = %e, "Action failed"),
    }
    metrics::record_action(&name, result.is_ok(), elapsed);

    ActionOutcome {
        name,
        result,
        elapsed,
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
