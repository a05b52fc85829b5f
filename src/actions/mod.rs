//! Recovery and notification actions.
//!
//! # Data Flow
//! ```text
//! startup:
//!     config → build_registry() → ActionRegistry (frozen)
//!
//! threshold crossed:
//!     FanoutDispatcher::dispatch(cause)
//!     → one task per registered action
//!     → ActionOutcome logged + recorded in metrics
//! ```
//!
//! # Design Decisions
//! - Actions never see each other; one failing, panicking or hanging
//!   action cannot affect the rest
//! - No retries: an error is recorded and dropped
//! - Dry-run is fixed at construction; actions still build their
//!   payloads but skip the side effect

pub mod fanout;
pub mod log;
pub mod registry;
pub mod webhook;

use std::future::Future;
use std::sync::Arc;
use async_trait::async_trait;
use thiserror::Error;

use crate::config::MonitorConfig;
use crate::health::CheckError;

pub use fanout::{ActionOutcome, Dispatch, FanoutDispatcher};
pub use log::LogAction;
pub use registry::{ActionRegistry, RegistryError};
pub use webhook::WebhookAction;

/// Errors returned by an action's trigger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("endpoint returned status {0}")]
    Status(u16),

    #[error("action panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Failed(String),
}

/// A named, independently triggerable side effect.
#[async_trait]
pub trait Action: Send + Sync {
    /// React to a threshold crossing caused by `cause`.
    async fn trigger(&self, cause: CheckError) -> Result<(), ActionError>;
}

/// Adapts a closure into an [`Action`].
pub struct FnAction<F>(F);

impl<F> FnAction<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F, Fut> Action for FnAction<F>
where
    F: Fn(CheckError) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
{
    async fn trigger(&self, cause: CheckError) -> Result<(), ActionError> {
        (self.0)(cause).await
    }
}

/// What actions know about the monitor that fired them.
#[derive(Debug, Clone)]
pub struct AlertContext {
    pub target: String,
    pub threshold: u32,
    pub dry_run: bool,
}

impl AlertContext {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            target: config.check.target.clone(),
            threshold: config.check.failure_threshold,
            dry_run: config.actions.dry_run,
        }
    }

    /// Human-readable alert body.
    pub fn message(&self, cause: &CheckError) -> String {
        format!(
            "Reachability to {} failed {} consecutive checks. Last error: {}",
            self.target, self.threshold, cause
        )
    }
}

/// Error building the configured actions.
#[derive(Debug, Error)]
pub enum ActionSetupError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to build webhook client: {0}")]
    Webhook(#[from] reqwest::Error),
}

/// Build the registry of actions enabled in `config`.
pub fn build_registry(config: &MonitorConfig) -> Result<ActionRegistry, ActionSetupError> {
    let context = AlertContext::from_config(config);
    let mut registry = ActionRegistry::new();

    let log_action = config
        .actions
        .log
        .enabled
        .then(|| Arc::new(LogAction::new(context.clone())) as Arc<dyn Action>);
    registry.register("log", log_action)?;

    let webhook_action = match &config.actions.webhook {
        Some(webhook) => Some(Arc::new(WebhookAction::new(context, webhook)?) as Arc<dyn Action>),
        None => None,
    };
    registry.register("webhook", webhook_action)?;

    Ok(registry)
}
