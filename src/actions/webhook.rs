//! HTTP webhook notification.
//!
//! # Responsibilities
//! - POST a JSON alert to a configured URL
//! - Treat transport errors and non-2xx responses as failures
//!
//! # Design Decisions
//! - The client carries its own request timeout so a hung endpoint
//!   only holds this action's task
//! - In dry-run the payload is built and logged, never sent

use std::time::Duration;
use async_trait::async_trait;
use serde::Serialize;

use crate::actions::{Action, ActionError, AlertContext};
use crate::config::WebhookConfig;
use crate::health::CheckError;

/// JSON body posted to the webhook.
#[derive(Debug, Serialize)]
pub struct AlertPayload<'a> {
    pub target: &'a str,
    pub cause: String,
    pub consecutive_threshold: u32,
    pub dry_run: bool,
    pub message: String,
}

pub struct WebhookAction {
    client: reqwest::Client,
    url: String,
    context: AlertContext,
}

impl WebhookAction {
    pub fn new(context: AlertContext, config: &WebhookConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(concat!("natwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            context,
        })
    }

    pub fn payload(&self, cause: &CheckError) -> AlertPayload<'_> {
        AlertPayload {
            target: &self.context.target,
            cause: cause.to_string(),
            consecutive_threshold: self.context.threshold,
            dry_run: self.context.dry_run,
            message: self.context.message(cause),
        }
    }
}

#[async_trait]
impl Action for WebhookAction {
    async fn trigger(&self, cause: CheckError) -> Result<(), ActionError> {
        let payload = self.payload(&cause);

        if self.context.dry_run {
            let body = serde_json::to_string(&payload)
                .map_err(|e| ActionError::Failed(e.to_string()))?;
            tracing::info!(url = %self.url, body = %body, "Dry run: would post webhook alert");
            return Ok(());
        }

        tracing::info!(url = %self.url, "Posting webhook alert");
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ActionError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ActionError::Status(status.as_u16()));
        }
        Ok(())
    }
}
