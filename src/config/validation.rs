//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, threshold >= 1)
//! - Validate addresses and URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MonitorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::MonitorConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no health check target specified")]
    MissingTarget,

    #[error("check interval must be greater than zero")]
    ZeroInterval,

    #[error("check timeout must be greater than zero")]
    ZeroTimeout,

    #[error("failure threshold must be at least 1")]
    ZeroThreshold,

    #[error("invalid metrics address {0:?}")]
    BadMetricsAddress(String),

    #[error("invalid webhook url {url:?}: {reason}")]
    BadWebhookUrl { url: String, reason: String },

    #[error("webhook timeout must be greater than zero")]
    ZeroWebhookTimeout,
}

pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.check.target.trim().is_empty() {
        errors.push(ValidationError::MissingTarget);
    }
    if config.check.interval_ms == 0 {
        errors.push(ValidationError::ZeroInterval);
    }
    if config.check.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.check.failure_threshold == 0 {
        errors.push(ValidationError::ZeroThreshold);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::BadMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if let Some(webhook) = &config.actions.webhook {
        match url::Url::parse(&webhook.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::BadWebhookUrl {
                url: webhook.url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            }),
            Err(e) => errors.push(ValidationError::BadWebhookUrl {
                url: webhook.url.clone(),
                reason: e.to_string(),
            }),
        }
        if webhook.timeout_ms == 0 {
            errors.push(ValidationError::ZeroWebhookTimeout);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
