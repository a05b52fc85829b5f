//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use std::num::NonZeroU32;
use std::time::Duration;
use serde::{Deserialize, Serialize};

/// Root configuration for the monitor.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// What to probe and how often.
    pub check: CheckConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Actions fired when the failure threshold is crossed.
    pub actions: ActionsConfig,
}

/// Kind of ICMP socket used by the probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SocketKind {
    /// SOCK_RAW; needs CAP_NET_RAW.
    #[default]
    Raw,
    /// Unprivileged SOCK_DGRAM ICMP (Linux `ping_group_range`).
    Datagram,
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CheckConfig {
    /// Hostname or IPv4 address to probe.
    pub target: String,

    /// Time between checks in milliseconds.
    pub interval_ms: u64,

    /// Per-check deadline in milliseconds.
    pub timeout_ms: u64,

    /// Number of consecutive failed checks before actions fire.
    pub failure_threshold: u32,

    pub socket: SocketKind,
}

impl CheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// `None` if the threshold is zero.
    pub fn threshold(&self) -> Option<NonZeroU32> {
        NonZeroU32::new(self.failure_threshold)
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            interval_ms: 1000,
            timeout_ms: 500,
            failure_threshold: 5,
            socket: SocketKind::Raw,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the status and metrics endpoint.
    pub metrics_enabled: bool,

    /// Status and metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Action configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ActionsConfig {
    /// Suppress real side effects; actions only log what they would do.
    pub dry_run: bool,

    pub log: LogActionConfig,

    /// Optional webhook; absent means the action is not registered.
    pub webhook: Option<WebhookConfig>,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            dry_run: true,
            log: LogActionConfig::default(),
            webhook: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LogActionConfig {
    pub enabled: bool,
}

impl Default for LogActionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Webhook action configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct WebhookConfig {
    /// URL the alert is POSTed to.
    pub url: String,

    /// Request timeout in milliseconds.
    #[serde(default = "default_webhook_timeout_ms")]
    pub timeout_ms: u64,
}

pub(crate) fn default_webhook_timeout_ms() -> u64 {
    5000
}
