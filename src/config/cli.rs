//! Command-line and environment overrides.
//!
//! Precedence: flag > environment > config file > defaults.

use std::path::PathBuf;
use clap::Parser;

use crate::config::loader::{read_config, ConfigError};
use crate::config::schema::{default_webhook_timeout_ms, MonitorConfig, SocketKind, WebhookConfig};
use crate::config::validation::validate_config;

#[derive(Debug, Default, Parser)]
#[command(name = "natwatch")]
#[command(about = "Detects sustained loss of reachability and fires recovery actions", long_about = None)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "NAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Hostname or IPv4 address to test.
    #[arg(long, env = "NAT_TARGET")]
    pub target: Option<String>,

    /// Timeout for each check in milliseconds.
    #[arg(long = "timeout", env = "NAT_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Interval between checks in milliseconds.
    #[arg(long = "interval", env = "NAT_INTERVAL_MS")]
    pub interval_ms: Option<u64>,

    /// Number of consecutive failed checks before actions are taken.
    #[arg(long, env = "NAT_THRESHOLD")]
    pub threshold: Option<u32>,

    /// ICMP socket kind.
    #[arg(long, value_enum, env = "NAT_SOCKET")]
    pub socket: Option<SocketKind>,

    /// Address to expose the status and Prometheus handler on.
    #[arg(long, env = "NAT_PROMETHEUS")]
    pub prometheus: Option<String>,

    /// Prevent any side effects from actions.
    #[arg(long, env = "NAT_DRY_RUN", num_args = 0..=1, default_missing_value = "true")]
    pub dry_run: Option<bool>,

    /// Webhook URL to post alerts to.
    #[arg(long, env = "NAT_WEBHOOK_URL")]
    pub webhook_url: Option<String>,
}

impl Cli {
    /// Layer these overrides onto `config`.
    pub fn apply(&self, config: &mut MonitorConfig) {
        if let Some(target) = &self.target {
            config.check.target = target.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.check.timeout_ms = timeout_ms;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.check.interval_ms = interval_ms;
        }
        if let Some(threshold) = self.threshold {
            config.check.failure_threshold = threshold;
        }
        if let Some(socket) = self.socket {
            config.check.socket = socket;
        }
        if let Some(address) = &self.prometheus {
            config.observability.metrics_address = address.clone();
        }
        if let Some(dry_run) = self.dry_run {
            config.actions.dry_run = dry_run;
        }
        if let Some(url) = &self.webhook_url {
            match &mut config.actions.webhook {
                Some(webhook) => webhook.url = url.clone(),
                None => {
                    config.actions.webhook = Some(WebhookConfig {
                        url: url.clone(),
                        timeout_ms: default_webhook_timeout_ms(),
                    })
                }
            }
        }
    }

    /// Build the effective, validated configuration.
    pub fn resolve(&self) -> Result<MonitorConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => MonitorConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}
