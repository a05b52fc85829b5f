//! natwatch: reachability monitor daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────────┐
//!   │                              NATWATCH                             │
//!   │                                                                   │
//!   │  ┌──────────┐  tick   ┌──────────┐  spawn   ┌──────────┐  ICMP    │
//!   │  │ monitor  │───────▶│ sampler  │────────▶│  probe   │─────────┼──▶ target
//!   │  │  loop    │         │ (race vs │◀────────│ (socket) │◀────────┼─── echo reply
//!   │  └────┬─────┘         │ deadline)│ result   └──────────┘          │
//!   │       │ sample        └──────────┘                                │
//!   │       ▼                                                           │
//!   │  ┌──────────┐ threshold ┌────────────┐   ┌──────┐ ┌─────────┐      │
//!   │  │ failure  │─────────▶│  fanout    │──▶│ log  │ │ webhook │ ...  │
//!   │  │ tracker  │  crossed  │ dispatcher │   └──────┘ └─────────┘      │
//!   │  └──────────┘           └────────────┘   (one task per action)    │
//!   │                                                                   │
//!   │  ┌─────────────────────────────────────────────────────────────┐  │
//!   │  │  config · observability (tracing, metrics) · /status server │  │
//!   │  └─────────────────────────────────────────────────────────────┘  │
//!   └───────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use clap::Parser;
use tokio::net::TcpListener;

use natwatch::actions::{build_registry, FanoutDispatcher};
use natwatch::config::Cli;
use natwatch::health::Monitor;
use natwatch::http::StatusServer;
use natwatch::lifecycle::{signals, Shutdown};
use natwatch::observability::{logging, metrics};
use natwatch::probe::IcmpProber;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("natwatch: {e}");
            std::process::exit(2);
        }
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("natwatch v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        target_host = %config.check.target,
        interval_ms = config.check.interval_ms,
        timeout_ms = config.check.timeout_ms,
        threshold = config.check.failure_threshold,
        socket = ?config.check.socket,
        dry_run = config.actions.dry_run,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();

    if config.observability.metrics_enabled {
        let handle = metrics::init_metrics()?;
        let listener = TcpListener::bind(&config.observability.metrics_address).await?;
        let server = StatusServer::new(handle);
        tokio::spawn(server.run(listener, shutdown.subscribe()));
    }

    let registry = build_registry(&config)?;
    let dispatcher = FanoutDispatcher::new(registry);
    let prober = Arc::new(IcmpProber::new(config.check.socket));
    let monitor = Monitor::from_config(&config.check, prober, dispatcher)?;

    let monitor_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);
    monitor.run(monitor_shutdown).await;

    tracing::info!("Shutdown complete");
    Ok(())
}
