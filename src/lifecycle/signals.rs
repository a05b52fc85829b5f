//! OS signal handling.
//!
//! SIGINT and SIGTERM both stop the monitor. There is no reload signal:
//! configuration is fixed for the process lifetime.

use crate::lifecycle::Shutdown;

/// Wait for SIGINT or SIGTERM.
pub async fn wait_for_termination() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut term = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = term.recv() => {}
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

/// Trigger `shutdown` when a termination signal arrives.
pub fn spawn_signal_listener(shutdown: Shutdown) {
    tokio::spawn(async move {
        match wait_for_termination().await {
            Ok(()) => tracing::info!("Termination signal received"),
            Err(e) => tracing::error!(error = %e, "Failed to listen for signals, shutting down"),
        }
        shutdown.trigger();
    });
}
