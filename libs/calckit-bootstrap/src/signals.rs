use anyhow::Result;
use tokio::signal;

use crate::logging::Logger;

/// Signals that can trigger shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownSignal {
    CtrlC,
    #[cfg(unix)]
    Sigterm,
}

/// Wait for termination signals (Ctrl+C, SIGTERM).
///
/// # Errors
/// Returns an error if a signal handler cannot be installed.
pub async fn wait_for_shutdown(logger: &Logger) -> Result<()> {
    let signal = tokio::select! {
        result = wait_ctrl_c() => result?,
        result = wait_sigterm() => result?,
    };

    tracing::info!(
        parent: logger.root_span(),
        ?signal,
        "shutdown signal received, initiating graceful shutdown"
    );
    Ok(())
}

async fn wait_ctrl_c() -> Result<ShutdownSignal> {
    signal::ctrl_c().await?;
    Ok(ShutdownSignal::CtrlC)
}

#[cfg(unix)]
async fn wait_sigterm() -> Result<ShutdownSignal> {
    let mut handler = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    handler.recv().await;
    Ok(ShutdownSignal::Sigterm)
}

#[cfg(not(unix))]
async fn wait_sigterm() -> Result<ShutdownSignal> {
    std::future::pending::<Result<ShutdownSignal>>().await
}
