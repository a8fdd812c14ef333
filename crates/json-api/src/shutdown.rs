//! Graceful shutdown signal handling

use std::io;

use salvo::server::ServerHandle;
use thiserror::Error;
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Signal handler installation failures.
#[derive(Debug, Error)]
pub enum ShutdownSignalError {
    /// Ctrl+C handler could not be installed.
    #[error("failed to install Ctrl+C handler: {0}")]
    CtrlC(#[source] io::Error),

    /// SIGTERM handler could not be installed.
    #[cfg(unix)]
    #[error("failed to install SIGTERM handler: {0}")]
    SigTerm(#[source] io::Error),

    /// Windows terminate handler could not be installed.
    #[cfg(windows)]
    #[error("failed to install Windows terminate handler: {0}")]
    Terminate(#[source] io::Error),
}

/// Wait for SIGINT or SIGTERM, then cancel `background` and stop the server gracefully.
///
/// # Errors
///
/// Returns an error when a signal handler cannot be installed.
pub async fn listen(
    handle: ServerHandle,
    background: CancellationToken,
) -> Result<(), ShutdownSignalError> {
    let ctrl_c = async { signal::ctrl_c().await.map_err(ShutdownSignalError::CtrlC) };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .map_err(ShutdownSignalError::SigTerm)?
            .recv()
            .await;
        Ok::<(), ShutdownSignalError>(())
    };

    #[cfg(windows)]
    let terminate = async {
        signal::windows::ctrl_close()
            .map_err(ShutdownSignalError::Terminate)?
            .recv()
            .await;
        Ok::<(), ShutdownSignalError>(())
    };

    tokio::select! {
        result = ctrl_c => {
            result?;
            tracing::info!("ctrl_c signal received");
        }
        result = terminate => {
            result?;
            tracing::info!("terminate signal received");
        }
    };

    background.cancel();
    handle.stop_graceful(None);

    Ok(())
}
