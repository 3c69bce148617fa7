//! Signal handling for graceful shutdown.

use tokio::signal::unix::{SignalKind, signal};

/// Creates a future that completes when a shutdown signal is received.
///
/// Listens for SIGTERM and SIGINT (Ctrl+C). A signal whose handler cannot be
/// installed is logged and never fires.
pub async fn shutdown_signal() {
    let sigterm = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    let sigint = async {
        match signal(SignalKind::interrupt()) {
            Ok(mut sigint) => {
                sigint.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGINT handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = sigterm => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint => {
            tracing::info!("Received SIGINT, initiating graceful shutdown");
        }
    }
}
