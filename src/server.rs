//! Server lifecycle: stop on a signal or an escalated request, drain, and
//! report how the process should exit.
//!
//! [`AppState::shutdown`](crate::state::AppState::shutdown) is only cancelled by
//! the request pipeline. Signals cancel a child of it, so after the server has
//! drained the two causes can still be told apart.

use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Runs the server until it stops by itself, or until `stop` is cancelled
/// and the grace period for in-flight requests has passed.
pub async fn drain<F>(server: F, stop: CancellationToken, grace: Duration) -> anyhow::Result<()>
where
    F: std::future::IntoFuture<Output = std::io::Result<()>>,
{
    let server = server.into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result.context("serving API"),
        _ = stop.cancelled() => {}
    }

    info!(grace_secs = grace.as_secs(), "Draining in-flight requests");
    match tokio::time::timeout(grace, server).await {
        Ok(result) => result.context("serving API"),
        Err(_) => {
            warn!("Grace period elapsed, closing remaining connections");
            Ok(())
        }
    }
}

/// Resolves on ctrl-c, SIGTERM, or cancellation of `stop`, then cancels `stop`.
pub async fn shutdown_signal(stop: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl-c"),
        _ = terminate => info!("Received SIGTERM"),
        _ = stop.cancelled() => warn!("Shutdown requested by the request pipeline"),
    }

    stop.cancel();
}

/// An error if the request pipeline asked for the shutdown, so the process
/// exits non-zero instead of looking like a clean stop.
pub fn shutdown_outcome(escalation: &CancellationToken) -> anyhow::Result<()> {
    if escalation.is_cancelled() {
        anyhow::bail!("shutdown requested by the request pipeline");
    }
    Ok(())
}
