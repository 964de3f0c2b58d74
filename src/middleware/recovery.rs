use std::any::Any;

use anyhow::anyhow;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio_util::sync::CancellationToken;
use tracing::error;

use stations_core::{AppError, ShutdownRequested};

/// Turns a handler panic into a generic 500. Used with `CatchPanicLayer::custom`.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = err.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = err.downcast_ref::<&str>() {
        msg.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::internal(anyhow!("handler panicked: {detail}")).into_response()
}

/// Cancels the server's shutdown token when any inner stage answered with
/// [`AppError::Shutdown`]. The client still receives the generic 500.
pub async fn escalate_shutdown(
    State(shutdown): State<CancellationToken>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;

    if let Some(ShutdownRequested(reason)) = response.extensions().get::<ShutdownRequested>() {
        error!(reason = %reason, "Request pipeline requested shutdown");
        shutdown.cancel();
    }

    response
}
