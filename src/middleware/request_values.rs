use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{Duration, Instant};

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, StatusCode, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use stations_core::AppError;

pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// State owned by a single request for its whole lifetime.
///
/// Inserted into the request extensions before any other middleware runs.
/// Clones share the same status slot.
#[derive(Debug, Clone)]
pub struct RequestValues {
    pub trace_id: Uuid,
    /// Wall-clock time the request arrived. Used as "now" by handlers.
    pub now: DateTime<Utc>,
    pub started: Instant,
    /// Advisory only; nothing is cancelled when it passes.
    pub deadline: Option<Instant>,
    status: Arc<AtomicU16>,
}

impl RequestValues {
    pub fn new(timeout: Option<Duration>) -> Self {
        let started = Instant::now();

        Self {
            trace_id: Uuid::new_v4(),
            now: Utc::now(),
            started,
            deadline: timeout.map(|timeout| started + timeout),
            status: Arc::new(AtomicU16::new(0)),
        }
    }

    pub fn set_status(&self, status: StatusCode) {
        self.status.store(status.as_u16(), Ordering::Relaxed);
    }

    /// The status recorded for the response, if one has been written yet.
    pub fn status(&self) -> Option<StatusCode> {
        match self.status.load(Ordering::Relaxed) {
            0 => None,
            code => StatusCode::from_u16(code).ok(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn is_past_deadline(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() > deadline)
    }
}

impl<S> FromRequestParts<S> for RequestValues
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestValues>()
            .cloned()
            .ok_or_else(|| AppError::shutdown("request values missing from request context"))
    }
}

/// Outermost middleware. Creates the request values and echoes the trace id.
pub async fn request_values(
    State(timeout): State<Duration>,
    mut req: Request,
    next: Next,
) -> Response {
    let values = RequestValues::new(Some(timeout));
    req.extensions_mut().insert(values.clone());

    let mut response = next.run(req).await;

    if let Ok(trace_id) = HeaderValue::from_str(&values.trace_id.to_string()) {
        response.headers_mut().insert(TRACE_ID_HEADER, trace_id);
    }

    response
}
