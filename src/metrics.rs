use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::Context;
use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use stations_config::TraceConfig;

use crate::middleware::request_values::RequestValues;

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Whether the Prometheus recorder was installed. False until [`init_metrics`] runs.
pub fn is_observability_enabled() -> bool {
    OBSERVABILITY_ENABLED.get().copied().unwrap_or(false)
}

/// Installs the Prometheus recorder and its upkeep task.
/// Returns `None` when observability is switched off.
pub fn init_metrics(config: &TraceConfig) -> anyhow::Result<Option<PrometheusHandle>> {
    let enabled = *OBSERVABILITY_ENABLED.get_or_init(|| config.enabled);
    if !enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5,
                10.0,
            ],
        )
        .context("setting histogram buckets")?
        .install_recorder()
        .context("installing Prometheus recorder")?;

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Ok(Some(handle))
}

/// Innermost global middleware. Records the final status into the request
/// values, then emits request metrics.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let values = req.extensions().get::<RequestValues>().cloned();

    if !is_observability_enabled() {
        let response = next.run(req).await;
        if let Some(values) = values {
            values.set_status(response.status());
        }
        return response;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let in_flight = InFlight::start();
    let response = next.run(req).await;
    drop(in_flight);

    let status = response.status();
    if let Some(values) = values {
        values.set_status(status);
    }

    let latency = start.elapsed().as_secs_f64();
    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(latency);

    response
}

/// Holds one unit of `http_requests_active`. Released on drop, so a handler
/// that panics or a request future that is cancelled still gives it back.
struct InFlight;

impl InFlight {
    fn start() -> Self {
        gauge!("http_requests_active").increment(1.0);
        Self
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        gauge!("http_requests_active").decrement(1.0);
    }
}

/// Router for the debug listener.
pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

pub fn track_token_issued() {
    if !is_observability_enabled() {
        return;
    }
    counter!("tokens_issued_total").increment(1);
}

pub fn track_authentication_failure(reason: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("authentication_failures_total", "reason" => reason).increment(1);
}

pub fn track_station_type_mutation(operation: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("station_type_mutations_total", "operation" => operation).increment(1);
}

pub fn track_station_mutation(operation: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("station_mutations_total", "operation" => operation).increment(1);
}
