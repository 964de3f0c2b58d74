use std::fs;
use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    extract::{ConnectInfo, MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use opentelemetry::{KeyValue, global, trace::TraceError};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    propagation::TraceContextPropagator,
    runtime,
    trace::{RandomIdGenerator, Sampler, Tracer},
};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use tracing::{Instrument, error, info, info_span, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use stations_config::TraceConfig;
use stations_core::AppError;

use crate::middleware::request_values::RequestValues;

/// Logs one line per request once the handler chain has finished.
///
/// Needs [`RequestValues`] from the outer pipeline; without them the request
/// is failed as a shutdown condition because the pipeline is miswired.
pub async fn logging_middleware(req: Request, next: Next) -> Result<Response, AppError> {
    let values = req
        .extensions()
        .get::<RequestValues>()
        .cloned()
        .ok_or_else(|| AppError::shutdown("request values missing from request context"))?;

    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());

    info!(
        trace_id = %values.trace_id,
        method = %method,
        path = %path,
        remote = %remote,
        "request started"
    );

    let span = info_span!("request", trace_id = %values.trace_id, method = %method, path = %path);
    let response = next.run(req).instrument(span).await;

    // Handlers that short-circuit above the metrics layer never record a status.
    let status = values.status().unwrap_or_else(|| response.status());
    let latency_ms = values.elapsed().as_millis();

    match status.as_u16() {
        500..=599 => error!(
            trace_id = %values.trace_id,
            method = %method,
            path = %path,
            remote = %remote,
            status = status.as_u16(),
            latency_ms = %latency_ms,
            "request completed"
        ),
        400..=499 => warn!(
            trace_id = %values.trace_id,
            method = %method,
            path = %path,
            remote = %remote,
            status = status.as_u16(),
            latency_ms = %latency_ms,
            "request completed"
        ),
        _ => info!(
            trace_id = %values.trace_id,
            method = %method,
            path = %path,
            remote = %remote,
            status = status.as_u16(),
            latency_ms = %latency_ms,
            "request completed"
        ),
    }

    if values.is_past_deadline() {
        warn!(
            trace_id = %values.trace_id,
            path = %path,
            latency_ms = %latency_ms,
            "request finished after its deadline"
        );
    }

    Ok(response)
}

fn init_tracer(config: &TraceConfig) -> Result<Tracer, TraceError> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let resource = Resource::new(vec![
        KeyValue::new(SERVICE_NAME, config.service_name.clone()),
        KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
        KeyValue::new("environment", config.environment.clone()),
    ]);

    let otlp_exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(config.otlp_endpoint.clone());

    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(otlp_exporter)
        .with_trace_config(
            opentelemetry_sdk::trace::Config::default()
                .with_sampler(Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(
                    config.probability,
                ))))
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(resource),
        )
        .install_batch(runtime::Tokio)
}

/// Installs the global subscriber: compact console output, a daily error log,
/// a daily JSON log and, when enabled, OTLP span export.
pub fn init_tracing(config: &TraceConfig) -> anyhow::Result<()> {
    fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("creating log directory {}", config.log_dir))?;

    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}=info,stations_db=info,tower_http=warn,hyper=info,tonic=info",
            env!("CARGO_CRATE_NAME")
        ))
    });

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .with_writer(RollingFileAppender::new(
            Rotation::DAILY,
            &config.log_dir,
            "stations.log",
        ))
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("error"));

    let json_layer = fmt::layer()
        .json()
        .with_writer(RollingFileAppender::new(
            Rotation::DAILY,
            &config.log_dir,
            "stations.json",
        ))
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(EnvFilter::new("info"));

    let registry = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(json_layer);

    if !config.enabled {
        registry.try_init().context("installing tracing subscriber")?;
        info!("tracing initialized without span export");
        return Ok(());
    }

    match init_tracer(config) {
        Ok(tracer) => {
            registry
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init()
                .context("installing tracing subscriber")?;
            info!(
                endpoint = %config.otlp_endpoint,
                probability = config.probability,
                "tracing initialized with OTLP export"
            );
        }
        Err(e) => {
            registry.try_init().context("installing tracing subscriber")?;
            warn!(error = %e, "OTLP exporter unavailable, continuing with local logs only");
        }
    }

    Ok(())
}

pub async fn shutdown_tracer() {
    info!("flushing trace exporter");
    global::shutdown_tracer_provider();
}
