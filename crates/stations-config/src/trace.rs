use std::env;

use crate::{env_or, env_string};

#[derive(Clone, Debug)]
pub struct TraceConfig {
    /// Master switch for the OTLP exporter and the Prometheus recorder.
    pub enabled: bool,
    pub otlp_endpoint: String,
    pub service_name: String,
    /// Fraction of traces sampled, clamped to `0.0..=1.0`.
    pub probability: f64,
    pub environment: String,
    pub log_dir: String,
}

impl TraceConfig {
    pub fn from_env() -> Self {
        let enabled = env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true);

        Self {
            enabled,
            otlp_endpoint: env_string("OTEL_EXPORTER_OTLP_ENDPOINT", "http://localhost:4317"),
            service_name: env_string("TRACE_SERVICE_NAME", "station-api"),
            probability: env_or("TRACE_PROBABILITY", 0.05_f64).clamp(0.0, 1.0),
            environment: env_string("ENVIRONMENT", "development"),
            log_dir: env_string("LOG_DIR", "storage/logs"),
        }
    }
}
