use std::time::Duration;

use crate::{env_or, env_string};

#[derive(Clone, Debug)]
pub struct WebConfig {
    pub address: String,
    /// Listener for operational endpoints such as `/metrics`.
    pub debug_address: String,
    /// Advisory per-request deadline. Handlers are never cancelled when it passes.
    pub request_timeout: Duration,
    /// Upper bound for draining in-flight requests at shutdown.
    pub shutdown_timeout: Duration,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:8000".to_string(),
            debug_address: "0.0.0.0:4000".to_string(),
            request_timeout: Duration::from_secs(5),
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl WebConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            address: env_string("WEB_ADDRESS", &defaults.address),
            debug_address: env_string("DEBUG_ADDRESS", &defaults.debug_address),
            request_timeout: Duration::from_secs(env_or(
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
            shutdown_timeout: Duration::from_secs(env_or(
                "SHUTDOWN_TIMEOUT_SECS",
                defaults.shutdown_timeout.as_secs(),
            )),
        }
    }
}
