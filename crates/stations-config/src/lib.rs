//! # Stations Config
//!
//! Configuration types for the Stations API, each loaded from environment
//! variables with development defaults:
//!
//! - [`web`]: listener addresses and timeouts
//! - [`database`]: PostgreSQL connection settings
//! - [`auth`]: signing key material and token lifetime
//! - [`cors`]: allowed browser origins
//! - [`trace`]: OpenTelemetry export and sampling
//!
//! # Example
//!
//! ```ignore
//! use stations_config::{AuthConfig, WebConfig};
//!
//! let web = WebConfig::from_env();
//! let auth = AuthConfig::from_env();
//! ```

pub mod auth;
pub mod cors;
pub mod database;
pub mod trace;
pub mod web;

pub use auth::AuthConfig;
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use trace::TraceConfig;
pub use web::WebConfig;

use std::env;
use std::str::FromStr;

pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

pub(crate) fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
