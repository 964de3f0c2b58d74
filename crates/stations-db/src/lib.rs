//! # Stations DB
//!
//! PostgreSQL access for the Stations API:
//!
//! - pool construction and the readiness check used by `/v1/health`
//! - [`schema`]: embedded migrations and development seed data
//! - [`accounts`]: the account store consulted at login
//!
//! # Example
//!
//! ```ignore
//! use stations_config::DatabaseConfig;
//! use stations_db::{init_db_pool, schema};
//!
//! let config = DatabaseConfig::from_env().expect("DATABASE_URL must be set");
//! let pool = init_db_pool(&config).await?;
//! schema::migrate(&pool).await?;
//! ```

pub mod accounts;
pub mod schema;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use stations_config::DatabaseConfig;

pub use accounts::{AccountStore, InMemoryAccountStore, PgAccountStore};
pub use sqlx::PgPool;

/// Connects a pool, failing if the database cannot be reached.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    pool_options(config).connect(&config.url).await
}

/// Builds a pool without connecting. The first query opens a connection, so
/// the server can start before the database is up.
pub fn lazy_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    pool_options(config).connect_lazy(&config.url)
}

/// Round-trips a trivial query to confirm the database is ready.
pub async fn status_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT true").execute(pool).await.map(|_| ())
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(3))
}
