use std::sync::Arc;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use stations_auth::Authenticator;
use stations_config::{CorsConfig, WebConfig};
use stations_db::AccountStore;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub accounts: Arc<dyn AccountStore>,
    pub authenticator: Arc<Authenticator>,
    pub web_config: WebConfig,
    pub cors_config: CorsConfig,
    /// Cancelled by the request pipeline when the server must stop. The process
    /// then exits with an error once in-flight requests have drained.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        db: PgPool,
        accounts: Arc<dyn AccountStore>,
        authenticator: Arc<Authenticator>,
        web_config: WebConfig,
        cors_config: CorsConfig,
    ) -> Self {
        Self {
            db,
            accounts,
            authenticator,
            web_config,
            cors_config,
            shutdown: CancellationToken::new(),
        }
    }
}
