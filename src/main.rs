use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use stations::logging::{init_tracing, shutdown_tracer};
use stations::metrics::{init_metrics, metrics_app};
use stations::router::init_router;
use stations::server::{drain, shutdown_outcome, shutdown_signal};
use stations::state::AppState;
use stations_auth::Authenticator;
use stations_config::{AuthConfig, CorsConfig, DatabaseConfig, TraceConfig, WebConfig};
use stations_db::{AccountStore, PgAccountStore, lazy_db_pool};

#[tokio::main]
async fn main() {
    dotenv().ok();

    if let Err(e) = run().await {
        error!(error = ?e, "Service failed");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let trace_config = TraceConfig::from_env();
    init_tracing(&trace_config)?;

    let web_config = WebConfig::from_env();
    let cors_config = CorsConfig::from_env();
    let auth_config = AuthConfig::from_env();
    let db_config = DatabaseConfig::from_env().context("DATABASE_URL must be set")?;

    info!(
        web = ?web_config,
        database = ?db_config,
        auth_key_id = %auth_config.key_id,
        algorithm = %auth_config.algorithm,
        origins = ?cors_config.allowed_origins,
        "Starting service"
    );

    let metrics_handle = init_metrics(&trace_config)?;

    let authenticator = Authenticator::from_config(&auth_config).context("loading key material")?;
    info!(kids = ?authenticator.public_keys().kids(), "Authenticator ready");

    let db = lazy_db_pool(&db_config).context("configuring database pool")?;
    let accounts = Arc::new(PgAccountStore::new(db.clone()));
    accounts
        .timing_hash()
        .map_err(|e| anyhow::anyhow!("preparing login timing hash: {e}"))?;

    let state = AppState::new(
        db,
        accounts,
        Arc::new(authenticator),
        web_config.clone(),
        cors_config,
    );
    let escalation = state.shutdown.clone();
    let stop = escalation.child_token();

    if let Some(handle) = metrics_handle {
        let debug_listener = TcpListener::bind(web_config.debug_address.as_str())
            .await
            .with_context(|| format!("binding debug listener {}", web_config.debug_address))?;
        info!(address = %web_config.debug_address, "Debug listener started");

        let debug_stop = stop.clone();
        tokio::spawn(async move {
            let served = axum::serve(debug_listener, metrics_app(handle))
                .with_graceful_shutdown(debug_stop.cancelled_owned())
                .await;
            if let Err(e) = served {
                warn!(error = %e, "Debug listener stopped");
            }
        });
    }

    let app = init_router(state);
    let listener = TcpListener::bind(web_config.address.as_str())
        .await
        .with_context(|| format!("binding API listener {}", web_config.address))?;
    info!(address = %web_config.address, "API listener started");

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(stop.clone()));

    drain(server, stop, web_config.shutdown_timeout).await?;

    info!("Shutdown complete");
    let outcome = shutdown_outcome(&escalation);
    shutdown_tracer().await;

    outcome
}
