use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use stations_auth::Role;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::recovery::{escalate_shutdown, panic_response};
use crate::middleware::request_values::request_values;
use crate::middleware::role::Protected;
use crate::modules::account::init_account_router;
use crate::modules::health::init_health_router;
use crate::modules::station_types::{init_station_types_admin_router, init_station_types_router};
use crate::modules::stations::{init_stations_admin_router, init_stations_router};
use crate::state::AppState;

pub fn init_router(state: AppState) -> Router {
    let authenticated = Protected::new(
        Router::new()
            .merge(init_station_types_router())
            .merge(init_stations_router()),
    )
    .into_router(state.authenticator.clone());

    let admin = Protected::new(
        Router::new()
            .merge(init_station_types_admin_router())
            .merge(init_stations_admin_router()),
    )
    .require(Role::Admin)
    .into_router(state.authenticator.clone());

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest(
            "/v1",
            Router::new()
                .merge(init_health_router())
                .merge(init_account_router())
                .merge(authenticated)
                .merge(admin),
        )
        .with_state(state.clone());

    apply_pipeline(app, &state)
}

/// Wraps `router` in the global middleware, innermost first: CORS, metrics,
/// logging, panic recovery, shutdown escalation, then request values.
pub fn apply_pipeline(router: Router, state: &AppState) -> Router {
    router
        .layer(cors_layer(state))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(
            state.shutdown.clone(),
            escalate_shutdown,
        ))
        .layer(middleware::from_fn_with_state(
            state.web_config.request_timeout,
            request_values,
        ))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true)
}
