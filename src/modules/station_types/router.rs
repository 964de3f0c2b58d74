use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{create, delete, query, query_by_id, update};

/// Read routes, open to any authenticated caller.
pub fn init_station_types_router() -> Router<AppState> {
    Router::new()
        .route("/station-types", get(query))
        .route("/station-type/{id}", get(query_by_id))
}

/// Mutating routes, for admins only.
pub fn init_station_types_admin_router() -> Router<AppState> {
    Router::new()
        .route("/station-type", post(create))
        .route("/station-type/{id}", put(update).delete(delete))
}
