use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{create, delete, query_by_id, query_by_station_type, update};

pub fn init_stations_router() -> Router<AppState> {
    Router::new()
        .route("/station-type/{id}/stations", get(query_by_station_type))
        .route("/station/{id}", get(query_by_id))
}

pub fn init_stations_admin_router() -> Router<AppState> {
    Router::new()
        .route("/station-type/{id}/station", post(create))
        .route("/station/{id}", put(update).delete(delete))
}
