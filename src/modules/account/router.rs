use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::token;

pub fn init_account_router() -> Router<AppState> {
    Router::new().route("/account/token", get(token).post(token))
}
