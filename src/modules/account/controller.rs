use axum::{Json, extract::State, http::HeaderMap};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Basic};
use tracing::instrument;

use stations_core::{AppError, ErrorResponse};

use super::model::TokenResponse;
use super::service::AccountService;
use crate::metrics::{track_authentication_failure, track_token_issued};
use crate::middleware::request_values::RequestValues;
use crate::state::AppState;

/// Exchange Basic credentials for a signed token
#[utoipa::path(
    post,
    path = "/v1/account/token",
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse)
    ),
    tag = "Account",
    security(("basic_auth" = []))
)]
#[instrument(skip(state, headers))]
pub async fn token(
    State(state): State<AppState>,
    values: RequestValues,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    let Some(Authorization(basic)) = headers.typed_get::<Authorization<Basic>>() else {
        track_authentication_failure("missing_basic");
        return Err(AppError::unauthorized("must provide name and password in Basic auth"));
    };

    let claims = AccountService::authenticate(
        state.accounts.as_ref(),
        &state.authenticator,
        values.now,
        basic.username(),
        basic.password(),
    )
    .await
    .inspect_err(|err| {
        if matches!(err, AppError::AuthenticationFailure) {
            track_authentication_failure("bad_credentials");
        }
    })?;

    let token = state.authenticator.generate_token(&claims).map_err(AppError::internal)?;
    track_token_issued();

    Ok(Json(TokenResponse { token }))
}
