use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::debug;
use uuid::Uuid;

use stations_auth::{Authenticator, Claims, Role};
use stations_core::AppError;

use crate::metrics::track_authentication_failure;

/// Claims of the caller, placed in the request extensions by [`authenticate`].
///
/// Extracting it on a route without authentication is a wiring bug and
/// escalates to a shutdown.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.0.has_role(role)
    }

    pub fn account_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::unauthorized("invalid subject in token"))
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                AppError::shutdown("claims missing from request context; route is not authenticated")
            })
    }
}

/// Verifies the bearer token and stores its [`Claims`] for later stages.
///
/// Every verification failure yields the same 401 so clients cannot tell an
/// expired token from a forged one.
pub async fn authenticate(
    State(authenticator): State<Arc<Authenticator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(Authorization(bearer)) = req.headers().typed_get::<Authorization<Bearer>>() else {
        track_authentication_failure("missing_bearer");
        return Err(AppError::unauthorized(
            "expected authorization header format: Bearer <token>",
        ));
    };

    let claims = authenticator.parse_claims(bearer.token()).map_err(|err| {
        debug!(error = %err, "Bearer token rejected");
        track_authentication_failure("invalid_token");
        AppError::unauthorized("unauthorized")
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
