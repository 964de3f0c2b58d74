//! Role gates.
//!
//! Gates read the [`Claims`] left by authentication, so they can only be
//! attached through [`Protected`], which always places them inside it.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
};

use stations_auth::{Authenticator, Claims, Role};
use stations_core::AppError;

use crate::middleware::auth::authenticate;

/// Rejects with 403 unless the caller holds `role`.
pub(crate) async fn require_role(
    State(role): State<Role>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = req.extensions().get::<Claims>().ok_or_else(|| {
        AppError::shutdown("role gate reached without claims; authentication did not run")
    })?;

    if !claims.has_role(role) {
        return Err(AppError::forbidden("you are not authorized for that action"));
    }

    Ok(next.run(req).await)
}

/// Routes that need a valid bearer token, and optionally roles.
///
/// ```ignore
/// let admin = Protected::new(init_admin_router())
///     .require(Role::Admin)
///     .into_router(state.authenticator.clone());
/// ```
pub struct Protected<S> {
    router: Router<S>,
    roles: Vec<Role>,
}

impl<S> Protected<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(router: Router<S>) -> Self {
        Self {
            router,
            roles: Vec::new(),
        }
    }

    /// Adds a role gate. Several gates must all pass.
    pub fn require(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    pub fn into_router(self, authenticator: Arc<Authenticator>) -> Router<S> {
        let mut router = self.router;

        for role in self.roles {
            router = router.route_layer(middleware::from_fn_with_state(role, require_role));
        }

        router.route_layer(middleware::from_fn_with_state(authenticator, authenticate))
    }
}
