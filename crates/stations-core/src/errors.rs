use std::fmt;

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Message returned for any failed credential check. Unknown account names and
/// wrong passwords must produce exactly this message.
pub const AUTHENTICATION_FAILED: &str = "authentication failed";

const INTERNAL_ERROR: &str = "Internal Server Error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub error: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            error: error.into(),
        }
    }
}

/// JSON body written for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            fields: None,
        }
    }
}

/// Response extension marking that the server must stop.
///
/// Attached by [`AppError::Shutdown`] when it is rendered so the outer
/// recovery layer can escalate it instead of treating it as a plain 500.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownRequested(pub String);

#[derive(Debug)]
pub enum AppError {
    /// Bad credentials or unknown account name. Both render identically.
    AuthenticationFailure,
    Unauthorized(String),
    Forbidden(String),
    InvalidInput {
        message: String,
        fields: Vec<FieldError>,
    },
    NotFound(String),
    Internal(Error),
    /// A core invariant was violated. Signals a bug, not a client error.
    Shutdown(String),
}

impl AppError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn invalid_fields(message: impl Into<String>, fields: Vec<FieldError>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            fields,
        }
    }

    /// Flattens derive-validation failures into field errors, sorted by field.
    pub fn validation(errors: &ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    let message = error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid"));
                    FieldError::new(field.to_string(), message)
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));

        Self::invalid_fields("field validation error", fields)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::Internal(err.into())
    }

    pub fn shutdown(reason: impl Into<String>) -> Self {
        Self::Shutdown(reason.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::AuthenticationFailure | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) | Self::Shutdown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthenticationFailure => "authentication_failure",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::InvalidInput { .. } => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
            Self::Shutdown(_) => "shutdown",
        }
    }

    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::Shutdown(_))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthenticationFailure => f.write_str(AUTHENTICATION_FAILED),
            Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::InvalidInput { message: msg, .. } => f.write_str(msg),
            Self::Internal(err) => write!(f, "{err:#}"),
            Self::Shutdown(reason) => write!(f, "shutdown requested: {reason}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            Self::AuthenticationFailure => ErrorResponse::new(AUTHENTICATION_FAILED),
            Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message) => ErrorResponse::new(message),
            Self::InvalidInput { message, fields } => ErrorResponse {
                error: message,
                fields: (!fields.is_empty()).then_some(fields),
            },
            Self::Internal(err) => {
                error!(error = ?err, "Unhandled internal error");
                ErrorResponse::new(INTERNAL_ERROR)
            }
            Self::Shutdown(reason) => {
                error!(reason = %reason, "Invariant violated, requesting shutdown");
                let mut response = (status, Json(ErrorResponse::new(INTERNAL_ERROR))).into_response();
                response.extensions_mut().insert(ShutdownRequested(reason));
                return response;
            }
        };

        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn status_follows_the_error_kind() {
        assert_eq!(AppError::AuthenticationFailure.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn field_errors_are_rendered_when_present() {
        let err = AppError::invalid_fields(
            "field validation error",
            vec![FieldError::new("name", "name is required")],
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_of(response).await;
        assert_eq!(body["error"], "field validation error");
        assert_eq!(body["fields"][0]["field"], "name");
        assert_eq!(body["fields"][0]["error"], "name is required");
    }

    #[tokio::test]
    async fn fields_key_is_omitted_without_field_errors() {
        let body = body_of(AppError::not_found("station not found").into_response()).await;
        assert_eq!(body, serde_json::json!({ "error": "station not found" }));
    }

    #[tokio::test]
    async fn internal_errors_hide_their_detail() {
        let err = AppError::from(anyhow::anyhow!("connection refused on 10.0.0.3"));
        let body = body_of(err.into_response()).await;
        assert_eq!(body["error"], "Internal Server Error");
    }

    #[tokio::test]
    async fn shutdown_errors_carry_the_marker() {
        let response = AppError::shutdown("request values missing").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.extensions().get::<ShutdownRequested>(),
            Some(&ShutdownRequested("request values missing".to_string()))
        );
    }

    #[tokio::test]
    async fn authentication_failure_uses_the_fixed_message() {
        let body = body_of(AppError::AuthenticationFailure.into_response()).await;
        assert_eq!(body["error"], AUTHENTICATION_FAILED);
    }
}
