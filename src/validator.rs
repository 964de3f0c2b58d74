use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use stations_core::{AppError, FieldError};

/// JSON body extractor that also runs derive validation.
///
/// Body problems and validation failures both map to 400; validation
/// failures list the offending fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        value
            .validate()
            .map_err(|errors| AppError::validation(&errors))?;

        Ok(ValidatedJson(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::bad_request("missing 'Content-Type: application/json' header");
    }

    let error_msg = rejection.body_text();

    if let Some(field) = error_msg
        .split("missing field `")
        .nth(1)
        .and_then(|s| s.split('`').next())
    {
        return AppError::invalid_fields(
            "field validation error",
            vec![FieldError::new(field, format!("{field} is required"))],
        );
    }

    if error_msg.contains("invalid type") {
        return AppError::bad_request("invalid field type in request");
    }

    AppError::bad_request("unable to decode request body")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
        #[validate(range(min = 0, message = "location_x must not be negative"))]
        location_x: i32,
    }

    fn json_request(body: &str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn valid_payload_is_extracted() {
        let ValidatedJson(payload) =
            ValidatedJson::<Payload>::from_request(json_request(r#"{"name":"Pump","location_x":1}"#), &())
                .await
                .unwrap();
        assert_eq!(payload.name, "Pump");
    }

    #[tokio::test]
    async fn validation_failures_list_fields() {
        let err = ValidatedJson::<Payload>::from_request(
            json_request(r#"{"name":"","location_x":-1}"#),
            &(),
        )
        .await
        .unwrap_err();

        match err {
            AppError::InvalidInput { fields, .. } => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["location_x", "name"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_field_is_named() {
        let err = ValidatedJson::<Payload>::from_request(json_request(r#"{"name":"Pump"}"#), &())
            .await
            .unwrap_err();

        match err {
            AppError::InvalidInput { fields, .. } => assert_eq!(fields[0].field, "location_x"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let err = ValidatedJson::<Payload>::from_request(json_request("{"), &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { .. }));
    }
}
