mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header::AUTHORIZATION};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;

use common::{TestApp, bearer_for, setup_test_app};

async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    bearer: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, bearer)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_station_type_lifecycle(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let admin = bearer_for(&app.state, &app.admin);

    let (status, created) = send(
        &app,
        "POST",
        "/v1/station-type",
        &admin,
        Some(json!({"name": "Solar", "description": "Panels"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Solar");
    assert_eq!(created["stations"], 0);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/v1/station-type/{id}"),
        &admin,
        Some(json!({"name": "Solar Array"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, fetched) = send(&app, "GET", &format!("/v1/station-type/{id}"), &admin, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Solar Array");
    assert_eq!(fetched["description"], "Panels");

    let (status, listed) = send(&app, "GET", "/v1/station-types", &admin, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().unwrap().iter().any(|st| st["id"] == id.as_str()));

    let (status, _) = send(&app, "DELETE", &format!("/v1/station-type/{id}"), &admin, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/v1/station-type/{id}"), &admin, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "station type not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_station_type_requires_name(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let admin = bearer_for(&app.state, &app.admin);

    let (status, body) = send(
        &app,
        "POST",
        "/v1/station-type",
        &admin,
        Some(json!({"description": "nameless"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "name");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_rejects_blank_name_and_missing_rows(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let admin = bearer_for(&app.state, &app.admin);
    let missing = uuid::Uuid::new_v4();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/v1/station-type/{missing}"),
        &admin,
        Some(json!({"name": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "name");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/v1/station-type/{missing}"),
        &admin,
        Some(json!({"description": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_station_role_can_read_but_not_write(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let station = bearer_for(&app.state, &app.station);

    let (status, _) = send(&app, "GET", "/v1/station-types", &station, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/v1/station-type",
        &station,
        Some(json!({"name": "Wind"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "you are not authorized for that action");
}
