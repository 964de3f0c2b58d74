mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header::AUTHORIZATION};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;

use stations_db::schema;

use common::{TestApp, bearer_for, setup_test_app};

const PLANT_TYPE_ID: &str = "5c86bbaa-4ef8-11eb-ae93-0242ac130002";
const PLANT_STATION_ONE: &str = "f676f266-590c-11eb-ae93-0242ac130002";

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

async fn seeded_app(pool: PgPool) -> TestApp {
    schema::seed(&pool).await.unwrap();
    setup_test_app(pool).await
}

#[sqlx::test(migrations = "./migrations")]
async fn test_seeded_stations_are_listed_by_type(pool: PgPool) {
    let app = seeded_app(pool).await;
    let bearer = bearer_for(&app.state, &app.station);

    let (status, stations) = send(
        &app,
        "GET",
        &format!("/v1/station-type/{PLANT_TYPE_ID}/stations"),
        &bearer,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stations.as_array().unwrap().len(), 3);
    assert_eq!(stations[0]["name"], "Plant Station One");

    let (status, plant) = send(
        &app,
        "GET",
        &format!("/v1/station-type/{PLANT_TYPE_ID}"),
        &bearer,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plant["stations"], 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_station_lifecycle(pool: PgPool) {
    let app = seeded_app(pool).await;
    let admin = bearer_for(&app.state, &app.admin);

    let (status, created) = send(
        &app,
        "POST",
        &format!("/v1/station-type/{PLANT_TYPE_ID}/station"),
        &admin,
        Some(json!({"name": "Plant Station Four", "location_x": 6, "location_y": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["account_id"], app.admin.id.to_string());
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/v1/station/{id}"),
        &admin,
        Some(json!({"description": "Greenhouse", "location_y": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, fetched) = send(&app, "GET", &format!("/v1/station/{id}"), &admin, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Plant Station Four");
    assert_eq!(fetched["description"], "Greenhouse");
    assert_eq!(fetched["location_x"], 6);
    assert_eq!(fetched["location_y"], 4);

    let (status, _) = send(&app, "DELETE", &format!("/v1/station/{id}"), &admin, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/v1/station/{id}"), &admin, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "station not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_adding_to_missing_type_is_not_found(pool: PgPool) {
    let app = seeded_app(pool).await;
    let admin = bearer_for(&app.state, &app.admin);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/station-type/{}/station", uuid::Uuid::new_v4()),
        &admin,
        Some(json!({"name": "Orphan"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "station type not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_negative_locations_are_rejected(pool: PgPool) {
    let app = seeded_app(pool).await;
    let admin = bearer_for(&app.state, &app.admin);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/v1/station/{PLANT_STATION_ONE}"),
        &admin,
        Some(json!({"location_x": -1})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "location_x");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deleting_a_type_removes_its_stations(pool: PgPool) {
    let app = seeded_app(pool).await;
    let admin = bearer_for(&app.state, &app.admin);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/v1/station-type/{PLANT_TYPE_ID}"),
        &admin,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/v1/station/{PLANT_STATION_ONE}"),
        &admin,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
