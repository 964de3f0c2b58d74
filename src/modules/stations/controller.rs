use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use stations_core::{AppError, ErrorResponse};

use super::model::{NewStation, Station, UpdateStation};
use super::service::StationService;
use crate::metrics::track_station_mutation;
use crate::middleware::auth::AuthUser;
use crate::middleware::request_values::RequestValues;
use crate::state::AppState;
use crate::utils::id::parse_id;
use crate::validator::ValidatedJson;

/// List the stations of a station type
#[utoipa::path(
    get,
    path = "/v1/station-type/{id}/stations",
    params(("id" = String, Path, description = "Station type id")),
    responses(
        (status = 200, description = "Stations of the type", body = Vec<Station>),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Stations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn query_by_station_type(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Station>>, AppError> {
    let station_type_id = parse_id(&id)?;
    let stations = StationService::query_by_station_type(&state.db, station_type_id).await?;
    Ok(Json(stations))
}

/// Get a station by id
#[utoipa::path(
    get,
    path = "/v1/station/{id}",
    params(("id" = String, Path, description = "Station id")),
    responses(
        (status = 200, description = "Station", body = Station),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Station not found", body = ErrorResponse)
    ),
    tag = "Stations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn query_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Station>, AppError> {
    let id = parse_id(&id)?;
    let station = StationService::query_by_id(&state.db, id).await?;
    Ok(Json(station))
}

/// Add a station to a station type
#[utoipa::path(
    post,
    path = "/v1/station-type/{id}/station",
    params(("id" = String, Path, description = "Station type id")),
    request_body = NewStation,
    responses(
        (status = 201, description = "Station created", body = Station),
        (status = 400, description = "Malformed id or validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Requires the ADMIN role", body = ErrorResponse),
        (status = 404, description = "Station type not found", body = ErrorResponse)
    ),
    tag = "Stations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    values: RequestValues,
    Path(id): Path<String>,
    ValidatedJson(new_station): ValidatedJson<NewStation>,
) -> Result<(StatusCode, Json<Station>), AppError> {
    let station_type_id = parse_id(&id)?;
    let account_id = user.account_id()?;

    let station =
        StationService::create(&state.db, station_type_id, account_id, new_station, values.now)
            .await?;
    track_station_mutation("create");

    Ok((StatusCode::CREATED, Json(station)))
}

/// Update a station
#[utoipa::path(
    put,
    path = "/v1/station/{id}",
    params(("id" = String, Path, description = "Station id")),
    request_body = UpdateStation,
    responses(
        (status = 204, description = "Station updated"),
        (status = 400, description = "Malformed id or validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not an admin and not the owner", body = ErrorResponse),
        (status = 404, description = "Station not found", body = ErrorResponse)
    ),
    tag = "Stations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    values: RequestValues,
    Path(id): Path<String>,
    ValidatedJson(update): ValidatedJson<UpdateStation>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    StationService::update(&state.db, &user, id, update, values.now).await?;
    track_station_mutation("update");

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a station
#[utoipa::path(
    delete,
    path = "/v1/station/{id}",
    params(("id" = String, Path, description = "Station id")),
    responses(
        (status = 204, description = "Station deleted"),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Requires the ADMIN role", body = ErrorResponse)
    ),
    tag = "Stations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    StationService::delete(&state.db, id).await?;
    track_station_mutation("delete");

    Ok(StatusCode::NO_CONTENT)
}
