use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use stations_core::{AppError, ErrorResponse};

use super::model::{NewStationType, StationType, UpdateStationType};
use super::service::StationTypeService;
use crate::metrics::track_station_type_mutation;
use crate::middleware::auth::AuthUser;
use crate::middleware::request_values::RequestValues;
use crate::state::AppState;
use crate::utils::id::parse_id;
use crate::validator::ValidatedJson;

/// List all station types
#[utoipa::path(
    get,
    path = "/v1/station-types",
    responses(
        (status = 200, description = "Station types with their station counts", body = Vec<StationType>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Station Types",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn query(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<StationType>>, AppError> {
    let station_types = StationTypeService::query(&state.db).await?;
    Ok(Json(station_types))
}

/// Get a station type by id
#[utoipa::path(
    get,
    path = "/v1/station-type/{id}",
    params(("id" = String, Path, description = "Station type id")),
    responses(
        (status = 200, description = "Station type", body = StationType),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Station type not found", body = ErrorResponse)
    ),
    tag = "Station Types",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn query_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<StationType>, AppError> {
    let id = parse_id(&id)?;
    let station_type = StationTypeService::query_by_id(&state.db, id).await?;
    Ok(Json(station_type))
}

/// Create a station type
#[utoipa::path(
    post,
    path = "/v1/station-type",
    request_body = NewStationType,
    responses(
        (status = 201, description = "Station type created", body = StationType),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Requires the ADMIN role", body = ErrorResponse)
    ),
    tag = "Station Types",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create(
    State(state): State<AppState>,
    values: RequestValues,
    ValidatedJson(new_station_type): ValidatedJson<NewStationType>,
) -> Result<(StatusCode, Json<StationType>), AppError> {
    let station_type = StationTypeService::create(&state.db, new_station_type, values.now).await?;
    track_station_type_mutation("create");

    Ok((StatusCode::CREATED, Json(station_type)))
}

/// Update a station type
#[utoipa::path(
    put,
    path = "/v1/station-type/{id}",
    params(("id" = String, Path, description = "Station type id")),
    request_body = UpdateStationType,
    responses(
        (status = 204, description = "Station type updated"),
        (status = 400, description = "Malformed id or validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Requires the ADMIN role", body = ErrorResponse),
        (status = 404, description = "Station type not found", body = ErrorResponse)
    ),
    tag = "Station Types",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    values: RequestValues,
    Path(id): Path<String>,
    ValidatedJson(update): ValidatedJson<UpdateStationType>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    StationTypeService::update(&state.db, id, update, values.now).await?;
    track_station_type_mutation("update");

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a station type and its stations
#[utoipa::path(
    delete,
    path = "/v1/station-type/{id}",
    params(("id" = String, Path, description = "Station type id")),
    responses(
        (status = 204, description = "Station type deleted"),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Requires the ADMIN role", body = ErrorResponse)
    ),
    tag = "Station Types",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    StationTypeService::delete(&state.db, id).await?;
    track_station_type_mutation("delete");

    Ok(StatusCode::NO_CONTENT)
}
