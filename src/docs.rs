use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use stations_core::{ErrorResponse, FieldError};

use crate::modules::account::TokenResponse;
use crate::modules::health::controller::HealthStatus;
use crate::modules::station_types::{NewStationType, StationType, UpdateStationType};
use crate::modules::stations::{NewStation, Station, UpdateStation};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::health::controller::health,
        crate::modules::account::controller::token,
        crate::modules::station_types::controller::query,
        crate::modules::station_types::controller::query_by_id,
        crate::modules::station_types::controller::create,
        crate::modules::station_types::controller::update,
        crate::modules::station_types::controller::delete,
        crate::modules::stations::controller::query_by_station_type,
        crate::modules::stations::controller::query_by_id,
        crate::modules::stations::controller::create,
        crate::modules::stations::controller::update,
        crate::modules::stations::controller::delete,
    ),
    components(
        schemas(
            HealthStatus,
            TokenResponse,
            ErrorResponse,
            FieldError,
            StationType,
            NewStationType,
            UpdateStationType,
            Station,
            NewStation,
            UpdateStation,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service readiness"),
        (name = "Account", description = "Token issuance"),
        (name = "Station Types", description = "Station type management"),
        (name = "Stations", description = "Station management")
    ),
    info(
        title = "Stations API",
        version = "0.1.0",
        description = "Station types and stations behind RS256 bearer tokens.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}
