use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use stations_auth::Role;
use stations_core::AppError;

use super::model::{NewStation, Station, UpdateStation};
use crate::middleware::auth::AuthUser;

const STATION_COLUMNS: &str = "id, station_type_id, account_id, name, description, \
                               location_x, location_y, date_created, date_updated";

pub struct StationService;

impl StationService {
    #[instrument(skip(db))]
    pub async fn query_by_station_type(
        db: &PgPool,
        station_type_id: Uuid,
    ) -> Result<Vec<Station>, AppError> {
        let query = format!(
            "SELECT {STATION_COLUMNS} FROM station WHERE station_type_id = $1 ORDER BY date_created"
        );
        let stations = sqlx::query_as::<_, Station>(&query)
            .bind(station_type_id)
            .fetch_all(db)
            .await?;

        Ok(stations)
    }

    #[instrument(skip(db))]
    pub async fn query_by_id(db: &PgPool, id: Uuid) -> Result<Station, AppError> {
        let query = format!("SELECT {STATION_COLUMNS} FROM station WHERE id = $1");
        sqlx::query_as::<_, Station>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("station not found"))
    }

    /// Adds a station owned by `account_id`. A missing station type is a 404.
    #[instrument(skip(db))]
    pub async fn create(
        db: &PgPool,
        station_type_id: Uuid,
        account_id: Uuid,
        new_station: NewStation,
        now: DateTime<Utc>,
    ) -> Result<Station, AppError> {
        let query = format!(
            r#"INSERT INTO station (id, station_type_id, account_id, name, description,
                                    location_x, location_y, date_created, date_updated)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
               RETURNING {STATION_COLUMNS}"#
        );

        sqlx::query_as::<_, Station>(&query)
            .bind(Uuid::new_v4())
            .bind(station_type_id)
            .bind(account_id)
            .bind(&new_station.name)
            .bind(&new_station.description)
            .bind(new_station.location_x)
            .bind(new_station.location_y)
            .bind(now)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_foreign_key_violation()
                {
                    return AppError::not_found("station type not found");
                }
                AppError::from(e)
            })
    }

    /// Applies the set fields of `update`.
    ///
    /// Admins may change any station; other callers only the stations they own.
    #[instrument(skip(db))]
    pub async fn update(
        db: &PgPool,
        actor: &AuthUser,
        id: Uuid,
        update: UpdateStation,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let fields = update.field_errors();
        if !fields.is_empty() {
            return Err(AppError::invalid_fields("field validation error", fields));
        }

        let mut station = Self::query_by_id(db, id).await?;

        if !actor.has_role(Role::Admin) && station.account_id != Some(actor.account_id()?) {
            return Err(AppError::forbidden("you are not authorized for that action"));
        }

        update.apply(&mut station);

        sqlx::query(
            r#"UPDATE station
               SET name = $2, description = $3, location_x = $4, location_y = $5,
                   date_updated = $6
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&station.name)
        .bind(&station.description)
        .bind(station.location_x)
        .bind(station.location_y)
        .bind(now)
        .execute(db)
        .await?;

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM station WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }
}
