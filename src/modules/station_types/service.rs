use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use stations_core::AppError;

use super::model::{NewStationType, StationType, UpdateStationType};

const SELECT_STATION_TYPES: &str = r#"
    SELECT st.id, st.name, st.description, COUNT(s.id) AS stations,
           st.date_created, st.date_updated
    FROM station_type st
    LEFT JOIN station s ON s.station_type_id = st.id"#;

pub struct StationTypeService;

impl StationTypeService {
    #[instrument(skip(db))]
    pub async fn query(db: &PgPool) -> Result<Vec<StationType>, AppError> {
        let query = format!("{SELECT_STATION_TYPES} GROUP BY st.id ORDER BY st.date_created");
        let station_types = sqlx::query_as::<_, StationType>(&query)
            .fetch_all(db)
            .await?;

        Ok(station_types)
    }

    #[instrument(skip(db))]
    pub async fn query_by_id(db: &PgPool, id: Uuid) -> Result<StationType, AppError> {
        let query = format!("{SELECT_STATION_TYPES} WHERE st.id = $1 GROUP BY st.id");
        sqlx::query_as::<_, StationType>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("station type not found"))
    }

    #[instrument(skip(db))]
    pub async fn create(
        db: &PgPool,
        new_station_type: NewStationType,
        now: DateTime<Utc>,
    ) -> Result<StationType, AppError> {
        let station_type = sqlx::query_as::<_, StationType>(
            r#"INSERT INTO station_type (id, name, description, date_created, date_updated)
               VALUES ($1, $2, $3, $4, $4)
               RETURNING id, name, description, 0::BIGINT AS stations, date_created, date_updated"#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_station_type.name)
        .bind(&new_station_type.description)
        .bind(now)
        .fetch_one(db)
        .await?;

        Ok(station_type)
    }

    /// Applies the set fields of `update`. Fails with 404 when the row is gone.
    #[instrument(skip(db))]
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        update: UpdateStationType,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let fields = update.field_errors();
        if !fields.is_empty() {
            return Err(AppError::invalid_fields("field validation error", fields));
        }

        let mut station_type = Self::query_by_id(db, id).await?;
        update.name.apply_to(&mut station_type.name);
        update.description.apply_to(&mut station_type.description);

        let result = sqlx::query(
            r#"UPDATE station_type SET name = $2, description = $3, date_updated = $4
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&station_type.name)
        .bind(&station_type.description)
        .bind(now)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("station type not found"));
        }

        Ok(())
    }

    /// Removes the station type and, through the foreign key, its stations.
    /// Deleting an id that does not exist is not an error.
    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM station_type WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }
}
