use sqlx::PgPool;
use sqlx::migrate::{MigrateError, Migrator};

/// Migrations under the workspace `migrations/` directory, embedded at build time.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

const SEED: &str = include_str!("../seeds/seed.sql");

/// Brings the schema up to date. Applied migrations are never re-run.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Replaces station data with the development seed set and inserts the
/// default accounts. Runs in one transaction.
pub async fn seed(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::raw_sql(SEED).execute(&mut *tx).await?;
    tx.commit().await
}
