use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use tracing::info;

use crate::error::StoreError;

pub type DbPool = Pool<Postgres>;

const CREATE_PRICES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS prices (
        id SERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        category VARCHAR(255) NOT NULL,
        price NUMERIC(10, 2) NOT NULL,
        create_date TIMESTAMP NOT NULL
    )
"#;

/// Establish a new Postgres connection pool for the import/export service.
pub async fn connect(database_url: &str) -> Result<DbPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
        .map_err(StoreError::Connection)
}

/// Create the `prices` table if it does not exist yet.
pub async fn ensure_schema(pool: &DbPool) -> Result<(), StoreError> {
    sqlx::query(CREATE_PRICES_TABLE)
        .execute(pool)
        .await
        .map_err(StoreError::Schema)?;
    info!("prices table is ready");
    Ok(())
}
