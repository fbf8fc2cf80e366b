use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{Postgres, Row, Transaction};
use tracing::{debug, error};

use super::{PriceStore, StoredPrice};
use crate::db::DbPool;
use crate::error::StoreError;
use crate::records::PriceRecord;

// Price and date are bound as normalized text and cast by Postgres, so the
// stored value is exactly the two-decimal / midnight rendering.
const INSERT_PRICE: &str = r#"
    INSERT INTO prices (name, category, price, create_date)
    VALUES ($1, $2, $3::numeric, $4::timestamp)
"#;

const COUNT_CATEGORIES: &str = "SELECT COUNT(DISTINCT category) FROM prices";

const SELECT_PRICES: &str = r#"
    SELECT id, name, category, price::float8 AS price, create_date
    FROM prices
"#;

#[derive(Debug, Clone)]
pub struct PostgresPriceStore {
    pool: DbPool,
}

impl PostgresPriceStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl PriceStore for PostgresPriceStore {
    async fn insert_batch(&self, records: &[PriceRecord]) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(StoreError::Connection)?;
        let mut tx = sqlx::Connection::begin(&mut *conn)
            .await
            .map_err(StoreError::Begin)?;

        match insert_and_count(&mut tx, records).await {
            Ok(total_categories) => {
                tx.commit().await.map_err(StoreError::Commit)?;
                Ok(total_categories)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!(error = %rollback_err, "failed to roll back prices transaction");
                }
                Err(err)
            }
        }
    }

    async fn fetch_all(&self) -> Result<Vec<StoredPrice>, StoreError> {
        let rows = sqlx::query(SELECT_PRICES)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::Query)?;

        let mut prices = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i32 = row.try_get("id").map_err(StoreError::Query)?;
            let create_date: NaiveDateTime =
                row.try_get("create_date").map_err(StoreError::Query)?;
            prices.push(StoredPrice {
                id: i64::from(id),
                name: row.try_get("name").map_err(StoreError::Query)?,
                category: row.try_get("category").map_err(StoreError::Query)?,
                price: row.try_get("price").map_err(StoreError::Query)?,
                create_date,
            });
        }

        Ok(prices)
    }
}

async fn insert_and_count(
    tx: &mut Transaction<'_, Postgres>,
    records: &[PriceRecord],
) -> Result<i64, StoreError> {
    // sqlx prepares INSERT_PRICE once on this connection and reuses the
    // cached statement for every row.
    for (row, record) in records.iter().enumerate() {
        sqlx::query(INSERT_PRICE)
            .bind(&record.name)
            .bind(&record.category)
            .bind(record.price_text())
            .bind(record.create_date_text())
            .execute(tx.as_mut())
            .await
            .map_err(|source| StoreError::Insert { row, source })?;
    }
    debug!(inserted = records.len(), "inserted price records");

    sqlx::query_scalar::<_, i64>(COUNT_CATEGORIES)
        .fetch_one(tx.as_mut())
        .await
        .map_err(StoreError::CountCategories)
}
