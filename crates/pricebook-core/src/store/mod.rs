//! Persistence seam for the `prices` table.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::StoreError;
use crate::records::PriceRecord;

pub use memory::MemoryPriceStore;
pub use postgres::PostgresPriceStore;

/// A row as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPrice {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub create_date: NaiveDateTime,
}

#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Insert every record in one transaction and return the number of
    /// distinct categories across the whole table, observed inside that
    /// transaction after the inserts. Either all records are committed or
    /// none are.
    async fn insert_batch(&self, records: &[PriceRecord]) -> Result<i64, StoreError>;

    /// Every stored row, in the store's natural scan order.
    async fn fetch_all(&self) -> Result<Vec<StoredPrice>, StoreError>;
}
