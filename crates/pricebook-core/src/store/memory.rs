use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{PriceStore, StoredPrice};
use crate::error::StoreError;
use crate::records::PriceRecord;

// Mirrors the column limits of the `prices` table.
const MAX_TEXT_CHARS: usize = 255;
const MAX_ABS_CENTS: f64 = 1e10;

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: Vec<StoredPrice>,
}

/// In-process stand-in for the Postgres store with the same all-or-nothing
/// batch semantics and column constraints.
#[derive(Debug, Default)]
pub struct MemoryPriceStore {
    table: Mutex<Table>,
}

impl MemoryPriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        // A panic while holding the lock cannot leave a half-applied batch:
        // rows are only appended after every record has been checked.
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn check_constraints(row: usize, record: &PriceRecord) -> Result<StoredPrice, StoreError> {
    let reject = |reason: String| StoreError::Rejected { row, reason };

    if record.name.chars().count() > MAX_TEXT_CHARS {
        return Err(reject(format!("name exceeds {MAX_TEXT_CHARS} characters")));
    }
    if record.category.chars().count() > MAX_TEXT_CHARS {
        return Err(reject(format!("category exceeds {MAX_TEXT_CHARS} characters")));
    }

    let cents = (record.price * 100.0).round();
    if cents.abs() >= MAX_ABS_CENTS {
        return Err(reject(format!(
            "price {} overflows NUMERIC(10,2)",
            record.price_text()
        )));
    }

    Ok(StoredPrice {
        id: 0,
        name: record.name.clone(),
        category: record.category.clone(),
        price: cents / 100.0,
        create_date: record.create_date,
    })
}

#[async_trait]
impl PriceStore for MemoryPriceStore {
    async fn insert_batch(&self, records: &[PriceRecord]) -> Result<i64, StoreError> {
        let mut table = self.lock();

        let mut staged = Vec::with_capacity(records.len());
        for (row, record) in records.iter().enumerate() {
            staged.push(check_constraints(row, record)?);
        }

        for mut price in staged {
            table.next_id += 1;
            price.id = table.next_id;
            table.rows.push(price);
        }

        let categories: HashSet<&str> = table.rows.iter().map(|r| r.category.as_str()).collect();
        Ok(categories.len() as i64)
    }

    async fn fetch_all(&self) -> Result<Vec<StoredPrice>, StoreError> {
        Ok(self.lock().rows.clone())
    }
}
