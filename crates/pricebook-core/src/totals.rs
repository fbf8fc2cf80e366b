use std::collections::BTreeSet;

use crate::records::{format_price, PriceRecord};

/// Running aggregates over the accepted rows of one import.
#[derive(Debug, Clone, Default)]
pub struct BatchTotals {
    total_items: i64,
    total_price: f64,
    categories: BTreeSet<String>,
}

impl BatchTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: &PriceRecord) {
        self.total_items += 1;
        self.total_price += record.price;
        if !self.categories.contains(&record.category) {
            self.categories.insert(record.category.clone());
        }
    }

    pub fn total_items(&self) -> i64 {
        self.total_items
    }

    pub fn total_price_text(&self) -> String {
        format_price(self.total_price)
    }

    /// Categories seen in this batch only. The count reported to callers
    /// comes from the store.
    pub fn distinct_categories(&self) -> usize {
        self.categories.len()
    }
}
