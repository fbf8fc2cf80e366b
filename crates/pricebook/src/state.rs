use std::sync::Arc;

use pricebook_core::PriceStore;

/// Shared handle passed to every request. The store is the only state.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn PriceStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PriceStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn PriceStore {
        self.store.as_ref()
    }
}
