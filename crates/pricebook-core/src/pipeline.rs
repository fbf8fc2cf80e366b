use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::archive;
use crate::error::{ExportError, ImportError, StoreError};
use crate::export::serialize_table;
use crate::ingestion::{build_batch, ImportBatch};
use crate::store::PriceStore;

/// Response body of a successful import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_items: i64,
    pub total_categories: i64,
    pub total_price: String,
}

/// Persist a batch in one store transaction.
///
/// `total_items` and `total_price` come from the batch; `total_categories`
/// is the table-wide distinct count observed after the inserts.
pub async fn persist_batch(
    store: &dyn PriceStore,
    batch: &ImportBatch,
) -> Result<ImportSummary, StoreError> {
    let total_categories = store.insert_batch(&batch.records).await.map_err(|err| {
        error!(error = %err, records = batch.records.len(), "failed to persist import batch");
        err
    })?;

    Ok(ImportSummary {
        total_items: batch.totals.total_items(),
        total_categories,
        total_price: batch.totals.total_price_text(),
    })
}

/// Unpack an uploaded archive, validate its rows and store the accepted ones.
pub async fn import_archive(
    store: &dyn PriceStore,
    archive_bytes: &[u8],
) -> Result<ImportSummary, ImportError> {
    let archive_hash = blake3::hash(archive_bytes).to_hex().to_string();
    let payload = archive::unpack(archive_bytes)?;
    let batch = build_batch(&payload);

    let summary = persist_batch(store, &batch).await?;

    info!(
        %archive_hash,
        accepted = summary.total_items,
        skipped = batch.skipped.len(),
        batch_categories = batch.totals.distinct_categories(),
        total_categories = summary.total_categories,
        total_price = %summary.total_price,
        "import committed"
    );

    Ok(summary)
}

/// Read the whole `prices` table and pack it as a `data.csv` archive.
pub async fn export_archive(store: &dyn PriceStore) -> Result<Vec<u8>, ExportError> {
    let prices = store.fetch_all().await?;
    let payload = serialize_table(&prices)?;
    let archive = archive::pack(&payload)?;

    info!(rows = prices.len(), bytes = archive.len(), "export archive built");
    Ok(archive)
}
