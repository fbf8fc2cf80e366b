pub mod archive;
pub mod db;
pub mod error;
pub mod export;
pub mod ingestion;
pub mod pipeline;
pub mod records;
pub mod store;
pub mod totals;

pub use error::{ArchiveError, ExportError, ImportError, StoreError};
pub use pipeline::{export_archive, import_archive, persist_batch, ImportSummary};
pub use store::{MemoryPriceStore, PostgresPriceStore, PriceStore, StoredPrice};
