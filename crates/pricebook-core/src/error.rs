// crates/pricebook-core/src/error.rs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("upload is not a readable ZIP archive: {0}")]
    Format(#[source] zip::result::ZipError),

    #[error("failed to read entry '{entry}' from archive: {source}")]
    EntryRead {
        entry: String,
        #[source]
        source: std::io::Error,
    },

    #[error("archive does not contain an entry named '{0}'")]
    MissingEntry(String),

    #[error("entry '{entry}' inflates past the {limit} byte limit")]
    PayloadTooLarge { entry: String, limit: u64 },

    #[error("failed to write archive: {0}")]
    Write(#[source] zip::result::ZipError),

    #[error("failed to write archive entry: {0}")]
    WriteIo(#[from] std::io::Error),
}

impl ArchiveError {
    /// Whether the failure was caused by the uploaded bytes rather than by us.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ArchiveError::Format(_)
                | ArchiveError::EntryRead { .. }
                | ArchiveError::MissingEntry(_)
                | ArchiveError::PayloadTooLarge { .. }
        )
    }
}

/// Failures talking to the price store. Any variant raised after a
/// transaction was opened is returned only once that transaction has been
/// rolled back.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to acquire a store connection: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("failed to begin transaction: {0}")]
    Begin(#[source] sqlx::Error),

    #[error("failed to insert record {row} of the batch: {source}")]
    Insert {
        row: usize,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to count distinct categories: {0}")]
    CountCategories(#[source] sqlx::Error),

    #[error("failed to commit transaction: {0}")]
    Commit(#[source] sqlx::Error),

    #[error("failed to read stored prices: {0}")]
    Query(#[source] sqlx::Error),

    #[error("failed to create prices table: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("record {row} of the batch rejected by store: {reason}")]
    Rejected { row: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ImportError {
    pub fn is_client_error(&self) -> bool {
        match self {
            ImportError::Archive(err) => err.is_client_error(),
            ImportError::Store(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to serialize prices as CSV: {0}")]
    Serialize(#[from] csv::Error),

    #[error("failed to flush CSV writer: {0}")]
    Flush(String),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}
