use tracing::warn;

use crate::records::{decode_row, PriceRecord, SkipReason};
use crate::totals::BatchTotals;

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// Record index in the CSV grid; the header is row 0. Blank lines are
    /// dropped by the reader and do not count, so after one this is not
    /// the physical line number.
    pub row: usize,
    pub reason: SkipReason,
}

/// Records accepted from one upload, in upload order, plus their aggregates.
#[derive(Debug, Default)]
pub struct ImportBatch {
    pub records: Vec<PriceRecord>,
    pub totals: BatchTotals,
    pub skipped: Vec<SkippedRow>,
}

impl ImportBatch {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn accept(&mut self, record: PriceRecord) {
        self.totals.record(&record);
        self.records.push(record);
    }

    fn skip(&mut self, row: usize, reason: SkipReason) {
        warn!(row, %reason, "skipping malformed row");
        self.skipped.push(SkippedRow { row, reason });
    }
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false).flexible(true);
    builder
}

/// Parse the `data.csv` payload into a batch.
///
/// Row 0 is the header and is never validated. Rows that fail validation
/// are recorded in [`ImportBatch::skipped`] and never fail the batch.
pub fn build_batch(payload: &[u8]) -> ImportBatch {
    let mut reader = reader_builder().from_reader(payload);
    let mut batch = ImportBatch::default();

    for (row, result) in reader.records().enumerate().skip(1) {
        match result {
            Ok(record) => match decode_row(&record) {
                Ok(price) => batch.accept(price),
                Err(reason) => batch.skip(row, reason),
            },
            Err(err) => batch.skip(row, SkipReason::Unreadable(err.to_string())),
        }
    }

    batch
}
