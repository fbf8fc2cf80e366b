use std::io::{Cursor, Read, Write};

use zip::{write::FileOptions, CompressionMethod, ZipArchive, ZipWriter};

use crate::error::ArchiveError;

/// Name of the only archive entry the pipeline reads or writes.
pub const DATA_ENTRY: &str = "data.csv";

/// Largest `data.csv` payload [`unpack`] will inflate.
pub const MAX_PAYLOAD_BYTES: u64 = 256 * 1024 * 1024;

/// Extract the `data.csv` payload from a ZIP upload.
///
/// Entries with any other name are ignored. Entries are scanned in central
/// directory order and, should the archive carry more than one entry named
/// exactly `data.csv`, the last one wins. Payloads larger than
/// [`MAX_PAYLOAD_BYTES`] are rejected.
pub fn unpack(archive_bytes: &[u8]) -> Result<Vec<u8>, ArchiveError> {
    unpack_with_limit(archive_bytes, MAX_PAYLOAD_BYTES)
}

/// [`unpack`] with an explicit cap on the inflated payload size.
pub fn unpack_with_limit(archive_bytes: &[u8], limit: u64) -> Result<Vec<u8>, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(archive_bytes)).map_err(ArchiveError::Format)?;

    let mut data_index = None;
    for index in 0..archive.len() {
        let entry = archive.by_index(index).map_err(ArchiveError::Format)?;
        if entry.name() == DATA_ENTRY {
            data_index = Some(index);
        }
    }

    let index = data_index.ok_or_else(|| ArchiveError::MissingEntry(DATA_ENTRY.to_string()))?;
    let entry = archive.by_index(index).map_err(ArchiveError::Format)?;
    let too_large = || ArchiveError::PayloadTooLarge {
        entry: DATA_ENTRY.to_string(),
        limit,
    };

    // The declared size is uploader-controlled: it only short-circuits the
    // obvious case and is never used to size the buffer.
    if entry.size() > limit {
        return Err(too_large());
    }

    let mut payload = Vec::new();
    entry
        .take(limit.saturating_add(1))
        .read_to_end(&mut payload)
        .map_err(|source| ArchiveError::EntryRead {
            entry: DATA_ENTRY.to_string(),
            source,
        })?;

    if payload.len() as u64 > limit {
        return Err(too_large());
    }

    Ok(payload)
}

/// Wrap a CSV payload into a single-entry ZIP named `data.csv`.
pub fn pack(payload: &[u8]) -> Result<Vec<u8>, ArchiveError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(DATA_ENTRY, options)
        .map_err(ArchiveError::Write)?;
    zip.write_all(payload)?;

    let cursor = zip.finish().map_err(ArchiveError::Write)?;
    Ok(cursor.into_inner())
}
