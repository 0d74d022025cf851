//! Dataset persistence: the flat CSV snapshot
//!
//! One crawl run produces one dataset; writing always replaces the previous
//! snapshot wholesale. The write is all-or-nothing: records go to a temp
//! file in the destination directory which is then renamed over the target,
//! so a partially written dataset is never observable as a complete one.

use crate::record::CatalogRecord;
use crate::DatasetError;
use std::path::Path;
use tempfile::NamedTempFile;

/// Fixed column order of the persisted dataset
pub const COLUMNS: [&str; 8] = [
    "id",
    "title",
    "price",
    "rating",
    "availability",
    "category",
    "image_url",
    "product_url",
];

/// Serializes the complete record list, replacing any existing dataset
///
/// # Arguments
///
/// * `path` - Destination of the dataset file
/// * `records` - The full record set from one crawl run
///
/// # Returns
///
/// * `Ok(())` - Dataset written and atomically moved into place
/// * `Err(DatasetError)` - Nothing observable was written
pub fn write_dataset(path: &Path, records: &[CatalogRecord]) -> Result<(), DatasetError> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = dir {
        std::fs::create_dir_all(dir)?;
    }

    let tmp = NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))?;

    {
        // Header written explicitly so an empty dataset still carries the schema
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file());
        writer.write_record(COLUMNS)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
    }

    tmp.persist(path)
        .map_err(|e| DatasetError::Persist(e.to_string()))?;

    tracing::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Reads the persisted dataset into an in-memory table
///
/// Tolerant by contract: a missing source yields an empty table with a
/// warning, a malformed source yields an empty table with an error log.
/// Consumers must treat "empty" as a valid state.
pub fn load_dataset(path: &Path) -> Vec<CatalogRecord> {
    if !path.exists() {
        tracing::warn!("Dataset {} not found, starting empty", path.display());
        return Vec::new();
    }

    match read_dataset(path) {
        Ok(records) => {
            tracing::info!("Loaded {} records from {}", records.len(), path.display());
            records
        }
        Err(e) => {
            tracing::error!("Failed to read dataset {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

fn read_dataset(path: &Path) -> Result<Vec<CatalogRecord>, DatasetError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();

    for result in reader.deserialize() {
        records.push(result?);
    }

    Ok(records)
}
