//! Per-brand JSON output store
//!
//! One pretty-printed UTF-8 JSON array of product records per brand,
//! accumulated across runs: a run loads the existing array, appends, and
//! rewrites the whole file through a temp-file + rename so an interrupted
//! write can never truncate or corrupt the store. Existing entries are
//! never overwritten; the array only grows.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::types::{ProductRecord, ProductSeed};

/// Errors raised by store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An existing store that fails to parse is an error, not an empty
    /// slate; resetting it would shrink the accumulated array.
    #[error("store file {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize records: {0}")]
    Serialize(#[source] serde_json::Error),
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Append-only store of product records, one file per brand.
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(io_err(&dir))?;
        Ok(Self { dir })
    }

    /// Path of a brand's review store file.
    pub fn brand_path(&self, brand: &str) -> PathBuf {
        self.dir.join(format!("{}_reviews.json", brand))
    }

    /// Path of a brand's discovery seed file.
    pub fn seeds_path(&self, brand: &str) -> PathBuf {
        self.dir.join(format!("{}_seeds.json", brand))
    }

    /// Load a brand's records. An absent file is an empty store; a file
    /// holding a single record is treated as a one-element array.
    pub fn load(&self, brand: &str) -> Result<Vec<ProductRecord>, StoreError> {
        let path = self.brand_path(brand);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).map_err(io_err(&path))?;
        match serde_json::from_str::<Vec<ProductRecord>>(&content) {
            Ok(records) => Ok(records),
            Err(_) => match serde_json::from_str::<ProductRecord>(&content) {
                Ok(record) => Ok(vec![record]),
                Err(source) => Err(StoreError::Corrupt { path, source }),
            },
        }
    }

    /// Append one record to a brand's store (read-modify-append).
    pub fn append(&self, brand: &str, record: ProductRecord) -> Result<PathBuf, StoreError> {
        let mut records = self.load(brand)?;
        records.push(record);
        let path = self.save_all(brand, &records)?;
        info!(
            "Saved product data to {} ({} records)",
            path.display(),
            records.len()
        );
        Ok(path)
    }

    /// Rewrite a brand's store wholesale.
    ///
    /// Writes to a temp file in the same directory and renames over the
    /// target, so a crash mid-write leaves the previous store intact.
    pub fn save_all(&self, brand: &str, records: &[ProductRecord]) -> Result<PathBuf, StoreError> {
        let path = self.brand_path(brand);
        let encoded =
            serde_json::to_string_pretty(records).map_err(StoreError::Serialize)?;
        write_atomic(&path, encoded.as_bytes())?;
        debug!("Wrote {} records to {}", records.len(), path.display());
        Ok(path)
    }

    /// Write a brand's discovery seeds, replacing any previous seed file.
    pub fn save_seeds(&self, brand: &str, seeds: &[ProductSeed]) -> Result<PathBuf, StoreError> {
        let path = self.seeds_path(brand);
        let encoded = serde_json::to_string_pretty(seeds).map_err(StoreError::Serialize)?;
        write_atomic(&path, encoded.as_bytes())?;
        info!("Saved {} seeds to {}", seeds.len(), path.display());
        Ok(path)
    }

    /// Load a brand's discovery seeds; an absent file is an empty list.
    pub fn load_seeds(&self, brand: &str) -> Result<Vec<ProductSeed>, StoreError> {
        let path = self.seeds_path(brand);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).map_err(io_err(&path))?;
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt { path, source })
    }
}

/// Write atomically using a temp file in the target directory.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let temp_path = path.with_extension("json.tmp");
    {
        let mut file = File::create(&temp_path).map_err(io_err(&temp_path))?;
        file.write_all(bytes).map_err(io_err(&temp_path))?;
        file.sync_all().map_err(io_err(&temp_path))?;
    }
    fs::rename(&temp_path, path).map_err(io_err(path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ReviewRecord, StarRating};
    use tempfile::TempDir;

    fn record(id: &str) -> ProductRecord {
        let mut record = ProductRecord::empty();
        record.product_id = Some(id.to_string());
        record.quotas.insert(StarRating::Five, 2);
        record.reviews.push(ReviewRecord {
            reviewer_name: "R".to_string(),
            star_rating: "5.0 out of 5 stars".to_string(),
            review_date: String::new(),
            review_text: format!("review for {}", id),
        });
        record
    }

    #[test]
    fn append_grows_store_by_one() {
        let dir = TempDir::new().unwrap();
        let store = OutputStore::open(dir.path()).unwrap();

        store.append("hp", record("A1")).unwrap();
        let before = store.load("hp").unwrap();
        store.append("hp", record("A2")).unwrap();
        let after = store.load("hp").unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(after[0].product_id.as_deref(), Some("A1"));
        assert_eq!(after[1].product_id.as_deref(), Some("A2"));
    }

    #[test]
    fn store_is_pretty_printed_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = OutputStore::open(dir.path()).unwrap();
        let path = store.append("hp", record("A1")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("[\n"), "expected a pretty-printed array");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn single_object_file_is_wrapped_into_an_array() {
        let dir = TempDir::new().unwrap();
        let store = OutputStore::open(dir.path()).unwrap();
        let path = store.brand_path("hp");
        std::fs::write(&path, serde_json::to_string(&record("A1")).unwrap()).unwrap();

        let records = store.load("hp").unwrap();
        assert_eq!(records.len(), 1);

        store.append("hp", record("A2")).unwrap();
        assert_eq!(store.load("hp").unwrap().len(), 2);
    }

    #[test]
    fn corrupt_store_errors_instead_of_resetting() {
        let dir = TempDir::new().unwrap();
        let store = OutputStore::open(dir.path()).unwrap();
        std::fs::write(store.brand_path("hp"), "{not json").unwrap();

        let err = store.append("hp", record("A1")).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        // The broken file is left for inspection, not clobbered
        assert_eq!(
            std::fs::read_to_string(store.brand_path("hp")).unwrap(),
            "{not json"
        );
    }

    #[test]
    fn empty_record_round_trips_as_empty_object() {
        let dir = TempDir::new().unwrap();
        let store = OutputStore::open(dir.path()).unwrap();
        store.append("hp", ProductRecord::empty()).unwrap();
        let records = store.load("hp").unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_empty());
    }

    #[test]
    fn seeds_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = OutputStore::open(dir.path()).unwrap();
        let seeds = vec![ProductSeed::new("B0A"), ProductSeed::new("B0B")];
        store.save_seeds("hp", &seeds).unwrap();
        assert_eq!(store.load_seeds("hp").unwrap(), seeds);
        assert!(store.load_seeds("dell").unwrap().is_empty());
    }
}
