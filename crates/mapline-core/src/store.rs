//! Destination stores for validated tables.
//!
//! A store receives one validated table at a time and writes it in
//! batches of at most `batch_size` rows.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use csv::ReaderBuilder;
use polars::prelude::{CsvWriter, DataFrame, PlSmallStr, SerWriter};
use tracing::{debug, info, warn};

use crate::error::StorageError;

/// Default rows per insert batch.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Capability interface for table sinks.
pub trait DestinationStore: Send + Sync {
    /// Prepare the destination. Safe to call more than once.
    fn create_schema(&self) -> Result<(), StorageError>;

    /// Append a table; returns the number of rows written.
    fn insert(&self, table: &str, df: &DataFrame, batch_size: usize)
    -> Result<usize, StorageError>;
}

/// Row offsets and lengths of each batch.
pub fn batch_ranges(height: usize, batch_size: usize) -> Vec<(usize, usize)> {
    let size = batch_size.max(1);
    (0..height)
        .step_by(size)
        .map(|start| (start, size.min(height - start)))
        .collect()
}

/// In-memory store that keeps every inserted batch.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<BTreeMap<String, Vec<DataFrame>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of tables that received data.
    pub fn table_names(&self) -> Vec<String> {
        self.tables
            .lock()
            .map(|tables| tables.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Inserted batches of one table, in insertion order.
    pub fn batches(&self, table: &str) -> Vec<DataFrame> {
        self.tables
            .lock()
            .ok()
            .and_then(|tables| tables.get(table).cloned())
            .unwrap_or_default()
    }

    /// Total rows inserted into one table.
    pub fn row_count(&self, table: &str) -> usize {
        self.batches(table).iter().map(DataFrame::height).sum()
    }
}

impl DestinationStore for MemoryStore {
    fn create_schema(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn insert(
        &self,
        table: &str,
        df: &DataFrame,
        batch_size: usize,
    ) -> Result<usize, StorageError> {
        if df.height() == 0 {
            warn!(table = %table, "no data to insert");
            return Ok(0);
        }
        let mut tables = self.tables.lock().map_err(|_| StorageError::Poisoned)?;
        let batches = tables.entry(table.to_string()).or_default();
        for (offset, len) in batch_ranges(df.height(), batch_size) {
            batches.push(df.slice(offset as i64, len));
        }
        Ok(df.height())
    }
}

/// Appends tables to `<dir>/<table>.csv`, writing the header once.
///
/// Later inserts are reordered to the header already on disk.
#[derive(Debug)]
pub struct CsvDirectoryStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvDirectoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.csv"))
    }
}

impl DestinationStore for CsvDirectoryStore {
    fn create_schema(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;
        info!(dir = %self.dir.display(), "output directory ready");
        Ok(())
    }

    fn insert(
        &self,
        table: &str,
        df: &DataFrame,
        batch_size: usize,
    ) -> Result<usize, StorageError> {
        if df.height() == 0 {
            warn!(table = %table, "no data to insert");
            return Ok(0);
        }
        self.create_schema()?;
        let path = self.table_path(table);
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;

        let existing = existing_header(table, &path)?;
        let frame = match &existing {
            Some(header) => align_to_header(table, df, header)?,
            None => df.clone(),
        };

        info!(table = %table, rows = frame.height(), path = %path.display(), "inserting rows");
        let mut needs_header = existing.is_none();
        for (offset, len) in batch_ranges(frame.height(), batch_size) {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|source| StorageError::Io {
                    path: path.clone(),
                    source,
                })?;
            let mut batch = frame.slice(offset as i64, len);
            CsvWriter::new(&mut file)
                .include_header(needs_header)
                .finish(&mut batch)
                .map_err(|err| StorageError::Insert {
                    table: table.to_string(),
                    message: err.to_string(),
                })?;
            needs_header = false;
            debug!(table = %table, start = offset, end = offset + len, "inserted batch");
        }
        Ok(df.height())
    }
}

/// Header of an existing, non-empty table file.
fn existing_header(table: &str, path: &Path) -> Result<Option<Vec<String>>, StorageError> {
    if !path.exists() {
        return Ok(None);
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|err| StorageError::Insert {
            table: table.to_string(),
            message: format!("{}: {err}", path.display()),
        })?;
    match reader.records().next() {
        Some(Ok(record)) => Ok(Some(record.iter().map(str::to_string).collect())),
        Some(Err(err)) => Err(StorageError::Insert {
            table: table.to_string(),
            message: format!("unreadable header in {}: {err}", path.display()),
        }),
        None => Ok(None),
    }
}

/// Reorders `df` to the column order of an existing file.
///
/// The column sets must match exactly.
fn align_to_header(
    table: &str,
    df: &DataFrame,
    header: &[String],
) -> Result<DataFrame, StorageError> {
    let names: Vec<&str> = df
        .get_column_names()
        .into_iter()
        .map(PlSmallStr::as_str)
        .collect();
    let missing: Vec<&str> = header
        .iter()
        .map(String::as_str)
        .filter(|h| !names.contains(h))
        .collect();
    let extra: Vec<&str> = names
        .iter()
        .copied()
        .filter(|n| !header.iter().any(|h| h.as_str() == *n))
        .collect();
    if !missing.is_empty() || !extra.is_empty() {
        return Err(StorageError::Insert {
            table: table.to_string(),
            message: format!(
                "columns do not match the existing header (missing: [{}], unexpected: [{}])",
                missing.join(", "),
                extra.join(", ")
            ),
        });
    }
    df.select(header.iter().map(String::as_str))
        .map_err(|err| StorageError::Insert {
            table: table.to_string(),
            message: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;
    use tempfile::TempDir;

    fn frame(rows: usize) -> DataFrame {
        let ids: Vec<i64> = (0..rows as i64).collect();
        df! { "id" => ids }.unwrap()
    }

    #[test]
    fn batch_ranges_cover_all_rows() {
        assert_eq!(batch_ranges(5, 2), vec![(0, 2), (2, 2), (4, 1)]);
        assert_eq!(batch_ranges(0, 10), Vec::<(usize, usize)>::new());
        assert_eq!(batch_ranges(2, 0), vec![(0, 1), (1, 1)]);
    }

    #[test]
    fn memory_store_keeps_batches() {
        let store = MemoryStore::new();
        assert_eq!(store.insert("orders", &frame(5), 2).unwrap(), 5);
        assert_eq!(store.batches("orders").len(), 3);
        assert_eq!(store.row_count("orders"), 5);
        assert_eq!(store.insert("orders", &frame(0), 2).unwrap(), 0);
        assert_eq!(store.table_names(), vec!["orders".to_string()]);
    }

    #[test]
    fn csv_store_appends_with_single_header() {
        let dir = TempDir::new().unwrap();
        let store = CsvDirectoryStore::new(dir.path().join("out"));
        store.create_schema().unwrap();
        store.insert("orders", &frame(3), 2).unwrap();
        store.insert("orders", &frame(1), 2).unwrap();

        let text = fs::read_to_string(store.table_path("orders")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["id", "0", "1", "2", "0"]);
    }

    #[test]
    fn csv_store_aligns_later_inserts_to_existing_header() {
        let dir = TempDir::new().unwrap();
        let store = CsvDirectoryStore::new(dir.path());
        let first = df! { "order_id" => ["A1"], "amount" => [10i64] }.unwrap();
        let reordered = df! { "amount" => [20i64], "order_id" => ["A2"] }.unwrap();
        store.insert("orders", &first, 10).unwrap();
        store.insert("orders", &reordered, 10).unwrap();

        let text = fs::read_to_string(store.table_path("orders")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["order_id,amount", "A1,10", "A2,20"]);
    }

    #[test]
    fn csv_store_rejects_mismatched_columns() {
        let dir = TempDir::new().unwrap();
        let store = CsvDirectoryStore::new(dir.path());
        let first = df! { "order_id" => ["A1"], "amount" => [10i64] }.unwrap();
        let wider = df! {
            "amount" => [20i64],
            "order_id" => ["A2"],
            "extra" => ["x"],
        }
        .unwrap();
        store.insert("orders", &first, 10).unwrap();

        let err = store.insert("orders", &wider, 10).unwrap_err();
        assert!(matches!(err, StorageError::Insert { .. }));
        assert!(err.to_string().contains("unexpected: [extra]"), "{err}");

        let text = fs::read_to_string(store.table_path("orders")).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
