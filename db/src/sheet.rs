//! JSON sheet-file backend.
//!
//! Stores the product sheet as one JSON document holding the header and the
//! data rows, the same shape a spreadsheet export has:
//!
//! ```json
//! {
//!   "columns": ["Marque", "Produit", "N-P-K | N-P2O5-K2O", "Details", "Detailed Name"],
//!   "rows": [["Acme", "UREA", "46-0-0", "granular", "Acme UREA 46-0-0 granular"]]
//! }
//! ```
//!
//! Every operation re-reads the file so the store always reflects the
//! latest content on disk. Writes go to a sibling temp file that is renamed
//! over the original.

use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use product_search_core::{RowPosition, Table};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Session;
use crate::error::{Result, StoreError};
use crate::store::{RecordStore, check_position};

/// On-disk layout of a sheet file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SheetFile {
    /// Header row.
    pub columns: Vec<String>,
    /// Data rows, each in header order.
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

impl SheetFile {
    /// Reads and parses a sheet file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SheetNotFound`] if the file is missing,
    /// [`StoreError::JsonError`] if it does not parse, or
    /// [`StoreError::InvalidSheet`] if the header is empty.
    pub fn read(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::SheetNotFound(path.to_path_buf()),
            _ => StoreError::IoError(e),
        })?;
        let sheet: SheetFile = serde_json::from_reader(BufReader::new(file))?;
        if sheet.columns.is_empty() {
            return Err(StoreError::InvalidSheet(format!(
                "'{}' has no header columns",
                path.display()
            )));
        }
        Ok(sheet)
    }

    /// Writes the sheet atomically (temp file + rename).
    pub fn write(&self, path: &Path) -> Result<()> {
        let tmp = temp_path(path);
        {
            let file = std::fs::File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.flush()?;
        }
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Converts to a normalized table snapshot.
    pub fn into_table(self) -> Table {
        Table::from_rows(self.columns, self.rows)
    }

    /// Captures a table as a sheet.
    pub fn from_table(table: &Table) -> Self {
        Self {
            columns: table.columns().to_vec(),
            rows: table
                .records()
                .iter()
                .map(|r| r.values_for(table.columns()))
                .collect(),
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// A [`RecordStore`] backed by a JSON sheet file.
///
/// # Examples
///
/// ```no_run
/// use product_search_store::{RecordStore, SheetFileStore};
///
/// let mut store = SheetFileStore::open("products.json", None).unwrap();
/// let table = store.load().unwrap();
/// println!("{} products", table.len());
/// ```
#[derive(Debug)]
pub struct SheetFileStore {
    path: PathBuf,
    session: Option<Session>,
}

impl SheetFileStore {
    /// Opens an existing sheet file.
    ///
    /// The session, if any, is kept for attribution in logs; the file
    /// itself needs no authentication.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SheetNotFound`] if the file does not exist, or
    /// a parse error if it is not a valid sheet.
    pub fn open(path: impl Into<PathBuf>, session: Option<Session>) -> Result<Self> {
        let path = path.into();
        let sheet = SheetFile::read(&path)?;
        info!(
            path = %path.display(),
            columns = sheet.columns.len(),
            rows = sheet.rows.len(),
            identity = session.as_ref().map(|s| s.identity.as_str()),
            "opened sheet"
        );
        Ok(Self { path, session })
    }

    /// Creates a new sheet file with the given header and no rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidSheet`] if `columns` is empty.
    pub fn create(path: impl Into<PathBuf>, columns: Vec<String>) -> Result<Self> {
        let path = path.into();
        if columns.is_empty() {
            return Err(StoreError::InvalidSheet(
                "a sheet needs at least one column".to_string(),
            ));
        }
        SheetFile {
            columns,
            rows: Vec::new(),
        }
        .write(&path)?;
        Ok(Self {
            path,
            session: None,
        })
    }

    /// Path of the sheet file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Session this store was opened with.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }
}

impl RecordStore for SheetFileStore {
    type Error = StoreError;

    fn load(&mut self) -> Result<Table> {
        let table = SheetFile::read(&self.path)?.into_table();
        debug!(rows = table.len(), "loaded sheet snapshot");
        Ok(table)
    }

    fn append(&mut self, row: Vec<String>) -> Result<()> {
        let mut sheet = SheetFile::read(&self.path)?;
        let mut row = row;
        row.resize(sheet.columns.len(), String::new());
        sheet.rows.push(row);
        sheet.write(&self.path)?;
        debug!(position = %RowPosition::from_index(sheet.rows.len() - 1), "appended row");
        Ok(())
    }

    fn delete_at(&mut self, position: RowPosition) -> Result<()> {
        let mut sheet = SheetFile::read(&self.path)?;
        let index = check_position(position, sheet.rows.len())?;
        sheet.rows.remove(index);
        sheet.write(&self.path)?;
        debug!(%position, "deleted row");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        vec!["Produit".into(), "Details".into()]
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SheetFileStore::open(dir.path().join("nope.json"), None).unwrap_err();
        assert!(matches!(err, StoreError::SheetNotFound(_)));
    }

    #[test]
    fn test_open_rejects_empty_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, r#"{"columns": [], "rows": []}"#).unwrap();
        assert!(matches!(
            SheetFileStore::open(&path, None),
            Err(StoreError::InvalidSheet(_))
        ));
    }

    #[test]
    fn test_append_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SheetFileStore::create(dir.path().join("s.json"), header()).unwrap();
        store.append(vec!["UREA".into(), "granular".into()]).unwrap();
        store.append(vec!["KCl".into()]).unwrap();

        let table = store.load().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[1].get("Details"), Some(""));

        store.delete_at(RowPosition::new(2)).unwrap();
        let table = store.load().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].get("Produit"), Some("KCl"));
        assert!(!temp_path(store.path()).exists());
    }

    #[test]
    fn test_delete_out_of_range_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SheetFileStore::create(dir.path().join("s.json"), header()).unwrap();
        store.append(vec!["UREA".into(), "granular".into()]).unwrap();
        assert!(matches!(
            store.delete_at(RowPosition::new(3)),
            Err(StoreError::RowOutOfRange { position: 3, rows: 1 })
        ));
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_sees_external_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        let mut store = SheetFileStore::create(&path, header()).unwrap();
        let sheet = SheetFile {
            columns: header(),
            rows: vec![vec!["Written".into(), "elsewhere".into()]],
        };
        sheet.write(&path).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_table_round_trip_keeps_ragged_rows_normalized() {
        let sheet = SheetFile {
            columns: header(),
            rows: vec![vec!["only".into()]],
        };
        let back = SheetFile::from_table(&sheet.into_table());
        assert_eq!(back.rows, vec![vec!["only".to_string(), String::new()]]);
    }
}
