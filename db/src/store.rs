//! The record store boundary and its in-memory implementation.
//!
//! A [`RecordStore`] exposes the three operations the workflow needs from
//! the backing sheet: read everything, append one row, delete one row by
//! sheet position. Backends report their own error type; callers propagate
//! it unchanged.

use product_search_core::{Record, RowPosition, Table};
use tracing::debug;

use crate::error::{Result, StoreError};

/// Access to the authoritative product sheet.
///
/// Rows are addressed by [`RowPosition`]: 1-based, counting the header row,
/// so the first data row is position 2.
pub trait RecordStore {
    /// Backend failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the full current snapshot, column order preserved.
    fn load(&mut self) -> std::result::Result<Table, Self::Error>;

    /// Appends one row whose values follow the header's column order.
    fn append(&mut self, row: Vec<String>) -> std::result::Result<(), Self::Error>;

    /// Removes exactly one row.
    ///
    /// Positions outside the data rows are an error, not a no-op.
    fn delete_at(&mut self, position: RowPosition) -> std::result::Result<(), Self::Error>;
}

impl<S: RecordStore + ?Sized> RecordStore for &mut S {
    type Error = S::Error;

    fn load(&mut self) -> std::result::Result<Table, Self::Error> {
        (**self).load()
    }

    fn append(&mut self, row: Vec<String>) -> std::result::Result<(), Self::Error> {
        (**self).append(row)
    }

    fn delete_at(&mut self, position: RowPosition) -> std::result::Result<(), Self::Error> {
        (**self).delete_at(position)
    }
}

/// Checks that `position` addresses a data row of a table with `rows` rows.
///
/// Returns the 0-based data index.
pub fn check_position(position: RowPosition, rows: usize) -> Result<usize> {
    match position.index() {
        Some(index) if index < rows => Ok(index),
        _ => Err(StoreError::RowOutOfRange {
            position: position.get(),
            rows,
        }),
    }
}

/// A store held entirely in memory.
///
/// # Examples
///
/// ```
/// use product_search_core::{RowPosition, Table};
/// use product_search_store::{MemoryStore, RecordStore};
///
/// let mut store = MemoryStore::new(Table::new(vec!["Produit".into()]));
/// store.append(vec!["UREA".into()]).unwrap();
/// store.append(vec!["KCl".into()]).unwrap();
/// store.delete_at(RowPosition::new(2)).unwrap();
///
/// let table = store.load().unwrap();
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.records()[0].get("Produit"), Some("KCl"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    table: Table,
}

impl MemoryStore {
    /// Wraps an existing table.
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    /// Current contents.
    pub fn table(&self) -> &Table {
        &self.table
    }
}

impl RecordStore for MemoryStore {
    type Error = StoreError;

    fn load(&mut self) -> Result<Table> {
        Ok(self.table.clone())
    }

    fn append(&mut self, row: Vec<String>) -> Result<()> {
        let columns = self.table.columns().to_vec();
        self.table.push(&Record::from_row(&columns, row));
        debug!(rows = self.table.len(), "appended row in memory");
        Ok(())
    }

    fn delete_at(&mut self, position: RowPosition) -> Result<()> {
        check_position(position, self.table.len())?;
        self.table.remove(position);
        debug!(%position, "deleted row in memory");
        Ok(())
    }
}
