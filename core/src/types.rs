//! Record and table types for sheet-shaped product data.
//!
//! This module defines the data model shared by the matcher, the entry
//! forms and every store backend. A [`Table`] is an ordered list of
//! [`Record`]s that share one column set; row order is significant because
//! stores address rows by their 1-based sheet position ([`RowPosition`]).

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Number of header rows above the first data row in a sheet.
///
/// Sheet positions are 1-based, so the first data row sits at
/// `HEADER_ROWS + 1`.
pub const HEADER_ROWS: usize = 1;

/// 1-based sheet row of a data record, counting the header row.
///
/// Positions are captured when a snapshot is loaded and handed back to the
/// store for deletes and edits. The first data row is position 2.
///
/// # Examples
///
/// ```
/// use product_search_core::RowPosition;
///
/// let pos = RowPosition::from_index(0);
/// assert_eq!(pos.get(), 2);
/// assert_eq!(pos.index(), Some(0));
///
/// // The header row has no data index.
/// assert_eq!(RowPosition::new(1).index(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowPosition(usize);

impl RowPosition {
    /// Wraps a raw sheet position.
    pub fn new(position: usize) -> Self {
        Self(position)
    }

    /// Converts a 0-based data index into a sheet position.
    pub fn from_index(index: usize) -> Self {
        Self(index + HEADER_ROWS + 1)
    }

    /// Returns the raw 1-based sheet position.
    pub fn get(self) -> usize {
        self.0
    }

    /// Returns the 0-based data index, or `None` for header or zero positions.
    pub fn index(self) -> Option<usize> {
        self.0.checked_sub(HEADER_ROWS + 1)
    }
}

impl std::fmt::Display for RowPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for RowPosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0 as u64)
    }
}

/// An ordered mapping from column name to string value.
///
/// Column order is preserved on insertion and in serialization. Every value
/// is a string; no field is typed or validated.
///
/// # Examples
///
/// ```
/// use product_search_core::Record;
///
/// let mut record = Record::new();
/// record.set("Marque", "Acme");
/// record.set("Produit", "UREA");
/// record.set("Marque", "Yara");
///
/// assert_eq!(record.get("Marque"), Some("Yara"));
/// assert_eq!(record.columns().collect::<Vec<_>>(), vec!["Marque", "Produit"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    entries: Vec<(String, String)>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record by pairing columns with values in order.
    ///
    /// Missing trailing values become empty strings; values past the last
    /// column are dropped.
    pub fn from_row<C, V>(columns: &[C], values: impl IntoIterator<Item = V>) -> Self
    where
        C: AsRef<str>,
        V: Into<String>,
    {
        let mut values = values.into_iter();
        let entries = columns
            .iter()
            .map(|col| {
                let value = values.next().map(Into::into).unwrap_or_default();
                (col.as_ref().to_string(), value)
            })
            .collect();
        Self { entries }
    }

    /// Returns the value stored under `column`.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Returns a mutable reference to the value under `column`.
    pub fn get_mut(&mut self, column: &str) -> Option<&mut String> {
        self.entries
            .iter_mut()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Sets `column` to `value`, replacing in place or appending a new column.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    /// Iterates column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates values in column order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, value)| value.as_str())
    }

    /// Iterates `(column, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Renders the record as a row in the given column order.
    ///
    /// Columns the record does not carry render as `""`.
    pub fn values_for<C: AsRef<str>>(&self, columns: &[C]) -> Vec<String> {
        columns
            .iter()
            .map(|col| self.get(col.as_ref()).unwrap_or_default().to_string())
            .collect()
    }

    /// Number of columns in the record.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A full snapshot of the sheet: one header and the data rows below it.
///
/// # Examples
///
/// ```
/// use product_search_core::{RowPosition, Table};
///
/// let table = Table::from_rows(
///     vec!["Produit".to_string(), "Details".to_string()],
///     vec![vec!["UREA".to_string(), "granular".to_string()]],
/// );
/// assert_eq!(table.len(), 1);
/// let record = table.get(RowPosition::new(2)).unwrap();
/// assert_eq!(record.get("Details"), Some("granular"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    /// Creates an empty table with the given header.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    /// Builds a table from raw sheet rows.
    ///
    /// Ragged rows are normalized to the header width: short rows are
    /// padded with `""` and extra cells are dropped.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let records = rows
            .into_iter()
            .map(|row| Record::from_row(&columns, row))
            .collect();
        Self { columns, records }
    }

    /// Appends a record, re-ordering its values to match the header.
    pub fn push(&mut self, record: &Record) {
        let row = record.values_for(&self.columns);
        self.records.push(Record::from_row(&self.columns, row));
    }

    /// Removes and returns the record at `position`.
    pub fn remove(&mut self, position: RowPosition) -> Option<Record> {
        let index = position.index()?;
        if index < self.records.len() {
            Some(self.records.remove(index))
        } else {
            None
        }
    }

    /// Header column names in sheet order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data records in sheet order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Looks up the record at a sheet position.
    pub fn get(&self, position: RowPosition) -> Option<&Record> {
        self.records.get(position.index()?)
    }

    /// Iterates records together with their sheet positions.
    pub fn positioned(&self) -> impl Iterator<Item = (RowPosition, &Record)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| (RowPosition::from_index(i), record))
    }

    /// Returns every position holding a record equal to `record`.
    ///
    /// More than one position means the sheet contains duplicate rows and
    /// content alone cannot tell them apart.
    pub fn positions_of(&self, record: &Record) -> Vec<RowPosition> {
        self.positioned()
            .filter(|(_, candidate)| *candidate == record)
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Returns `true` if the table has the given column.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
