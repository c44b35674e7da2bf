//! Migration lifecycle operations for the SQLite sheet tables.
//!
//! Provides [`Migration`] for creating, dropping, seeding, and refreshing
//! the sheet tables. All mutation operations run inside a transaction.
//!
//! # Example
//!
//! ```no_run
//! use product_search_sqlite::Migration;
//! use rusqlite::Connection;
//!
//! let conn = Connection::open("products.db").unwrap();
//! let mut migration = Migration::new(conn, "ps_").unwrap();
//!
//! migration.up().unwrap();
//! let report = migration.seed("products.json").unwrap();
//! println!("{} rows imported", report.rows_inserted);
//!
//! let status = migration.status().unwrap();
//! assert!(status.tables_exist);
//! ```

use std::path::Path;

use product_search_store::SheetFile;
use rusqlite::Connection;
use tracing::info;

use crate::convert;
use crate::error::{Result, SqliteError};
use crate::schema::{generate_drop_sql, generate_schema_sql, validate_prefix};

/// Manages the lifecycle of the sheet tables for one prefix.
pub struct Migration {
    conn: Connection,
    prefix: String,
}

impl Migration {
    /// Creates a migration manager for the given connection and table prefix.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::InvalidPrefix`] if the prefix contains invalid characters.
    pub fn new(conn: Connection, prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        Ok(Self { conn, prefix })
    }

    /// Creates the sheet tables.
    ///
    /// Uses `CREATE TABLE IF NOT EXISTS`, so calling it twice is harmless.
    pub fn up(&mut self) -> Result<()> {
        let sql = generate_schema_sql(&self.prefix)?;
        let tx = self.conn.transaction()?;
        tx.execute_batch(&sql)
            .map_err(|e| SqliteError::MigrationError(format!("failed to create tables: {e}")))?;
        tx.commit()?;
        info!(prefix = %self.prefix, "created sheet tables");
        Ok(())
    }

    /// Drops the sheet tables and everything in them.
    pub fn down(&mut self) -> Result<()> {
        let sql = generate_drop_sql(&self.prefix)?;
        let tx = self.conn.transaction()?;
        tx.execute_batch(&sql)
            .map_err(|e| SqliteError::MigrationError(format!("failed to drop tables: {e}")))?;
        tx.commit()?;
        info!(prefix = %self.prefix, "dropped sheet tables");
        Ok(())
    }

    /// Reports whether the tables exist and how much they hold.
    pub fn status(&self) -> Result<MigrationStatus> {
        if !convert::tables_exist(&self.conn, &self.prefix)? {
            return Ok(MigrationStatus::default());
        }
        Ok(MigrationStatus {
            tables_exist: true,
            column_count: convert::load_columns(&self.conn, &self.prefix)?.len(),
            row_count: convert::count_rows(&self.conn, &self.prefix)?,
        })
    }

    /// Imports a JSON sheet file.
    ///
    /// An empty database takes the sheet's header. If a header is already
    /// stored it must match the sheet's exactly; rows are appended after the
    /// existing ones. Everything happens in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::NotInitialized`] if [`up`](Self::up) has not
    /// run, [`SqliteError::MigrationError`] on a header mismatch, or a store
    /// error if the sheet file cannot be read.
    pub fn seed(&mut self, source: impl AsRef<Path>) -> Result<SeedReport> {
        let sheet = SheetFile::read(source.as_ref())?;
        if !convert::tables_exist(&self.conn, &self.prefix)? {
            return Err(SqliteError::NotInitialized(self.prefix.clone()));
        }

        let tx = self.conn.transaction()?;
        let mut report = SeedReport::default();

        let existing = convert::load_columns(&tx, &self.prefix)?;
        if existing.is_empty() {
            report.columns_inserted = convert::insert_columns(&tx, &self.prefix, &sheet.columns)?;
        } else if existing != sheet.columns {
            return Err(SqliteError::MigrationError(format!(
                "sheet header {:?} does not match stored header {:?}",
                sheet.columns, existing
            )));
        }

        let width = sheet.columns.len();
        for mut row in sheet.rows {
            row.resize(width, String::new());
            convert::insert_row(&tx, &self.prefix, &row)?;
            report.rows_inserted += 1;
        }

        tx.commit()?;
        info!(
            prefix = %self.prefix,
            columns = report.columns_inserted,
            rows = report.rows_inserted,
            "seeded sheet tables"
        );
        Ok(report)
    }

    /// Drops the tables, recreates them, and seeds from `source`.
    pub fn refresh(&mut self, source: impl AsRef<Path>) -> Result<SeedReport> {
        self.down()?;
        self.up()?;
        self.seed(source)
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the migration and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

/// Snapshot returned by [`Migration::status`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Whether the sheet tables exist.
    pub tables_exist: bool,
    /// Number of header columns stored.
    pub column_count: usize,
    /// Number of data rows stored.
    pub row_count: usize,
}

/// Counts from a seed operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Header columns written; zero when a matching header already existed.
    pub columns_inserted: usize,
    /// Data rows appended.
    pub rows_inserted: usize,
}
