//! [`RecordStore`] implementation over the SQLite sheet tables.

use std::path::Path;

use product_search_core::{RowPosition, Table};
use product_search_store::{RecordStore, Session, check_position};
use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::convert;
use crate::error::{Result, SqliteError};
use crate::schema::validate_prefix;

/// A product sheet stored in SQLite.
///
/// Sheet order is insertion order. Every call queries the database, so
/// writes by other connections are visible on the next [`load`](RecordStore::load).
///
/// # Examples
///
/// ```no_run
/// use product_search_sqlite::SqliteRecordStore;
/// use product_search_store::RecordStore;
///
/// let mut store = SqliteRecordStore::open("products.db", "ps_", None).unwrap();
/// let table = store.load().unwrap();
/// println!("{} products", table.len());
/// ```
pub struct SqliteRecordStore {
    conn: Connection,
    prefix: String,
    session: Option<Session>,
}

impl SqliteRecordStore {
    /// Wraps a connection whose sheet tables already exist.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::InvalidPrefix`] for a bad prefix and
    /// [`SqliteError::NotInitialized`] if the tables are missing.
    pub fn new(conn: Connection, prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        if !convert::tables_exist(&conn, &prefix)? {
            return Err(SqliteError::NotInitialized(prefix));
        }
        Ok(Self {
            conn,
            prefix,
            session: None,
        })
    }

    /// Opens a database file.
    pub fn open(
        path: impl AsRef<Path>,
        prefix: impl Into<String>,
        session: Option<Session>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let mut store = Self::new(conn, prefix)?;
        info!(
            path = %path.display(),
            prefix = %store.prefix,
            identity = session.as_ref().map(|s| s.identity.as_str()),
            "opened sqlite sheet"
        );
        store.session = session;
        Ok(store)
    }

    /// Session this store was opened with.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl RecordStore for SqliteRecordStore {
    type Error = SqliteError;

    fn load(&mut self) -> Result<Table> {
        let columns = convert::load_columns(&self.conn, &self.prefix)?;
        let rows = convert::load_rows(&self.conn, &self.prefix)?;
        debug!(rows = rows.len(), "loaded sqlite snapshot");
        Ok(Table::from_rows(columns, rows))
    }

    fn append(&mut self, row: Vec<String>) -> Result<()> {
        let width = convert::load_columns(&self.conn, &self.prefix)?.len();
        let mut row = row;
        row.resize(width, String::new());
        let id = convert::insert_row(&self.conn, &self.prefix, &row)?;
        debug!(id, "appended row");
        Ok(())
    }

    fn delete_at(&mut self, position: RowPosition) -> Result<()> {
        let tx = self.conn.transaction()?;
        let rows = convert::count_rows(&tx, &self.prefix)?;
        let index = check_position(position, rows)?;
        let id = convert::row_id_at(&tx, &self.prefix, index)?.ok_or(
            product_search_store::StoreError::RowOutOfRange {
                position: position.get(),
                rows,
            },
        )?;
        tx.execute(
            &format!("DELETE FROM {}rows WHERE id = ?1", self.prefix),
            params![id],
        )?;
        tx.commit()?;
        debug!(%position, id, "deleted row");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::generate_schema_sql;

    fn store() -> SqliteRecordStore {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(&generate_schema_sql("ps_").unwrap()).unwrap();
        convert::insert_columns(&conn, "ps_", &["Produit".into(), "Details".into()]).unwrap();
        SqliteRecordStore::new(conn, "ps_").unwrap()
    }

    #[test]
    fn test_new_requires_tables() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(matches!(
            SqliteRecordStore::new(conn, "ps_"),
            Err(SqliteError::NotInitialized(_))
        ));
    }

    #[test]
    fn test_append_load_delete() {
        let mut s = store();
        s.append(vec!["UREA".into(), "granular".into()]).unwrap();
        s.append(vec!["KCl".into()]).unwrap();
        s.append(vec!["DAP".into(), "18-46-0".into()]).unwrap();

        let table = s.load().unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.records()[1].get("Details"), Some(""));

        s.delete_at(RowPosition::new(3)).unwrap();
        let table = s.load().unwrap();
        let names: Vec<_> = table.records().iter().map(|r| r.get("Produit")).collect();
        assert_eq!(names, vec![Some("UREA"), Some("DAP")]);
    }

    #[test]
    fn test_delete_out_of_range() {
        let mut s = store();
        s.append(vec!["UREA".into()]).unwrap();
        assert!(matches!(
            s.delete_at(RowPosition::new(3)),
            Err(SqliteError::StoreError(_))
        ));
        assert!(matches!(
            s.delete_at(RowPosition::new(1)),
            Err(SqliteError::StoreError(_))
        ));
        assert_eq!(s.load().unwrap().len(), 1);
    }
}
