//! SQL schema generation with customizable table prefixes.
//!
//! Generates the `CREATE TABLE` statements that hold one product sheet in
//! SQLite. All table names are prefixed with a configurable string so
//! several sheets can live in the same database.
//!
//! # Table structure
//!
//! - `{prefix}columns` — the header, one row per column with its ordinal
//! - `{prefix}rows` — data rows; `cells` is a JSON array in header order,
//!   and `id` order is sheet order
//!
//! # Custom prefix
//!
//! Prefixes must contain only alphanumeric characters and underscores.

use crate::error::{Result, SqliteError};

/// Validates that a table prefix contains only alphanumeric characters and underscores.
pub(crate) fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Err(SqliteError::InvalidPrefix(prefix.to_string()));
    }
    if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SqliteError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}

/// Generates the SQL schema for a sheet with the given prefix.
///
/// # Errors
///
/// Returns [`SqliteError::InvalidPrefix`] if the prefix contains characters
/// other than alphanumerics and underscores, or if it is empty.
pub fn generate_schema_sql(prefix: &str) -> Result<String> {
    validate_prefix(prefix)?;

    let sql = format!(
        r#"
CREATE TABLE IF NOT EXISTS {prefix}columns (
    ordinal INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS {prefix}rows (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cells TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
        prefix = prefix
    );

    Ok(sql)
}

/// Generates SQL to drop the sheet tables.
///
/// # Errors
///
/// Returns [`SqliteError::InvalidPrefix`] if the prefix is invalid.
pub fn generate_drop_sql(prefix: &str) -> Result<String> {
    validate_prefix(prefix)?;

    let sql = format!(
        r#"
DROP TABLE IF EXISTS {prefix}rows;
DROP TABLE IF EXISTS {prefix}columns;
"#,
        prefix = prefix
    );

    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_prefix() {
        assert!(validate_prefix("ps_").is_ok());
        assert!(validate_prefix("sheet1").is_ok());
        assert!(validate_prefix("A_B_C").is_ok());
    }

    #[test]
    fn test_invalid_prefix_empty() {
        assert!(validate_prefix("").is_err());
    }

    #[test]
    fn test_invalid_prefix_special_chars() {
        assert!(validate_prefix("drop;--").is_err());
        assert!(validate_prefix("hello world").is_err());
        assert!(validate_prefix("test-prefix").is_err());
        assert!(validate_prefix("fertilisé_").is_err());
    }

    #[test]
    fn test_generate_schema_sql_contains_tables() {
        let sql = generate_schema_sql("ps_").unwrap();
        assert!(sql.contains("ps_columns"));
        assert!(sql.contains("ps_rows"));
    }

    #[test]
    fn test_generate_drop_sql_contains_all_tables() {
        let sql = generate_drop_sql("ps_").unwrap();
        assert!(sql.contains("DROP TABLE IF EXISTS ps_rows"));
        assert!(sql.contains("DROP TABLE IF EXISTS ps_columns"));
    }

    #[test]
    fn test_generate_drop_sql_invalid_prefix() {
        assert!(generate_drop_sql("").is_err());
    }

    #[test]
    fn test_schema_executes_and_orders_by_id() {
        let sql = generate_schema_sql("t_").unwrap();
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(&sql).unwrap();
        conn.execute("INSERT INTO t_rows (cells) VALUES ('[\"a\"]')", [])
            .unwrap();
        conn.execute("INSERT INTO t_rows (cells) VALUES ('[\"b\"]')", [])
            .unwrap();
        let first: String = conn
            .query_row("SELECT cells FROM t_rows ORDER BY id LIMIT 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(first, "[\"a\"]");

        // Header names are unique.
        conn.execute("INSERT INTO t_columns (ordinal, name) VALUES (0, 'x')", [])
            .unwrap();
        assert!(conn
            .execute("INSERT INTO t_columns (ordinal, name) VALUES (1, 'x')", [])
            .is_err());
    }
}
