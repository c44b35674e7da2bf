//! Conversion between sheet rows and SQLite rows.
//!
//! Cells of one data row are stored together as a JSON array of strings in
//! header order. The header itself lives in its own table with explicit
//! ordinals. Sheet order is `id` order, so the n-th data row is found with
//! `ORDER BY id LIMIT 1 OFFSET n`.

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{Result, SqliteError};

/// Encodes a row's cells for storage.
pub(crate) fn encode_cells(cells: &[String]) -> Result<String> {
    serde_json::to_string(cells)
        .map_err(|e| SqliteError::ConversionError(format!("failed to encode cells: {e}")))
}

/// Decodes a stored row back into its cells.
pub(crate) fn decode_cells(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw)
        .map_err(|e| SqliteError::ConversionError(format!("failed to decode cells '{raw}': {e}")))
}

/// Checks whether the sheet tables exist for `prefix`.
pub(crate) fn tables_exist(conn: &Connection, prefix: &str) -> Result<bool> {
    let table_name = format!("{prefix}rows");
    let mut stmt =
        conn.prepare("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1")?;
    let count: i64 = stmt.query_row([&table_name], |row| row.get(0))?;
    Ok(count > 0)
}

/// Loads the header in ordinal order.
pub fn load_columns(conn: &Connection, prefix: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT name FROM {prefix}columns ORDER BY ordinal"
    ))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Replaces the header.
///
/// Returns the number of columns written.
pub fn insert_columns(conn: &Connection, prefix: &str, columns: &[String]) -> Result<usize> {
    conn.execute(&format!("DELETE FROM {prefix}columns"), [])?;
    let mut stmt = conn.prepare(&format!(
        "INSERT INTO {prefix}columns (ordinal, name) VALUES (?1, ?2)"
    ))?;
    for (ordinal, name) in columns.iter().enumerate() {
        stmt.execute(params![ordinal as i64, name])?;
    }
    Ok(columns.len())
}

/// Loads all data rows in sheet order.
pub fn load_rows(conn: &Connection, prefix: &str) -> Result<Vec<Vec<String>>> {
    let mut stmt = conn.prepare(&format!("SELECT cells FROM {prefix}rows ORDER BY id"))?;
    let raw = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    raw.iter().map(|cells| decode_cells(cells)).collect()
}

/// Appends one data row and returns its id.
pub fn insert_row(conn: &Connection, prefix: &str, cells: &[String]) -> Result<i64> {
    let encoded = encode_cells(cells)?;
    conn.execute(
        &format!("INSERT INTO {prefix}rows (cells) VALUES (?1)"),
        params![encoded],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Number of data rows.
pub fn count_rows(conn: &Connection, prefix: &str) -> Result<usize> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {prefix}rows"), [], |row| {
        row.get(0)
    })?;
    Ok(count as usize)
}

/// Id of the data row at a 0-based sheet index.
pub fn row_id_at(conn: &Connection, prefix: &str, index: usize) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            &format!("SELECT id FROM {prefix}rows ORDER BY id LIMIT 1 OFFSET ?1"),
            params![index as i64],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}
