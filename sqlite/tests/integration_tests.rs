//! Integration tests for the product-search-sqlite crate.

use product_search_core::{DetailedNameLayout, MatchOptions, RowPosition};
use product_search_sqlite::{Migration, SqliteRecordStore};
use product_search_store::{Catalog, CatalogError, RecordStore, SheetFile};
use rusqlite::Connection;

fn columns() -> Vec<String> {
    ["Marque", "Produit", "N-P-K | N-P2O5-K2O", "Details", "Detailed Name"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn row(brand: &str, product: &str, npk: &str, details: &str) -> Vec<String> {
    let detailed = format!("{brand} {product} {npk} {details}");
    vec![
        brand.to_string(),
        product.to_string(),
        npk.to_string(),
        details.to_string(),
        detailed,
    ]
}

/// Writes a small fertilizer sheet and returns the temp dir holding it.
fn write_sheet() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("products.json");
    SheetFile {
        columns: columns(),
        rows: vec![
            row("Acme", "UREA", "46-0-0", "granular"),
            row("Yara", "KCl", "0-0-60", "red"),
            row("Acme", "DAP", "18-46-0", "bulk"),
        ],
    }
    .write(&path)
    .unwrap();
    (dir, path)
}

fn seeded_db(dir: &std::path::Path, sheet: &std::path::Path) -> std::path::PathBuf {
    let db = dir.join("products.db");
    let mut migration = Migration::new(Connection::open(&db).unwrap(), "ps_").unwrap();
    migration.up().unwrap();
    migration.seed(sheet).unwrap();
    db
}

// =============================================================================
// Migration Lifecycle Tests
// =============================================================================

#[test]
fn test_migration_lifecycle() {
    let (dir, sheet) = write_sheet();
    let conn = Connection::open_in_memory().unwrap();
    let mut migration = Migration::new(conn, "ps_").unwrap();

    assert!(!migration.status().unwrap().tables_exist);
    migration.up().unwrap();
    let report = migration.seed(&sheet).unwrap();
    assert_eq!(report.columns_inserted, 5);
    assert_eq!(report.rows_inserted, 3);

    let status = migration.status().unwrap();
    assert!(status.tables_exist);
    assert_eq!(status.column_count, 5);
    assert_eq!(status.row_count, 3);

    migration.down().unwrap();
    assert!(!migration.status().unwrap().tables_exist);
    drop(dir);
}

#[test]
fn test_prefixes_are_isolated() {
    let (_dir, sheet) = write_sheet();
    let conn = Connection::open_in_memory().unwrap();
    let mut a = Migration::new(conn, "a_").unwrap();
    a.up().unwrap();
    a.seed(&sheet).unwrap();

    let mut b = Migration::new(a.into_connection(), "b_").unwrap();
    b.up().unwrap();
    assert_eq!(b.status().unwrap().row_count, 0);

    let mut store = SqliteRecordStore::new(b.into_connection(), "a_").unwrap();
    assert_eq!(store.load().unwrap().len(), 3);
}

// =============================================================================
// Record Store Tests
// =============================================================================

#[test]
fn test_store_matches_sheet_contents() {
    let (dir, sheet) = write_sheet();
    let db = seeded_db(dir.path(), &sheet);

    let mut store = SqliteRecordStore::open(&db, "ps_", None).unwrap();
    let table = store.load().unwrap();
    let expected = SheetFile::read(&sheet).unwrap().into_table();
    assert_eq!(table, expected);
}

#[test]
fn test_writes_visible_to_other_connections() {
    let (dir, sheet) = write_sheet();
    let db = seeded_db(dir.path(), &sheet);

    let mut writer = SqliteRecordStore::open(&db, "ps_", None).unwrap();
    let mut reader = SqliteRecordStore::open(&db, "ps_", None).unwrap();

    writer.append(row("Acme", "MAP", "11-52-0", "")).unwrap();
    assert_eq!(reader.load().unwrap().len(), 4);

    writer.delete_at(RowPosition::new(2)).unwrap();
    let table = reader.load().unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.records()[0].get("Produit"), Some("KCl"));
}

// =============================================================================
// Catalog Workflow Tests
// =============================================================================

#[test]
fn test_catalog_search_edit_delete() {
    let (dir, sheet) = write_sheet();
    let db = seeded_db(dir.path(), &sheet);
    let store = SqliteRecordStore::open(&db, "ps_", None).unwrap();
    let mut catalog = Catalog::new(store, DetailedNameLayout::default());

    let outcome = catalog.search("Acme UREA", &MatchOptions::default()).unwrap();
    assert_eq!(outcome.hits[0].position, RowPosition::new(2));

    let target = outcome.hits[0].to_target();
    let (_context, mut form) = catalog.begin_edit(target.position).unwrap();
    form.set("Details", "prilled").unwrap();
    let saved = catalog.edit(&target, form).unwrap();
    assert_eq!(saved.get("Detailed Name"), Some("Acme UREA 46-0-0 prilled"));

    let table = catalog.snapshot().unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(
        table.records().last().and_then(|r| r.get("Details")),
        Some("prilled")
    );

    // The edited row moved to the end, so the captured target is stale.
    assert!(matches!(
        catalog.delete(&target),
        Err(CatalogError::Stale { .. })
    ));
}
