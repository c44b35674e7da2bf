//! SQLite storage backend for the product sheet.
//!
//! This crate keeps a product sheet in SQLite and exposes it through the
//! same [`RecordStore`](product_search_store::RecordStore) boundary as the
//! JSON sheet file, so the catalog workflow runs unchanged on either.
//!
//! # Architecture
//!
//! - **`schema`** — SQL generation with customizable table prefixes
//! - **`migration`** — Lifecycle operations (up/down/seed/refresh/status)
//! - **`convert`** — Row cells ↔ SQL rows, position ↔ row id
//! - **`store`** — [`SqliteRecordStore`]
//!
//! # Quick start — migrations
//!
//! ```no_run
//! use product_search_sqlite::Migration;
//! use rusqlite::Connection;
//!
//! let conn = Connection::open("products.db").unwrap();
//! let mut migration = Migration::new(conn, "ps_").unwrap();
//!
//! migration.up().unwrap();
//! migration.seed("products.json").unwrap();
//!
//! let status = migration.status().unwrap();
//! println!("Rows: {}", status.row_count);
//! ```
//!
//! # Quick start — catalog
//!
//! ```no_run
//! use product_search_core::{DetailedNameLayout, MatchOptions};
//! use product_search_sqlite::SqliteRecordStore;
//! use product_search_store::Catalog;
//!
//! let store = SqliteRecordStore::open("products.db", "ps_", None).unwrap();
//! let mut catalog = Catalog::new(store, DetailedNameLayout::default());
//! let outcome = catalog.search("UREA", &MatchOptions::default()).unwrap();
//! println!("{} hits", outcome.hits.len());
//! ```
//!
//! # Table prefix customization
//!
//! Table names are prefixed with a configurable string so several sheets
//! can share one database file. Prefixes must contain only alphanumeric
//! characters and underscores.

mod convert;
mod error;
mod migration;
mod schema;
mod store;

pub use error::{Result, SqliteError};
pub use migration::{Migration, MigrationStatus, SeedReport};
pub use schema::{generate_drop_sql, generate_schema_sql};
pub use store::SqliteRecordStore;
