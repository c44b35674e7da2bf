//! Record store boundary, sheet-file backend and catalog workflow.
//!
//! This crate connects the pure matcher and forms from
//! `product_search_core` to wherever the product sheet actually lives.
//!
//! # Quick start
//!
//! ```no_run
//! use product_search_store::{Catalog, SheetFileStore, StoreConfig};
//!
//! let config = StoreConfig::load("product-search.yml").unwrap();
//! let session = config.session().unwrap();
//! let store = SheetFileStore::open(config.backend.path(), session).unwrap();
//!
//! let mut catalog = Catalog::new(store, config.layout.clone());
//! let outcome = catalog.search("UREA 46", &config.search).unwrap();
//! for hit in &outcome.hits {
//!     println!("row {} ({}%)", hit.position, hit.score);
//! }
//! ```
//!
//! # Backends
//!
//! - [`SheetFileStore`] — a JSON sheet file, re-read on every call.
//! - [`MemoryStore`] — an in-process table for tests and scratch work.
//! - The `product-search-sqlite` crate provides a SQLite backend.
//!
//! All backends implement [`RecordStore`]; the [`Catalog`] is generic over
//! it and returns backend errors unchanged inside [`CatalogError::Store`].

mod catalog;
mod config;
mod error;
mod sheet;
mod store;

pub use catalog::{Catalog, CatalogError, SearchHit, SearchOutcome};
pub use config::{BackendConfig, Credentials, DEFAULT_SQLITE_PREFIX, Session, StoreConfig};
pub use error::{Result, StoreError};
pub use sheet::{SheetFile, SheetFileStore};
pub use store::{MemoryStore, RecordStore, check_position};
