//! Core types and pure logic for the product composition search tool.
//!
//! This crate holds everything that does not touch a backend:
//!
//! - [`Record`], [`Table`] and [`RowPosition`] — the sheet-shaped data
//!   model, with rows addressed by their 1-based sheet position.
//! - [`partial_ratio`] and [`ratio`] — edit-distance similarity on a 0–100
//!   scale.
//! - [`search`] — the approximate matcher that ranks rows by similarity of
//!   one designated field to a free-text query.
//! - [`DetailedNameLayout`] — the rule that rebuilds the derived
//!   "Detailed Name" column from brand, product, formulation and details.
//! - [`EntryForm`] and [`EditContext`] — the add/edit forms and the explicit
//!   record of which row is being edited.
//!
//! # Example
//!
//! ```
//! use product_search_core::*;
//!
//! let columns: Vec<String> = ["Marque", "Produit", "N-P-K | N-P2O5-K2O", "Details", "Detailed Name"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! let layout = DetailedNameLayout::default();
//!
//! // Fill a new-product form and derive its Detailed Name
//! let mut form = EntryForm::blank(&columns, &layout);
//! form.set("Marque", "Acme").unwrap();
//! form.set("Produit", "UREA").unwrap();
//! form.set("N-P-K | N-P2O5-K2O", "46-0-0").unwrap();
//! form.set("Details", "granular").unwrap();
//!
//! let mut table = Table::new(columns.clone());
//! table.push(&form.into_record(&columns, &layout));
//!
//! let matches = search("UREA 46", &table, &MatchOptions::default());
//! assert_eq!(matches[0].score, 100);
//! assert_eq!(matches[0].record.get("Detailed Name"), Some("Acme UREA 46-0-0 granular"));
//! ```

mod detailed;
mod form;
mod matcher;
mod similarity;
mod types;

pub use detailed::{DetailedNameLayout, SEPARATOR};
pub use form::{EditContext, EditTarget, EntryForm, FormError};
pub use matcher::{DEFAULT_SEARCH_FIELD, DEFAULT_THRESHOLD, Match, MatchOptions, search};
pub use similarity::{CaseMode, partial_ratio, partial_ratio_with, ratio, ratio_with};
pub use types::{HEADER_ROWS, Record, RowPosition, Table};
