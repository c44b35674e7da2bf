//! Search, add, edit and delete over a [`RecordStore`].
//!
//! [`Catalog`] runs one user action at a time to completion. Searches load a
//! fresh snapshot and rank it with the core matcher. Adds and edits build
//! the record from an [`EntryForm`], which regenerates the Detailed Name
//! before anything is written.
//!
//! Deletes and edits address the [`RowPosition`] captured when the row was
//! shown to the user. Before writing, the catalog reloads and checks that
//! the row at that position still holds the captured values; if not, the
//! action is refused with [`CatalogError::Stale`]. This narrows, but does
//! not close, the window in which another writer can shift rows.
//!
//! An edit is an append followed by a delete of the original row. It is not
//! atomic: if the delete fails the sheet keeps both rows and the caller gets
//! [`CatalogError::PartialEdit`].
//!
//! # Example
//!
//! ```
//! use product_search_core::{DetailedNameLayout, MatchOptions, Table};
//! use product_search_store::{Catalog, MemoryStore};
//!
//! let columns: Vec<String> = ["Marque", "Produit", "N-P-K | N-P2O5-K2O", "Details", "Detailed Name"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! let store = MemoryStore::new(Table::new(columns));
//! let mut catalog = Catalog::new(store, DetailedNameLayout::default());
//!
//! let mut form = catalog.blank_form().unwrap();
//! form.set("Marque", "Acme").unwrap();
//! form.set("Produit", "UREA").unwrap();
//! catalog.add(form).unwrap();
//!
//! let outcome = catalog.search("UREA", &MatchOptions::default()).unwrap();
//! assert_eq!(outcome.hits.len(), 1);
//! ```

use product_search_core::{
    DetailedNameLayout, EditContext, EditTarget, EntryForm, FormError, MatchOptions, Record,
    RowPosition, Table, search,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::store::RecordStore;

/// Errors raised by catalog actions.
///
/// Backend failures are carried unchanged in [`CatalogError::Store`].
#[derive(Debug, Error)]
pub enum CatalogError<E: std::error::Error + 'static> {
    /// The record store failed.
    #[error(transparent)]
    Store(E),

    /// Form input was rejected.
    #[error("invalid form input: {0}")]
    Form(#[from] FormError),

    /// The search field is not a column of the sheet.
    #[error("unknown search field '{0}'")]
    UnknownField(String),

    /// The sheet header lacks the Detailed Name column, so a written row
    /// would lose its derived name.
    #[error("sheet has no '{0}' column")]
    MissingTarget(String),

    /// No data row exists at the requested position.
    #[error("no row at position {0}")]
    RowNotFound(RowPosition),

    /// The row at the captured position no longer holds the captured values.
    #[error("row {position} changed since it was loaded; search again before retrying")]
    Stale {
        /// Captured position.
        position: RowPosition,
    },

    /// The edited row was appended but the original could not be deleted.
    #[error("edited row was appended but row {position} could not be deleted: {source}")]
    PartialEdit {
        /// Position of the original row, still present.
        position: RowPosition,
        /// Failure from the delete step.
        #[source]
        source: E,
    },
}

/// One search result with an owned copy of the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// Sheet position captured at load time.
    pub position: RowPosition,
    /// Similarity score, 0–100.
    pub score: u8,
    /// The row's values.
    pub record: Record,
}

impl SearchHit {
    /// Captures this hit for a later delete or edit.
    pub fn to_target(&self) -> EditTarget {
        EditTarget::new(self.position, self.record.clone())
    }
}

/// Result of a search action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    /// Query as entered.
    pub query: String,
    /// Threshold used.
    pub threshold: u8,
    /// Matches, best first.
    pub hits: Vec<SearchHit>,
}

impl SearchOutcome {
    /// Returns `true` when nothing reached the threshold.
    ///
    /// An empty outcome is a normal result, not an error.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// The action layer between a front end and a [`RecordStore`].
#[derive(Debug)]
pub struct Catalog<S> {
    store: S,
    layout: DetailedNameLayout,
}

type CatalogResult<T, S> = std::result::Result<T, CatalogError<<S as RecordStore>::Error>>;

impl<S: RecordStore> Catalog<S> {
    /// Wraps a store with the given derived-name layout.
    pub fn new(store: S, layout: DetailedNameLayout) -> Self {
        Self { store, layout }
    }

    /// The derived-name layout in use.
    pub fn layout(&self) -> &DetailedNameLayout {
        &self.layout
    }

    /// Loads the current snapshot.
    pub fn snapshot(&mut self) -> CatalogResult<Table, S> {
        self.store.load().map_err(CatalogError::Store)
    }

    /// Ranks the current snapshot against `query`.
    pub fn search(&mut self, query: &str, options: &MatchOptions) -> CatalogResult<SearchOutcome, S> {
        let table = self.snapshot()?;
        if !table.has_column(&options.field) {
            return Err(CatalogError::UnknownField(options.field.clone()));
        }
        let hits: Vec<SearchHit> = search(query, &table, options)
            .into_iter()
            .map(|m| SearchHit {
                position: m.position,
                score: m.score,
                record: m.record.clone(),
            })
            .collect();

        if hits.is_empty() {
            info!(query, threshold = options.threshold, "no product matched");
        } else {
            debug!(query, hits = hits.len(), rows = table.len(), "search complete");
        }

        Ok(SearchOutcome {
            query: query.to_string(),
            threshold: options.threshold,
            hits,
        })
    }

    /// An empty add form over the current header.
    pub fn blank_form(&mut self) -> CatalogResult<EntryForm, S> {
        let table = self.writable_snapshot()?;
        Ok(EntryForm::blank(table.columns(), &self.layout))
    }

    /// Selects the row at `position` for editing.
    ///
    /// Returns the edit context and a form prefilled with the row's values.
    pub fn begin_edit(&mut self, position: RowPosition) -> CatalogResult<(EditContext, EntryForm), S> {
        let table = self.writable_snapshot()?;
        let record = table
            .get(position)
            .cloned()
            .ok_or(CatalogError::RowNotFound(position))?;
        let target = EditTarget::new(position, record);
        let form = EntryForm::prefilled(&target, table.columns(), &self.layout);
        Ok((EditContext::Editing(target), form))
    }

    /// Appends a new record built from `form`.
    ///
    /// Returns the record as written, Detailed Name included.
    pub fn add(&mut self, form: EntryForm) -> CatalogResult<Record, S> {
        let table = self.writable_snapshot()?;
        let record = form.into_record(table.columns(), &self.layout);
        self.store
            .append(record.values_for(table.columns()))
            .map_err(CatalogError::Store)?;
        info!(
            name = record.get(&self.layout.target).unwrap_or_default(),
            "product added"
        );
        Ok(record)
    }

    /// Deletes the captured row.
    pub fn delete(&mut self, target: &EditTarget) -> CatalogResult<(), S> {
        self.verify(target)?;
        self.store
            .delete_at(target.position)
            .map_err(CatalogError::Store)?;
        info!(position = %target.position, "product deleted");
        Ok(())
    }

    /// Replaces the captured row with a record built from `form`.
    ///
    /// The new record is appended first, then the original row is deleted.
    /// Appending at the end leaves the original's position unchanged.
    pub fn edit(&mut self, target: &EditTarget, form: EntryForm) -> CatalogResult<Record, S> {
        let table = self.verify(target)?;
        let record = form.into_record(table.columns(), &self.layout);

        self.store
            .append(record.values_for(table.columns()))
            .map_err(CatalogError::Store)?;
        self.store
            .delete_at(target.position)
            .map_err(|source| {
                warn!(position = %target.position, "edit left a duplicate row");
                CatalogError::PartialEdit {
                    position: target.position,
                    source,
                }
            })?;

        info!(
            position = %target.position,
            name = record.get(&self.layout.target).unwrap_or_default(),
            "product edited"
        );
        Ok(record)
    }

    /// Loads a snapshot whose header can hold the Detailed Name.
    fn writable_snapshot(&mut self) -> CatalogResult<Table, S> {
        let table = self.snapshot()?;
        if !table.has_column(&self.layout.target) {
            return Err(CatalogError::MissingTarget(self.layout.target.clone()));
        }
        Ok(table)
    }

    /// Reloads and checks the captured row is still in place.
    fn verify(&mut self, target: &EditTarget) -> CatalogResult<Table, S> {
        let table = self.snapshot()?;
        match table.get(target.position) {
            Some(current) if *current == target.record => {}
            Some(_) => return Err(CatalogError::Stale { position: target.position }),
            None => return Err(CatalogError::RowNotFound(target.position)),
        }
        if !table.has_column(&self.layout.target) {
            return Err(CatalogError::MissingTarget(self.layout.target.clone()));
        }
        let copies = table.positions_of(&target.record).len();
        if copies > 1 {
            warn!(
                position = %target.position,
                copies,
                "row has identical duplicates; acting on the captured position only"
            );
        }
        Ok(table)
    }
}
