//! Entry forms and the explicit edit context.
//!
//! The add and edit forms expose exactly the table's non-derived columns.
//! Submitting a form produces a [`Record`] in table column order with the
//! Detailed Name regenerated. Which row is being edited travels as an
//! [`EditContext`] value passed between steps rather than as shared state.
//!
//! No field is required and no value is type-checked; any string is
//! accepted.

use thiserror::Error;

use crate::detailed::DetailedNameLayout;
use crate::types::{Record, RowPosition};

/// Form input errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// The field is not one of the form's columns.
    #[error("unknown field: {0}")]
    UnknownField(String),
    /// The field is computed and cannot be set directly.
    #[error("field '{0}' is derived and cannot be edited")]
    DerivedField(String),
}

/// A row selected for editing, as it looked when the snapshot was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    /// Sheet position captured at load time.
    pub position: RowPosition,
    /// The record's values at load time.
    pub record: Record,
}

impl EditTarget {
    /// Captures a row for a later delete or edit.
    pub fn new(position: RowPosition, record: Record) -> Self {
        Self { position, record }
    }
}

/// Which row, if any, is mid-edit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditContext {
    /// No edit in progress.
    #[default]
    Absent,
    /// The given row is being edited.
    Editing(EditTarget),
}

impl EditContext {
    /// Returns the target row, if editing.
    pub fn target(&self) -> Option<&EditTarget> {
        match self {
            EditContext::Absent => None,
            EditContext::Editing(target) => Some(target),
        }
    }

    /// Returns `true` if an edit is in progress.
    pub fn is_editing(&self) -> bool {
        matches!(self, EditContext::Editing(_))
    }
}

/// Values collected for the editable columns of one record.
///
/// # Examples
///
/// ```
/// use product_search_core::{DetailedNameLayout, EntryForm};
///
/// let columns: Vec<String> = ["Marque", "Produit", "N-P-K | N-P2O5-K2O", "Details", "Detailed Name"]
///     .iter()
///     .map(|s| s.to_string())
///     .collect();
/// let layout = DetailedNameLayout::default();
///
/// let mut form = EntryForm::blank(&columns, &layout);
/// assert_eq!(form.fields().count(), 4);
/// form.set("Produit", "KCl").unwrap();
/// assert!(form.set("Detailed Name", "x").is_err());
///
/// let record = form.into_record(&columns, &layout);
/// assert_eq!(record.get("Detailed Name"), Some(" KCl  "));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryForm {
    values: Record,
    derived: String,
}

impl EntryForm {
    /// An empty form over the editable columns.
    pub fn blank(columns: &[String], layout: &DetailedNameLayout) -> Self {
        let values = columns
            .iter()
            .filter(|col| !layout.is_derived(col))
            .fold(Record::new(), |mut record, col| {
                record.set(col.clone(), "");
                record
            });
        Self {
            values,
            derived: layout.target.clone(),
        }
    }

    /// A form prefilled with the target row's current values.
    pub fn prefilled(target: &EditTarget, columns: &[String], layout: &DetailedNameLayout) -> Self {
        let mut form = Self::blank(columns, layout);
        for (name, value) in target.record.iter() {
            if let Some(slot) = form.slot(name) {
                *slot = value.to_string();
            }
        }
        form
    }

    /// Sets one editable field.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::DerivedField`] for the derived column and
    /// [`FormError::UnknownField`] for anything that is not a table column.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> Result<(), FormError> {
        if field == self.derived {
            return Err(FormError::DerivedField(field.to_string()));
        }
        match self.slot(field) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(FormError::UnknownField(field.to_string())),
        }
    }

    /// Returns the current value of a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field)
    }

    /// Iterates `(field, value)` pairs in column order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter()
    }

    /// Builds the record to persist.
    ///
    /// Every table column is filled in header order and the derived column
    /// is regenerated from the submitted values.
    pub fn into_record(self, columns: &[String], layout: &DetailedNameLayout) -> Record {
        let row = self.values.values_for(columns);
        let mut record = Record::from_row(columns, row);
        layout.apply(&mut record);
        record
    }

    fn slot(&mut self, field: &str) -> Option<&mut String> {
        self.values.get_mut(field)
    }
}
