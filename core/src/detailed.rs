//! The derived "Detailed Name" column.
//!
//! The Detailed Name is never typed by hand. It is rebuilt from four source
//! columns (brand, product, formulation code, details) joined by a single
//! space every time a record is created or edited. Separators inside source
//! values are not escaped, so the derived value cannot always be split back
//! into its parts.

use serde::{Deserialize, Serialize};

use crate::types::Record;

/// Separator placed between source fields.
pub const SEPARATOR: &str = " ";

/// Column names feeding the derived Detailed Name.
///
/// The defaults match the header of the shared product sheet.
///
/// # Examples
///
/// ```
/// use product_search_core::{DetailedNameLayout, Record};
///
/// let layout = DetailedNameLayout::default();
/// let mut record = Record::new();
/// record.set("Marque", "Acme");
/// record.set("Produit", "UREA");
/// record.set("N-P-K | N-P2O5-K2O", "46-0-0");
/// record.set("Details", "granular");
///
/// assert_eq!(layout.generate(&record), "Acme UREA 46-0-0 granular");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailedNameLayout {
    /// Brand column.
    pub brand: String,
    /// Product column.
    pub product: String,
    /// Formulation code column (nutrient ratio).
    pub formulation: String,
    /// Free-text details column.
    pub details: String,
    /// The derived column itself.
    pub target: String,
}

impl Default for DetailedNameLayout {
    fn default() -> Self {
        Self {
            brand: "Marque".to_string(),
            product: "Produit".to_string(),
            formulation: "N-P-K | N-P2O5-K2O".to_string(),
            details: "Details".to_string(),
            target: "Detailed Name".to_string(),
        }
    }
}

impl DetailedNameLayout {
    /// Source columns in concatenation order.
    pub fn sources(&self) -> [&str; 4] {
        [
            self.brand.as_str(),
            self.product.as_str(),
            self.formulation.as_str(),
            self.details.as_str(),
        ]
    }

    /// Returns `true` if `column` is the derived column.
    pub fn is_derived(&self, column: &str) -> bool {
        column == self.target
    }

    /// Builds the Detailed Name from the record's source fields.
    ///
    /// Missing source fields contribute an empty string, so the separator
    /// count is always fixed.
    pub fn generate(&self, record: &Record) -> String {
        self.sources()
            .iter()
            .map(|col| record.get(col).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }

    /// Recomputes the derived column in place.
    pub fn apply(&self, record: &mut Record) {
        let name = self.generate(record);
        record.set(self.target.clone(), name);
    }

    /// Checks that the stored derived value matches its sources.
    pub fn is_consistent(&self, record: &Record) -> bool {
        record.get(&self.target) == Some(self.generate(record).as_str())
    }
}
