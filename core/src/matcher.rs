//! Approximate search over a table snapshot.
//!
//! [`search`] scores the designated field of every row against the query
//! with [`partial_ratio_with`](crate::partial_ratio_with), keeps rows at or
//! above the threshold and orders them by descending score. Rows with equal
//! scores stay in sheet order.
//!
//! The scan is pure: it borrows the snapshot and returns matches that carry
//! the [`RowPosition`] captured at load time, so follow-up deletes and edits
//! address that position instead of searching for the row again.
//!
//! # Examples
//!
//! ```
//! use product_search_core::{MatchOptions, Table, search};
//!
//! let table = Table::from_rows(
//!     vec!["Detailed Name".to_string()],
//!     vec![vec!["Acme UREA 46-0-0 granular".to_string()]],
//! );
//! let matches = search("UREA 46", &table, &MatchOptions::default());
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].score, 100);
//! assert_eq!(matches[0].position.get(), 2);
//! ```

use serde::{Deserialize, Serialize};

use crate::similarity::{CaseMode, partial_ratio_with};
use crate::types::{Record, RowPosition, Table};

/// Default inclusive score threshold.
pub const DEFAULT_THRESHOLD: u8 = 80;

/// Column searched when none is configured.
pub const DEFAULT_SEARCH_FIELD: &str = "Detailed Name";

/// Search parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Column whose value is scored against the query.
    pub field: String,
    /// Minimum score (inclusive) for a row to be returned.
    pub threshold: u8,
    /// Case handling for scoring.
    pub case: CaseMode,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            field: DEFAULT_SEARCH_FIELD.to_string(),
            threshold: DEFAULT_THRESHOLD,
            case: CaseMode::default(),
        }
    }
}

impl MatchOptions {
    /// Replaces the threshold.
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// Replaces the searched field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Replaces the case mode.
    pub fn with_case(mut self, case: CaseMode) -> Self {
        self.case = case;
        self
    }
}

/// A row that scored at or above the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match<'a> {
    /// Sheet position captured from the snapshot.
    pub position: RowPosition,
    /// The matched record.
    pub record: &'a Record,
    /// Similarity score, 0–100.
    pub score: u8,
}

/// Scores every row and returns the matches, best first.
///
/// A blank query matches nothing. A row without the designated field is
/// scored against the empty string and therefore never matches a positive
/// threshold.
pub fn search<'a>(query: &str, table: &'a Table, options: &MatchOptions) -> Vec<Match<'a>> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<Match<'a>> = table
        .positioned()
        .filter_map(|(position, record)| {
            let value = record.get(&options.field).unwrap_or_default();
            let score = partial_ratio_with(query, value, options.case);
            (score >= options.threshold).then_some(Match {
                position,
                record,
                score,
            })
        })
        .collect();

    // sort_by is stable, so equal scores keep scan order.
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(names: &[&str]) -> Table {
        Table::from_rows(
            vec!["Detailed Name".to_string()],
            names.iter().map(|n| vec![n.to_string()]).collect(),
        )
    }

    #[test]
    fn test_empty_table_yields_nothing() {
        let t = Table::default();
        assert!(search("anything", &t, &MatchOptions::default()).is_empty());
    }

    #[test]
    fn test_blank_query_yields_nothing() {
        let t = table(&["Acme UREA 46-0-0 granular"]);
        let opts = MatchOptions::default().with_threshold(0);
        assert!(search("   ", &t, &opts).is_empty());
    }

    #[test]
    fn test_exact_value_scores_100() {
        let t = table(&["Yara Urea 46-0-0 prilled", "Acme UREA 46-0-0 granular"]);
        let m = search(
            "Acme UREA 46-0-0 granular",
            &t,
            &MatchOptions::default().with_threshold(100),
        );
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].score, 100);
        assert_eq!(m[0].position, RowPosition::new(3));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let t = table(&["Acme UREA 46-0-0 granular"]);
        let at = search("UREA 64", &t, &MatchOptions::default().with_threshold(86));
        let above = search("UREA 64", &t, &MatchOptions::default().with_threshold(87));
        assert_eq!(at.len(), 1);
        assert!(above.is_empty());
    }

    #[test]
    fn test_sorted_by_descending_score_ties_stable() {
        let t = table(&[
            "Acme UREA 64-0-0",
            "Yara UREA 46 prilled",
            "Timac UREA 46",
            "Acme UREA 64-0-0",
        ]);
        let m = search("UREA 46", &t, &MatchOptions::default());
        let scores: Vec<u8> = m.iter().map(|x| x.score).collect();
        assert_eq!(scores, vec![100, 100, 86, 86]);
        let positions: Vec<usize> = m.iter().map(|x| x.position.get()).collect();
        assert_eq!(positions, vec![3, 4, 2, 5]);
    }

    #[test]
    fn test_missing_field_never_matches() {
        let t = Table::from_rows(
            vec!["Produit".to_string()],
            vec![vec!["UREA 46".to_string()]],
        );
        assert!(search("UREA 46", &t, &MatchOptions::default()).is_empty());
        let by_product = MatchOptions::default().with_field("Produit");
        assert_eq!(search("UREA 46", &t, &by_product).len(), 1);
    }

    #[test]
    fn test_query_overhanging_field_end_still_matches() {
        let t = table(&["Acme Bio UREA 46-0-0"]);
        let m = search("UREA 46-0-0 gran", &t, &MatchOptions::default());
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].score, 81);
    }

    #[test]
    fn test_case_insensitive_option() {
        let t = table(&["Acme UREA 46-0-0 granular"]);
        assert!(search("urea 46", &t, &MatchOptions::default()).is_empty());
        let opts = MatchOptions::default().with_case(CaseMode::Insensitive);
        assert_eq!(search("urea 46", &t, &opts)[0].score, 100);
    }

    #[test]
    fn test_lower_threshold_is_superset() {
        let t = table(&[
            "Acme UREA 46-0-0 granular",
            "KCl fertilizer",
            "Yara Urea 46-0-0 prilled",
            "Timac Agro Physalg 25",
        ]);
        let mut previous: Option<Vec<RowPosition>> = None;
        for threshold in (0..=100).rev().step_by(5) {
            let opts = MatchOptions::default().with_threshold(threshold);
            let mut found: Vec<RowPosition> =
                search("UREA 46", &t, &opts).iter().map(|m| m.position).collect();
            found.sort();
            if let Some(prev) = &previous {
                assert!(prev.iter().all(|p| found.contains(p)));
            }
            previous = Some(found);
        }
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let opts: MatchOptions = serde_json::from_str(r#"{"threshold": 90}"#).unwrap();
        assert_eq!(opts.threshold, 90);
        assert_eq!(opts.field, DEFAULT_SEARCH_FIELD);
        assert_eq!(opts.case, CaseMode::Sensitive);
    }
}
