//! Edit-distance based string similarity on a 0–100 scale.
//!
//! [`ratio`] scores two whole strings by their indel similarity: twice the
//! longest common subsequence over the combined length. [`partial_ratio`]
//! slides the shorter string across the longer one and keeps the best
//! window, so a query that appears inside a longer field scores high even
//! though the field carries extra text. Windows that run off either end of
//! the longer string are scored too, truncated at the edge, so a query that
//! overhangs the start or end of a field is compared against the overlap
//! only.
//!
//! All scoring runs over Unicode scalar values, not bytes. Scores round half
//! to even, so a similarity of exactly 12.5% scores 12.
//!
//! # Examples
//!
//! ```
//! use product_search_core::{partial_ratio, ratio};
//!
//! assert_eq!(ratio("UREA 46", "UREA 46"), 100);
//! assert_eq!(partial_ratio("UREA 46", "Acme UREA 46-0-0 granular"), 100);
//! assert!(partial_ratio("Potassium Chloride", "KCl fertilizer") < 50);
//! ```

use serde::{Deserialize, Serialize};

/// Whether letter case participates in scoring.
///
/// Matching is case-sensitive by default, so `"urea"` and `"UREA"` only
/// share their non-letter characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    /// Compare characters exactly (the default).
    #[default]
    Sensitive,
    /// Lower-case both sides before comparing.
    Insensitive,
}

impl CaseMode {
    fn prepare(self, s: &str) -> Vec<char> {
        match self {
            CaseMode::Sensitive => s.chars().collect(),
            CaseMode::Insensitive => s.chars().flat_map(char::to_lowercase).collect(),
        }
    }
}

/// Similarity of two whole strings, 0–100.
///
/// Two empty strings are identical and score 100.
pub fn ratio(a: &str, b: &str) -> u8 {
    ratio_with(a, b, CaseMode::Sensitive)
}

/// [`ratio`] with an explicit [`CaseMode`].
pub fn ratio_with(a: &str, b: &str, case: CaseMode) -> u8 {
    let a = case.prepare(a);
    let b = case.prepare(b);
    to_score(indel_similarity(&a, &b))
}

/// Best-window similarity between the shorter and the longer string, 0–100.
///
/// Returns 0 when either string is empty.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    partial_ratio_with(a, b, CaseMode::Sensitive)
}

/// [`partial_ratio`] with an explicit [`CaseMode`].
///
/// # Examples
///
/// ```
/// use product_search_core::{CaseMode, partial_ratio_with};
///
/// let field = "Acme UREA 46-0-0 granular";
/// assert!(partial_ratio_with("urea 46", field, CaseMode::Sensitive) < 80);
/// assert_eq!(partial_ratio_with("urea 46", field, CaseMode::Insensitive), 100);
/// ```
pub fn partial_ratio_with(a: &str, b: &str, case: CaseMode) -> u8 {
    let a = case.prepare(a);
    let b = case.prepare(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let (shorter, longer) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    let width = shorter.len();

    let len = longer.len();
    let head = (1..width).map(|end| &longer[..end]);
    let full = (0..=len - width).map(|start| &longer[start..start + width]);
    let tail = (len - width + 1..len).map(|start| &longer[start..]);

    let mut best = 0.0_f64;
    for window in head.chain(full).chain(tail) {
        if window == shorter.as_slice() {
            return 100;
        }
        let sim = indel_similarity(shorter, window);
        if sim > best {
            best = sim;
        }
    }
    to_score(best)
}

/// `2 * LCS / (|a| + |b|)` in `[0.0, 1.0]`.
fn indel_similarity(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    (2 * lcs_len(a, b)) as f64 / total as f64
}

/// Length of the longest common subsequence, two-row dynamic programming.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

fn to_score(sim: f64) -> u8 {
    (sim * 100.0).round_ties_even().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcs_len() {
        let a: Vec<char> = "ABCBDAB".chars().collect();
        let b: Vec<char> = "BDCABA".chars().collect();
        assert_eq!(lcs_len(&a, &b), 4);
        assert_eq!(lcs_len(&[], &b), 0);
    }

    #[test]
    fn test_ratio_identical_and_disjoint() {
        assert_eq!(ratio("granular", "granular"), 100);
        assert_eq!(ratio("", ""), 100);
        assert_eq!(ratio("abc", "xyz"), 0);
        assert_eq!(ratio("abc", ""), 0);
    }

    #[test]
    fn test_ratio_partial_overlap() {
        // LCS("abcd", "abxd") = 3 → 6/8
        assert_eq!(ratio("abcd", "abxd"), 75);
    }

    #[test]
    fn test_ratio_rounds_half_to_even() {
        // 2 * 1 / 16 = 12.5%, 2 * 3 / 16 = 37.5%
        assert_eq!(ratio("a", "abcdefghijklmno"), 12);
        assert_eq!(ratio("abc", "abcdefghijklm"), 38);
    }

    #[test]
    fn test_partial_ratio_substring_is_perfect() {
        assert_eq!(partial_ratio("UREA 46", "Acme UREA 46-0-0 granular"), 100);
        assert_eq!(partial_ratio("KCl", "KCl fertilizer"), 100);
    }

    #[test]
    fn test_partial_ratio_is_symmetric_in_argument_order() {
        let field = "Acme UREA 46-0-0 granular";
        assert_eq!(partial_ratio("UREA 64", field), partial_ratio(field, "UREA 64"));
    }

    #[test]
    fn test_partial_ratio_transposed_digits() {
        assert_eq!(partial_ratio("UREA 64", "Acme UREA 46-0-0 granular"), 86);
    }

    #[test]
    fn test_partial_ratio_weak_overlap() {
        assert_eq!(partial_ratio("Potassium Chloride", "KCl fertilizer"), 45);
    }

    #[test]
    fn test_partial_ratio_query_overhanging_field_end() {
        // The query runs past the end of the field; only the overlap counts.
        let field = "Acme Bio UREA 46-0-0";
        assert_eq!(partial_ratio("UREA 46-0-0 gran", field), 81);
        assert_eq!(partial_ratio(field, "UREA 46-0-0 gran"), 81);
    }

    #[test]
    fn test_partial_ratio_query_overhanging_field_start() {
        assert_eq!(partial_ratio("Bio UREA 46-0", "UREA 46-0-0 granular"), 82);
    }

    #[test]
    fn test_partial_ratio_empty_side_scores_zero() {
        assert_eq!(partial_ratio("", "anything"), 0);
        assert_eq!(partial_ratio("anything", ""), 0);
        assert_eq!(partial_ratio("", ""), 0);
    }

    #[test]
    fn test_case_sensitivity_is_explicit() {
        let field = "Acme UREA 46-0-0 granular";
        assert_eq!(partial_ratio_with("urea 46", field, CaseMode::Sensitive), 43);
        assert_eq!(partial_ratio_with("urea 46", field, CaseMode::Insensitive), 100);
        assert_eq!(ratio_with("Granulé", "GRANULÉ", CaseMode::Insensitive), 100);
    }

    #[test]
    fn test_unicode_scored_per_char() {
        assert_eq!(partial_ratio("granulé", "Physalg 25 granulé"), 100);
    }

    #[test]
    fn test_case_mode_deserializes_lowercase() {
        let mode: CaseMode = serde_json::from_str("\"insensitive\"").unwrap();
        assert_eq!(mode, CaseMode::Insensitive);
    }
}
