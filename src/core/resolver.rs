//! Column resolution: fuzzy-match table headers onto semantic roles
//!
//! Each role carries a short list of human-readable candidate names. Every
//! header is scored against every candidate with a normalized indel
//! similarity (0-100, case-insensitive); the best-scoring header is bound to
//! the role when its score is strictly above [`ACCEPT_THRESHOLD`].
//!
//! Roles are resolved independently, so two roles may bind the same header.
//! When several headers share the best score the first one in header order
//! wins.

use crate::types::{Binding, Role};
use serde::Serialize;
use tracing::debug;

/// Minimum score (exclusive) for a header to be bound to a role
pub const ACCEPT_THRESHOLD: f64 = 60.0;

/// Candidate header names for a role
pub fn candidates(role: Role) -> &'static [&'static str] {
    match role {
        Role::Date => &["InvoiceDate", "Order Date", "Date"],
        Role::Sales => &["TotalSales", "Sales"],
        Role::Profit => &["OperatingProfit", "Profit"],
        Role::Product => &["Product", "Category", "Product Name"],
        Role::Region => &["Region"],
        Role::State => &["State"],
        Role::City => &["City"],
        Role::Retailer => &["Retailer"],
        Role::Quantity => &["UnitsSold", "Quantity"],
    }
}

/// Normalized indel similarity in [0, 100]: `200 * LCS(a, b) / (|a| + |b|)`
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(&a, &b) as f64 / total as f64
}

/// Case-insensitive similarity between a header and a candidate name
pub fn score(header: &str, candidate: &str) -> f64 {
    ratio(&header.to_lowercase(), &candidate.to_lowercase())
}

/// Length of the longest common subsequence (two-row dynamic programming)
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Best header for one role, whether or not it clears the threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMatch {
    pub role: Role,
    /// Highest-scoring header (None only when there are no headers)
    pub best_header: Option<String>,
    pub score: f64,
    pub bound: bool,
}

/// Pick the best header for a set of candidate names.
///
/// Returns the header index and its score. `None` when `headers` is empty.
pub fn best_header(candidate_names: &[&str], headers: &[String]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;

    for (idx, header) in headers.iter().enumerate() {
        let header_score = candidate_names
            .iter()
            .map(|c| score(header, c))
            .fold(0.0, f64::max);

        if best.map_or(true, |(_, s)| header_score > s) {
            best = Some((idx, header_score));
        }
    }

    best
}

/// Match a single role against the headers
pub fn match_role(role: Role, headers: &[String]) -> ColumnMatch {
    match best_header(candidates(role), headers) {
        Some((idx, best_score)) => ColumnMatch {
            role,
            best_header: Some(headers[idx].clone()),
            score: best_score,
            bound: best_score > ACCEPT_THRESHOLD,
        },
        None => ColumnMatch {
            role,
            best_header: None,
            score: 0.0,
            bound: false,
        },
    }
}

/// Per-role match details for every role, in role order
pub fn explain(headers: &[String]) -> Vec<ColumnMatch> {
    Role::ALL
        .iter()
        .map(|&role| match_role(role, headers))
        .collect()
}

/// Resolve every role against the headers
pub fn resolve(headers: &[String]) -> Binding {
    let mut binding = Binding::new();

    for m in explain(headers) {
        debug!(
            role = %m.role,
            header = m.best_header.as_deref().unwrap_or("-"),
            score = m.score,
            bound = m.bound,
            "column match"
        );
        if let (true, Some(header)) = (m.bound, m.best_header) {
            binding.bind(m.role, header);
        }
    }

    binding
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_ratio_identical_and_disjoint() {
        assert_eq!(ratio("sales", "sales"), 100.0);
        assert_eq!(ratio("abc", "xyz"), 0.0);
        assert_eq!(ratio("", ""), 100.0);
        assert_eq!(ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_ratio_partial() {
        // LCS("sales", "totalsales") = 5 → 200 * 5 / 15
        let r = ratio("sales", "totalsales");
        assert!((r - 66.666_666).abs() < 1e-3);
    }

    #[test]
    fn test_score_ignores_case() {
        assert_eq!(score("ORDER DATE", "Order Date"), 100.0);
    }

    #[test]
    fn test_empty_headers_bind_nothing() {
        let binding = resolve(&[]);
        for role in Role::ALL {
            assert!(!binding.is_bound(role));
        }
    }

    #[test]
    fn test_low_similarity_is_unbound() {
        let binding = resolve(&headers(&["Widget"]));
        assert!(!binding.is_bound(Role::Region));
        assert!(score("Widget", "Region") <= ACCEPT_THRESHOLD);
    }

    #[test]
    fn test_score_exactly_at_threshold_is_unbound() {
        // "state" vs "sales": LCS 3 → 200 * 3 / 10 = 60
        assert_eq!(score("Sales", "State"), 60.0);
        let binding = resolve(&headers(&["Sales"]));
        assert!(!binding.is_bound(Role::State));
        assert_eq!(binding.get(Role::Sales), Some("Sales"));
    }

    #[test]
    fn test_typical_headers() {
        let binding = resolve(&headers(&[
            "Retailer",
            "Invoice Date",
            "Region",
            "State",
            "City",
            "Product",
            "Units Sold",
            "Total Sales",
            "Operating Profit",
        ]));
        assert_eq!(binding.get(Role::Date), Some("Invoice Date"));
        assert_eq!(binding.get(Role::Sales), Some("Total Sales"));
        assert_eq!(binding.get(Role::Profit), Some("Operating Profit"));
        assert_eq!(binding.get(Role::Product), Some("Product"));
        assert_eq!(binding.get(Role::Region), Some("Region"));
        assert_eq!(binding.get(Role::State), Some("State"));
        assert_eq!(binding.get(Role::City), Some("City"));
        assert_eq!(binding.get(Role::Retailer), Some("Retailer"));
        assert_eq!(binding.get(Role::Quantity), Some("Units Sold"));
    }

    #[test]
    fn test_roles_may_share_a_header() {
        // "profit" vs "product": LCS 4 → 200 * 4 / 13 ≈ 61.5
        let binding = resolve(&headers(&["Profit"]));
        assert_eq!(binding.get(Role::Profit), Some("Profit"));
        assert_eq!(binding.get(Role::Product), Some("Profit"));
    }

    #[test]
    fn test_tie_keeps_first_header() {
        let (idx, s) = best_header(&["Region"], &headers(&["region", "REGION"])).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(s, 100.0);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let h = headers(&["Order Date", "Sales", "Region", "Profit"]);
        assert_eq!(resolve(&h), resolve(&h));
    }

    #[test]
    fn test_explain_reports_unbound_best_guess() {
        let matches = explain(&headers(&["Widget"]));
        let region = matches.iter().find(|m| m.role == Role::Region).unwrap();
        assert_eq!(region.best_header.as_deref(), Some("Widget"));
        assert!(!region.bound);
        assert_eq!(matches.len(), Role::ALL.len());
    }
}
