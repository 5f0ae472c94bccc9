//! Token-level comparison that ignores how much whitespace separates tokens.

use crate::traits::comparator::OutputComparator;

/// Trims `s` and collapses every whitespace run (spaces, tabs, newlines) to a
/// single space.
pub fn normalize_output(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Outputs match when they are equal after [`normalize_output`].
pub struct WhitespaceComparator;

impl OutputComparator for WhitespaceComparator {
    fn matches(&self, expected: &str, actual: &str) -> bool {
        normalize_output(expected) == normalize_output(actual)
    }
}
