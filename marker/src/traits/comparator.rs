/// Strategy for deciding whether a program's output matches the expected one.
pub trait OutputComparator: Send + Sync {
    fn matches(&self, expected: &str, actual: &str) -> bool;
}
