/// A graded run stopped because a newer attempt for the same user started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Submission superseded by a newer attempt")]
pub struct Superseded;
