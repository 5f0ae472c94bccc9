//! # Marker
//!
//! Grades battle submissions. A solution is run once as written for a quick
//! sample check, or bound to every hidden test case of the assigned problem
//! and executed one test at a time for a graded verdict.
//!
//! - [`driver::EvaluationDriver`] talks to the sandbox and builds reports.
//! - [`comparators`] hold output comparison strategies.
//! - [`attempts::AttemptRegistry`] lets a newer submission cancel an older one.

pub mod attempts;
pub mod comparators;
pub mod driver;
pub mod error;
pub mod traits;
pub mod types;

pub use attempts::{AttemptRegistry, AttemptToken};
pub use driver::EvaluationDriver;
pub use error::Superseded;
pub use traits::progress::{NoProgress, ProgressSink};
