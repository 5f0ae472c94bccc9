pub mod whitespace_comparator;

pub use whitespace_comparator::{WhitespaceComparator, normalize_output};
