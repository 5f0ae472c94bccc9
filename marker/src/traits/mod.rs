pub mod comparator;
pub mod progress;
