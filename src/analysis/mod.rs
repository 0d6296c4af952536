//! Comparison of completed candidates.
//!
//! The [`comparator`] ranks candidates by mean throughput and marks which
//! pairs are statistically distinguishable at the 95% level.

pub mod comparator;

pub use comparator::{intervals_overlap, rank, significantly_different, Ranking};
