//! Statistical reduction of timing samples.
//!
//! This module provides:
//! - [`Stats::from_samples`]: pure reduction of a sample sequence
//! - [`OnlineStats`]: the same reduction computed incrementally
//! - [`t_critical_95`]: two-tailed 95% Student-t critical values

mod online;
mod summary;
mod t_table;

pub use online::OnlineStats;
pub use summary::Stats;
pub use t_table::{t_critical_95, Z_975};
