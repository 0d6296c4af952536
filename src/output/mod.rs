//! Output formatting for suite results.
//!
//! - [`terminal`]: Benchmark.js-style lines and a colored [`TerminalReporter`]
//! - [`json`]: serialization of reports and events

pub mod json;
pub mod terminal;

pub use json::{to_json, to_json_pretty};
pub use terminal::{format_partial, format_rate, format_report, format_stats_line, TerminalReporter};
