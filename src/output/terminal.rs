//! Terminal output in the familiar Benchmark.js layout.
//!
//! ```text
//! regex x 1,204,311 ops/sec ±0.84% (88 runs sampled)
//! memchr x 9,876,101 ops/sec ±0.31% (93 runs sampled)
//! Fastest is memchr
//! ```

use std::io::{self, Write};

use colored::Colorize;

use crate::error::WorkFailure;
use crate::events::SuiteListener;
use crate::result::{PartialReport, SuiteReport};
use crate::statistics::Stats;

/// Format one candidate's statistics as a single line.
pub fn format_stats_line(name: &str, stats: &Stats) -> String {
    let runs = if stats.sample_count == 1 { "run" } else { "runs" };
    format!(
        "{} x {} ops/sec {} ({} {} sampled)",
        name,
        format_rate(stats.mean_rate),
        format_margin(stats),
        stats.sample_count,
        runs
    )
}

/// Format a rate with thousands separators; rates below 100 keep two decimals.
pub fn format_rate(rate: f64) -> String {
    if !rate.is_finite() {
        return rate.to_string();
    }
    let fixed = if rate < 100.0 {
        format!("{:.2}", rate)
    } else {
        format!("{:.0}", rate)
    };
    let (integer, fraction) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let (sign, digits) = match integer.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

fn format_margin(stats: &Stats) -> String {
    if stats.is_bounded() {
        format!("\u{00B1}{:.2}%", stats.margin_of_error_pct)
    } else {
        "\u{00B1}\u{221E}%".to_string()
    }
}

/// Format a completed report: one line per ranked candidate, then failures
/// and the fastest tie-set.
pub fn format_report(report: &SuiteReport) -> String {
    let mut output = String::new();

    for result in &report.results {
        let line = format_stats_line(&result.name, &result.stats);
        if report.fastest.len() == 1 && report.fastest[0] == result.name && report.results.len() > 1
        {
            output.push_str(&line.green().to_string());
        } else {
            output.push_str(&line);
        }
        output.push('\n');
    }

    for failure in &report.failures {
        output.push_str(&format!(
            "{} {} failed: {}\n",
            failure.name.red().bold(),
            failure.phase,
            failure.message
        ));
    }

    if !report.fastest.is_empty() {
        output.push_str(&format!("Fastest is {}\n", report.fastest.join(", ")));
    }

    output
}

/// Format a cancelled run's partial report.
pub fn format_partial(partial: &PartialReport) -> String {
    let mut output = String::new();

    for completed in &partial.completed {
        output.push_str(&format_stats_line(&completed.name, &completed.stats));
        output.push('\n');
    }
    for failure in &partial.failures {
        output.push_str(&format!(
            "{} {} failed: {}\n",
            failure.name.red().bold(),
            failure.phase,
            failure.message
        ));
    }

    output.push_str(&"Cancelled".yellow().bold().to_string());
    if let Some(name) = &partial.interrupted {
        output.push_str(&format!(" while sampling {}", name));
    }
    if !partial.skipped.is_empty() {
        output.push_str(&format!("; skipped {}", partial.skipped.join(", ")));
    }
    output.push('\n');

    output
}

/// A [`SuiteListener`] that prints progress as each candidate completes.
///
/// Write errors are ignored; reporting never interrupts a run.
pub struct TerminalReporter<W: Write = io::Stdout> {
    out: W,
}

impl TerminalReporter {
    /// Report to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalReporter<W> {
    /// Report to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the reporter, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SuiteListener for TerminalReporter<W> {
    fn on_cycle(&mut self, name: &str, stats: &Stats) {
        let _ = writeln!(self.out, "{}", format_stats_line(name, stats));
    }

    fn on_candidate_failed(&mut self, name: &str, failure: &WorkFailure) {
        let _ = writeln!(self.out, "{} {}", name.red().bold(), failure);
    }

    fn on_complete(&mut self, report: &SuiteReport) {
        if report.fastest.is_empty() {
            let _ = writeln!(self.out, "{}", "No candidate completed".yellow());
        } else {
            let _ = writeln!(
                self.out,
                "Fastest is {}",
                report.fastest.join(", ").green().bold()
            );
        }
        let _ = self.out.flush();
    }

    fn on_cancelled(&mut self, partial: &PartialReport) {
        let _ = write!(self.out, "{}", "Cancelled".yellow().bold());
        if let Some(name) = &partial.interrupted {
            let _ = write!(self.out, " while sampling {}", name);
        }
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }
}
