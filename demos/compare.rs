//! Example: comparing three ways to find a byte in a buffer.
//!
//! Run with:
//! ```bash
//! cargo run --release --example compare
//! RUST_LOG=rate_bench=debug cargo run --release --example compare
//! ```
//!
//! The haystack is built once, outside the measured closures, so only the
//! search itself is timed.

use rate_bench::output::{format_partial, to_json_pretty, TerminalReporter};
use rate_bench::{Candidate, Outcome, RunConfig, Suite};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let haystack: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
    let needle = 250u8;

    let mut suite = Suite::new();
    suite.add_listener(TerminalReporter::stdout());

    let result = suite
        .add("iter().position", || {
            haystack.iter().position(|&b| b == needle)
        })
        .and_then(|s| s.add("contains", || haystack.contains(&needle)))
        .and_then(|s| {
            s.add("chunked", || {
                haystack
                    .chunks(64)
                    .position(|chunk| chunk.contains(&needle))
            })
        });
    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    // A candidate whose setup fails is reported and skipped
    let registered = suite.add_candidate(
        Candidate::new("mmap", || ()).with_fallible_setup(|| {
            std::fs::metadata("/nonexistent/haystack.bin").map(|_| ())
        }),
    );
    if let Err(err) = registered {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let config = RunConfig::quick().env_overrides();
    match suite.run(config) {
        Ok(Outcome::Completed(report)) => {
            if std::env::var_os("RATE_BENCH_JSON").is_some() {
                match to_json_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(err) => eprintln!("error: {err}"),
                }
            }
        }
        Ok(Outcome::Cancelled(partial)) => print!("{}", format_partial(&partial)),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
