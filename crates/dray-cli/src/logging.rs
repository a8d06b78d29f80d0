//! Tracing setup for the `dray` binary.
//!
//! Both formats write to stderr: stdout is reserved for command output, so
//! `--json` envelopes stay parseable even with logging turned up. The
//! library crates in this workspace carry no logging dependency; all
//! subscriber wiring lives here.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber.
///
/// `verbose` is the count of `-v` flags: 0 logs INFO and up, 1 DEBUG, 2 or
/// more TRACE. `json` switches the human format to line-delimited JSON
/// events.
///
/// # Panics
/// Panics when a global subscriber is already installed.
pub fn init(verbose: u8, json: bool) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // RUST_LOG still applies; the -v count raises this crate's targets on
    // top of whatever it names.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"))
        .add_directive(format!("dray={level}").parse().unwrap())
        .add_directive(level.into());

    let base = tracing_subscriber::registry().with(filter);

    if json {
        base.with(
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();
    } else {
        base.with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
