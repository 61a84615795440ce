//! Tracing setup for the `slots` binary.
//!
//! Logs go to stderr so rendered output on stdout stays clean. `RUST_LOG`
//! overrides the default filter.

use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("slots={level},slot_engine={level}"))
    });

    // try_init: a subscriber may already be installed (tests, embedding).
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        debug!(%level, "logging initialized");
    }
}
