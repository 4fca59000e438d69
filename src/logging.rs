//! Logging setup
//!
//! The library only emits `tracing` events; the binary installs the
//! subscriber. Output goes to stderr so that stdout stays parseable.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` for this crate
/// when `verbose` is true.
///
/// ```no_run
/// tea::logging::init(false);
/// ```
pub fn init(verbose: bool) {
    let default = if verbose { "warn,tea=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .try_init();
}

/// Subscriber for unit tests, captured by the test harness
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
