//! Tracing setup for the `autoregtest` binary.
//!
//! Progress of a run is reported through `tracing` events on stderr. The
//! harness output itself goes to the run's log file, not through here.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global subscriber.
///
/// `RUST_LOG` takes precedence when set; otherwise events at `level` and
/// above are shown. Output: stderr, compact format.
pub fn init(level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
