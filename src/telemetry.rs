//! Tracing initialisation shared by both binaries.
//!
//! Logs go to stderr so they never mix with the report on stdout (the batch
//! runner parses the validator's stdout as JSON).

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects `debug`, else `warn`.
/// Only the first call takes effect.
pub fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .ok();
}
