//! Logging initialization for the CLI.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! binary's job. Logs go to stderr so stdout stays machine-readable.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Maps the `-v` count to a level: 0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Installs the global subscriber.
///
/// `RUST_LOG` is honoured; a non-zero `verbosity` overrides it for this
/// crate. A second call is a no-op.
pub fn init(verbosity: u8) {
    let level = level_for(verbosity);

    let mut filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    if verbosity > 0 {
        if let Ok(directive) = format!("lockfile_sbom={level}").parse() {
            filter = filter.add_directive(directive);
        }
    }

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
