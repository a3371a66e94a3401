//! Diagnostic logging setup.
//!
//! User-facing output goes through [`crate::output`]; this module only wires
//! `tracing` events to stderr, filtered by `RUST_LOG` or the `-v` count.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Maps `-v` occurrences to a default filter directive.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Installs the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over `verbosity` when set. Calling this twice
/// is harmless; the second call returns an error that callers may ignore.
///
/// # Arguments
///
/// * `verbosity` - Number of `-v` flags given on the command line
///
/// # Example
///
/// ```no_run
/// use tidyfolder::logging::setup_logging;
/// setup_logging(1).expect("subscriber already installed");
/// tracing::info!("shown with -v");
/// ```
pub fn setup_logging(verbosity: u8) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()?;

    tracing::debug!(verbosity, "logging initialized");
    Ok(())
}
