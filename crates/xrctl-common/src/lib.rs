//! Shared utilities for xrctl: logging setup and unit conversions.

#![forbid(unsafe_code)]

pub mod helpers;

/// Initialize tracing. `RUST_LOG` overrides `default_level`.
///
/// Output goes to stderr so it never mixes with command output on stdout.
pub fn init_tracing_with_default(default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second initialisation (tests, re-entry after elevation) is not an error.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
