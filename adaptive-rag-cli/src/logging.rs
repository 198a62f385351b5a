//! Tracing setup for the binary: logs go to stderr so answers on stdout stay clean.

use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG` when set, otherwise `default_level`; `verbose` raises
/// the library to `debug`.
pub fn env_filter(default_level: &str, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new(format!("{},adaptive_rag=debug", default_level))
        } else {
            EnvFilter::new(default_level)
        }
    })
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init_tracing(default_level: &str, verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level, verbose))
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .try_init();
}
