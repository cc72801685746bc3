//! Logging setup for the command-line driver.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary (or to tests that want to see the output).

use tracing::Level;
use tracing::subscriber::SetGlobalDefaultError;

/// Install a compact `fmt` subscriber as the global default.
///
/// `verbose` lowers the max level from `INFO` to `DEBUG`, which turns on the
/// per-sample progress records.
pub fn install_logger(verbose: bool) -> Result<(), SetGlobalDefaultError> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}
