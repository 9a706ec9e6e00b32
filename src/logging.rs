//! Tracing subscriber setup
//!
//! Logs go to stderr so stdout stays machine-readable.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// WARN by default, DEBUG with `--verbose`, ERROR with `--quiet`
pub fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
