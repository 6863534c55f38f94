//! VaultSweep: finds and removes unused attachments, empty notes and empty
//! folders in a markdown vault.
//!
//! Thin binary entry point. All logic lives in the `vaultsweep-core`
//! and `vaultsweep-cli` crates.

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `debug` or
/// `vaultsweep_core=debug`.
const LOG_ENV: &str = "VAULTSWEEP_LOG";

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so reports on stdout stay clean.
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = vaultsweep_cli::Cli::parse();
    tracing::debug!(?cli, "VaultSweep starting");

    vaultsweep_cli::run(cli)
}
