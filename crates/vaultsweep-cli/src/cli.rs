use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "vaultsweep")]
#[command(
    about = "Find and remove unused attachments, empty notes and empty folders in a markdown vault",
    long_about = None,
    version
)]
pub struct Cli {
    /// Settings file to use instead of the vault's `.vaultsweep.toml`
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report what a cleanup would remove, without touching anything
    Scan {
        #[arg(long, value_name = "DIR")]
        vault: PathBuf,
        /// Also write the report as CSV
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },
    /// Scan, confirm, then remove
    Clean {
        #[arg(long, value_name = "DIR")]
        vault: PathBuf,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Permanently delete old entries from the vault's trash folder
    PurgeTrash {
        #[arg(long, value_name = "DIR")]
        vault: PathBuf,
    },
    /// Print the effective settings as TOML
    PrintConfig {
        #[arg(long, value_name = "DIR")]
        vault: Option<PathBuf>,
    },
}

impl Commands {
    /// The vault this command runs against, if any.
    pub fn vault(&self) -> Option<&PathBuf> {
        match self {
            Self::Scan { vault, .. } | Self::Clean { vault, .. } | Self::PurgeTrash { vault } => {
                Some(vault)
            }
            Self::PrintConfig { vault } => vault.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_flag_is_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "vaultsweep",
            "clean",
            "--vault",
            "/notes",
            "--yes",
            "--config",
            "/tmp/s.toml",
        ])
        .expect("parses");
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.toml")));
        assert!(matches!(cli.command, Commands::Clean { yes: true, .. }));
        assert_eq!(cli.command.vault(), Some(&PathBuf::from("/notes")));
    }

    #[test]
    fn vault_is_required_for_scan() {
        assert!(Cli::try_parse_from(["vaultsweep", "scan"]).is_err());
    }
}
