/// Command dispatch.
use crate::cli::{Cli, Commands};
use crate::config::{self, ConfigSource};
use crate::prompt::TerminalConfirm;
use crate::report;
use crate::state::ScanState;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{info, warn};
use vaultsweep_core::cleanup::{cleanup, ApproveAll, ConfirmDeletion};
use vaultsweep_core::host::Vault;
use vaultsweep_core::scanner::{start_scan, ScanResult};
use vaultsweep_core::settings::Settings;
use vaultsweep_core::trash::purge_host_trash;
use vaultsweep_core::LocalVault;

/// Run `cli` against the real terminal.
pub fn run(cli: Cli) -> Result<()> {
    let mut stdout = std::io::stdout();
    let mut confirm = TerminalConfirm::stdio();
    App::new(&mut stdout, &mut confirm).run(cli)
}

pub struct App<'a> {
    out: &'a mut dyn Write,
    confirm: &'a mut dyn ConfirmDeletion,
    user_config: Option<PathBuf>,
}

impl<'a> App<'a> {
    pub fn new(out: &'a mut dyn Write, confirm: &'a mut dyn ConfirmDeletion) -> Self {
        Self {
            out,
            confirm,
            user_config: config::user_config_path(),
        }
    }

    /// Use `path` as the user-level settings file (or none at all).
    pub fn with_user_config(mut self, path: Option<PathBuf>) -> Self {
        self.user_config = path;
        self
    }

    pub fn run(&mut self, cli: Cli) -> Result<()> {
        let (settings, source) = config::load_settings(
            cli.config.as_deref(),
            cli.command.vault().map(PathBuf::as_path),
            self.user_config.as_deref(),
        )?;
        info!(source = %source, "settings loaded");

        match cli.command {
            Commands::Scan { vault, export } => {
                let (_, result) = scan_vault(&vault, &settings)?;
                report::print_scan(self.out, &result)?;
                if let Some(path) = export {
                    report::export_csv(&path, &result)?;
                    writeln!(self.out, "Report written to {}", path.display())?;
                }
            }
            Commands::Clean { vault, yes } => {
                let (vault, result) = scan_vault(&vault, &settings)?;
                report::print_scan(self.out, &result)?;
                let mut approve = ApproveAll;
                let confirm: &mut dyn ConfirmDeletion = if yes {
                    &mut approve
                } else {
                    &mut *self.confirm
                };
                let outcome = cleanup(&result, &settings, &*vault, confirm);
                report::print_cleanup(self.out, &outcome)?;
            }
            Commands::PurgeTrash { vault } => {
                if settings.host_trash_cleanup_age_days.is_none() {
                    writeln!(
                        self.out,
                        "host_trash_cleanup_age_days is not set; nothing to purge."
                    )?;
                    return Ok(());
                }
                settings.compile().context("invalid settings")?;
                let vault = open_vault(&vault)?;
                let purged = purge_host_trash(&vault, &settings, SystemTime::now())
                    .context("failed to read the vault trash")?;
                report::print_report(self.out, "Purged", &purged)?;
            }
            Commands::PrintConfig { .. } => {
                if source != ConfigSource::Defaults {
                    writeln!(self.out, "# from {source}")?;
                }
                write!(self.out, "{}", config::to_toml(&settings)?)?;
            }
        }
        Ok(())
    }
}

fn open_vault(path: &Path) -> Result<LocalVault> {
    let vault = LocalVault::open(path)
        .with_context(|| format!("failed to open vault {}", path.display()))?;
    for warning in vault.warnings() {
        warn!("{warning}");
    }
    Ok(vault)
}

/// Open the vault and scan it on the scanner thread.
pub fn scan_vault(path: &Path, settings: &Settings) -> Result<(Arc<LocalVault>, ScanResult)> {
    let compiled = settings.compile().context("invalid settings")?;
    let vault = Arc::new(open_vault(path)?);

    let handle = start_scan(vault.clone() as Arc<dyn Vault>, compiled);
    let mut state = ScanState::new();
    state.drain(&handle);
    let result = handle.join()?;

    info!(
        files = state.files_to_remove,
        folders = state.folders_to_remove,
        warnings = state.warnings.len(),
        "scan finished"
    );
    Ok((vault, result))
}
