/// Locating and loading the settings file.
///
/// Lookup order: an explicit `--config` file, then `<vault>/.vaultsweep.toml`,
/// then `settings.toml` in the user's config directory, then defaults.
use anyhow::{Context, Result};
use directories::BaseDirs;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use vaultsweep_core::settings::Settings;

/// Settings file kept at the root of a vault. Dot-prefixed, so it is never
/// part of the scanned tree.
pub const VAULT_SETTINGS_FILE: &str = ".vaultsweep.toml";

/// Directory under the OS config root.
pub const APP_DIR_NAME: &str = "vaultsweep";

/// Overrides the OS config root, for tests and portable setups.
pub const CONFIG_HOME_ENV: &str = "VAULTSWEEP_CONFIG_HOME";

/// Where the effective settings came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Vault(PathBuf),
    User(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(path) | Self::Vault(path) | Self::User(path) => {
                write!(f, "{}", path.display())
            }
            Self::Defaults => f.write_str("built-in defaults"),
        }
    }
}

/// `settings.toml` under the user's config directory, if one can be found.
pub fn user_config_path() -> Option<PathBuf> {
    let base = match std::env::var_os(CONFIG_HOME_ENV) {
        Some(path) => PathBuf::from(path),
        None => BaseDirs::new()?.config_dir().join(APP_DIR_NAME),
    };
    Some(base.join("settings.toml"))
}

pub fn parse_settings(text: &str) -> Result<Settings> {
    Ok(toml::from_str(text)?)
}

pub fn read_settings(path: &Path) -> Result<Settings> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    parse_settings(&text).with_context(|| format!("invalid settings in {}", path.display()))
}

/// Resolve and load the effective settings.
///
/// An explicit file must exist; the others are only used when present.
pub fn load_settings(
    explicit: Option<&Path>,
    vault: Option<&Path>,
    user: Option<&Path>,
) -> Result<(Settings, ConfigSource)> {
    if let Some(path) = explicit {
        return Ok((read_settings(path)?, ConfigSource::Explicit(path.to_path_buf())));
    }

    if let Some(path) = vault.map(|v| v.join(VAULT_SETTINGS_FILE)).filter(|p| p.is_file()) {
        let settings = read_settings(&path)?;
        return Ok((settings, ConfigSource::Vault(path)));
    }

    if let Some(path) = user.filter(|p| p.is_file()) {
        return Ok((read_settings(path)?, ConfigSource::User(path.to_path_buf())));
    }

    debug!("no settings file found, using defaults");
    Ok((Settings::default(), ConfigSource::Defaults))
}

pub fn to_toml(settings: &Settings) -> Result<String> {
    toml::to_string_pretty(settings).context("failed to serialise settings")
}
