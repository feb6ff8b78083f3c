//! Configuration loading functionality.
//!
//! Handles default path discovery under the XDG config directory, tilde
//! expansion, and parsing of `circadian.toml`.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;

/// Expand a leading `~` to the user's home directory.
///
/// Paths without a tilde pass through untouched. `~user` forms are not
/// supported and pass through as literal paths.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return home;
    }
    PathBuf::from(path)
}

/// Base alacritty configuration directory ($XDG_CONFIG_HOME/alacritty).
fn alacritty_config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("could not determine the user configuration directory")?;
    Ok(base.join("alacritty"))
}

/// Default location of the schedule configuration.
pub fn default_circadian_path() -> Result<PathBuf> {
    Ok(alacritty_config_dir()?.join("circadian.toml"))
}

/// Default location of the live alacritty configuration.
pub fn default_alacritty_path() -> Result<PathBuf> {
    Ok(alacritty_config_dir()?.join("alacritty.toml"))
}

/// Load the schedule configuration from a specific path.
///
/// Does not create a default file: a missing schedule is a fatal
/// configuration error, reported to the caller.
pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!(
            "critical file {} does not exist, check your configuration",
            path.display()
        );
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    Ok(config)
}
