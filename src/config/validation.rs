//! Configuration validation logic.
//!
//! All checks here are fatal: the daemon refuses to start on a configuration
//! it cannot schedule from. Validation runs exactly once at startup so that
//! later cycles never trip over malformed specifiers or missing files.

use anyhow::{Context, Result};

use super::Config;
use crate::time_spec::TimeSpec;

/// Validate the loaded schedule configuration.
///
/// Checks, in order:
/// - the theme list is non-empty
/// - every `time` field parses as a solar token or strict `HH:MM`
/// - coordinates are present, numeric, and in range when solar tokens are used
/// - every referenced theme file is installed in the theme folder
pub fn validate_config(config: &Config) -> Result<()> {
    if config.themes.is_empty() {
        anyhow::bail!("no themes specified in circadian config");
    }

    for theme in &config.themes {
        if theme.name.trim().is_empty() {
            anyhow::bail!("a theme entry has an empty name");
        }
        TimeSpec::parse(&theme.time)
            .with_context(|| format!("theme {:?} has an invalid time", theme.name))?;
    }

    if config.uses_solar_tokens() {
        let coords = config
            .resolved_coordinates()
            .context("schedule uses solar event times")?;
        if !(-90.0..=90.0).contains(&coords.latitude) {
            anyhow::bail!(
                "invalid latitude: {}. Must be between -90 and 90 degrees",
                coords.latitude
            );
        }
        if !(-180.0..=180.0).contains(&coords.longitude) {
            anyhow::bail!(
                "invalid longitude: {}. Must be between -180 and 180 degrees",
                coords.longitude
            );
        }
    }

    let folder = config.theme_folder_path();
    if !folder.is_dir() {
        anyhow::bail!(
            "theme folder {} does not exist, check your configuration",
            folder.display()
        );
    }
    for theme in &config.themes {
        let path = config.theme_file(&theme.name);
        if !path.exists() {
            anyhow::bail!("theme {} is not installed in {}", theme.name, path.display());
        }
    }

    Ok(())
}
