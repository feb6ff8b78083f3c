//! Configuration system for circadianr with validation and coordinate handling.
//!
//! This module manages the `circadian.toml` schedule configuration:
//!
//! ```toml
//! theme-folder = "~/.config/alacritty/themes"
//!
//! [coordinates]
//! latitude = 51.5074     # numbers or strings are both accepted
//! longitude = "-0.1278"
//!
//! [[themes]]
//! name = "solarized-light"
//! time = "sunrise"       # dawn | sunrise | noon | sunset | dusk | "HH:MM"
//!
//! [[themes]]
//! name = "solarized-dark"
//! time = "21:30"
//! ```
//!
//! Validation is performed once at startup and is strict: an empty theme
//! list, an unparseable time specifier, missing or non-numeric coordinates
//! (when any theme uses a solar token), or an uninstalled theme file are all
//! fatal configuration errors reported to the caller.

pub mod loading;
pub mod validation;


use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

pub use loading::{default_alacritty_path, default_circadian_path, expand_tilde, load_from_path};
pub use validation::validate_config;

/// Solar event tokens accepted in a theme's `time` field.
pub const SOLAR_TOKENS: [&str; 5] = ["dawn", "sunrise", "noon", "sunset", "dusk"];

/// A coordinate value as it appears in the TOML document.
///
/// Users write latitude/longitude either as TOML floats or as quoted
/// strings; both must parse as real numbers or configuration loading fails.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum CoordValue {
    Number(f64),
    Text(String),
}

impl CoordValue {
    /// Interpret the raw value as a float.
    pub fn as_f64(&self) -> Result<f64> {
        match self {
            CoordValue::Number(n) => Ok(*n),
            CoordValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .with_context(|| format!("coordinate value {s:?} is not a valid number")),
        }
    }
}

/// Raw `[coordinates]` block, values unvalidated.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RawCoordinates {
    pub latitude: Option<CoordValue>,
    pub longitude: Option<CoordValue>,
}

/// Validated geographic coordinates used for solar calculations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One schedule entry: a theme name and the time specifier it switches at.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ThemeEntry {
    pub name: String,
    pub time: String,
}

/// Configuration structure for the circadian schedule.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Directory holding one `<name>.toml` file per theme.
    #[serde(rename = "theme-folder")]
    pub theme_folder: String,

    /// Ordered theme schedule. Order does not affect selection (selection is
    /// by computed time) but breaks ties deterministically.
    #[serde(default)]
    pub themes: Vec<ThemeEntry>,

    /// Optional coordinates, required as soon as any entry uses a solar token.
    pub coordinates: Option<RawCoordinates>,
}

impl Config {
    /// The theme folder with `~` expanded.
    pub fn theme_folder_path(&self) -> PathBuf {
        expand_tilde(&self.theme_folder)
    }

    /// Path of the theme file for `name`.
    pub fn theme_file(&self, name: &str) -> PathBuf {
        self.theme_folder_path().join(format!("{name}.toml"))
    }

    /// Whether any schedule entry uses a solar event token.
    pub fn uses_solar_tokens(&self) -> bool {
        self.themes
            .iter()
            .any(|t| SOLAR_TOKENS.contains(&t.time.as_str()))
    }

    /// Validated coordinates, or an error describing what is missing or
    /// malformed. Only called when solar tokens are in use.
    pub fn resolved_coordinates(&self) -> Result<Coordinates> {
        let raw = self
            .coordinates
            .as_ref()
            .context("solar event times require a [coordinates] block in circadian.toml")?;
        let latitude = raw
            .latitude
            .as_ref()
            .context("coordinates.latitude is missing")?
            .as_f64()?;
        let longitude = raw
            .longitude
            .as_ref()
            .context("coordinates.longitude is missing")?
            .as_f64()?;
        Ok(Coordinates {
            latitude,
            longitude,
        })
    }

    /// Log the loaded schedule in the structured output style.
    pub fn log_config(&self) {
        log_block_start!("Loaded configuration");
        log_indented!("Theme folder: {}", self.theme_folder_path().display());
        for theme in &self.themes {
            log_indented!("{} at {}", theme.name, theme.time);
        }
        if let Ok(coords) = self.resolved_coordinates() {
            log_indented!(
                "Coordinates: {:.4}, {:.4}",
                coords.latitude,
                coords.longitude
            );
        }
    }
}
