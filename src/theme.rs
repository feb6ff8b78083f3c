//! Theme loading and application to the live Alacritty configuration.
//!
//! The applier owns the live configuration document for the process
//! lifetime. Applying a theme replaces only the `colors` table and rewrites
//! the destination file; every other key is preserved untouched. The whole
//! merge + serialize + write span runs under one process-wide lock so a
//! scheduled fire and a wake-triggered resync can never interleave writes.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use toml::{Table, Value};

/// Read-only snapshot of one theme's color block.
///
/// Loaded in the scheduling path (where a missing or colorless theme file
/// is a fatal configuration error) and handed to timer actions, which only
/// merge and write.
#[derive(Debug, Clone)]
pub struct ThemeColorData {
    pub name: String,
    colors: Value,
}

impl ThemeColorData {
    /// Load a theme snapshot from `path`.
    pub fn load(name: &str, path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("theme {} is not installed in {}", name, path.display());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read theme file {}", path.display()))?;
        let table: Table = toml::from_str(&contents)
            .with_context(|| format!("failed to parse theme file {}", path.display()))?;
        let colors = table
            .get("colors")
            .cloned()
            .with_context(|| format!("theme file {} has no colors block", path.display()))?;
        Ok(Self {
            name: name.to_string(),
            colors,
        })
    }
}

/// Applies theme color blocks to the live configuration under mutual
/// exclusion and persists the result.
pub struct ThemeApplier {
    dest: PathBuf,
    live: Mutex<Table>,
}

impl ThemeApplier {
    /// Load the live configuration from `source`; switches will be written
    /// to `dest`.
    pub fn load(source: &Path, dest: PathBuf) -> Result<Self> {
        if !source.exists() {
            anyhow::bail!(
                "critical file {} does not exist, check your configuration",
                source.display()
            );
        }
        let contents = fs::read_to_string(source)
            .with_context(|| format!("failed to read {}", source.display()))?;
        let live: Table = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", source.display()))?;
        Ok(Self {
            dest,
            live: Mutex::new(live),
        })
    }

    /// Merge the theme's colors into the live configuration and rewrite the
    /// destination file.
    ///
    /// A destination that cannot be written is logged and swallowed; the
    /// next scheduled switch retries naturally.
    pub fn apply(&self, theme: &ThemeColorData) {
        let mut live = match self.live.lock() {
            Ok(guard) => guard,
            // A panicked fire action never leaves a half-merged document:
            // the merge below is the first mutation under the lock.
            Err(poisoned) => poisoned.into_inner(),
        };
        live.insert("colors".to_string(), theme.colors.clone());

        let serialized = match toml::to_string(&*live) {
            Ok(s) => s,
            Err(e) => {
                log_pipe!();
                log_error!("failed to serialize configuration for {}: {}", theme.name, e);
                return;
            }
        };
        if let Err(e) = fs::write(&self.dest, serialized) {
            log_pipe!();
            log_warning!("{} not writable: {}", self.dest.display(), e);
        }
    }

    /// Current in-memory configuration (primarily for tests and debugging).
    pub fn snapshot(&self) -> Table {
        match self.live.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Destination path switches are written to.
    pub fn dest(&self) -> &Path {
        &self.dest
    }
}
