//! Single-instance enforcement.
//!
//! Two daemons rewriting the same alacritty.toml would race each other, so
//! startup takes an exclusive advisory lock on a well-known lock file and
//! refuses to run when it is already held.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

/// Holds the exclusive lock for the process lifetime.
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

/// Lock file location: `$XDG_RUNTIME_DIR/circadianr.lock`, falling back to
/// the system temp directory.
pub fn lock_path() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("circadianr.lock")
}

/// Acquire the single-instance lock, writing our pid for diagnostics.
pub fn acquire() -> Result<LockGuard> {
    let path = lock_path();
    let mut file = File::create(&path)
        .with_context(|| format!("failed to create lock file {}", path.display()))?;

    file.try_lock_exclusive().map_err(|_| {
        anyhow::anyhow!(
            "another circadianr instance is already running (lock held on {})",
            path.display()
        )
    })?;

    let _ = writeln!(file, "{}", std::process::id());
    Ok(LockGuard { file, path })
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = fs::remove_file(&self.path);
    }
}
