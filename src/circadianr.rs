//! Application coordinator.
//!
//! Wires the pieces together in startup order: resolve paths, load and
//! validate the schedule, take the single-instance lock, load the live
//! alacritty configuration, install the signal handler and system monitors,
//! then hand control to the scheduler until shutdown.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config;
use crate::core::{Scheduler, SchedulerParams};
use crate::dbus;
use crate::lock;
use crate::signals;
use crate::theme::ThemeApplier;

/// Fully resolved daemon settings.
pub struct Circadianr {
    debug_enabled: bool,
    circadian_path: PathBuf,
    alacritty_source: PathBuf,
    alacritty_dest: PathBuf,
}

impl Circadianr {
    /// Resolve CLI path overrides against the XDG defaults.
    ///
    /// The destination defaults to the source, which itself defaults to
    /// `$XDG_CONFIG_HOME/alacritty/alacritty.toml`.
    pub fn from_cli(
        debug_enabled: bool,
        circadian_path: Option<String>,
        alacritty_source: Option<String>,
        alacritty_dest: Option<String>,
    ) -> Result<Self> {
        let circadian_path = match circadian_path {
            Some(p) => config::expand_tilde(&p),
            None => config::default_circadian_path()?,
        };
        let alacritty_source = match alacritty_source {
            Some(p) => config::expand_tilde(&p),
            None => config::default_alacritty_path()?,
        };
        let alacritty_dest = match alacritty_dest {
            Some(p) => config::expand_tilde(&p),
            None => alacritty_source.clone(),
        };
        Ok(Self {
            debug_enabled,
            circadian_path,
            alacritty_source,
            alacritty_dest,
        })
    }

    /// Run the daemon to completion.
    pub fn run(self) -> Result<()> {
        log_version!();

        let config = config::load_from_path(&self.circadian_path)?;
        config::validate_config(&config)?;
        config.log_config();

        if self.alacritty_source == self.alacritty_dest {
            log_pipe!();
            log_warning!(
                "{} will be rewritten in place; comments and formatting are not preserved",
                self.alacritty_dest.display()
            );
        }

        // Held until run() returns; a second instance fails fast.
        let _lock = lock::acquire()?;

        let applier = Arc::new(ThemeApplier::load(
            &self.alacritty_source,
            self.alacritty_dest,
        )?);

        let signal_state = signals::setup_signal_handler(self.debug_enabled)?;
        dbus::start_system_monitors(signal_state.signal_sender.clone(), self.debug_enabled);

        let scheduler = Scheduler::new(SchedulerParams {
            config,
            applier,
            signal_state,
            debug_enabled: self.debug_enabled,
        })?;
        scheduler.run()?;

        log_block_start!("Shutting down circadianr");
        log_end!();
        Ok(())
    }
}
