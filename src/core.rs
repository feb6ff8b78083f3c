//! Core scheduling loop and timer management.
//!
//! The daemon's steady state is a cycle: apply the currently-due theme at
//! startup, arm one cancellable timer per schedule entry for its next
//! occurrence, block until every timer of the cycle has fired or been
//! cancelled, then re-arm for the next day. A separate event thread reacts
//! to sleep/resume, clock changes, and termination signals by cancelling
//! the armed timers; the main loop observes its wait set emptying and
//! re-arms (or exits) as usual, so no special-case states are needed.

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::Config;
use crate::schedule;
use crate::signals::{SignalMessage, SignalState};
use crate::theme::{ThemeApplier, ThemeColorData};
use crate::time_spec::TimeSpecResolver;

/// Cancellation control for one armed timer.
///
/// Cancellation is cooperative: a timer that is already executing its fire
/// action completes it; a timer still waiting on its deadline wakes up and
/// exits without firing. Each timer fires at most once.
pub struct TimerControl {
    cancelled: Mutex<bool>,
    signal: Condvar,
}

impl TimerControl {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            cancelled: Mutex::new(false),
            signal: Condvar::new(),
        })
    }

    /// Request cancellation and wake the waiting timer thread.
    pub fn cancel(&self) {
        let mut cancelled = match self.cancelled.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *cancelled = true;
        self.signal.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        match self.cancelled.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Arm a timer thread that runs `action` after `delay` unless the control
/// is cancelled first.
pub fn arm_timer(
    delay: Duration,
    control: Arc<TimerControl>,
    action: impl FnOnce() + Send + 'static,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let guard = match control.cancelled.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let (guard, wait) = control
            .signal
            .wait_timeout_while(guard, delay, |cancelled| !*cancelled)
            .unwrap_or_else(|poisoned| {
                let (guard, wait) = poisoned.into_inner();
                (guard, wait)
            });
        let fire = !*guard && wait.timed_out();
        drop(guard);
        if fire {
            action();
        }
    })
}

/// The current cycle's cancel handles.
///
/// Armed by the scheduler loop, cancelled by the event thread; the
/// collection itself is mutex-guarded against that concurrent access.
/// Join handles never live here; they stay with the loop that arms them.
pub struct CycleTimers {
    controls: Mutex<Vec<Arc<TimerControl>>>,
}

impl CycleTimers {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            controls: Mutex::new(Vec::new()),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Arc<TimerControl>>> {
        match self.controls.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn register(&self, control: Arc<TimerControl>) {
        self.lock().push(control);
    }

    /// Cancel every armed timer. Returns how many controls were signalled.
    pub fn cancel_all(&self) -> usize {
        let controls = self.lock();
        for control in controls.iter() {
            control.cancel();
        }
        controls.len()
    }

    /// Drop the controls of a completed cycle.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn armed_count(&self) -> usize {
        self.lock().len()
    }
}

/// Dependencies needed to build a [`Scheduler`].
pub struct SchedulerParams {
    pub config: Config,
    pub applier: Arc<ThemeApplier>,
    pub signal_state: SignalState,
    pub debug_enabled: bool,
}

/// Shared state between the scheduler loop and its event thread.
struct SchedulerContext {
    config: Config,
    resolver: TimeSpecResolver,
    applier: Arc<ThemeApplier>,
    timers: Arc<CycleTimers>,
    running: Arc<AtomicBool>,
}

impl SchedulerContext {
    /// Select and apply the theme that is currently due.
    fn apply_current(&self) -> Result<()> {
        let now = Utc::now();
        let entry = schedule::select_current(&self.config.themes, &self.resolver, now)?;
        let data = ThemeColorData::load(&entry.name, &self.config.theme_file(&entry.name))?;
        log_block_start!("Applying currently due theme: {}", entry.name);
        self.applier.apply(&data);
        Ok(())
    }

    /// Cancel all armed timers and immediately re-apply the current theme.
    fn resync(&self, reason: &str) {
        log_block_start!("Resyncing after {reason}");
        let cancelled = self.timers.cancel_all();
        log_indented!("Cancelled {cancelled} pending timer(s)");
        if let Err(e) = self.apply_current() {
            log_pipe!();
            log_error!("Resync failed: {:#}", e);
        }
    }
}

/// The daemon's scheduling state machine.
pub struct Scheduler {
    ctx: Arc<SchedulerContext>,
    signal_state: SignalState,
    debug_enabled: bool,
}

impl Scheduler {
    pub fn new(params: SchedulerParams) -> Result<Self> {
        let coords = if params.config.uses_solar_tokens() {
            Some(params.config.resolved_coordinates()?)
        } else {
            None
        };
        let ctx = Arc::new(SchedulerContext {
            resolver: TimeSpecResolver::new(coords),
            applier: params.applier,
            timers: CycleTimers::new(),
            running: Arc::clone(&params.signal_state.running),
            config: params.config,
        });
        Ok(Self {
            ctx,
            signal_state: params.signal_state,
            debug_enabled: params.debug_enabled,
        })
    }

    /// Run the daemon loop until a shutdown signal arrives.
    ///
    /// Errors from the startup and cycle-arming paths (fatal configuration
    /// problems) propagate to the caller; this function never exits the
    /// process itself.
    pub fn run(self) -> Result<()> {
        let Self {
            ctx,
            signal_state,
            debug_enabled,
        } = self;

        ctx.apply_current()
            .context("failed to apply the startup theme")?;

        let receiver = signal_state.signal_receiver;
        let event_ctx = Arc::clone(&ctx);
        thread::spawn(move || {
            for message in receiver.iter() {
                match message {
                    SignalMessage::Shutdown => {
                        log_block_start!("Shutdown requested, cancelling armed timers");
                        event_ctx.running.store(false, Ordering::SeqCst);
                        event_ctx.timers.cancel_all();
                        break;
                    }
                    SignalMessage::Sleep { resuming: false } => {
                        log_block_start!("System entering sleep/suspend");
                    }
                    SignalMessage::Sleep { resuming: true } => {
                        event_ctx.resync("resume from sleep/suspend");
                    }
                    SignalMessage::TimeChange => {
                        event_ctx.resync("system clock change");
                    }
                }
            }
        });

        while ctx.running.load(Ordering::SeqCst) {
            let handles = Self::arm_cycle(&ctx, debug_enabled)?;
            for handle in handles {
                let _ = handle.join();
            }
            ctx.timers.clear();
        }

        Ok(())
    }

    /// Arm one timer per schedule entry for its next occurrence.
    ///
    /// Theme data is loaded here, in the arming path, where a missing theme
    /// file is a fatal configuration error. The timer actions themselves
    /// only merge and write under the applier's lock.
    fn arm_cycle(ctx: &Arc<SchedulerContext>, debug_enabled: bool) -> Result<Vec<JoinHandle<()>>> {
        let now = Utc::now();
        log_block_start!("Arming theme switch timers");

        let mut handles = Vec::with_capacity(ctx.config.themes.len());
        for entry in &ctx.config.themes {
            let data = ThemeColorData::load(&entry.name, &ctx.config.theme_file(&entry.name))?;
            let occurrence = schedule::next_occurrence(entry, &ctx.resolver, now)?;

            let control = TimerControl::new();
            ctx.timers.register(Arc::clone(&control));

            let applier = Arc::clone(&ctx.applier);
            let name = entry.name.clone();
            handles.push(arm_timer(occurrence.delay, control, move || {
                log_block_start!("Switching theme to {name}");
                applier.apply(&data);
            }));

            log_indented!(
                "{} at {}",
                entry.name,
                occurrence
                    .instant
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S")
            );
            if debug_enabled {
                log_indented!("delay {}s", occurrence.delay.as_secs());
            }
        }

        // A shutdown that raced the arming above must not leave fresh
        // timers waiting out their full delays.
        if !ctx.running.load(Ordering::SeqCst) {
            ctx.timers.cancel_all();
        }

        Ok(handles)
    }
}
