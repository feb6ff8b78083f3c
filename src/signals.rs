//! Signal handling for the circadianr daemon.
//!
//! Unix termination signals and the D-Bus system monitors all funnel into
//! one mpsc channel of [`SignalMessage`] values, processed by the
//! scheduler's event thread.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    sync::mpsc::{Receiver, Sender, channel},
    thread,
};

/// Unified message type for all asynchronous events.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalMessage {
    /// Shutdown signal (SIGTERM, SIGINT, SIGHUP)
    Shutdown,
    /// Sleep event from systemd-logind (going to sleep or resuming)
    Sleep { resuming: bool },
    /// Discontinuous system clock change detected
    TimeChange,
}

/// Signal handling state shared between threads.
pub struct SignalState {
    /// Atomic flag indicating if the daemon should keep running
    pub running: Arc<AtomicBool>,
    /// Channel receiver for unified signal messages
    pub signal_receiver: Receiver<SignalMessage>,
    /// Channel sender for unified signal messages (shared with the D-Bus monitors)
    pub signal_sender: Sender<SignalMessage>,
}

/// Install the termination signal handler thread.
///
/// SIGTERM, SIGINT, and SIGHUP all clear the running flag and post a
/// [`SignalMessage::Shutdown`] so the scheduler can cancel its armed timers
/// and exit cleanly.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));
    let (signal_sender, signal_receiver) = channel();

    let mut signals =
        Signals::new([SIGTERM, SIGINT, SIGHUP]).context("failed to register signal handlers")?;

    let running_flag = Arc::clone(&running);
    let sender = signal_sender.clone();
    thread::spawn(move || {
        for signal in signals.forever() {
            if debug_enabled {
                log_pipe!();
                log_debug!("Received termination signal {}", signal);
            }
            running_flag.store(false, Ordering::SeqCst);
            if sender.send(SignalMessage::Shutdown).is_err() {
                // Event thread is gone; nothing left to notify.
                break;
            }
        }
    });

    Ok(SignalState {
        running,
        signal_receiver,
        signal_sender,
    })
}
