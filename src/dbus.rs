//! System event monitoring.
//!
//! Two kernel/session mechanisms can invalidate armed timers:
//!
//! - Sleep/resume, observed via the systemd-logind `PrepareForSleep` signal
//!   over the system D-Bus (zbus blocking API).
//! - Discontinuous system clock changes (manual adjustment, NTP jump),
//!   observed via a timerfd armed with `TFD_TIMER_CANCEL_ON_SET`.
//!
//! Each monitor runs in its own thread and posts a [`SignalMessage`] to the
//! scheduler's event channel. Both degrade gracefully: when D-Bus or timerfd
//! is unavailable the daemon keeps running without that detection.

use anyhow::{Context, Result};
use nix::errno::Errno;
use nix::sys::time::TimeSpec;
use nix::sys::timerfd::{ClockId, Expiration, TimerFd, TimerFlags, TimerSetTimeFlags};
use std::sync::mpsc::Sender;
use std::thread;

use crate::signals::SignalMessage;

/// D-Bus proxy trait for the systemd-logind Manager interface.
#[zbus::proxy(
    interface = "org.freedesktop.login1.Manager",
    default_service = "org.freedesktop.login1",
    default_path = "/org/freedesktop/login1"
)]
trait LogindManager {
    /// PrepareForSleep signal emitted by systemd-logind.
    ///
    /// `start == true` means the system is about to suspend;
    /// `start == false` means it is resuming.
    #[zbus(signal)]
    fn prepare_for_sleep(&self, start: bool) -> zbus::Result<()>;
}

/// Start the sleep/resume and clock-change monitors in dedicated threads.
pub fn start_system_monitors(signal_sender: Sender<SignalMessage>, debug_enabled: bool) {
    let sleep_sender = signal_sender.clone();
    thread::spawn(move || {
        if let Err(e) = monitor_sleep_signals(sleep_sender, debug_enabled) {
            log_pipe!();
            log_warning!("Sleep/resume monitoring unavailable: {}", e);
            log_indented!("Timers will not be refreshed after suspend");
        }
    });

    thread::spawn(move || {
        if let Err(e) = monitor_time_changes(signal_sender, debug_enabled) {
            log_pipe!();
            log_warning!("System time change monitoring unavailable: {}", e);
            log_indented!("Timers will not be refreshed after clock adjustments");
        }
    });
}

/// Monitor PrepareForSleep signals on the system bus.
fn monitor_sleep_signals(signal_sender: Sender<SignalMessage>, debug_enabled: bool) -> Result<()> {
    let connection =
        zbus::blocking::Connection::system().context("failed to connect to system D-Bus")?;
    let logind_proxy =
        LogindManagerProxyBlocking::new(&connection).context("failed to create logind proxy")?;
    let mut sleep_signals = logind_proxy
        .receive_prepare_for_sleep()
        .context("failed to subscribe to PrepareForSleep signals")?;

    if debug_enabled {
        log_pipe!();
        log_debug!("Subscribed to systemd-logind PrepareForSleep signals");
    }

    loop {
        let Some(signal) = sleep_signals.next() else {
            anyhow::bail!("D-Bus connection lost, PrepareForSleep signal stream ended");
        };
        match signal.args() {
            Ok(args) => {
                let resuming = !args.start;
                if signal_sender
                    .send(SignalMessage::Sleep { resuming })
                    .is_err()
                {
                    // Channel disconnected; the daemon is exiting.
                    return Ok(());
                }
            }
            Err(e) => {
                log_pipe!();
                log_warning!("Failed to parse PrepareForSleep arguments: {}", e);
            }
        }
    }
}

/// Clock-change detector built on timerfd.
///
/// A CLOCK_REALTIME timer armed far in the future with
/// `TFD_TIMER_CANCEL_ON_SET` fails with ECANCELED whenever the system
/// clock undergoes a discontinuous change.
struct TimeChangeDetector {
    timer: TimerFd,
}

impl TimeChangeDetector {
    fn new() -> nix::Result<Self> {
        let timer = TimerFd::new(ClockId::CLOCK_REALTIME, TimerFlags::empty())?;
        let mut detector = TimeChangeDetector { timer };
        detector.arm()?;
        Ok(detector)
    }

    fn arm(&mut self) -> nix::Result<()> {
        let flags =
            TimerSetTimeFlags::TFD_TIMER_ABSTIME | TimerSetTimeFlags::TFD_TIMER_CANCEL_ON_SET;
        // Far enough in the future that normal expiry never happens.
        let far_future = TimeSpec::new(i64::MAX / 1000, 0);
        self.timer.set(Expiration::OneShot(far_future), flags)
    }

    /// Block until a clock change occurs. Returns after re-arming.
    fn wait_for_time_change(&mut self) -> Result<()> {
        match self.timer.wait() {
            // ECANCELED is the event we are waiting for.
            Err(Errno::ECANCELED) => self.arm().context("failed to re-arm timerfd"),
            // Expiry should be unreachable; treat a jump past the deadline
            // as a time change as well.
            Ok(_) => self.arm().context("failed to re-arm timerfd"),
            Err(e) => anyhow::bail!("timerfd wait error: {e}"),
        }
    }
}

/// Monitor discontinuous system clock changes.
fn monitor_time_changes(signal_sender: Sender<SignalMessage>, debug_enabled: bool) -> Result<()> {
    let mut detector = TimeChangeDetector::new().context("failed to create timerfd detector")?;

    if debug_enabled {
        log_pipe!();
        log_debug!("Watching for system clock changes via timerfd");
    }

    loop {
        detector.wait_for_time_change()?;
        if signal_sender.send(SignalMessage::TimeChange).is_err() {
            // Channel disconnected; the daemon is exiting.
            return Ok(());
        }
    }
}
