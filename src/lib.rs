//! Automatic Alacritty theme switching by time of day or solar events.
//!
//! circadianr is a small daemon that reads a `circadian.toml` schedule,
//! computes when each theme becomes active (fixed `HH:MM` clock times or
//! solar events like `sunrise` and `dusk`), applies the currently-due theme
//! at startup, and then sleeps on cancellable timers until the next switch.
//! Sleep/resume and system clock changes resynchronize the schedule.

#[macro_use]
pub mod logger;

pub mod args;
pub mod circadianr;
pub mod config;
pub mod core;
pub mod dbus;
pub mod geo;
pub mod lock;
pub mod schedule;
pub mod signals;
pub mod theme;
pub mod time_spec;

pub use circadianr::Circadianr;
