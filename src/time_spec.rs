//! Time specifier parsing and resolution.
//!
//! A schedule entry's `time` field is either one of the five solar event
//! tokens or an explicit clock time in strict `HH:MM` form. Resolution turns
//! a specifier into a concrete UTC instant on the reference instant's
//! calendar date; clock times are interpreted in the process's local time
//! zone before conversion.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, LocalResult, NaiveTime, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;

use crate::config::Coordinates;
use crate::geo::{SolarPhase, solar};

/// Strict two-digit-colon-two-digit pattern. No seconds, no single digits.
fn clock_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{2}:\d{2}$").expect("valid clock regex"))
}

/// A parsed time specifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeSpec {
    /// A solar event resolved per-date from the configured coordinates.
    Solar(SolarPhase),
    /// A fixed local wall-clock time, minute precision.
    Clock(NaiveTime),
}

impl TimeSpec {
    /// Parse a specifier string.
    ///
    /// Anything that is not a solar token must match `HH:MM` exactly with
    /// hour 00-23 and minute 00-59; `24:00` and seconds are rejected.
    pub fn parse(spec: &str) -> Result<TimeSpec> {
        if let Some(phase) = SolarPhase::from_token(spec) {
            return Ok(TimeSpec::Solar(phase));
        }

        if !clock_pattern().is_match(spec) {
            anyhow::bail!("unknown time format {spec:?} (expected a solar event or HH:MM)");
        }
        let (hour_str, minute_str) = spec.split_once(':').expect("pattern guarantees a colon");
        let hour: u32 = hour_str.parse().expect("pattern guarantees digits");
        let minute: u32 = minute_str.parse().expect("pattern guarantees digits");

        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .with_context(|| format!("time {spec:?} is out of range"))?;
        Ok(TimeSpec::Clock(time))
    }
}

/// Resolves time specifiers against the configured coordinates.
///
/// Coordinates are optional at construction; they are only consulted for
/// solar specifiers, and their presence is guaranteed by startup validation
/// whenever the schedule contains solar tokens.
#[derive(Debug, Clone, Copy)]
pub struct TimeSpecResolver {
    coords: Option<Coordinates>,
}

impl TimeSpecResolver {
    pub fn new(coords: Option<Coordinates>) -> Self {
        Self { coords }
    }

    /// Resolve a specifier to a UTC instant on the reference instant's
    /// calendar date. Clock times are interpreted in the process's local
    /// time zone before conversion to UTC.
    pub fn resolve(&self, spec: &str, reference: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let date = reference.date_naive();
        match TimeSpec::parse(spec)? {
            TimeSpec::Solar(phase) => {
                let coords = self
                    .coords
                    .context("solar event times require configured coordinates")?;
                solar::event_time(phase, coords, date)
            }
            TimeSpec::Clock(time) => {
                let naive = date.and_time(time);
                let local = match Local.from_local_datetime(&naive) {
                    LocalResult::Single(dt) => dt,
                    // DST fall-back repeats an hour; take the earlier mapping
                    LocalResult::Ambiguous(earliest, _) => earliest,
                    LocalResult::None => {
                        anyhow::bail!("local time {naive} does not exist (DST gap)")
                    }
                };
                Ok(local.with_timezone(&Utc))
            }
        }
    }
}
