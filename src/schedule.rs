//! Schedule selection and arming computation.
//!
//! Two questions drive the daemon: "whose turn is it right now" (answered by
//! [`select_current`]) and "when does each theme fire next" (answered by
//! [`next_occurrence`]). Both anchor every entry's time-of-day to the
//! reference instant's UTC calendar date, seconds zeroed, and both carry the
//! same one-second bias so the exact boundary instant counts as "just
//! occurred" on one side and never double-fires on the other.

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Timelike, Utc};
use std::time::Duration as StdDuration;

use crate::config::ThemeEntry;
use crate::time_spec::TimeSpecResolver;

/// A theme's next scheduled switch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Occurrence {
    /// The instant the switch lands on (today or tomorrow).
    pub instant: DateTime<Utc>,
    /// Timer delay from the reference instant, one-second debounce included.
    pub delay: StdDuration,
}

/// Plant the resolved instant's hour and minute on `now`'s UTC calendar
/// date with seconds zeroed. Selection and arming always anchor to "today"
/// relative to the reference instant, regardless of the date the resolver
/// produced.
fn candidate_on(now: DateTime<Utc>, resolved: DateTime<Utc>) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(resolved.hour(), resolved.minute(), 0)
        .expect("hour and minute come from a valid instant");
    Utc.from_utc_datetime(&now.date_naive().and_time(time))
}

/// Determine which entry's scheduled time most recently elapsed.
///
/// Elapsed seconds are truncated and biased by +1 so a switch time equal to
/// `now` qualifies. Ties keep the first entry in list order. When every
/// candidate is still ahead of `now` (e.g. the daemon started at 00:01 and
/// the earliest theme is at 06:00), the schedule wraps cyclically: the entry
/// with the largest time-of-day is yesterday's last theme and wins.
pub fn select_current<'a>(
    entries: &'a [ThemeEntry],
    resolver: &TimeSpecResolver,
    now: DateTime<Utc>,
) -> Result<&'a ThemeEntry> {
    if entries.is_empty() {
        anyhow::bail!("no themes specified in circadian config");
    }

    let mut nearest_past: Option<(&ThemeEntry, i64)> = None;
    let mut latest_of_day: Option<(&ThemeEntry, DateTime<Utc>)> = None;

    for entry in entries {
        let resolved = resolver.resolve(&entry.time, now)?;
        let candidate = candidate_on(now, resolved);
        let elapsed = (now - candidate).num_seconds() + 1;

        if elapsed > 0 && nearest_past.is_none_or(|(_, best)| elapsed < best) {
            nearest_past = Some((entry, elapsed));
        }
        if latest_of_day.is_none_or(|(_, latest)| candidate > latest) {
            latest_of_day = Some((entry, candidate));
        }
    }

    match nearest_past {
        Some((entry, _)) => Ok(entry),
        None => {
            let (entry, _) = latest_of_day.expect("entries are non-empty");
            Ok(entry)
        }
    }
}

/// Compute an entry's next occurrence relative to `now`.
///
/// If today's planted candidate is strictly before `now`, the next
/// occurrence is the same time-of-day advanced by exactly one calendar day;
/// otherwise it is today's candidate. The past/future decision is made on
/// the planted candidate, never on the raw resolved instant: the two sit on
/// different UTC dates whenever a local wall-clock time maps across the UTC
/// date boundary, and only the candidate keeps the occurrence inside the
/// next 24 hours. The returned delay is whole seconds plus the one-second
/// debounce.
pub fn next_occurrence(
    entry: &ThemeEntry,
    resolver: &TimeSpecResolver,
    now: DateTime<Utc>,
) -> Result<Occurrence> {
    let resolved = resolver.resolve(&entry.time, now)?;
    let mut instant = candidate_on(now, resolved);
    if instant < now {
        instant += Duration::days(1);
    }

    let delay_secs = (instant - now).num_seconds() + 1;
    Ok(Occurrence {
        instant,
        delay: StdDuration::from_secs(delay_secs as u64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn entry(name: &str, time: &str) -> ThemeEntry {
        ThemeEntry {
            name: name.to_string(),
            time: time.to_string(),
        }
    }

    fn three_entries() -> Vec<ThemeEntry> {
        vec![
            entry("morning", "10:00"),
            entry("afternoon", "14:00"),
            entry("evening", "18:00"),
        ]
    }

    /// A UTC instant whose local wall-clock time is `hour:minute` today.
    fn local_today(hour: u32, minute: u32) -> DateTime<Utc> {
        let date = Local::now().date_naive();
        let naive = date.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap());
        Local
            .from_local_datetime(&naive)
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_select_nearest_past() {
        let entries = three_entries();
        let resolver = TimeSpecResolver::new(None);
        let now = local_today(15, 0);
        let selected = select_current(&entries, &resolver, now).unwrap();
        assert_eq!(selected.name, "afternoon");
    }

    #[test]
    fn test_select_at_exact_boundary() {
        // The +1 bias makes the boundary instant count as "just occurred".
        let entries = three_entries();
        let resolver = TimeSpecResolver::new(None);
        let now = local_today(14, 0);
        let selected = select_current(&entries, &resolver, now).unwrap();
        assert_eq!(selected.name, "afternoon");
    }

    #[test]
    fn test_select_wraps_before_first_entry() {
        // Before every entry the schedule is cyclic: yesterday's last theme
        // is still current. The fatal-error alternative is not implemented.
        let entries = three_entries();
        let resolver = TimeSpecResolver::new(None);
        let now = local_today(9, 0);
        let selected = select_current(&entries, &resolver, now).unwrap();
        assert_eq!(selected.name, "evening");
    }

    #[test]
    fn test_select_tie_keeps_list_order() {
        let entries = vec![entry("first", "12:00"), entry("second", "12:00")];
        let resolver = TimeSpecResolver::new(None);
        let now = local_today(13, 0);
        let selected = select_current(&entries, &resolver, now).unwrap();
        assert_eq!(selected.name, "first");
    }

    #[test]
    fn test_select_empty_schedule_errors() {
        let resolver = TimeSpecResolver::new(None);
        assert!(select_current(&[], &resolver, Utc::now()).is_err());
    }

    #[test]
    fn test_next_occurrence_upcoming_today() {
        let resolver = TimeSpecResolver::new(None);
        let now = local_today(9, 0);
        let occurrence = next_occurrence(&entry("morning", "10:00"), &resolver, now).unwrap();
        assert_eq!(occurrence.instant - now, Duration::hours(1));
        assert_eq!(occurrence.delay, StdDuration::from_secs(3601));
    }

    #[test]
    fn test_next_occurrence_past_rolls_to_tomorrow() {
        let resolver = TimeSpecResolver::new(None);
        let now = local_today(15, 0);
        let occurrence = next_occurrence(&entry("morning", "10:00"), &resolver, now).unwrap();
        // Same clock time, exactly one calendar day later.
        assert_eq!(occurrence.instant - now, Duration::hours(19));
        let local = occurrence.instant.with_timezone(&Local);
        assert_eq!(local.hour(), 10);
        assert_eq!(local.minute(), 0);
        assert_eq!(
            local.date_naive(),
            Local::now().date_naive() + Duration::days(1)
        );
    }

    #[test]
    fn test_next_occurrence_at_exact_boundary() {
        let resolver = TimeSpecResolver::new(None);
        let now = local_today(10, 0);
        // Only instants strictly before now roll to tomorrow; the boundary
        // itself stays today and fires after the one-second debounce.
        let occurrence = next_occurrence(&entry("morning", "10:00"), &resolver, now).unwrap();
        assert_eq!(occurrence.instant, now);
        assert_eq!(occurrence.delay, StdDuration::from_secs(1));
    }

    #[test]
    fn test_unknown_spec_propagates() {
        let resolver = TimeSpecResolver::new(None);
        assert!(next_occurrence(&entry("bad", "25:99"), &resolver, Utc::now()).is_err());
    }
}
