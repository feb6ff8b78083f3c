use chrono::NaiveDate;
use proptest::prelude::*;

use circadianr::config::Coordinates;
use circadianr::geo::solar::{SolarPhase, event_time};
use circadianr::time_spec::TimeSpec;

/// Latitudes where all five solar phases occur year-round. Polar latitudes
/// (midnight sun, polar night) are excluded on purpose.
fn mid_latitude_strategy() -> impl Strategy<Value = f64> {
    -55.0..=55.0
}

fn longitude_strategy() -> impl Strategy<Value = f64> {
    -180.0..=180.0
}

/// Arbitrary dates across several years; day capped at 28 so every month
/// is valid.
fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2020i32..=2030, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

#[cfg(test)]
mod solar_event_tests {
    use super::*;
    use chrono::Timelike;

    proptest! {
        /// The same date and location always resolve to the same instant.
        #[test]
        fn test_event_time_is_deterministic(
            lat in mid_latitude_strategy(),
            lon in longitude_strategy(),
            date in date_strategy()
        ) {
            let coords = Coordinates { latitude: lat, longitude: lon };
            let a = event_time(SolarPhase::Noon, coords, date).unwrap();
            let b = event_time(SolarPhase::Noon, coords, date).unwrap();
            prop_assert_eq!(a, b);
        }

        /// Phases keep their natural order wherever all five occur.
        #[test]
        fn test_phases_are_ordered(
            lat in mid_latitude_strategy(),
            lon in longitude_strategy(),
            date in date_strategy()
        ) {
            let coords = Coordinates { latitude: lat, longitude: lon };
            let dawn = event_time(SolarPhase::Dawn, coords, date).unwrap();
            let sunrise = event_time(SolarPhase::Sunrise, coords, date).unwrap();
            let noon = event_time(SolarPhase::Noon, coords, date).unwrap();
            let sunset = event_time(SolarPhase::Sunset, coords, date).unwrap();
            let dusk = event_time(SolarPhase::Dusk, coords, date).unwrap();

            prop_assert!(dawn < sunrise);
            prop_assert!(sunrise < noon);
            prop_assert!(noon < sunset);
            prop_assert!(sunset < dusk);
        }

        /// Noon sits midway between sunrise and sunset, to the second.
        #[test]
        fn test_noon_is_the_daylight_midpoint(
            lat in mid_latitude_strategy(),
            lon in longitude_strategy(),
            date in date_strategy()
        ) {
            let coords = Coordinates { latitude: lat, longitude: lon };
            let sunrise = event_time(SolarPhase::Sunrise, coords, date).unwrap();
            let noon = event_time(SolarPhase::Noon, coords, date).unwrap();
            let sunset = event_time(SolarPhase::Sunset, coords, date).unwrap();

            let to_noon = (noon - sunrise).num_seconds();
            let from_noon = (sunset - noon).num_seconds();
            prop_assert!((to_noon - from_noon).abs() <= 2,
                "midpoint skew {to_noon} vs {from_noon}");
        }

        /// Resolved instants are truncated to whole seconds.
        #[test]
        fn test_events_have_second_precision(
            lat in mid_latitude_strategy(),
            lon in longitude_strategy(),
            date in date_strategy()
        ) {
            let coords = Coordinates { latitude: lat, longitude: lon };
            let sunset = event_time(SolarPhase::Sunset, coords, date).unwrap();
            prop_assert_eq!(sunset.nanosecond(), 0);
        }
    }
}

#[cfg(test)]
mod time_spec_parse_tests {
    use super::*;
    use chrono::NaiveTime;

    proptest! {
        /// Every valid HH:MM string parses back to the same clock time.
        #[test]
        fn test_clock_spec_round_trip(hour in 0u32..24, minute in 0u32..60) {
            let spec = format!("{hour:02}:{minute:02}");
            let parsed = TimeSpec::parse(&spec).unwrap();
            prop_assert_eq!(
                parsed,
                TimeSpec::Clock(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
            );
        }

        /// Out-of-range components are rejected, not clamped.
        #[test]
        fn test_out_of_range_clock_specs_rejected(
            hour in 24u32..100,
            minute in 60u32..100
        ) {
            let bad_hour = format!("{hour:02}:00");
            let bad_minute = format!("00:{minute:02}");
            prop_assert!(TimeSpec::parse(&bad_hour).is_err());
            prop_assert!(TimeSpec::parse(&bad_minute).is_err());
        }
    }
}
