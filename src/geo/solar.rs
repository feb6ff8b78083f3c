//! Astronomical event times via the sunrise crate.
//!
//! Resolves the five supported solar phases to UTC instants for a given
//! date and location. The calculation is pure: the same inputs always
//! produce the same instant.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Timelike, Utc};
use sunrise::{Coordinates as SolarCoordinates, DawnType, SolarDay, SolarEvent};

use crate::config::Coordinates;

/// One of the five solar event tokens a schedule entry may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolarPhase {
    Dawn,
    Sunrise,
    Noon,
    Sunset,
    Dusk,
}

impl SolarPhase {
    /// Parse a configuration token. Returns None for anything that is not
    /// exactly one of the five lowercase tokens.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "dawn" => Some(SolarPhase::Dawn),
            "sunrise" => Some(SolarPhase::Sunrise),
            "noon" => Some(SolarPhase::Noon),
            "sunset" => Some(SolarPhase::Sunset),
            "dusk" => Some(SolarPhase::Dusk),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SolarPhase::Dawn => "dawn",
            SolarPhase::Sunrise => "sunrise",
            SolarPhase::Noon => "noon",
            SolarPhase::Sunset => "sunset",
            SolarPhase::Dusk => "dusk",
        }
    }
}

/// Truncate to second precision to avoid sub-second comparison issues.
fn truncate_to_second(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

/// Compute the UTC instant of a solar phase for the given date and location.
///
/// Dawn and dusk use civil twilight (sun at -6° elevation). Solar noon is
/// derived as the midpoint of sunrise and sunset, which keeps the phases
/// ordered dawn < sunrise < noon < sunset < dusk wherever all five occur.
pub fn event_time(
    phase: SolarPhase,
    coords: Coordinates,
    date: NaiveDate,
) -> Result<DateTime<Utc>> {
    let coord = SolarCoordinates::new(coords.latitude, coords.longitude).ok_or_else(|| {
        anyhow::anyhow!(
            "coordinates {:.4}, {:.4} are out of range for solar calculations",
            coords.latitude,
            coords.longitude
        )
    })?;
    let solar_day = SolarDay::new(coord, date);

    let instant = match phase {
        SolarPhase::Dawn => solar_day.event_time(SolarEvent::Dawn(DawnType::Civil)),
        SolarPhase::Sunrise => solar_day.event_time(SolarEvent::Sunrise),
        SolarPhase::Noon => {
            let sunrise = solar_day.event_time(SolarEvent::Sunrise);
            let sunset = solar_day.event_time(SolarEvent::Sunset);
            sunrise + (sunset - sunrise) / 2
        }
        SolarPhase::Sunset => solar_day.event_time(SolarEvent::Sunset),
        SolarPhase::Dusk => solar_day.event_time(SolarEvent::Dusk(DawnType::Civil)),
    };

    Ok(truncate_to_second(instant))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: Coordinates = Coordinates {
        latitude: 51.5074,
        longitude: -0.1278,
    };

    fn june_solstice() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 21).unwrap()
    }

    #[test]
    fn test_event_time_deterministic() {
        let a = event_time(SolarPhase::Sunrise, LONDON, june_solstice()).unwrap();
        let b = event_time(SolarPhase::Sunrise, LONDON, june_solstice()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_phase_ordering() {
        let date = june_solstice();
        let dawn = event_time(SolarPhase::Dawn, LONDON, date).unwrap();
        let sunrise = event_time(SolarPhase::Sunrise, LONDON, date).unwrap();
        let noon = event_time(SolarPhase::Noon, LONDON, date).unwrap();
        let sunset = event_time(SolarPhase::Sunset, LONDON, date).unwrap();
        let dusk = event_time(SolarPhase::Dusk, LONDON, date).unwrap();

        assert!(dawn < sunrise);
        assert!(sunrise < noon);
        assert!(noon < sunset);
        assert!(sunset < dusk);
    }

    #[test]
    fn test_second_precision() {
        let sunset = event_time(SolarPhase::Sunset, LONDON, june_solstice()).unwrap();
        assert_eq!(sunset.nanosecond(), 0);
    }

    #[test]
    fn test_token_round_trip() {
        for token in crate::config::SOLAR_TOKENS {
            let phase = SolarPhase::from_token(token).unwrap();
            assert_eq!(phase.as_str(), token);
        }
        assert_eq!(SolarPhase::from_token("midnight"), None);
        assert_eq!(SolarPhase::from_token("Sunrise"), None);
    }
}
