//! Position provider seam.
//!
//! The astronomical work — Julian day conversion, planetary longitudes,
//! house cusps — lives in an external ephemeris. This module defines the
//! contract the chart builder consumes ([`PositionSource`]), a fixture
//! implementation for tests and offline use, and (behind the `swisseph`
//! feature) an adapter over the Swiss Ephemeris crate configured for
//! sidereal Lahiri positions with Placidus houses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{normalize_360, CelestialBody, KundliError, ALL_BODIES};

/// Bodies queried from a position source: everything except Ketu,
/// which is always derived from Rahu.
pub const TRACKED_BODIES: [CelestialBody; 11] = [
    CelestialBody::Sun,
    CelestialBody::Moon,
    CelestialBody::Mars,
    CelestialBody::Mercury,
    CelestialBody::Jupiter,
    CelestialBody::Venus,
    CelestialBody::Saturn,
    CelestialBody::Rahu,
    CelestialBody::Uranus,
    CelestialBody::Neptune,
    CelestialBody::Pluto,
];

/// Sidereal longitude and signed angular speed of one body.
/// Negative speed means retrograde motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyPosition {
    pub longitude: f64,
    pub speed: f64,
}

/// One instant's worth of raw positions: every tracked body plus the
/// sidereal ascendant longitude. Entries keep query order so downstream
/// output is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSet {
    pub positions: Vec<(CelestialBody, BodyPosition)>,
    pub ascendant: f64,
}

impl PositionSet {
    pub fn get(&self, body: CelestialBody) -> Option<BodyPosition> {
        self.positions
            .iter()
            .find(|(b, _)| *b == body)
            .map(|(_, p)| *p)
    }

    /// Append Ketu at Rahu + 180°, speed 0 (a computed point, never
    /// retrograde). No-op when Rahu is absent or Ketu already present.
    pub fn with_ketu(mut self) -> Self {
        if self.get(CelestialBody::Ketu).is_some() {
            return self;
        }
        if let Some(rahu) = self.get(CelestialBody::Rahu) {
            self.positions.push((
                CelestialBody::Ketu,
                BodyPosition {
                    longitude: normalize_360(rahu.longitude + 180.0),
                    speed: 0.0,
                },
            ));
        }
        self
    }

    /// Bodies in chart order (the fixed `ALL_BODIES` sequence), skipping
    /// any the source did not supply.
    pub fn bodies_in_chart_order(&self) -> impl Iterator<Item = (CelestialBody, BodyPosition)> + '_ {
        ALL_BODIES
            .iter()
            .filter_map(move |b| self.get(*b).map(|p| (*b, p)))
    }
}

/// External contract: sidereal longitudes, speeds and the ascendant for
/// a civil instant (already UTC) at a geographic location.
pub trait PositionSource {
    fn positions(
        &self,
        instant: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
        bodies: &[CelestialBody],
    ) -> Result<PositionSet, KundliError>;
}

// ---------------------------
// ## Fixture source
// ---------------------------

/// In-memory position table. Used by tests and by callers that obtained
/// positions elsewhere; ignores the instant and location.
#[derive(Debug, Clone, Default)]
pub struct FixedPositions {
    entries: Vec<(CelestialBody, BodyPosition)>,
    ascendant: f64,
}

impl FixedPositions {
    pub fn new(ascendant: f64) -> Self {
        FixedPositions {
            entries: Vec::new(),
            ascendant,
        }
    }

    pub fn with_body(mut self, body: CelestialBody, longitude: f64, speed: f64) -> Self {
        self.entries.push((body, BodyPosition { longitude, speed }));
        self
    }

    /// Reference chart: 1998-05-06 09:20 UTC+5:30 at 30.7167N 76.8833E.
    /// Longitudes are fixture values for demo and golden tests, not a
    /// live ephemeris read.
    pub fn example() -> Self {
        FixedPositions::new(99.0)
            .with_body(CelestialBody::Sun, 21.8, 0.96)
            .with_body(CelestialBody::Moon, 48.0, 13.2)
            .with_body(CelestialBody::Mars, 37.0, 0.65)
            .with_body(CelestialBody::Mercury, 10.0, 1.3)
            .with_body(CelestialBody::Jupiter, 330.0, -0.05)
            .with_body(CelestialBody::Venus, 352.5, 1.2)
            .with_body(CelestialBody::Saturn, 5.0, 0.11)
            .with_body(CelestialBody::Rahu, 145.0, -0.05)
            .with_body(CelestialBody::Uranus, 317.0, -0.02)
            .with_body(CelestialBody::Neptune, 301.5, 0.01)
            .with_body(CelestialBody::Pluto, 243.3, -0.02)
    }
}

impl PositionSource for FixedPositions {
    fn positions(
        &self,
        _instant: DateTime<Utc>,
        _latitude: f64,
        _longitude: f64,
        bodies: &[CelestialBody],
    ) -> Result<PositionSet, KundliError> {
        let mut positions = Vec::with_capacity(bodies.len());
        for body in bodies {
            let entry = self
                .entries
                .iter()
                .find(|(b, _)| b == body)
                .map(|(_, p)| *p)
                .ok_or_else(|| KundliError::Calculation {
                    body: body.english_name().to_string(),
                    message: "no fixture position".to_string(),
                })?;
            positions.push((*body, entry));
        }
        Ok(PositionSet {
            positions,
            ascendant: self.ascendant,
        })
    }
}

// ---------------------------
// ## Swiss Ephemeris adapter
// ---------------------------

#[cfg(feature = "swisseph")]
pub use self::swiss::SwissEphemerisSource;

#[cfg(feature = "swisseph")]
mod swiss {
    use super::*;
    use chrono::{Datelike, Timelike};
    use swisseph::swe::{calc_ut, houses_ex, julday};
    use swisseph::AscMc;

    // Swiss Ephemeris body codes; Rahu uses the mean lunar node.
    const fn body_code(body: CelestialBody) -> Option<u32> {
        match body {
            CelestialBody::Sun => Some(0),
            CelestialBody::Moon => Some(1),
            CelestialBody::Mercury => Some(2),
            CelestialBody::Venus => Some(3),
            CelestialBody::Mars => Some(4),
            CelestialBody::Jupiter => Some(5),
            CelestialBody::Saturn => Some(6),
            CelestialBody::Uranus => Some(7),
            CelestialBody::Neptune => Some(8),
            CelestialBody::Pluto => Some(9),
            CelestialBody::Rahu => Some(10),
            CelestialBody::Ketu => None,
        }
    }

    const FLG_SWIEPH: u32 = 2;
    const FLG_SIDEREAL: u32 = 64;
    const FLG_SPEED: u32 = 256;
    const GREG_CAL: i32 = 1;
    const PLACIDUS: i32 = b'P' as i32;

    /// Sidereal (Lahiri) positions with Placidus houses from the Swiss
    /// Ephemeris.
    #[derive(Debug, Default)]
    pub struct SwissEphemerisSource;

    impl SwissEphemerisSource {
        pub fn new() -> Self {
            SwissEphemerisSource
        }

        fn flags() -> u32 {
            FLG_SWIEPH | FLG_SIDEREAL | FLG_SPEED
        }
    }

    fn julian_day(instant: DateTime<Utc>) -> f64 {
        let hour = instant.hour() as f64
            + instant.minute() as f64 / 60.0
            + instant.second() as f64 / 3600.0;
        julday(
            instant.year(),
            instant.month() as i32,
            instant.day() as i32,
            hour,
            GREG_CAL,
        )
    }

    impl PositionSource for SwissEphemerisSource {
        fn positions(
            &self,
            instant: DateTime<Utc>,
            latitude: f64,
            longitude: f64,
            bodies: &[CelestialBody],
        ) -> Result<PositionSet, KundliError> {
            let jd = julian_day(instant);
            let flags = Self::flags();

            let mut positions = Vec::with_capacity(bodies.len());
            for body in bodies {
                let code = body_code(*body).ok_or_else(|| KundliError::Calculation {
                    body: body.english_name().to_string(),
                    message: "body is derived, not queried".to_string(),
                })?;
                let result = calc_ut(jd, code, flags).map_err(|e| KundliError::Calculation {
                    body: body.english_name().to_string(),
                    message: format!("swiss ephemeris error: {e}"),
                })?;
                positions.push((
                    *body,
                    BodyPosition {
                        longitude: normalize_360(result.out[0]),
                        speed: result.out[3],
                    },
                ));
            }

            let (_cusps, ascmc) = houses_ex(jd, flags as i32, latitude, longitude, PLACIDUS);
            let ascendant = normalize_360(AscMc::from_array(ascmc).ascendant);

            Ok(PositionSet {
                positions,
                ascendant,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn any_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(1998, 5, 6, 3, 50, 0).unwrap()
    }

    #[test]
    fn ketu_derived_opposite_rahu() {
        let set = FixedPositions::example()
            .positions(any_instant(), 30.7167, 76.8833, &TRACKED_BODIES)
            .unwrap()
            .with_ketu();
        let rahu = set.get(CelestialBody::Rahu).unwrap();
        let ketu = set.get(CelestialBody::Ketu).unwrap();
        assert_relative_eq!(
            ketu.longitude,
            normalize_360(rahu.longitude + 180.0)
        );
        assert_relative_eq!(ketu.speed, 0.0);
    }

    #[test]
    fn with_ketu_wraps_past_360() {
        let set = FixedPositions::new(0.0)
            .with_body(CelestialBody::Rahu, 200.0, -0.05)
            .positions(any_instant(), 0.0, 0.0, &[CelestialBody::Rahu])
            .unwrap()
            .with_ketu();
        assert_relative_eq!(set.get(CelestialBody::Ketu).unwrap().longitude, 20.0);
    }

    #[test]
    fn with_ketu_is_idempotent() {
        let set = FixedPositions::example()
            .positions(any_instant(), 0.0, 0.0, &TRACKED_BODIES)
            .unwrap()
            .with_ketu()
            .with_ketu();
        let ketu_count = set
            .positions
            .iter()
            .filter(|(b, _)| *b == CelestialBody::Ketu)
            .count();
        assert_eq!(ketu_count, 1);
    }

    #[test]
    fn missing_body_is_a_calculation_error() {
        let source = FixedPositions::new(0.0).with_body(CelestialBody::Sun, 10.0, 1.0);
        let err = source
            .positions(any_instant(), 0.0, 0.0, &[CelestialBody::Moon])
            .unwrap_err();
        assert!(matches!(err, KundliError::Calculation { .. }));
    }

    #[test]
    fn chart_order_iteration_is_stable() {
        let set = FixedPositions::example()
            .positions(any_instant(), 0.0, 0.0, &TRACKED_BODIES)
            .unwrap()
            .with_ketu();
        let order: Vec<CelestialBody> = set.bodies_in_chart_order().map(|(b, _)| b).collect();
        let expected: Vec<CelestialBody> = ALL_BODIES.to_vec();
        assert_eq!(order, expected);
    }
}
