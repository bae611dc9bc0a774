//! Divisional chart (varga) transforms.
//!
//! Only the Navamsa (D9) is supported: each sign's 30° span splits into
//! nine 3°20′ parts, and the part index offsets from the sign's element
//! group start, `(sign_index % 4) * 3` signs from Aries. All arithmetic
//! is multiply-first so no repeating-decimal divisor can misclassify a
//! part boundary.

use crate::ephemeris::{BodyPosition, PositionSet};
use crate::normalize_360;

/// Map a D1 sidereal longitude to its D9 longitude. Input must already
/// be normalized to [0, 360).
pub fn navamsa_longitude(longitude: f64) -> f64 {
    let sign_index = (longitude / 30.0).floor() as usize % 12;
    let degree_in_sign = longitude.rem_euclid(30.0);
    // Part index 0..=8: floor(d * 9 / 30) rather than d / (10/3).
    let part = ((degree_in_sign * 9.0) / 30.0).floor() as usize;
    let element_start = (sign_index % 4) * 3;
    let new_sign = (element_start + part) % 12;
    let new_degree = (degree_in_sign * 9.0).rem_euclid(30.0);
    new_sign as f64 * 30.0 + new_degree
}

/// Transform a whole position set to D9. The nodes pass through
/// unchanged (they have no divisional chart in this design); speeds are
/// preserved so retrograde status carries over; the ascendant is
/// transformed like any longitude.
pub fn navamsa_positions(set: &PositionSet) -> PositionSet {
    let positions = set
        .positions
        .iter()
        .map(|(body, p)| {
            let longitude = if body.is_node() {
                normalize_360(p.longitude)
            } else {
                navamsa_longitude(normalize_360(p.longitude))
            };
            (
                *body,
                BodyPosition {
                    longitude,
                    speed: p.speed,
                },
            )
        })
        .collect();
    PositionSet {
        positions,
        ascendant: navamsa_longitude(normalize_360(set.ascendant)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::FixedPositions;
    use crate::ephemeris::PositionSource;
    use crate::ephemeris::TRACKED_BODIES;
    use crate::{CelestialBody, ZodiacSign};
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    #[test]
    fn mid_aries_lands_in_leo() {
        // 15° Aries: part 4, fire group starts at Aries → Leo
        let d9 = navamsa_longitude(15.0);
        assert_eq!(ZodiacSign::from_longitude(d9), ZodiacSign::Leo);
        assert_relative_eq!(d9, 135.0);
    }

    #[test]
    fn sign_start_maps_to_element_start() {
        // First part of each sign opens at the sign's group start:
        // (sign_index % 4) * 3 signs from Aries.
        assert_relative_eq!(navamsa_longitude(0.0), 0.0); // Aries → Aries
        assert_relative_eq!(navamsa_longitude(30.0), 90.0); // Taurus → Cancer
        assert_relative_eq!(navamsa_longitude(60.0), 180.0); // Gemini → Libra
        assert_relative_eq!(navamsa_longitude(90.0), 270.0); // Cancer → Capricorn
        // Fifth sign wraps back to the fire start
        assert_relative_eq!(navamsa_longitude(120.0), 0.0); // Leo → Aries
    }

    #[test]
    fn part_boundaries_are_exact() {
        // 3°20′ = 10/3° opens the second part; multiply-first keeps the
        // boundary on the correct side.
        let just_before = 10.0 / 3.0 - 1e-9;
        let at_boundary = 10.0 / 3.0;
        assert_eq!(
            ZodiacSign::from_longitude(navamsa_longitude(just_before)),
            ZodiacSign::Aries
        );
        assert_eq!(
            ZodiacSign::from_longitude(navamsa_longitude(at_boundary)),
            ZodiacSign::Taurus
        );
    }

    #[test]
    fn last_part_of_a_sign() {
        // 29.9° Aries: part 8 → Sagittarius, 29.1° within
        let d9 = navamsa_longitude(29.9);
        assert_eq!(ZodiacSign::from_longitude(d9), ZodiacSign::Sagittarius);
        assert_relative_eq!(d9.rem_euclid(30.0), 29.1, epsilon = 1e-9);
    }

    #[test]
    fn degree_within_part_scales_ninefold() {
        // 1° into a part → 9° into the D9 sign
        let d9 = navamsa_longitude(1.0);
        assert_relative_eq!(d9.rem_euclid(30.0), 9.0);
    }

    #[test]
    fn transform_is_pure() {
        for lon in [0.0, 12.34, 123.456, 359.999] {
            assert_relative_eq!(navamsa_longitude(lon), navamsa_longitude(lon));
        }
    }

    #[test]
    fn nodes_pass_through_unchanged() {
        let set = FixedPositions::example()
            .positions(
                Utc.with_ymd_and_hms(1998, 5, 6, 3, 50, 0).unwrap(),
                30.7167,
                76.8833,
                &TRACKED_BODIES,
            )
            .unwrap()
            .with_ketu();
        let d9 = navamsa_positions(&set);
        assert_relative_eq!(
            d9.get(CelestialBody::Rahu).unwrap().longitude,
            set.get(CelestialBody::Rahu).unwrap().longitude
        );
        assert_relative_eq!(
            d9.get(CelestialBody::Ketu).unwrap().longitude,
            set.get(CelestialBody::Ketu).unwrap().longitude
        );
        // Non-nodes move
        assert!(
            (d9.get(CelestialBody::Sun).unwrap().longitude
                - set.get(CelestialBody::Sun).unwrap().longitude)
                .abs()
                > 1.0
        );
    }

    #[test]
    fn ascendant_is_transformed() {
        let set = FixedPositions::example()
            .positions(
                Utc.with_ymd_and_hms(1998, 5, 6, 3, 50, 0).unwrap(),
                30.7167,
                76.8833,
                &TRACKED_BODIES,
            )
            .unwrap();
        let d9 = navamsa_positions(&set);
        assert_relative_eq!(d9.ascendant, navamsa_longitude(99.0));
    }

    #[test]
    fn speeds_are_preserved() {
        let set = FixedPositions::example()
            .positions(
                Utc.with_ymd_and_hms(1998, 5, 6, 3, 50, 0).unwrap(),
                30.7167,
                76.8833,
                &TRACKED_BODIES,
            )
            .unwrap();
        let d9 = navamsa_positions(&set);
        assert_relative_eq!(
            d9.get(CelestialBody::Jupiter).unwrap().speed,
            set.get(CelestialBody::Jupiter).unwrap().speed
        );
    }
}
