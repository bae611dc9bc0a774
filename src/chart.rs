//! Chart derivation engine.
//!
//! Turns raw sidereal positions into an annotated chart: sign and house
//! placement, dignity against the sign lord, exaltation/debilitation
//! with peak detection, combustion, retrogression and nakshatra. All
//! rules are static data tables so a rule change is a data edit.

use serde::Serialize;

use crate::aspects::{self, AspectEntry};
use crate::ephemeris::PositionSet;
use crate::varga;
use crate::{
    angular_separation, normalize_360, CelestialBody, ChartVariant, Dignity, House,
    NakshatraInfo, StatusFlags, ZodiacSign,
};

// ---------------------------
// ## Rule tables
// ---------------------------

/// Planetary lord of each sign (universal rulership assignment).
pub const fn sign_ruler(sign: ZodiacSign) -> CelestialBody {
    match sign {
        ZodiacSign::Aries => CelestialBody::Mars,
        ZodiacSign::Taurus => CelestialBody::Venus,
        ZodiacSign::Gemini => CelestialBody::Mercury,
        ZodiacSign::Cancer => CelestialBody::Moon,
        ZodiacSign::Leo => CelestialBody::Sun,
        ZodiacSign::Virgo => CelestialBody::Mercury,
        ZodiacSign::Libra => CelestialBody::Venus,
        ZodiacSign::Scorpio => CelestialBody::Mars,
        ZodiacSign::Sagittarius => CelestialBody::Jupiter,
        ZodiacSign::Capricorn => CelestialBody::Saturn,
        ZodiacSign::Aquarius => CelestialBody::Saturn,
        ZodiacSign::Pisces => CelestialBody::Jupiter,
    }
}

/// Friend/enemy/neutral sets per body. The nodes carry empty sets, so
/// every lord relationship resolves to N/A for them.
pub struct Friendship {
    pub body: CelestialBody,
    pub friends: &'static [CelestialBody],
    pub enemies: &'static [CelestialBody],
    pub neutral: &'static [CelestialBody],
}

use CelestialBody::{
    Jupiter as Ju, Ketu as Ke, Mars as Ma, Mercury as Me, Moon as Mo, Rahu as Ra, Saturn as Sa,
    Sun as Su, Venus as Ve,
};

pub const FRIENDSHIPS: [Friendship; 9] = [
    Friendship { body: Su, friends: &[Mo, Ma, Ju], enemies: &[Sa, Ve], neutral: &[Me] },
    Friendship { body: Mo, friends: &[Su, Me], enemies: &[Ra, Ke], neutral: &[Ma, Ju, Ve, Sa] },
    Friendship { body: Ma, friends: &[Su, Mo, Ju], enemies: &[Me], neutral: &[Ve, Sa] },
    Friendship { body: Me, friends: &[Su, Ve], enemies: &[Mo], neutral: &[Ma, Ju, Sa] },
    Friendship { body: Ju, friends: &[Su, Mo, Ma], enemies: &[Ve, Me], neutral: &[Sa] },
    Friendship { body: Ve, friends: &[Me, Sa], enemies: &[Su, Mo], neutral: &[Ma, Ju] },
    Friendship { body: Sa, friends: &[Me, Ve], enemies: &[Su, Mo], neutral: &[Ma, Ju] },
    Friendship { body: Ra, friends: &[], enemies: &[], neutral: &[] },
    Friendship { body: Ke, friends: &[], enemies: &[], neutral: &[] },
];

/// Exaltation points (sign, exact degree) of the seven classical bodies.
pub const EXALTATIONS: [(CelestialBody, ZodiacSign, f64); 7] = [
    (Su, ZodiacSign::Aries, 10.0),
    (Mo, ZodiacSign::Taurus, 3.0),
    (Ma, ZodiacSign::Capricorn, 28.0),
    (Me, ZodiacSign::Virgo, 15.0),
    (Ju, ZodiacSign::Cancer, 5.0),
    (Ve, ZodiacSign::Pisces, 27.0),
    (Sa, ZodiacSign::Libra, 20.0),
];

/// Debilitation points — always the sign opposite the exaltation, at
/// the same degree.
pub const DEBILITATIONS: [(CelestialBody, ZodiacSign, f64); 7] = [
    (Su, ZodiacSign::Libra, 10.0),
    (Mo, ZodiacSign::Scorpio, 3.0),
    (Ma, ZodiacSign::Cancer, 28.0),
    (Me, ZodiacSign::Pisces, 15.0),
    (Ju, ZodiacSign::Capricorn, 5.0),
    (Ve, ZodiacSign::Virgo, 27.0),
    (Sa, ZodiacSign::Aries, 20.0),
];

/// Orb around the exact exaltation/debilitation degree that earns the
/// additional "peak" flag.
pub const PEAK_ORB: f64 = 5.0;

/// Per-body combustion orbs, degrees from the Sun.
pub const COMBUSTION_ORBS: [(CelestialBody, f64); 6] = [
    (Mo, 12.0),
    (Ma, 17.0),
    (Me, 14.0),
    (Ju, 11.0),
    (Ve, 10.0),
    (Sa, 15.0),
];

/// Combustion orb policy. Two variants exist in the wild: a per-body
/// orb table and a flat orb for every body. The per-body table is the
/// default; the uniform policy is opt-in and never silently merged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CombustionPolicy {
    PerBody,
    Uniform(f64),
}

impl Default for CombustionPolicy {
    fn default() -> Self {
        CombustionPolicy::PerBody
    }
}

impl CombustionPolicy {
    /// Orb for a body, or `None` when combustion does not apply. The
    /// Sun itself is never combust under either policy.
    pub fn orb(&self, body: CelestialBody) -> Option<f64> {
        if body == CelestialBody::Sun {
            return None;
        }
        match self {
            CombustionPolicy::PerBody => COMBUSTION_ORBS
                .iter()
                .find(|(b, _)| *b == body)
                .map(|(_, orb)| *orb),
            CombustionPolicy::Uniform(orb) => Some(*orb),
        }
    }
}

// ---------------------------
// ## Rule evaluation
// ---------------------------

/// Dignity of a body in a sign: its relationship to the sign's lord.
pub fn dignity_of(body: CelestialBody, sign: ZodiacSign) -> Dignity {
    let table = match FRIENDSHIPS.iter().find(|f| f.body == body) {
        Some(t) => t,
        None => return Dignity::NotApplicable,
    };
    let lord = sign_ruler(sign);
    if lord == body {
        Dignity::Own
    } else if table.friends.contains(&lord) {
        Dignity::Friend
    } else if table.neutral.contains(&lord) {
        Dignity::Neutral
    } else if table.enemies.contains(&lord) {
        Dignity::Enemy
    } else {
        Dignity::NotApplicable
    }
}

/// Exaltation/debilitation flags for a body at a degree within a sign.
/// The signs in the two tables are opposite by construction, so both
/// flags can never be set at once.
pub fn exaltation_flags(
    body: CelestialBody,
    sign: ZodiacSign,
    degree_in_sign: f64,
) -> (bool, bool, bool) {
    if let Some((_, _, deg)) = EXALTATIONS.iter().find(|(b, s, _)| *b == body && *s == sign) {
        let peak = (degree_in_sign - deg).abs() <= PEAK_ORB;
        return (true, false, peak);
    }
    if let Some((_, _, deg)) = DEBILITATIONS
        .iter()
        .find(|(b, s, _)| *b == body && *s == sign)
    {
        let peak = (degree_in_sign - deg).abs() <= PEAK_ORB;
        return (false, true, peak);
    }
    (false, false, false)
}

/// Combustion check against the Sun's longitude. Strict less-than at
/// the orb boundary.
pub fn is_combust(
    body: CelestialBody,
    body_lon: f64,
    sun_lon: f64,
    policy: CombustionPolicy,
) -> bool {
    match policy.orb(body) {
        Some(orb) => angular_separation(body_lon, sun_lon) < orb,
        None => false,
    }
}

/// House sign table anchored at the ascendant sign: house h carries the
/// sign `(asc + h - 1) mod 12`. A rotation of the fixed sign sequence,
/// so each sign maps to exactly one house.
pub fn house_table(asc_sign: ZodiacSign) -> [ZodiacSign; 12] {
    let mut table = [ZodiacSign::Aries; 12];
    for (h, slot) in table.iter_mut().enumerate() {
        *slot = ZodiacSign::from_index(asc_sign.index() + h);
    }
    table
}

// ---------------------------
// ## Chart assembly
// ---------------------------

/// One body's fully derived placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub body: CelestialBody,
    pub longitude: f64,
    pub degree_in_sign: f64,
    pub sign: ZodiacSign,
    pub house: House,
    pub status: StatusFlags,
    pub dignity: Dignity,
    pub nakshatra: NakshatraInfo,
    pub speed: f64,
}

/// Immutable snapshot of one chart variant: ascendant, house table,
/// annotated placements and projected aspects.
#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub variant: ChartVariant,
    pub ascendant: f64,
    pub asc_sign: ZodiacSign,
    pub houses: [ZodiacSign; 12],
    pub placements: Vec<Placement>,
    pub aspects: Vec<AspectEntry>,
}

impl Chart {
    /// Derive a chart from raw positions. For the Navamsa variant the
    /// whole position set (ascendant included) is run through the D9
    /// transform first; status flags are then derived from the
    /// transformed longitudes.
    pub fn compute(
        variant: ChartVariant,
        positions: &PositionSet,
        combustion: CombustionPolicy,
    ) -> Chart {
        let set = positions.clone().with_ketu();
        let set = match variant {
            ChartVariant::Rasi => set,
            ChartVariant::Navamsa => varga::navamsa_positions(&set),
        };

        let ascendant = normalize_360(set.ascendant);
        let asc_sign = ZodiacSign::from_longitude(ascendant);
        let houses = house_table(asc_sign);
        let sun_lon = set.get(CelestialBody::Sun).map(|p| p.longitude);

        let mut placements = Vec::with_capacity(set.positions.len());
        for (body, position) in set.bodies_in_chart_order() {
            let longitude = normalize_360(position.longitude);
            let sign = ZodiacSign::from_longitude(longitude);
            let degree_in_sign = longitude.rem_euclid(30.0);
            let house = house_of_sign(&houses, sign);

            let (exalted, debilitated, peak) = exaltation_flags(body, sign, degree_in_sign);
            let combust = match sun_lon {
                Some(sun) => is_combust(body, longitude, sun, combustion),
                None => false,
            };
            let status = StatusFlags {
                exalted,
                debilitated,
                peak,
                combust,
                retrograde: position.speed < 0.0,
            };

            placements.push(Placement {
                body,
                longitude,
                degree_in_sign,
                sign,
                house,
                status,
                dignity: dignity_of(body, sign),
                nakshatra: NakshatraInfo::from_longitude(longitude),
                speed: position.speed,
            });
        }

        let aspects = aspects::aspects_of(&placements);

        Chart {
            variant,
            ascendant,
            asc_sign,
            houses,
            placements,
            aspects,
        }
    }

    pub fn placement(&self, body: CelestialBody) -> Option<&Placement> {
        self.placements.iter().find(|p| p.body == body)
    }

    /// Sign carried by a house in this chart.
    pub fn house_sign(&self, house: House) -> ZodiacSign {
        self.houses[(house.number() - 1) as usize]
    }

    /// House carrying a sign in this chart.
    pub fn house_of_sign(&self, sign: ZodiacSign) -> House {
        house_of_sign(&self.houses, sign)
    }

    /// Placements occupying a house.
    pub fn residents(&self, house: House) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(move |p| p.house == house)
    }
}

fn house_of_sign(houses: &[ZodiacSign; 12], sign: ZodiacSign) -> House {
    let h = houses
        .iter()
        .position(|s| *s == sign)
        .expect("house table is a rotation of all twelve signs") as u8
        + 1;
    House::from_number(h).expect("position in a 12-slot table is in 1..=12")
}
