//! kundli_core — Vedic birth chart (Kundli) computation.
//!
//! Planetary positions come from an external ephemeris through the
//! [`ephemeris::PositionSource`] seam; everything on this side is
//! deterministic derivation: sign and house placement, dignity,
//! combustion, retrogression, aspect projection, house strength
//! scoring, the Navamsa (D9) transform and yoga detection. A
//! cooldown-gated narration client turns a computed chart into a
//! natural-language reading via a hosted text-generation endpoint.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

pub mod aspects;
pub mod chart;
pub mod dataset;
pub mod ephemeris;
pub mod narration;
pub mod render;
pub mod service;
pub mod varga;
pub mod yogas;

pub use aspects::{AspectEntry, HouseStrength, StrengthBucket};
pub use chart::{Chart, CombustionPolicy, Placement};
pub use ephemeris::{BodyPosition, PositionSet, PositionSource};
pub use service::{compute_kundli, KundliRequest, KundliResponse};

// ---------------------------
// ## Enumerations
// ---------------------------

/// The tracked bodies. Ketu is always derived as Rahu + 180° and is
/// never queried from the position source.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CelestialBody {
    #[serde(rename = "Su")]
    Sun,
    #[serde(rename = "Mo")]
    Moon,
    #[serde(rename = "Ma")]
    Mars,
    #[serde(rename = "Me")]
    Mercury,
    #[serde(rename = "Ju")]
    Jupiter,
    #[serde(rename = "Ve")]
    Venus,
    #[serde(rename = "Sa")]
    Saturn,
    #[serde(rename = "Ra")]
    Rahu,
    #[serde(rename = "Ke")]
    Ketu,
    #[serde(rename = "Ur")]
    Uranus,
    #[serde(rename = "Ne")]
    Neptune,
    #[serde(rename = "Pl")]
    Pluto,
}

/// All twelve bodies in chart order.
pub const ALL_BODIES: [CelestialBody; 12] = [
    CelestialBody::Sun,
    CelestialBody::Moon,
    CelestialBody::Mars,
    CelestialBody::Mercury,
    CelestialBody::Jupiter,
    CelestialBody::Venus,
    CelestialBody::Saturn,
    CelestialBody::Rahu,
    CelestialBody::Ketu,
    CelestialBody::Uranus,
    CelestialBody::Neptune,
    CelestialBody::Pluto,
];

/// The seven classical bodies (Sun through Saturn).
pub const CLASSICAL_BODIES: [CelestialBody; 7] = [
    CelestialBody::Sun,
    CelestialBody::Moon,
    CelestialBody::Mars,
    CelestialBody::Mercury,
    CelestialBody::Jupiter,
    CelestialBody::Venus,
    CelestialBody::Saturn,
];

impl CelestialBody {
    pub fn iter() -> impl Iterator<Item = CelestialBody> {
        ALL_BODIES.iter().copied()
    }

    /// Two-letter abbreviation used on the wire ("Su", "Mo", ...).
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Sun => "Su",
            Self::Moon => "Mo",
            Self::Mars => "Ma",
            Self::Mercury => "Me",
            Self::Jupiter => "Ju",
            Self::Venus => "Ve",
            Self::Saturn => "Sa",
            Self::Rahu => "Ra",
            Self::Ketu => "Ke",
            Self::Uranus => "Ur",
            Self::Neptune => "Ne",
            Self::Pluto => "Pl",
        }
    }

    pub const fn english_name(self) -> &'static str {
        match self {
            Self::Sun => "Sun",
            Self::Moon => "Moon",
            Self::Mars => "Mars",
            Self::Mercury => "Mercury",
            Self::Jupiter => "Jupiter",
            Self::Venus => "Venus",
            Self::Saturn => "Saturn",
            Self::Rahu => "Rahu",
            Self::Ketu => "Ketu",
            Self::Uranus => "Uranus",
            Self::Neptune => "Neptune",
            Self::Pluto => "Pluto",
        }
    }

    /// Rahu and Ketu, the lunar nodes.
    pub const fn is_node(self) -> bool {
        matches!(self, Self::Rahu | Self::Ketu)
    }

    /// Trans-Saturnian bodies, outside the classical rule tables.
    pub const fn is_outer(self) -> bool {
        matches!(self, Self::Uranus | Self::Neptune | Self::Pluto)
    }

    /// Benefic/malefic classification used for aspect nature and house
    /// strength scoring.
    pub const fn nature(self) -> Nature {
        match self {
            Self::Jupiter | Self::Venus | Self::Moon => Nature::Benefic,
            Self::Mars | Self::Saturn | Self::Rahu | Self::Ketu => Nature::Malefic,
            Self::Sun | Self::Mercury => Nature::Neutral,
            Self::Uranus | Self::Neptune | Self::Pluto => Nature::Malefic,
        }
    }
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.english_name())
    }
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ZodiacSign {
    Aries = 0,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

/// All twelve signs in zodiac order.
pub const ALL_SIGNS: [ZodiacSign; 12] = [
    ZodiacSign::Aries,
    ZodiacSign::Taurus,
    ZodiacSign::Gemini,
    ZodiacSign::Cancer,
    ZodiacSign::Leo,
    ZodiacSign::Virgo,
    ZodiacSign::Libra,
    ZodiacSign::Scorpio,
    ZodiacSign::Sagittarius,
    ZodiacSign::Capricorn,
    ZodiacSign::Aquarius,
    ZodiacSign::Pisces,
];

impl ZodiacSign {
    /// Sign occupied by a longitude. Input is normalized first, so any
    /// real number maps to one of the twelve signs.
    pub fn from_longitude(longitude: f64) -> Self {
        let normalized = longitude.rem_euclid(360.0);
        ALL_SIGNS[(normalized / 30.0).floor() as usize % 12]
    }

    pub fn from_index(index: usize) -> Self {
        ALL_SIGNS[index % 12]
    }

    /// 0-based position in the zodiac (Aries = 0).
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Aries => "Aries",
            Self::Taurus => "Taurus",
            Self::Gemini => "Gemini",
            Self::Cancer => "Cancer",
            Self::Leo => "Leo",
            Self::Virgo => "Virgo",
            Self::Libra => "Libra",
            Self::Scorpio => "Scorpio",
            Self::Sagittarius => "Sagittarius",
            Self::Capricorn => "Capricorn",
            Self::Aquarius => "Aquarius",
            Self::Pisces => "Pisces",
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum House {
    First = 1,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
    Seventh,
    Eighth,
    Ninth,
    Tenth,
    Eleventh,
    Twelfth,
}

impl House {
    pub fn from_number(number: u8) -> Option<House> {
        match number {
            1 => Some(House::First),
            2 => Some(House::Second),
            3 => Some(House::Third),
            4 => Some(House::Fourth),
            5 => Some(House::Fifth),
            6 => Some(House::Sixth),
            7 => Some(House::Seventh),
            8 => Some(House::Eighth),
            9 => Some(House::Ninth),
            10 => Some(House::Tenth),
            11 => Some(House::Eleventh),
            12 => Some(House::Twelfth),
            _ => None,
        }
    }

    pub fn all() -> impl Iterator<Item = House> {
        (1..=12).filter_map(House::from_number)
    }

    /// 1-based house number.
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// The house `steps` places ahead, wrapping past the twelfth.
    /// `nth_ahead(0)` is the house itself.
    pub fn nth_ahead(self, steps: u8) -> House {
        let n = ((self.number() as u16 - 1 + steps as u16) % 12) as u8 + 1;
        House::from_number(n).expect("wrapped house number is in 1..=12")
    }
}

impl Serialize for House {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

impl fmt::Display for House {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Benefic/malefic/neutral classification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nature {
    Benefic,
    Malefic,
    Neutral,
}

impl fmt::Display for Nature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Nature::Benefic => "benefic",
            Nature::Malefic => "malefic",
            Nature::Neutral => "neutral",
        };
        write!(f, "{}", s)
    }
}

/// Relationship of a body to the lord of its occupied sign.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dignity {
    Own,
    Friend,
    Neutral,
    Enemy,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl fmt::Display for Dignity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Dignity::Own => "Own",
            Dignity::Friend => "Friend",
            Dignity::Neutral => "Neutral",
            Dignity::Enemy => "Enemy",
            Dignity::NotApplicable => "N/A",
        };
        write!(f, "{}", s)
    }
}

/// Closed set of placement status flags. Serialized as the list of
/// active tags, in the order the original backend emitted them.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct StatusFlags {
    pub exalted: bool,
    pub debilitated: bool,
    pub peak: bool,
    pub combust: bool,
    pub retrograde: bool,
}

impl StatusFlags {
    pub fn is_empty(&self) -> bool {
        *self == StatusFlags::default()
    }

    /// Active tags: exalted/debilitated, then peak, combust, retrograde.
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags = Vec::new();
        if self.exalted {
            tags.push("exalted");
        }
        if self.debilitated {
            tags.push("debilitated");
        }
        if self.peak {
            tags.push("peak");
        }
        if self.combust {
            tags.push("combust");
        }
        if self.retrograde {
            tags.push("retrograde");
        }
        tags
    }
}

impl Serialize for StatusFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.tags())
    }
}

/// Which chart the response describes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartVariant {
    #[serde(rename = "regular")]
    Rasi,
    #[serde(rename = "d9", alias = "navamsa")]
    Navamsa,
}

impl Default for ChartVariant {
    fn default() -> Self {
        ChartVariant::Rasi
    }
}

// ---------------------------
// ## Nakshatras
// ---------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Nakshatra {
    Ashwini,
    Bharani,
    Krittika,
    Rohini,
    Mrigashira,
    Ardra,
    Punarvasu,
    Pushya,
    Ashlesha,
    Magha,
    PurvaPhalguni,
    UttaraPhalguni,
    Hasta,
    Chitra,
    Swati,
    Vishakha,
    Anuradha,
    Jyeshtha,
    Moola,
    PurvaAshadha,
    UttaraAshadha,
    Shravana,
    Dhanishta,
    Shatabhisha,
    PurvaBhadrapada,
    UttaraBhadrapada,
    Revati,
}

pub const ALL_NAKSHATRAS: [Nakshatra; 27] = [
    Nakshatra::Ashwini,
    Nakshatra::Bharani,
    Nakshatra::Krittika,
    Nakshatra::Rohini,
    Nakshatra::Mrigashira,
    Nakshatra::Ardra,
    Nakshatra::Punarvasu,
    Nakshatra::Pushya,
    Nakshatra::Ashlesha,
    Nakshatra::Magha,
    Nakshatra::PurvaPhalguni,
    Nakshatra::UttaraPhalguni,
    Nakshatra::Hasta,
    Nakshatra::Chitra,
    Nakshatra::Swati,
    Nakshatra::Vishakha,
    Nakshatra::Anuradha,
    Nakshatra::Jyeshtha,
    Nakshatra::Moola,
    Nakshatra::PurvaAshadha,
    Nakshatra::UttaraAshadha,
    Nakshatra::Shravana,
    Nakshatra::Dhanishta,
    Nakshatra::Shatabhisha,
    Nakshatra::PurvaBhadrapada,
    Nakshatra::UttaraBhadrapada,
    Nakshatra::Revati,
];

impl Nakshatra {
    /// Nakshatra containing a longitude. Each spans 13°20′ (40/3°);
    /// the index is computed multiply-first to avoid a repeating
    /// decimal divisor.
    pub fn from_longitude(longitude: f64) -> Nakshatra {
        let normalized = longitude.rem_euclid(360.0);
        ALL_NAKSHATRAS[((normalized * 3.0) / 40.0).floor() as usize % 27]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Ashwini => "Ashwini",
            Self::Bharani => "Bharani",
            Self::Krittika => "Krittika",
            Self::Rohini => "Rohini",
            Self::Mrigashira => "Mrigashira",
            Self::Ardra => "Ardra",
            Self::Punarvasu => "Punarvasu",
            Self::Pushya => "Pushya",
            Self::Ashlesha => "Ashlesha",
            Self::Magha => "Magha",
            Self::PurvaPhalguni => "Purva Phalguni",
            Self::UttaraPhalguni => "Uttara Phalguni",
            Self::Hasta => "Hasta",
            Self::Chitra => "Chitra",
            Self::Swati => "Swati",
            Self::Vishakha => "Vishakha",
            Self::Anuradha => "Anuradha",
            Self::Jyeshtha => "Jyeshtha",
            Self::Moola => "Moola",
            Self::PurvaAshadha => "Purva Ashadha",
            Self::UttaraAshadha => "Uttara Ashadha",
            Self::Shravana => "Shravana",
            Self::Dhanishta => "Dhanishta",
            Self::Shatabhisha => "Shatabhisha",
            Self::PurvaBhadrapada => "Purva Bhadrapada",
            Self::UttaraBhadrapada => "Uttara Bhadrapada",
            Self::Revati => "Revati",
        }
    }
}

impl Serialize for Nakshatra {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl fmt::Display for Nakshatra {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A nakshatra with its quarter (pada, 1..=4).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct NakshatraInfo {
    pub nakshatra: Nakshatra,
    pub pada: u8,
}

impl NakshatraInfo {
    pub fn from_longitude(longitude: f64) -> NakshatraInfo {
        let normalized = longitude.rem_euclid(360.0);
        let nakshatra = Nakshatra::from_longitude(normalized);
        // Each pada spans 3°20′ (10/3°); multiply-first keeps the
        // quarter boundaries exact.
        let within = (normalized * 3.0).rem_euclid(40.0);
        let pada = (within / 10.0).floor() as u8 + 1;
        NakshatraInfo { nakshatra, pada }
    }
}

// ---------------------------
// ## Structures
// ---------------------------

/// Birth instant and geographic location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BirthInfo {
    pub date_time: chrono::DateTime<chrono::Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

// ---------------------------
// ## Error Handling
// ---------------------------

#[derive(Debug, Error)]
pub enum KundliError {
    /// Malformed or missing request fields; computation is never
    /// attempted on partial input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Position provider failure — fatal for the request, no retry.
    #[error("position calculation failed for {body}: {message}")]
    Calculation { body: String, message: String },
    /// Dataset problems are reported here and degraded by callers.
    #[error("dataset error: {0}")]
    Dataset(String),
}

// ---------------------------
// ## Angle helpers
// ---------------------------

/// Normalize a degree value into [0, 360).
pub fn normalize_360(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

/// Shortest angular separation between two longitudes, in [0, 180].
pub fn angular_separation(a: f64, b: f64) -> f64 {
    let diff = (normalize_360(a) - normalize_360(b)).abs();
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}
