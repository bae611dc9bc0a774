//! Request validation and response assembly.
//!
//! The HTTP layer itself lives elsewhere; this module takes an already
//! parsed request, validates it, runs the derivation pipeline and
//! shapes the JSON response the frontend consumes. All response maps
//! are ordered so identical inputs produce byte-identical output.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::aspects::{self, StrengthBucket};
use crate::chart::{Chart, CombustionPolicy};
use crate::ephemeris::{PositionSource, TRACKED_BODIES};
use crate::yogas::{self, YogaMatch};
use crate::{
    CelestialBody, ChartVariant, Dignity, KundliError, NakshatraInfo, StatusFlags, ZodiacSign,
    ALL_SIGNS,
};

/// Fixed house writeups returned with every chart.
pub const HOUSE_DESCRIPTIONS: [&str; 12] = [
    "Self, body, appearance, personality",
    "Wealth, family, speech, possessions",
    "Siblings, courage, communication",
    "Mother, home, property, emotions",
    "Children, creativity, education",
    "Enemies, debts, health, service",
    "Marriage, spouse, partnerships",
    "Death, transformation, occult",
    "Luck, dharma, higher learning",
    "Career, status, public life",
    "Gains, friends, aspirations",
    "Losses, expenses, spirituality",
];

// ---------------------------
// ## Request
// ---------------------------

/// Birth details as posted by the frontend. `tz` is the UTC offset in
/// hours and may be fractional (5.5 for IST).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KundliRequest {
    pub date: String,
    pub time: String,
    pub lat: f64,
    pub lon: f64,
    pub tz: f64,
    #[serde(default)]
    pub chart_type: ChartVariant,
}

/// Validate the request and convert the civil birth time to UTC.
pub fn birth_instant(request: &KundliRequest) -> Result<DateTime<Utc>, KundliError> {
    let date = NaiveDate::parse_from_str(&request.date, "%Y-%m-%d")
        .map_err(|e| KundliError::InvalidInput(format!("date '{}': {e}", request.date)))?;
    let time = NaiveTime::parse_from_str(&request.time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(&request.time, "%H:%M"))
        .map_err(|e| KundliError::InvalidInput(format!("time '{}': {e}", request.time)))?;
    if !(-90.0..=90.0).contains(&request.lat) {
        return Err(KundliError::InvalidInput(format!(
            "latitude {} out of range",
            request.lat
        )));
    }
    if !(-180.0..=180.0).contains(&request.lon) {
        return Err(KundliError::InvalidInput(format!(
            "longitude {} out of range",
            request.lon
        )));
    }
    if !(-12.0..=14.0).contains(&request.tz) {
        return Err(KundliError::InvalidInput(format!(
            "timezone offset {} out of range",
            request.tz
        )));
    }
    let offset_seconds = (request.tz * 3600.0).round() as i64;
    let naive = date.and_time(time) - ChronoDuration::seconds(offset_seconds);
    Ok(Utc.from_utc_datetime(&naive))
}

// ---------------------------
// ## Response
// ---------------------------

/// One planet as listed under its sign.
#[derive(Debug, Clone, Serialize)]
pub struct PlanetEntry {
    pub name: CelestialBody,
    pub deg: f64,
    pub sign: ZodiacSign,
    pub status: StatusFlags,
    pub dignity: Dignity,
    pub nakshatra: NakshatraInfo,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct HouseStrengthEntry {
    pub strength: StrengthBucket,
    pub color: &'static str,
}

/// The full chart payload.
#[derive(Debug, Clone, Serialize)]
pub struct KundliResponse {
    pub sign_planets: BTreeMap<ZodiacSign, Vec<PlanetEntry>>,
    pub positions: BTreeMap<CelestialBody, f64>,
    pub asc_sign: ZodiacSign,
    pub house_descriptions: BTreeMap<u8, &'static str>,
    pub house_strengths: BTreeMap<u8, HouseStrengthEntry>,
    pub dataset: Value,
    pub yogas: Vec<YogaMatch>,
}

/// Compute the chart a request asks for. Provider failures propagate;
/// nothing is computed on invalid input.
pub fn compute_chart(
    request: &KundliRequest,
    source: &dyn PositionSource,
) -> Result<Chart, KundliError> {
    let instant = birth_instant(request)?;
    let set = source.positions(instant, request.lat, request.lon, &TRACKED_BODIES)?;
    Ok(Chart::compute(
        request.chart_type,
        &set,
        CombustionPolicy::default(),
    ))
}

/// Full pipeline: validate, compute, score, detect yogas and merge the
/// dataset blob verbatim.
pub fn compute_kundli(
    request: &KundliRequest,
    source: &dyn PositionSource,
    dataset: Value,
) -> Result<KundliResponse, KundliError> {
    let chart = compute_chart(request, source)?;

    let mut sign_planets: BTreeMap<ZodiacSign, Vec<PlanetEntry>> =
        ALL_SIGNS.iter().map(|s| (*s, Vec::new())).collect();
    for p in &chart.placements {
        sign_planets.entry(p.sign).or_default().push(PlanetEntry {
            name: p.body,
            deg: round_tenth(p.degree_in_sign),
            sign: p.sign,
            status: p.status,
            dignity: p.dignity,
            nakshatra: p.nakshatra,
        });
    }

    let positions: BTreeMap<CelestialBody, f64> = chart
        .placements
        .iter()
        .map(|p| (p.body, p.longitude))
        .collect();

    let house_descriptions: BTreeMap<u8, &'static str> = HOUSE_DESCRIPTIONS
        .iter()
        .enumerate()
        .map(|(i, text)| (i as u8 + 1, *text))
        .collect();

    let house_strengths: BTreeMap<u8, HouseStrengthEntry> = aspects::house_strengths(&chart)
        .iter()
        .map(|s| {
            (
                s.house.number(),
                HouseStrengthEntry {
                    strength: s.bucket,
                    color: s.bucket.color(),
                },
            )
        })
        .collect();

    let yogas = yogas::detect_yogas(&chart);

    Ok(KundliResponse {
        sign_planets,
        positions,
        asc_sign: chart.asc_sign,
        house_descriptions,
        house_strengths,
        dataset,
        yogas,
    })
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
