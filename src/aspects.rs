//! Aspect projection and house strength scoring.
//!
//! Each body throws aspects onto fixed house offsets ahead of its own
//! house. An aspect's nature follows the body's benefic/malefic
//! classification. House strength aggregates resident placements and
//! incoming aspects into a coarse strong/weak/neutral bucket.

use serde::Serialize;

use crate::chart::{Chart, Placement};
use crate::{CelestialBody, House, Nature};

/// Steps ahead (counting the source house as the first) paired with the
/// traditional aspect label. A step of 6 is the 7th-house aspect.
pub fn aspect_steps(body: CelestialBody) -> &'static [(u8, &'static str)] {
    match body {
        CelestialBody::Mars => &[(3, "4th"), (6, "7th"), (7, "8th")],
        CelestialBody::Jupiter => &[(4, "5th"), (6, "7th"), (8, "9th")],
        CelestialBody::Saturn => &[(2, "3rd"), (6, "7th"), (9, "10th")],
        CelestialBody::Rahu | CelestialBody::Ketu => &[(4, "5th"), (8, "9th")],
        _ => &[(6, "7th")],
    }
}

/// One projected aspect: a body in `from_house` influencing `to_house`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AspectEntry {
    pub body: CelestialBody,
    pub from_house: House,
    pub to_house: House,
    pub label: &'static str,
    pub nature: Nature,
}

/// Project every placement's aspects. Output order follows placement
/// order, then the body's step table.
pub fn aspects_of(placements: &[Placement]) -> Vec<AspectEntry> {
    let mut aspects = Vec::new();
    for placement in placements {
        for &(step, label) in aspect_steps(placement.body) {
            aspects.push(AspectEntry {
                body: placement.body,
                from_house: placement.house,
                to_house: placement.house.nth_ahead(step),
                label,
                nature: placement.body.nature(),
            });
        }
    }
    aspects
}

// ---------------------------
// ## House strength
// ---------------------------

/// Strength bucket for a house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthBucket {
    Strong,
    Weak,
    Neutral,
}

impl StrengthBucket {
    pub const fn label(self) -> &'static str {
        match self {
            StrengthBucket::Strong => "strong",
            StrengthBucket::Weak => "weak",
            StrengthBucket::Neutral => "neutral",
        }
    }

    /// UI color associated with the bucket.
    pub const fn color(self) -> &'static str {
        match self {
            StrengthBucket::Strong => "#90EE90",
            StrengthBucket::Weak => "#FFB6C1",
            StrengthBucket::Neutral => "#FFD700",
        }
    }
}

/// Scoring constants. A bespoke heuristic with no classical citation;
/// the values are preserved exactly for output parity and gathered here
/// so replacing the policy is a data edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorePolicy {
    /// Base values per nature: [exalted, plain, debilitated].
    pub benefic: [f64; 3],
    pub malefic: [f64; 3],
    pub neutral: [f64; 3],
    pub combust_factor: f64,
    pub retrograde_factor: f64,
    pub aspect_benefic: f64,
    pub aspect_malefic: f64,
    pub strong_threshold: f64,
    pub weak_threshold: f64,
}

pub const DEFAULT_SCORE_POLICY: ScorePolicy = ScorePolicy {
    benefic: [1.5, 0.8, -0.5],
    malefic: [0.5, -0.8, -1.5],
    neutral: [1.0, 0.2, -1.0],
    combust_factor: 0.5,
    retrograde_factor: 0.8,
    aspect_benefic: 0.3,
    aspect_malefic: -0.3,
    strong_threshold: 0.2,
    weak_threshold: -0.2,
};

impl Default for ScorePolicy {
    fn default() -> Self {
        DEFAULT_SCORE_POLICY
    }
}

impl ScorePolicy {
    fn resident_base(&self, placement: &Placement) -> f64 {
        let idx = if placement.status.exalted {
            0
        } else if placement.status.debilitated {
            2
        } else {
            1
        };
        match placement.body.nature() {
            Nature::Benefic => self.benefic[idx],
            Nature::Malefic => self.malefic[idx],
            Nature::Neutral => self.neutral[idx],
        }
    }

    fn resident_value(&self, placement: &Placement) -> f64 {
        let mut value = self.resident_base(placement);
        if placement.status.combust {
            value *= self.combust_factor;
        }
        if placement.status.retrograde {
            value *= self.retrograde_factor;
        }
        value
    }

    fn aspect_value(&self, nature: Nature) -> f64 {
        match nature {
            Nature::Benefic => self.aspect_benefic,
            Nature::Malefic => self.aspect_malefic,
            Nature::Neutral => 0.0,
        }
    }

    fn bucket(&self, average: f64) -> StrengthBucket {
        if average >= self.strong_threshold {
            StrengthBucket::Strong
        } else if average <= self.weak_threshold {
            StrengthBucket::Weak
        } else {
            StrengthBucket::Neutral
        }
    }
}

/// A house's aggregated strength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HouseStrength {
    pub house: House,
    pub bucket: StrengthBucket,
    pub average: f64,
}

/// Score every house: residents contribute their nature/state base
/// (damped when combust or retrograde), each incoming aspect adds its
/// nature value, and the total is averaged over the contribution count
/// (zero when the house is untouched).
pub fn house_strengths(chart: &Chart) -> [HouseStrength; 12] {
    house_strengths_with(chart, &ScorePolicy::default())
}

pub fn house_strengths_with(chart: &Chart, policy: &ScorePolicy) -> [HouseStrength; 12] {
    let mut out = [HouseStrength {
        house: House::First,
        bucket: StrengthBucket::Neutral,
        average: 0.0,
    }; 12];

    for (slot, house) in out.iter_mut().zip(House::all()) {
        let mut sum = 0.0;
        let mut count = 0u32;

        for placement in chart.residents(house) {
            sum += policy.resident_value(placement);
            count += 1;
        }
        for aspect in chart.aspects.iter().filter(|a| a.to_house == house) {
            sum += policy.aspect_value(aspect.nature);
            count += 1;
        }

        let average = if count > 0 { sum / count as f64 } else { 0.0 };
        *slot = HouseStrength {
            house,
            bucket: policy.bucket(average),
            average,
        };
    }
    out
}
