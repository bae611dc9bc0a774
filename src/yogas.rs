//! Yoga detection over a computed chart.
//!
//! Detects the classical combinations the product surfaces: angular
//! Jupiter, Moon–Mars conjunction, a benefic in the tenth, the
//! Saraswati grouping, exalted Pancha Mahapurusha candidates and the
//! Kala Sarpa axis. Conditions are the simplified chart-level forms,
//! not full shastra rules.

use serde::Serialize;

use crate::chart::Chart;
use crate::{CelestialBody, House, Nature, CLASSICAL_BODIES};

/// A detected yoga with its formation details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YogaMatch {
    pub name: &'static str,
    pub description: &'static str,
    pub details: String,
}

const KENDRAS: [House; 4] = [House::First, House::Fourth, House::Seventh, House::Tenth];
const TRIKONAS: [House; 3] = [House::First, House::Fifth, House::Ninth];

fn in_kendra(house: House) -> bool {
    KENDRAS.contains(&house)
}

fn in_kendra_or_trikona(house: House) -> bool {
    in_kendra(house) || TRIKONAS.contains(&house)
}

/// Run every detector against the chart.
pub fn detect_yogas(chart: &Chart) -> Vec<YogaMatch> {
    let mut yogas = Vec::new();

    // Gaja Kesari: Jupiter in an angular house.
    if let Some(jupiter) = chart.placement(CelestialBody::Jupiter) {
        if in_kendra(jupiter.house) {
            yogas.push(YogaMatch {
                name: "Gaja Kesari Yoga",
                description: "Jupiter in an angular house",
                details: format!("Jupiter in house {} ({})", jupiter.house, jupiter.sign),
            });
        }
    }

    // Chandra Mangal: Moon and Mars share a house.
    if let (Some(moon), Some(mars)) = (
        chart.placement(CelestialBody::Moon),
        chart.placement(CelestialBody::Mars),
    ) {
        if moon.house == mars.house {
            yogas.push(YogaMatch {
                name: "Chandra Mangal Yoga",
                description: "Moon and Mars conjunct",
                details: format!("Moon and Mars in house {} ({})", moon.house, moon.sign),
            });
        }
    }

    // Amala: a natural benefic in the tenth house.
    for placement in chart.residents(House::Tenth) {
        if placement.body.nature() == Nature::Benefic {
            yogas.push(YogaMatch {
                name: "Amala Yoga",
                description: "A benefic in the tenth house",
                details: format!("{} in house 10 ({})", placement.body, placement.sign),
            });
        }
    }

    // Saraswati: at least two of Mercury, Jupiter, Venus in a kendra or
    // trikona.
    let saraswati: Vec<_> = [
        CelestialBody::Mercury,
        CelestialBody::Jupiter,
        CelestialBody::Venus,
    ]
    .iter()
    .filter_map(|b| chart.placement(*b))
    .filter(|p| in_kendra_or_trikona(p.house))
    .collect();
    if saraswati.len() >= 2 {
        let details = saraswati
            .iter()
            .map(|p| format!("{} in house {} ({})", p.body, p.house, p.sign))
            .collect::<Vec<_>>()
            .join(", ");
        yogas.push(YogaMatch {
            name: "Saraswati Yoga",
            description: "Mercury, Jupiter and Venus well placed",
            details,
        });
    }

    // Pancha Mahapurusha: one of the five candidates exalted in a
    // kendra.
    for body in [
        CelestialBody::Mars,
        CelestialBody::Mercury,
        CelestialBody::Jupiter,
        CelestialBody::Venus,
        CelestialBody::Saturn,
    ] {
        if let Some(p) = chart.placement(body) {
            if p.status.exalted && in_kendra(p.house) {
                yogas.push(YogaMatch {
                    name: "Pancha Mahapurusha Yoga",
                    description: "An exalted planet in an angular house",
                    details: format!("{} exalted in house {} ({})", p.body, p.house, p.sign),
                });
            }
        }
    }

    // Kala Sarpa: all seven classical bodies on one side of the
    // Rahu–Ketu axis.
    if let (Some(rahu), Some(ketu)) = (
        chart.placement(CelestialBody::Rahu),
        chart.placement(CelestialBody::Ketu),
    ) {
        let classical: Vec<_> = CLASSICAL_BODIES
            .iter()
            .filter_map(|b| chart.placement(*b))
            .collect();
        if classical.len() == CLASSICAL_BODIES.len() {
            let relative =
                |lon: f64| crate::normalize_360(lon - rahu.longitude);
            let all_ahead = classical.iter().all(|p| relative(p.longitude) < 180.0);
            let all_behind = classical.iter().all(|p| relative(p.longitude) >= 180.0);
            if all_ahead || all_behind {
                yogas.push(YogaMatch {
                    name: "Kala Sarpa Yoga",
                    description: "All planets within the Rahu-Ketu axis",
                    details: format!(
                        "Rahu in house {} ({}), Ketu in house {} ({})",
                        rahu.house, rahu.sign, ketu.house, ketu.sign
                    ),
                });
            }
        }
    }

    yogas
}
