//! Golden end-to-end chart for the reference birth data
//! (1998-05-06 09:20 UTC+5:30 at 30.7167N 76.8833E) over fixture
//! positions. Every derived value is pinned so a rule regression shows
//! up as a concrete diff, and the whole response must be byte-stable
//! across runs.

use kundli_core::ephemeris::FixedPositions;
use kundli_core::service::{compute_chart, compute_kundli, KundliRequest};
use kundli_core::varga::navamsa_longitude;
use kundli_core::{CelestialBody, ChartVariant, Dignity, House, ZodiacSign};

use approx::assert_relative_eq;

fn request(chart_type: ChartVariant) -> KundliRequest {
    KundliRequest {
        date: "1998-05-06".to_string(),
        time: "09:20".to_string(),
        lat: 30.7167,
        lon: 76.8833,
        tz: 5.5,
        chart_type,
    }
}

fn empty_dataset() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

#[test]
fn golden_rasi_chart() {
    let chart = compute_chart(&request(ChartVariant::Rasi), &FixedPositions::example()).unwrap();

    assert_eq!(chart.asc_sign, ZodiacSign::Cancer);

    // (body, sign, house, dignity, [exalted, debilitated, peak, combust, retrograde])
    let expectations: [(CelestialBody, ZodiacSign, u8, Dignity, [bool; 5]); 12] = [
        (CelestialBody::Sun, ZodiacSign::Aries, 10, Dignity::Friend, [true, false, false, false, false]),
        (CelestialBody::Moon, ZodiacSign::Taurus, 11, Dignity::Neutral, [true, false, false, false, false]),
        (CelestialBody::Mars, ZodiacSign::Taurus, 11, Dignity::Neutral, [false, false, false, true, false]),
        (CelestialBody::Mercury, ZodiacSign::Aries, 10, Dignity::Neutral, [false, false, false, true, false]),
        (CelestialBody::Jupiter, ZodiacSign::Pisces, 9, Dignity::Own, [false, false, false, false, true]),
        (CelestialBody::Venus, ZodiacSign::Pisces, 9, Dignity::Neutral, [true, false, true, false, false]),
        (CelestialBody::Saturn, ZodiacSign::Aries, 10, Dignity::Neutral, [false, true, false, false, false]),
        (CelestialBody::Rahu, ZodiacSign::Leo, 2, Dignity::NotApplicable, [false, false, false, false, true]),
        (CelestialBody::Ketu, ZodiacSign::Aquarius, 8, Dignity::NotApplicable, [false, false, false, false, false]),
        (CelestialBody::Uranus, ZodiacSign::Aquarius, 8, Dignity::NotApplicable, [false, false, false, false, true]),
        (CelestialBody::Neptune, ZodiacSign::Aquarius, 8, Dignity::NotApplicable, [false, false, false, false, false]),
        (CelestialBody::Pluto, ZodiacSign::Sagittarius, 6, Dignity::NotApplicable, [false, false, false, false, true]),
    ];

    for (body, sign, house, dignity, flags) in expectations {
        let p = chart.placement(body).unwrap_or_else(|| panic!("{body} missing"));
        assert_eq!(p.sign, sign, "{body} sign");
        assert_eq!(p.house.number(), house, "{body} house");
        assert_eq!(p.dignity, dignity, "{body} dignity");
        assert_eq!(p.status.exalted, flags[0], "{body} exalted");
        assert_eq!(p.status.debilitated, flags[1], "{body} debilitated");
        assert_eq!(p.status.peak, flags[2], "{body} peak");
        assert_eq!(p.status.combust, flags[3], "{body} combust");
        assert_eq!(p.status.retrograde, flags[4], "{body} retrograde");
    }
}

#[test]
fn golden_ketu_is_opposite_rahu() {
    let chart = compute_chart(&request(ChartVariant::Rasi), &FixedPositions::example()).unwrap();
    let rahu = chart.placement(CelestialBody::Rahu).unwrap();
    let ketu = chart.placement(CelestialBody::Ketu).unwrap();
    assert_relative_eq!(
        ketu.longitude,
        (rahu.longitude + 180.0).rem_euclid(360.0)
    );
    assert!(!ketu.status.retrograde);
}

#[test]
fn golden_aspect_projection() {
    let chart = compute_chart(&request(ChartVariant::Rasi), &FixedPositions::example()).unwrap();

    let targets = |body: CelestialBody| -> Vec<u8> {
        chart
            .aspects
            .iter()
            .filter(|a| a.body == body)
            .map(|a| a.to_house.number())
            .collect()
    };

    // Mars sits in house 11: 4th/7th/8th land on 2, 5, 6
    assert_eq!(targets(CelestialBody::Mars), vec![2, 5, 6]);
    // Saturn sits in house 10: 3rd/7th/10th land on 12, 4, 7
    assert_eq!(targets(CelestialBody::Saturn), vec![12, 4, 7]);
    // Rahu sits in house 2: 5th/9th land on 6, 10
    assert_eq!(targets(CelestialBody::Rahu), vec![6, 10]);
    // The Sun throws only its 7th
    assert_eq!(targets(CelestialBody::Sun), vec![4]);
}

#[test]
fn golden_house_strengths() {
    let response = compute_kundli(
        &request(ChartVariant::Rasi),
        &FixedPositions::example(),
        empty_dataset(),
    )
    .unwrap();

    assert_eq!(response.house_strengths[&9].strength.label(), "strong");
    assert_eq!(response.house_strengths[&9].color, "#90EE90");
    assert_eq!(response.house_strengths[&2].strength.label(), "weak");
    assert_eq!(response.house_strengths[&2].color, "#FFB6C1");
    assert_eq!(response.house_strengths[&10].strength.label(), "neutral");
    assert_eq!(response.house_strengths[&10].color, "#FFD700");
}

#[test]
fn golden_navamsa_chart() {
    let chart =
        compute_chart(&request(ChartVariant::Navamsa), &FixedPositions::example()).unwrap();

    // Asc 99.0° → Pisces in D9
    assert_eq!(chart.asc_sign, ZodiacSign::Pisces);

    // Sun 21.8° Aries → part 6 of the fire group → Libra
    let sun = chart.placement(CelestialBody::Sun).unwrap();
    assert_eq!(sun.sign, ZodiacSign::Libra);
    assert_relative_eq!(sun.longitude, navamsa_longitude(21.8), epsilon = 1e-9);
    // Libra is the Sun's debilitation sign; the D9 flags follow the
    // transformed longitude.
    assert!(sun.status.debilitated);

    // Nodes pass through unchanged
    let rahu = chart.placement(CelestialBody::Rahu).unwrap();
    assert_relative_eq!(rahu.longitude, 145.0);
    assert_eq!(rahu.sign, ZodiacSign::Leo);
}

#[test]
fn navamsa_literal_from_mid_aries() {
    // 15° Aries: part floor(15/3.333) = 4, group start 0 → Leo
    let d9 = navamsa_longitude(15.0);
    assert_eq!(ZodiacSign::from_longitude(d9), ZodiacSign::Leo);
}

#[test]
fn response_is_byte_stable_across_runs() {
    let a = compute_kundli(
        &request(ChartVariant::Rasi),
        &FixedPositions::example(),
        empty_dataset(),
    )
    .unwrap();
    let b = compute_kundli(
        &request(ChartVariant::Rasi),
        &FixedPositions::example(),
        empty_dataset(),
    )
    .unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn response_shape_matches_the_wire_contract() {
    let response = compute_kundli(
        &request(ChartVariant::Rasi),
        &FixedPositions::example(),
        empty_dataset(),
    )
    .unwrap();
    let value = serde_json::to_value(&response).unwrap();

    assert_eq!(value["asc_sign"], "Cancer");
    assert_eq!(value["positions"]["Ke"], 325.0);
    assert_eq!(value["sign_planets"]["Aries"][0]["name"], "Su");
    assert_eq!(value["sign_planets"]["Aries"][0]["deg"], 21.8);
    assert_eq!(
        value["sign_planets"]["Aries"][0]["status"],
        serde_json::json!(["exalted"])
    );
    assert_eq!(value["house_descriptions"]["1"], "Self, body, appearance, personality");
    assert_eq!(value["house_strengths"]["9"]["strength"], "strong");
    assert_eq!(value["house_strengths"]["9"]["color"], "#90EE90");
    assert!(value["dataset"].as_object().unwrap().is_empty());
}

#[test]
fn house_bijection_holds_for_every_ascendant() {
    for asc_index in 0..12 {
        let source = FixedPositions::new(asc_index as f64 * 30.0 + 5.0)
            .with_body(CelestialBody::Sun, 10.0, 1.0)
            .with_body(CelestialBody::Moon, 40.0, 13.0)
            .with_body(CelestialBody::Mars, 70.0, 0.5)
            .with_body(CelestialBody::Mercury, 100.0, 1.2)
            .with_body(CelestialBody::Jupiter, 130.0, 0.1)
            .with_body(CelestialBody::Venus, 160.0, 1.1)
            .with_body(CelestialBody::Saturn, 190.0, 0.05)
            .with_body(CelestialBody::Rahu, 220.0, -0.05)
            .with_body(CelestialBody::Uranus, 250.0, 0.01)
            .with_body(CelestialBody::Neptune, 280.0, 0.01)
            .with_body(CelestialBody::Pluto, 310.0, 0.01);
        let chart = compute_chart(&request(ChartVariant::Rasi), &source).unwrap();
        let mut seen = [false; 12];
        for house in House::all() {
            let sign = chart.house_sign(house);
            assert!(!seen[sign.index()]);
            seen[sign.index()] = true;
            assert_eq!(chart.house_of_sign(sign), house);
        }
        assert!(seen.iter().all(|s| *s));
    }
}
