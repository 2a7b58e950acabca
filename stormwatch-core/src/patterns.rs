//! Weather pattern classification engine
//!
//! Pure, stateless pattern detection from current conditions and the
//! calendar month. Same inputs always produce the same outputs.
//! Patterns may co-occur; output order is rule order.

use crate::input::Conditions;
use crate::text;
use chrono::{DateTime, Datelike, FixedOffset};
use serde::{Deserialize, Serialize};

/// Named meteorological regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    SouthwestMonsoon,
    NortheastMonsoon,
    IntertropicalConvergence,
    ActiveLowPressure,
    ConvectiveDevelopment,
    HighPressureRidge,
}

impl PatternKind {
    pub const ALL: [PatternKind; 6] = [
        PatternKind::SouthwestMonsoon,
        PatternKind::NortheastMonsoon,
        PatternKind::IntertropicalConvergence,
        PatternKind::ActiveLowPressure,
        PatternKind::ConvectiveDevelopment,
        PatternKind::HighPressureRidge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::SouthwestMonsoon => "southwest-monsoon",
            PatternKind::NortheastMonsoon => "northeast-monsoon",
            PatternKind::IntertropicalConvergence => "intertropical-convergence",
            PatternKind::ActiveLowPressure => "active-low-pressure",
            PatternKind::ConvectiveDevelopment => "convective-development",
            PatternKind::HighPressureRidge => "high-pressure-ridge",
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            PatternKind::SouthwestMonsoon => 0.85,
            PatternKind::NortheastMonsoon => 0.80,
            PatternKind::IntertropicalConvergence => 0.88,
            PatternKind::ActiveLowPressure => 0.90,
            PatternKind::ConvectiveDevelopment => 0.82,
            PatternKind::HighPressureRidge => 0.85,
        }
    }

    /// Multiplicative rainfall modifier
    pub fn modifier(&self) -> f64 {
        match self {
            PatternKind::SouthwestMonsoon => 1.25,
            PatternKind::NortheastMonsoon => 0.90,
            PatternKind::IntertropicalConvergence => 1.40,
            PatternKind::ActiveLowPressure => 1.35,
            PatternKind::ConvectiveDevelopment => 1.20,
            PatternKind::HighPressureRidge => 0.70,
        }
    }

    /// Points added to the overall risk score (total capped by the caller)
    pub fn risk_bonus(&self) -> u32 {
        match self {
            PatternKind::IntertropicalConvergence => 8,
            PatternKind::ActiveLowPressure => 6,
            PatternKind::ConvectiveDevelopment => 4,
            PatternKind::SouthwestMonsoon => 3,
            PatternKind::NortheastMonsoon | PatternKind::HighPressureRidge => 0,
        }
    }
}

/// A pattern that fired for the current conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedPattern {
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub confidence: f64,
    pub impact: String,
    pub modifier: f64,
}

impl DetectedPattern {
    fn new(kind: PatternKind) -> Self {
        DetectedPattern {
            kind,
            confidence: kind.confidence(),
            impact: text::pattern_impact(kind).to_string(),
            modifier: kind.modifier(),
        }
    }
}

/// Detect all patterns for the given conditions at `timestamp`.
///
/// The month is taken in the timestamp's own offset.
pub fn detect_weather_patterns(
    conditions: &Conditions,
    timestamp: DateTime<FixedOffset>,
) -> Vec<DetectedPattern> {
    let month = timestamp.month();
    let c = conditions;

    let checks = [
        (PatternKind::SouthwestMonsoon, check_southwest_monsoon(month)),
        (PatternKind::NortheastMonsoon, check_northeast_monsoon(month)),
        (PatternKind::IntertropicalConvergence, check_itcz(c)),
        (PatternKind::ActiveLowPressure, check_active_low(c)),
        (PatternKind::ConvectiveDevelopment, check_convective(c)),
        (PatternKind::HighPressureRidge, check_high_pressure_ridge(c)),
    ];

    checks
        .into_iter()
        .filter(|(_, fired)| *fired)
        .map(|(kind, _)| DetectedPattern::new(kind))
        .collect()
}

/// Product of all detected modifiers (1.0 when none fired)
pub fn combined_modifier(patterns: &[DetectedPattern]) -> f64 {
    patterns.iter().map(|p| p.modifier).product()
}

pub fn has_pattern(patterns: &[DetectedPattern], kind: PatternKind) -> bool {
    patterns.iter().any(|p| p.kind == kind)
}

// ---------- seasonal ----------

fn check_southwest_monsoon(month: u32) -> bool {
    matches!(month, 6..=9)
}

fn check_northeast_monsoon(month: u32) -> bool {
    matches!(month, 11 | 12 | 1 | 2)
}

// ---------- threshold ----------

fn check_itcz(c: &Conditions) -> bool {
    c.humidity_pct >= 90.0 && c.pressure_hpa < 1008.0 && c.wind_kmh < 25.0
}

fn check_active_low(c: &Conditions) -> bool {
    c.pressure_hpa < 1004.0 && c.humidity_pct > 85.0
}

fn check_convective(c: &Conditions) -> bool {
    c.humidity_pct >= 88.0
        && c.pressure_hpa < 1010.0
        && (15.0..=40.0).contains(&c.wind_kmh)
}

fn check_high_pressure_ridge(c: &Conditions) -> bool {
    c.pressure_hpa >= 1014.0 && c.humidity_pct < 75.0 && c.wind_kmh < 20.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn in_month(month: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, month, 15, 12, 0, 0)
            .unwrap()
    }

    fn kinds(patterns: &[DetectedPattern]) -> Vec<PatternKind> {
        patterns.iter().map(|p| p.kind).collect()
    }

    // ---------- seasonal ----------

    #[test]
    fn southwest_monsoon_months() {
        let calm = Conditions::new(5.0, 1011.0, 78.0, 29.0);
        for month in [6, 7, 8, 9] {
            assert_eq!(
                kinds(&detect_weather_patterns(&calm, in_month(month))),
                vec![PatternKind::SouthwestMonsoon]
            );
        }
        assert!(detect_weather_patterns(&calm, in_month(5)).is_empty());
        assert!(detect_weather_patterns(&calm, in_month(10)).is_empty());
    }

    #[test]
    fn northeast_monsoon_months() {
        let calm = Conditions::new(5.0, 1011.0, 78.0, 26.0);
        for month in [11, 12, 1, 2] {
            assert_eq!(
                kinds(&detect_weather_patterns(&calm, in_month(month))),
                vec![PatternKind::NortheastMonsoon]
            );
        }
        assert!(detect_weather_patterns(&calm, in_month(3)).is_empty());
    }

    // ---------- threshold ----------

    #[test]
    fn itcz_at_threshold() {
        let c = Conditions::new(24.9, 1007.9, 90.0, 28.0);
        assert!(has_pattern(
            &detect_weather_patterns(&c, in_month(4)),
            PatternKind::IntertropicalConvergence
        ));
        let c = Conditions::new(25.0, 1007.9, 90.0, 28.0);
        assert!(!has_pattern(
            &detect_weather_patterns(&c, in_month(4)),
            PatternKind::IntertropicalConvergence
        ));
    }

    #[test]
    fn active_low_requires_humidity_above_85() {
        let c = Conditions::new(10.0, 1003.0, 85.0, 28.0);
        assert!(!has_pattern(
            &detect_weather_patterns(&c, in_month(4)),
            PatternKind::ActiveLowPressure
        ));
        let c = Conditions::new(10.0, 1003.0, 85.5, 28.0);
        assert!(has_pattern(
            &detect_weather_patterns(&c, in_month(4)),
            PatternKind::ActiveLowPressure
        ));
    }

    #[test]
    fn convective_wind_band_is_inclusive() {
        for wind in [15.0, 40.0] {
            let c = Conditions::new(wind, 1009.0, 88.0, 30.0);
            assert!(has_pattern(
                &detect_weather_patterns(&c, in_month(4)),
                PatternKind::ConvectiveDevelopment
            ));
        }
        let c = Conditions::new(41.0, 1009.0, 88.0, 30.0);
        assert!(detect_weather_patterns(&c, in_month(4)).is_empty());
    }

    #[test]
    fn high_pressure_ridge() {
        let c = Conditions::new(8.0, 1016.0, 60.0, 31.0);
        let patterns = detect_weather_patterns(&c, in_month(4));
        assert_eq!(kinds(&patterns), vec![PatternKind::HighPressureRidge]);
        assert_eq!(combined_modifier(&patterns), 0.70);
    }

    #[test]
    fn co_occurring_patterns_keep_rule_order() {
        let c = Conditions::new(18.0, 1002.0, 93.0, 29.0);
        let patterns = detect_weather_patterns(&c, in_month(7));
        assert_eq!(
            kinds(&patterns),
            vec![
                PatternKind::SouthwestMonsoon,
                PatternKind::IntertropicalConvergence,
                PatternKind::ActiveLowPressure,
                PatternKind::ConvectiveDevelopment,
            ]
        );
        let expected = 1.25 * 1.40 * 1.35 * 1.20;
        assert!((combined_modifier(&patterns) - expected).abs() < 1e-12);
    }

    #[test]
    fn detection_is_idempotent() {
        let c = Conditions::new(18.0, 1002.0, 93.0, 29.0);
        let first = detect_weather_patterns(&c, in_month(8));
        let second = detect_weather_patterns(&c, in_month(8));
        assert_eq!(first, second);
    }

    #[test]
    fn empty_modifier_is_neutral() {
        assert_eq!(combined_modifier(&[]), 1.0);
    }

    #[test]
    fn serializes_kebab_case_type() {
        let p = DetectedPattern::new(PatternKind::IntertropicalConvergence);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["type"], "intertropical-convergence");
        assert_eq!(json["modifier"], 1.40);
    }

    #[test]
    fn every_kind_serializes_as_its_name() {
        for kind in PatternKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.as_str());
            assert!((0.0..=1.0).contains(&kind.confidence()));
            assert!(kind.risk_bonus() <= 8);
        }
    }
}
