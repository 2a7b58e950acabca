//! Overall risk aggregation
//!
//! Global invariants enforced:
//! - Deterministic risk calculations
//! - Score is an integer in [0, 100]
//! - Level is a pure function of score and thresholds

use crate::hazards::{
    FormationLikelihood, PressureAssessment, Severity, StormFormationAssessment, WindAssessment,
};
use crate::input::Conditions;
use crate::patterns::DetectedPattern;
use crate::rainfall::{FloodRisk, RainfallAssessment};
use crate::text;
use serde::{Deserialize, Serialize};

/// Risk level classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Minimal,  // < 15
    Low,      // 15-30
    Moderate, // 30-50
    High,     // 50-70
    Critical, // >= 70
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 5] = [
        RiskLevel::Minimal,
        RiskLevel::Low,
        RiskLevel::Moderate,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Minimal => "MINIMAL",
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

/// Configurable risk level thresholds (lower bounds, inclusive)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskThresholds {
    pub low: f64,
    pub moderate: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        RiskThresholds {
            low: 15.0,
            moderate: 30.0,
            high: 50.0,
            critical: 70.0,
        }
    }
}

/// Assign risk level with default thresholds
pub fn assign_risk_level(score: u32) -> RiskLevel {
    assign_risk_level_with_thresholds(score, &RiskThresholds::default())
}

/// Assign risk level with custom thresholds
pub fn assign_risk_level_with_thresholds(score: u32, thresholds: &RiskThresholds) -> RiskLevel {
    let score = f64::from(score);
    if score >= thresholds.critical {
        RiskLevel::Critical
    } else if score >= thresholds.high {
        RiskLevel::High
    } else if score >= thresholds.moderate {
        RiskLevel::Moderate
    } else if score >= thresholds.low {
        RiskLevel::Low
    } else {
        RiskLevel::Minimal
    }
}

// ---------- points tables ----------
//
// Distinct from the hazard severity tables in `hazards`: these convert a
// hazard into score points for aggregation.

/// Wind points: (minimum km/h, points), strongest first
pub const WIND_POINTS: [(f64, u32); 5] = [(185.0, 35), (118.0, 28), (89.0, 20), (62.0, 12), (39.0, 6)];

/// Pressure points: (pressure below hPa, points), deepest first
pub const PRESSURE_POINTS: [(f64, u32); 4] = [(995.0, 18), (1000.0, 14), (1004.0, 10), (1008.0, 6)];

/// Storm formation points: (minimum formation score, points)
pub const FORMATION_POINTS: [(f64, u32); 3] = [(75.0, 10), (50.0, 7), (25.0, 4)];

pub const PATTERN_BONUS_CAP: u32 = 15;
pub const COMBINED_THREAT_BONUS: u32 = 8;
/// Points a single hazard must reach to count towards the combined threat
pub const COMBINED_THREAT_MIN_POINTS: u32 = 15;
pub const TROPICAL_FLOOR_POINTS: u32 = 3;
pub const MAX_SCORE: u32 = 100;

pub fn wind_points(speed_kmh: f64) -> u32 {
    WIND_POINTS
        .iter()
        .find(|(min, _)| speed_kmh >= *min)
        .map_or(0, |(_, points)| *points)
}

pub fn pressure_points(pressure_hpa: f64) -> u32 {
    PRESSURE_POINTS
        .iter()
        .find(|(below, _)| pressure_hpa < *below)
        .map_or(0, |(_, points)| *points)
}

pub fn formation_points(score: f64) -> u32 {
    FORMATION_POINTS
        .iter()
        .find(|(min, _)| score >= *min)
        .map_or(0, |(_, points)| *points)
}

/// Pattern bonus, capped at `PATTERN_BONUS_CAP`
pub fn pattern_bonus(patterns: &[DetectedPattern]) -> u32 {
    patterns
        .iter()
        .map(|p| p.kind.risk_bonus())
        .sum::<u32>()
        .min(PATTERN_BONUS_CAP)
}

/// One contribution to the overall score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub factor: String,
    pub points: u32,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub overall_score: u32,
    pub level: RiskLevel,
    pub factors: Vec<RiskFactor>,
    pub recommendation: String,
    pub confidence: f64,
}

/// Facts a level recommendation may cite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationFacts {
    pub level: RiskLevel,
    /// Wind speed, when wind contributed points
    pub wind_kmh: Option<f64>,
    /// Expected 24h rain, when rain contributed points
    pub rain_mm: Option<f64>,
}

/// The four hazard assessments of a general analysis
#[derive(Debug, Clone, Copy)]
pub struct HazardInputs<'a> {
    pub wind: &'a WindAssessment,
    pub rain: &'a RainfallAssessment,
    pub pressure: &'a PressureAssessment,
    pub storm: &'a StormFormationAssessment,
}

fn flood_severity(risk: FloodRisk) -> Severity {
    match risk {
        FloodRisk::Minimal => Severity::Minimal,
        FloodRisk::Low => Severity::Low,
        FloodRisk::Moderate => Severity::Moderate,
        FloodRisk::High => Severity::High,
        FloodRisk::Severe => Severity::Critical,
    }
}

fn formation_severity(likelihood: FormationLikelihood) -> Severity {
    match likelihood {
        FormationLikelihood::High => Severity::High,
        FormationLikelihood::Moderate => Severity::Moderate,
        FormationLikelihood::Low => Severity::Low,
        FormationLikelihood::VeryLow => Severity::Minimal,
    }
}

/// Aggregate hazards and patterns into a single risk assessment
pub fn calculate_overall_risk(
    hazards: HazardInputs<'_>,
    conditions: &Conditions,
    patterns: &[DetectedPattern],
    thresholds: &RiskThresholds,
) -> RiskAssessment {
    let HazardInputs {
        wind,
        rain,
        pressure,
        storm,
    } = hazards;
    let mut factors = Vec::new();

    let wind_pts = wind_points(wind.speed_kmh);
    if wind_pts > 0 {
        factors.push(RiskFactor {
            factor: text::wind_factor(wind),
            points: wind_pts,
            severity: wind.severity,
        });
    }

    let rain_pts = rain.risk_points();
    if rain_pts > 0 {
        factors.push(RiskFactor {
            factor: text::rain_factor(rain),
            points: rain_pts,
            severity: flood_severity(rain.flood_risk),
        });
    }

    let pressure_pts = pressure_points(pressure.pressure_hpa);
    if pressure_pts > 0 {
        factors.push(RiskFactor {
            factor: text::pressure_factor(pressure),
            points: pressure_pts,
            severity: pressure.severity,
        });
    }

    let storm_pts = formation_points(storm.score);
    if storm_pts > 0 {
        factors.push(RiskFactor {
            factor: text::formation_factor(storm),
            points: storm_pts,
            severity: formation_severity(storm.likelihood),
        });
    }

    let bonus = pattern_bonus(patterns);
    if bonus > 0 {
        factors.push(RiskFactor {
            factor: text::pattern_factor(patterns),
            points: bonus,
            severity: Severity::Moderate,
        });
    }

    let major_hazards = [wind_pts, rain_pts, pressure_pts, storm_pts]
        .iter()
        .filter(|p| **p >= COMBINED_THREAT_MIN_POINTS)
        .count();
    if major_hazards >= 2 {
        factors.push(RiskFactor {
            factor: text::combined_threat_factor(major_hazards),
            points: COMBINED_THREAT_BONUS,
            severity: Severity::High,
        });
    }

    let mut total: u32 = factors.iter().map(|f| f.points).sum();

    if total == 0 && (conditions.humidity_pct > 70.0 || conditions.wind_kmh > 15.0) {
        factors.push(RiskFactor {
            factor: text::TROPICAL_FLOOR_FACTOR.to_string(),
            points: TROPICAL_FLOOR_POINTS,
            severity: Severity::Minimal,
        });
        total = TROPICAL_FLOOR_POINTS;
    }

    let overall_score = total.min(MAX_SCORE);
    let level = assign_risk_level_with_thresholds(overall_score, thresholds);

    let recommendation = text::risk_recommendation(&RecommendationFacts {
        level,
        wind_kmh: (wind_pts > 0).then_some(wind.speed_kmh),
        rain_mm: (rain_pts > 0).then_some(rain.expected_24h_mm),
    });

    // Storm formation confidence is not part of the overall figure
    let confidence = (wind.confidence + rain.confidence + pressure.confidence) / 3.0;

    tracing::debug!(
        overall_score,
        level = level.as_str(),
        factors = factors.len(),
        "overall risk calculated"
    );

    RiskAssessment {
        overall_score,
        level,
        factors,
        recommendation,
        confidence,
    }
}
