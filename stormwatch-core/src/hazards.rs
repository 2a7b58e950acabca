//! Per-hazard assessments: wind, pressure and storm formation
//!
//! Every tier lookup is driven by a named table so the hazard-severity
//! breakpoints stay in one place (the points tables used for aggregation
//! live separately in `risk`).
//!
//! Global invariants enforced:
//! - Lookups are exhaustive over the validated input range
//! - Confidence values are fixed per hazard model

use crate::input::Conditions;
use crate::patterns::{has_pattern, DetectedPattern, PatternKind};
use serde::{Deserialize, Serialize};

/// Hazard severity, ascending
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minimal,
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Minimal => "minimal",
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

// ---------- wind ----------

pub const WIND_CONFIDENCE: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindCategory {
    SuperTyphoon,
    Typhoon,
    Storm,
    Gale,
    Breeze,
    Calm,
}

impl WindCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindCategory::SuperTyphoon => "super typhoon force",
            WindCategory::Typhoon => "typhoon force",
            WindCategory::Storm => "storm force",
            WindCategory::Gale => "gale force",
            WindCategory::Breeze => "breeze",
            WindCategory::Calm => "calm",
        }
    }
}

/// One row of the wind severity table
#[derive(Debug, Clone, Copy)]
pub struct WindTier {
    pub min_kmh: f64,
    pub category: WindCategory,
    pub severity: Severity,
    pub signal: u8,
    pub action: &'static str,
}

/// Wind severity table, strongest first. The last row catches everything.
pub const WIND_TIERS: [WindTier; 7] = [
    WindTier {
        min_kmh: 185.0,
        category: WindCategory::SuperTyphoon,
        severity: Severity::Critical,
        signal: 5,
        action: "Evacuate to designated shelters immediately; stay away from windows and coastal areas",
    },
    WindTier {
        min_kmh: 118.0,
        category: WindCategory::Typhoon,
        severity: Severity::Critical,
        signal: 4,
        action: "Stay in a sturdy shelter; prepare for evacuation and expect widespread damage",
    },
    WindTier {
        min_kmh: 89.0,
        category: WindCategory::Storm,
        severity: Severity::High,
        signal: 3,
        action: "Secure roofs and loose objects; suspend outdoor and sea travel",
    },
    WindTier {
        min_kmh: 62.0,
        category: WindCategory::Gale,
        severity: Severity::Moderate,
        signal: 2,
        action: "Bring in outdoor items and avoid coastal and riverside areas",
    },
    WindTier {
        min_kmh: 39.0,
        category: WindCategory::Gale,
        severity: Severity::Low,
        signal: 1,
        action: "Secure light objects and monitor weather bulletins",
    },
    WindTier {
        min_kmh: 20.0,
        category: WindCategory::Breeze,
        severity: Severity::Minimal,
        signal: 0,
        action: "No action needed; light outdoor activities are safe",
    },
    WindTier {
        min_kmh: f64::NEG_INFINITY,
        category: WindCategory::Calm,
        severity: Severity::Minimal,
        signal: 0,
        action: "No action needed",
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindAssessment {
    pub speed_kmh: f64,
    pub category: WindCategory,
    pub severity: Severity,
    pub signal: u8,
    pub action: String,
    pub confidence: f64,
}

pub fn wind_tier(speed_kmh: f64) -> &'static WindTier {
    WIND_TIERS
        .iter()
        .find(|t| speed_kmh >= t.min_kmh)
        .unwrap_or(&WIND_TIERS[WIND_TIERS.len() - 1])
}

pub fn assess_wind(speed_kmh: f64) -> WindAssessment {
    let tier = wind_tier(speed_kmh);
    WindAssessment {
        speed_kmh,
        category: tier.category,
        severity: tier.severity,
        signal: tier.signal,
        action: tier.action.to_string(),
        confidence: WIND_CONFIDENCE,
    }
}

// ---------- pressure ----------

pub const PRESSURE_CONFIDENCE: f64 = 0.90;

/// Pressure at or above which conditions are considered fair, hPa
pub const FAVORABLE_PRESSURE_HPA: f64 = 1016.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PressureCategory {
    Critical,
    High,
    ModerateHigh,
    Moderate,
    Low,
    Normal,
    Favorable,
}

impl PressureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PressureCategory::Critical => "critical",
            PressureCategory::High => "high",
            PressureCategory::ModerateHigh => "moderate-high",
            PressureCategory::Moderate => "moderate",
            PressureCategory::Low => "low",
            PressureCategory::Normal => "normal",
            PressureCategory::Favorable => "favorable",
        }
    }
}

/// One row of the low-pressure table; applies when pressure is below `below_hpa`
#[derive(Debug, Clone, Copy)]
pub struct PressureTier {
    pub below_hpa: f64,
    pub category: PressureCategory,
    pub severity: Severity,
    pub description: &'static str,
}

/// Low-pressure table, deepest first
pub const PRESSURE_TIERS: [PressureTier; 5] = [
    PressureTier {
        below_hpa: 995.0,
        category: PressureCategory::Critical,
        severity: Severity::Critical,
        description: "Extremely low pressure consistent with a typhoon-strength system",
    },
    PressureTier {
        below_hpa: 1000.0,
        category: PressureCategory::High,
        severity: Severity::High,
        description: "Very low pressure indicating a strong tropical disturbance",
    },
    PressureTier {
        below_hpa: 1004.0,
        category: PressureCategory::ModerateHigh,
        severity: Severity::Moderate,
        description: "Low pressure area likely to bring sustained rain",
    },
    PressureTier {
        below_hpa: 1008.0,
        category: PressureCategory::Moderate,
        severity: Severity::Moderate,
        description: "Below-normal pressure supporting cloud and shower development",
    },
    PressureTier {
        below_hpa: 1010.0,
        category: PressureCategory::Low,
        severity: Severity::Low,
        description: "Slightly low pressure; isolated showers possible",
    },
];

const NORMAL_PRESSURE_DESCRIPTION: &str = "Pressure within the normal tropical range";
const FAVORABLE_PRESSURE_DESCRIPTION: &str = "High pressure favoring fair and stable weather";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureAssessment {
    pub pressure_hpa: f64,
    pub category: PressureCategory,
    pub severity: Severity,
    pub description: String,
    pub confidence: f64,
}

pub fn assess_pressure(pressure_hpa: f64) -> PressureAssessment {
    let (category, severity, description) =
        match PRESSURE_TIERS.iter().find(|t| pressure_hpa < t.below_hpa) {
            Some(tier) => (tier.category, tier.severity, tier.description),
            None if pressure_hpa >= FAVORABLE_PRESSURE_HPA => (
                PressureCategory::Favorable,
                Severity::Minimal,
                FAVORABLE_PRESSURE_DESCRIPTION,
            ),
            None => (
                PressureCategory::Normal,
                Severity::Minimal,
                NORMAL_PRESSURE_DESCRIPTION,
            ),
        };

    PressureAssessment {
        pressure_hpa,
        category,
        severity,
        description: description.to_string(),
        confidence: PRESSURE_CONFIDENCE,
    }
}

// ---------- storm formation ----------

/// Pressure below which a deficit contributes to formation risk, hPa
const FORMATION_PRESSURE_BASE: f64 = 1008.0;
/// Humidity above which excess moisture contributes, %
const FORMATION_HUMIDITY_BASE: f64 = 85.0;
/// Temperature above which warmth contributes, °C
const FORMATION_TEMPERATURE_BASE: f64 = 27.0;
/// Bonus when an active low-pressure pattern is present
const ACTIVE_LOW_FORMATION_BONUS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormationLikelihood {
    High,
    Moderate,
    Low,
    VeryLow,
}

impl FormationLikelihood {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormationLikelihood::High => "high",
            FormationLikelihood::Moderate => "moderate",
            FormationLikelihood::Low => "low",
            FormationLikelihood::VeryLow => "very-low",
        }
    }

    pub fn timeframe(&self) -> &'static str {
        match self {
            FormationLikelihood::High => "24-48h",
            FormationLikelihood::Moderate => "48-72h",
            FormationLikelihood::Low | FormationLikelihood::VeryLow => "72h+",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            FormationLikelihood::High => {
                "Monitor PAGASA tropical cyclone bulletins every 6 hours and prepare emergency supplies"
            }
            FormationLikelihood::Moderate => {
                "Check PAGASA advisories twice daily for low pressure area updates"
            }
            FormationLikelihood::Low => "Check the daily weather outlook",
            FormationLikelihood::VeryLow => "Routine monitoring is sufficient",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StormFormationAssessment {
    /// Formation risk, 0-100
    pub score: f64,
    pub likelihood: FormationLikelihood,
    pub timeframe: String,
    pub advice: String,
    pub confidence: f64,
}

/// Additive formation-risk score, clamped to [0, 100]
pub fn formation_score(c: &Conditions, patterns: &[DetectedPattern]) -> f64 {
    let mut score = 0.0;

    let deficit = FORMATION_PRESSURE_BASE - c.pressure_hpa;
    if deficit > 0.0 {
        let weight = if deficit > 8.0 {
            7.0
        } else if deficit > 4.0 {
            5.0
        } else {
            3.0
        };
        score += deficit * weight;
    }

    let excess_humidity = c.humidity_pct - FORMATION_HUMIDITY_BASE;
    if excess_humidity > 0.0 {
        let weight = if c.humidity_pct > 92.0 { 1.5 } else { 0.8 };
        score += excess_humidity * weight;
    }

    let excess_temperature = c.temperature_c - FORMATION_TEMPERATURE_BASE;
    if excess_temperature > 0.0 {
        score += excess_temperature * 2.0;
    }

    if (20.0..30.0).contains(&c.wind_kmh) {
        score += 3.0;
    } else if (30.0..=60.0).contains(&c.wind_kmh) {
        score += 6.0;
    }

    if has_pattern(patterns, PatternKind::ActiveLowPressure) {
        score += ACTIVE_LOW_FORMATION_BONUS;
    }

    score.clamp(0.0, 100.0)
}

pub fn formation_likelihood(score: f64) -> FormationLikelihood {
    if score > 75.0 {
        FormationLikelihood::High
    } else if score > 55.0 {
        FormationLikelihood::Moderate
    } else if score > 35.0 {
        FormationLikelihood::Low
    } else {
        FormationLikelihood::VeryLow
    }
}

/// Model confidence depends on how textbook the setup is
pub fn formation_confidence(c: &Conditions) -> f64 {
    if c.pressure_hpa < 1000.0 && c.humidity_pct > 90.0 && c.temperature_c > 28.0 {
        0.88
    } else if c.pressure_hpa < 1005.0 && c.humidity_pct > 85.0 {
        0.75
    } else if c.pressure_hpa < 1010.0 || c.humidity_pct > 80.0 {
        0.65
    } else {
        0.50
    }
}

pub fn assess_storm_formation(
    c: &Conditions,
    patterns: &[DetectedPattern],
) -> StormFormationAssessment {
    let score = formation_score(c, patterns);
    let likelihood = formation_likelihood(score);
    StormFormationAssessment {
        score,
        likelihood,
        timeframe: likelihood.timeframe().to_string(),
        advice: likelihood.advice().to_string(),
        confidence: formation_confidence(c),
    }
}
