//! Rainfall prediction model
//!
//! Layered heuristic: baseline, additive humidity / pressure / wind /
//! warmth terms, one multiplicative humidity-pressure synergy bonus, and
//! finally the weather-pattern modifier. Every rule that fires is kept in
//! the factor audit trail of the result.
//!
//! Global invariants enforced:
//! - Pattern modifier is applied after the synergy bonus
//! - At most one synergy bonus applies (strongest first)
//! - Outputs are finite and floored (5 mm / 8 mm)

use crate::input::Conditions;
use serde::{Deserialize, Serialize};

/// Background 24h rainfall for a tropical location, mm
pub const RAINFALL_BASELINE_MM: f64 = 8.0;

/// Reference pressure for the deficit terms, hPa
pub const RAINFALL_PRESSURE_BASELINE_HPA: f64 = 1012.0;

pub const MIN_RAINFALL_24H_MM: f64 = 5.0;
pub const MIN_RAINFALL_48H_MM: f64 = 8.0;
pub const FORECAST_48H_FACTOR: f64 = 1.6;

/// Confidence reported when no factor fired
const DEFAULT_CONFIDENCE: f64 = 0.50;

/// Confidence attached to the pattern modifier factor
const PATTERN_MODIFIER_CONFIDENCE: f64 = 0.80;

/// Linear contribution `offset + (value - threshold) * slope`, active at or above `threshold`
#[derive(Debug, Clone, Copy)]
pub struct LinearBand {
    pub threshold: f64,
    pub offset: f64,
    pub slope: f64,
    pub confidence: f64,
    pub label: &'static str,
}

impl LinearBand {
    fn contribution(&self, value: f64) -> f64 {
        self.offset + (value - self.threshold) * self.slope
    }
}

/// Humidity bands, most humid first; bands meet end to end
pub const HUMIDITY_BANDS: [LinearBand; 5] = [
    LinearBand {
        threshold: 95.0,
        offset: 48.0,
        slope: 6.0,
        confidence: 0.85,
        label: "Saturated air mass",
    },
    LinearBand {
        threshold: 92.0,
        offset: 36.0,
        slope: 4.0,
        confidence: 0.80,
        label: "Very high humidity",
    },
    LinearBand {
        threshold: 88.0,
        offset: 22.0,
        slope: 3.5,
        confidence: 0.75,
        label: "High humidity",
    },
    LinearBand {
        threshold: 82.0,
        offset: 10.0,
        slope: 2.0,
        confidence: 0.65,
        label: "Elevated humidity",
    },
    LinearBand {
        threshold: 75.0,
        offset: 3.0,
        slope: 1.0,
        confidence: 0.55,
        label: "Moderate humidity",
    },
];

/// Pressure-deficit bands (deficit below 1012 hPa), deepest first
pub const PRESSURE_DEFICIT_BANDS: [LinearBand; 4] = [
    LinearBand {
        threshold: 12.0,
        offset: 38.0,
        slope: 2.5,
        confidence: 0.85,
        label: "Deep pressure deficit",
    },
    LinearBand {
        threshold: 8.0,
        offset: 24.0,
        slope: 3.5,
        confidence: 0.80,
        label: "Strong pressure deficit",
    },
    LinearBand {
        threshold: 4.0,
        offset: 10.0,
        slope: 3.5,
        confidence: 0.70,
        label: "Moderate pressure deficit",
    },
    LinearBand {
        threshold: 1.0,
        offset: 3.0,
        slope: 7.0 / 3.0,
        confidence: 0.60,
        label: "Slight pressure deficit",
    },
];

/// Wind band that feeds moisture convergence, km/h (inclusive)
const FAVORABLE_WIND_MIN: f64 = 40.0;
const FAVORABLE_WIND_MAX: f64 = 85.0;

/// Multiplicative bonus when humidity and pressure deficit cross together
#[derive(Debug, Clone, Copy)]
pub struct SynergyBonus {
    pub min_humidity: f64,
    pub min_deficit: f64,
    pub multiplier: f64,
    pub confidence: f64,
    pub label: &'static str,
}

/// Synergy bonuses, strongest first; only the first match applies
pub const SYNERGY_BONUSES: [SynergyBonus; 3] = [
    SynergyBonus {
        min_humidity: 92.0,
        min_deficit: 8.0,
        multiplier: 1.35,
        confidence: 0.85,
        label: "Strong humidity-pressure synergy",
    },
    SynergyBonus {
        min_humidity: 88.0,
        min_deficit: 5.0,
        multiplier: 1.22,
        confidence: 0.78,
        label: "Humidity-pressure synergy",
    },
    SynergyBonus {
        min_humidity: 85.0,
        min_deficit: 3.0,
        multiplier: 1.12,
        confidence: 0.70,
        label: "Mild humidity-pressure synergy",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FactorEffect {
    /// Millimetres added (negative when suppressing)
    Additive(f64),
    Multiplier(f64),
}

/// One rule that contributed to the rainfall estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainfallFactor {
    pub factor: String,
    pub effect: FactorEffect,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RainIntensity {
    Light,
    Moderate,
    Significant,
    Heavy,
    Extreme,
}

impl RainIntensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            RainIntensity::Light => "light",
            RainIntensity::Moderate => "moderate",
            RainIntensity::Significant => "significant",
            RainIntensity::Heavy => "heavy",
            RainIntensity::Extreme => "extreme",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FloodRisk {
    Minimal,
    Low,
    Moderate,
    High,
    Severe,
}

impl FloodRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            FloodRisk::Minimal => "minimal",
            FloodRisk::Low => "low",
            FloodRisk::Moderate => "moderate",
            FloodRisk::High => "high",
            FloodRisk::Severe => "severe",
        }
    }
}

/// 24h breakpoints shared by intensity and flood-risk tiers, mm
pub const RAIN_TIER_BREAKPOINTS: [f64; 4] = [35.0, 65.0, 100.0, 150.0];

pub fn rain_intensity(mm_24h: f64) -> RainIntensity {
    match rain_tier_index(mm_24h) {
        0 => RainIntensity::Light,
        1 => RainIntensity::Moderate,
        2 => RainIntensity::Significant,
        3 => RainIntensity::Heavy,
        _ => RainIntensity::Extreme,
    }
}

pub fn flood_risk(mm_24h: f64) -> FloodRisk {
    match rain_tier_index(mm_24h) {
        0 => FloodRisk::Minimal,
        1 => FloodRisk::Low,
        2 => FloodRisk::Moderate,
        3 => FloodRisk::High,
        _ => FloodRisk::Severe,
    }
}

fn rain_tier_index(mm_24h: f64) -> usize {
    RAIN_TIER_BREAKPOINTS
        .iter()
        .take_while(|b| mm_24h >= **b)
        .count()
}

/// Rainfall risk points: (minimum 24h mm, points), highest first
pub const RAIN_POINTS: [(f64, u32); 5] = [(150.0, 40), (100.0, 30), (65.0, 20), (35.0, 12), (15.0, 6)];

pub fn rain_points(mm_24h: f64) -> u32 {
    RAIN_POINTS
        .iter()
        .find(|(min, _)| mm_24h >= *min)
        .map_or(0, |(_, points)| *points)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainfallAssessment {
    pub expected_24h_mm: f64,
    pub expected_48h_mm: f64,
    pub intensity: RainIntensity,
    pub flood_risk: FloodRisk,
    pub confidence: f64,
    pub pattern_modifier: f64,
    pub factors: Vec<RainfallFactor>,
}

impl RainfallAssessment {
    pub fn risk_points(&self) -> u32 {
        rain_points(self.expected_24h_mm)
    }

    pub fn forecast(&self) -> RainfallForecast {
        RainfallForecast {
            expected_24h_mm: self.expected_24h_mm,
            expected_48h_mm: self.expected_48h_mm,
            intensity: self.intensity,
            flood_risk: self.flood_risk,
            confidence: self.confidence,
        }
    }
}

/// Compact rainfall block carried by every report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainfallForecast {
    pub expected_24h_mm: f64,
    pub expected_48h_mm: f64,
    pub intensity: RainIntensity,
    pub flood_risk: FloodRisk,
    pub confidence: f64,
}

impl RainfallForecast {
    pub fn from_totals(expected_24h_mm: f64, expected_48h_mm: f64, confidence: f64) -> Self {
        RainfallForecast {
            expected_24h_mm,
            expected_48h_mm,
            intensity: rain_intensity(expected_24h_mm),
            flood_risk: flood_risk(expected_24h_mm),
            confidence,
        }
    }
}

struct Accumulator {
    total: f64,
    factors: Vec<RainfallFactor>,
}

impl Accumulator {
    fn add(&mut self, factor: &str, mm: f64, confidence: f64) {
        tracing::trace!(factor, mm, "rainfall additive factor");
        self.total += mm;
        self.factors.push(RainfallFactor {
            factor: factor.to_string(),
            effect: FactorEffect::Additive(mm),
            confidence,
        });
    }

    fn multiply(&mut self, factor: &str, multiplier: f64, confidence: f64) {
        tracing::trace!(factor, multiplier, "rainfall multiplicative factor");
        self.total *= multiplier;
        self.factors.push(RainfallFactor {
            factor: factor.to_string(),
            effect: FactorEffect::Multiplier(multiplier),
            confidence,
        });
    }
}

/// Estimate 24h / 48h rainfall.
///
/// `pattern_modifier` is the product of detected pattern modifiers and is
/// applied last.
pub fn assess_rainfall(c: &Conditions, pattern_modifier: f64) -> RainfallAssessment {
    let mut acc = Accumulator {
        total: RAINFALL_BASELINE_MM,
        factors: Vec::new(),
    };
    let humidity = c.humidity_pct;
    let deficit = RAINFALL_PRESSURE_BASELINE_HPA - c.pressure_hpa;

    if let Some(band) = HUMIDITY_BANDS.iter().find(|b| humidity >= b.threshold) {
        acc.add(band.label, band.contribution(humidity), band.confidence);
    }

    if let Some(band) = PRESSURE_DEFICIT_BANDS.iter().find(|b| deficit >= b.threshold) {
        acc.add(band.label, band.contribution(deficit), band.confidence);
    }

    let wind = c.wind_kmh;
    if (FAVORABLE_WIND_MIN..=FAVORABLE_WIND_MAX).contains(&wind) {
        acc.add(
            "Wind-driven moisture convergence",
            3.0 + (wind - FAVORABLE_WIND_MIN) * 0.15,
            0.60,
        );
    } else if wind > FAVORABLE_WIND_MAX {
        acc.add(
            "Wind shear disruption",
            -(wind - FAVORABLE_WIND_MAX) * 0.2,
            0.65,
        );
    }

    if c.temperature_c > 28.0 && humidity > 85.0 {
        acc.add(
            "Warm moist air instability",
            (c.temperature_c - 28.0) * 1.5 + (humidity - 85.0) * 0.3,
            0.70,
        );
    }

    if let Some(bonus) = SYNERGY_BONUSES
        .iter()
        .find(|b| humidity >= b.min_humidity && deficit >= b.min_deficit)
    {
        acc.multiply(bonus.label, bonus.multiplier, bonus.confidence);
    }

    let pattern_modifier = if pattern_modifier.is_finite() && pattern_modifier >= 0.0 {
        pattern_modifier
    } else {
        1.0
    };
    if (pattern_modifier - 1.0).abs() > f64::EPSILON {
        acc.multiply(
            "Weather pattern modifier",
            pattern_modifier,
            PATTERN_MODIFIER_CONFIDENCE,
        );
    }

    let expected_24h_mm = acc.total.max(MIN_RAINFALL_24H_MM);
    let expected_48h_mm = (expected_24h_mm * FORECAST_48H_FACTOR).max(MIN_RAINFALL_48H_MM);

    let confidence = if acc.factors.is_empty() {
        DEFAULT_CONFIDENCE
    } else {
        acc.factors.iter().map(|f| f.confidence).sum::<f64>() / acc.factors.len() as f64
    };

    debug_assert!(expected_24h_mm.is_finite() && expected_48h_mm.is_finite());

    RainfallAssessment {
        expected_24h_mm,
        expected_48h_mm,
        intensity: rain_intensity(expected_24h_mm),
        flood_risk: flood_risk(expected_24h_mm),
        confidence,
        pattern_modifier,
        factors: acc.factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quiet_day_stays_near_baseline() {
        let c = Conditions::new(15.0, 1012.0, 75.0, 28.0);
        let r = assess_rainfall(&c, 1.0);
        assert_relative_eq!(r.expected_24h_mm, 11.0, epsilon = 1e-9);
        assert_relative_eq!(r.expected_48h_mm, 17.6, epsilon = 1e-9);
        assert_eq!(r.intensity, RainIntensity::Light);
        assert_eq!(r.flood_risk, FloodRisk::Minimal);
        assert_eq!(r.factors.len(), 1);
        assert_eq!(r.risk_points(), 0);
    }

    #[test]
    fn test_no_factor_defaults_confidence() {
        let c = Conditions::new(5.0, 1015.0, 60.0, 26.0);
        let r = assess_rainfall(&c, 1.0);
        assert!(r.factors.is_empty());
        assert_eq!(r.confidence, 0.50);
        assert_eq!(r.expected_24h_mm, 8.0);
        assert_eq!(r.expected_48h_mm, 12.8);
    }

    #[test]
    fn test_floors_apply_after_suppression() {
        // Dry ridge pattern plus heavy shear and no moisture
        let c = Conditions::new(300.0, 1030.0, 40.0, 20.0);
        let r = assess_rainfall(&c, 0.70);
        assert_eq!(r.expected_24h_mm, MIN_RAINFALL_24H_MM);
        assert_eq!(r.expected_48h_mm, MIN_RAINFALL_48H_MM);
    }

    #[test]
    fn test_synergy_multiplier_before_pattern_modifier() {
        // humidity 93 -> 36 + 4 = 40; deficit 7 -> 10 + 3 * 3.5 = 20.5
        let c = Conditions::new(10.0, 1005.0, 93.0, 27.0);
        let r = assess_rainfall(&c, 1.4);
        let expected = (8.0 + 40.0 + 20.5) * 1.22 * 1.4;
        assert_relative_eq!(r.expected_24h_mm, expected, epsilon = 1e-9);
        assert_eq!(r.intensity, RainIntensity::Heavy);
        assert_eq!(r.flood_risk, FloodRisk::High);

        let kinds: Vec<&str> = r.factors.iter().map(|f| f.factor.as_str()).collect();
        assert_eq!(
            kinds,
            vec![
                "Very high humidity",
                "Moderate pressure deficit",
                "Humidity-pressure synergy",
                "Weather pattern modifier",
            ]
        );
    }

    #[test]
    fn test_only_strongest_synergy_applies() {
        let c = Conditions::new(0.0, 1000.0, 96.0, 27.0);
        let r = assess_rainfall(&c, 1.0);
        let multipliers: Vec<f64> = r
            .factors
            .iter()
            .filter_map(|f| match f.effect {
                FactorEffect::Multiplier(m) => Some(m),
                FactorEffect::Additive(_) => None,
            })
            .collect();
        assert_eq!(multipliers, vec![1.35]);
    }

    #[test]
    fn test_wind_monotonicity() {
        let at = |wind: f64| assess_rainfall(&Conditions::new(wind, 1006.0, 90.0, 29.0), 1.0);

        let mut prev = at(0.0).expected_24h_mm;
        for step in 1..=60 {
            let mm = at(step as f64).expected_24h_mm;
            assert!(mm >= prev, "rain fell from {} to {} at {} km/h", prev, mm, step);
            prev = mm;
        }

        let mut prev = at(85.0).expected_24h_mm;
        for step in 86..=300 {
            let mm = at(step as f64).expected_24h_mm;
            assert!(mm <= prev, "rain rose from {} to {} at {} km/h", prev, mm, step);
            prev = mm;
        }
    }

    #[test]
    fn test_confidence_is_mean_of_factors() {
        let c = Conditions::new(50.0, 1010.0, 90.0, 30.0);
        let r = assess_rainfall(&c, 1.0);
        let mean = r.factors.iter().map(|f| f.confidence).sum::<f64>() / r.factors.len() as f64;
        assert_relative_eq!(r.confidence, mean, epsilon = 1e-12);
        assert!(r.factors.len() >= 3);
    }

    #[test]
    fn test_tier_breakpoints() {
        assert_eq!(rain_intensity(34.9), RainIntensity::Light);
        assert_eq!(rain_intensity(35.0), RainIntensity::Moderate);
        assert_eq!(rain_intensity(65.0), RainIntensity::Significant);
        assert_eq!(rain_intensity(100.0), RainIntensity::Heavy);
        assert_eq!(rain_intensity(150.0), RainIntensity::Extreme);
        assert_eq!(flood_risk(99.9), FloodRisk::Moderate);
        assert_eq!(flood_risk(100.0), FloodRisk::High);
        assert_eq!(rain_points(14.9), 0);
        assert_eq!(rain_points(15.0), 6);
        assert_eq!(rain_points(150.0), 40);
    }

    #[test]
    fn test_invalid_modifier_is_neutral() {
        let c = Conditions::new(10.0, 1010.0, 80.0, 28.0);
        assert_eq!(
            assess_rainfall(&c, f64::NAN).expected_24h_mm,
            assess_rainfall(&c, 1.0).expected_24h_mm
        );
    }
}
