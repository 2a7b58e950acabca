//! Tropical cyclone outlook: intensity, rainfall, path and proximity risk
//!
//! Global invariants enforced:
//! - Pure functions of the cyclone telemetry and current conditions
//! - Forecast winds stay within [0.6, 1.5] x current and 0-350 km/h
//! - Path latitudes stay in [-90, 90], longitudes in [-180, 180)

use crate::hazards::Severity;
use crate::input::{validate_in, Conditions, RawReading, ValidRange};
use crate::rainfall::RainfallForecast;
use crate::risk::{assign_risk_level_with_thresholds, RiskAssessment, RiskFactor, RiskThresholds};
use crate::text;
use serde::{Deserialize, Serialize};

pub const LATITUDE_RANGE: ValidRange = ValidRange::new(-90.0, 90.0);
pub const LONGITUDE_RANGE: ValidRange = ValidRange::new(-180.0, 180.0);
pub const CYCLONE_WIND_RANGE: ValidRange = ValidRange::new(0.0, 350.0);
pub const DISTANCE_RANGE: ValidRange = ValidRange::new(0.0, 5000.0);

/// Telemetry of an active cyclone as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycloneSnapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lat: RawReading,
    #[serde(default)]
    pub lng: RawReading,
    #[serde(default, alias = "windSpeed")]
    pub wind_speed: RawReading,
    #[serde(default)]
    pub distance: RawReading,
}

impl CycloneSnapshot {
    pub fn new(
        name: impl Into<String>,
        lat: impl Into<RawReading>,
        lng: impl Into<RawReading>,
        wind_speed: impl Into<RawReading>,
        distance: impl Into<RawReading>,
    ) -> Self {
        CycloneSnapshot {
            name: name.into(),
            lat: lat.into(),
            lng: lng.into(),
            wind_speed: wind_speed.into(),
            distance: distance.into(),
        }
    }

    pub fn telemetry(&self) -> CycloneTelemetry {
        let name = self.name.trim();
        CycloneTelemetry {
            name: if name.is_empty() {
                text::UNNAMED_CYCLONE.to_string()
            } else {
                name.to_string()
            },
            lat: validate_in(&self.lat, LATITUDE_RANGE),
            lng: validate_in(&self.lng, LONGITUDE_RANGE),
            wind_kmh: validate_in(&self.wind_speed, CYCLONE_WIND_RANGE),
            distance_km: validate_in(&self.distance, DISTANCE_RANGE),
        }
    }
}

/// Validated cyclone telemetry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycloneTelemetry {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub wind_kmh: f64,
    pub distance_km: f64,
}

/// Closest cyclone by validated distance; first wins on ties
pub fn closest_cyclone(cyclones: &[CycloneSnapshot]) -> Option<CycloneTelemetry> {
    cyclones
        .iter()
        .map(CycloneSnapshot::telemetry)
        .reduce(|best, c| if c.distance_km < best.distance_km { c } else { best })
}

// ---------- intensity ----------

const SST_REFERENCE_C: f64 = 26.5;
const INTENSITY_PRESSURE_REFERENCE_HPA: f64 = 1008.0;
const INTENSITY_HUMIDITY_REFERENCE_PCT: f64 = 75.0;
const INTENSIFYING_ABOVE: f64 = 2.0;
const WEAKENING_BELOW: f64 = -1.0;

/// Sea surface temperature estimate by |latitude|: (below degrees, deg C)
pub const SST_BANDS: [(f64, f64); 4] = [(10.0, 29.5), (15.0, 29.0), (20.0, 28.5), (25.0, 27.5)];
pub const SST_POLEWARD_C: f64 = 26.0;

pub fn estimate_sst(lat: f64) -> f64 {
    let lat = lat.abs();
    SST_BANDS
        .iter()
        .find(|(below, _)| lat < *below)
        .map_or(SST_POLEWARD_C, |(_, sst)| *sst)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityTrend {
    Intensifying,
    Steady,
    Weakening,
}

impl IntensityTrend {
    pub fn from_score(score: f64) -> Self {
        if score > INTENSIFYING_ABOVE {
            IntensityTrend::Intensifying
        } else if score < WEAKENING_BELOW {
            IntensityTrend::Weakening
        } else {
            IntensityTrend::Steady
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IntensityTrend::Intensifying => "intensifying",
            IntensityTrend::Steady => "steady",
            IntensityTrend::Weakening => "weakening",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityForecast {
    pub current_kmh: f64,
    pub sea_surface_temp_c: f64,
    pub score: f64,
    pub trend: IntensityTrend,
    pub forecast_24h_kmh: f64,
    pub forecast_48h_kmh: f64,
}

fn bounded_forecast(current: f64, growth: f64) -> f64 {
    (current * growth)
        .clamp(current * 0.6, current * 1.5)
        .clamp(CYCLONE_WIND_RANGE.min, CYCLONE_WIND_RANGE.max)
}

pub fn forecast_intensity(cyclone: &CycloneTelemetry, conditions: &Conditions) -> IntensityForecast {
    let sst = estimate_sst(cyclone.lat);
    let score = 1.5 * (sst - SST_REFERENCE_C)
        + 0.15 * (INTENSITY_PRESSURE_REFERENCE_HPA - conditions.pressure_hpa)
        + 0.08 * (conditions.humidity_pct - INTENSITY_HUMIDITY_REFERENCE_PCT);
    let w = cyclone.wind_kmh;

    IntensityForecast {
        current_kmh: w,
        sea_surface_temp_c: sst,
        score,
        trend: IntensityTrend::from_score(score),
        forecast_24h_kmh: bounded_forecast(w, 1.0 + 0.04 * score),
        forecast_48h_kmh: bounded_forecast(w, 1.0 + 0.07 * score),
    }
}

// ---------- rainfall ----------

/// Base cyclone rainfall by wind: (minimum km/h, mm)
pub const CYCLONE_RAIN_BASE: [(f64, f64); 4] = [(185.0, 250.0), (118.0, 180.0), (89.0, 120.0), (62.0, 80.0)];
pub const CYCLONE_RAIN_BASE_WEAK_MM: f64 = 50.0;
/// Distance over which the rain footprint decays
pub const RAIN_DECAY_DISTANCE_KM: f64 = 800.0;
pub const MIN_DISTANCE_FACTOR: f64 = 0.3;
pub const CYCLONE_RAIN_48H_FACTOR: f64 = 1.5;
pub const CYCLONE_RAIN_CONFIDENCE: f64 = 0.75;

pub fn forecast_cyclone_rainfall(
    cyclone: &CycloneTelemetry,
    conditions: &Conditions,
) -> RainfallForecast {
    let base = CYCLONE_RAIN_BASE
        .iter()
        .find(|(min, _)| cyclone.wind_kmh >= *min)
        .map_or(CYCLONE_RAIN_BASE_WEAK_MM, |(_, mm)| *mm);
    let humidity_factor = (conditions.humidity_pct / 80.0).clamp(0.8, 1.3);
    let distance_factor = (1.0 - cyclone.distance_km / RAIN_DECAY_DISTANCE_KM).max(MIN_DISTANCE_FACTOR);

    let mm_24h = base * humidity_factor * distance_factor;
    RainfallForecast::from_totals(
        mm_24h,
        mm_24h * CYCLONE_RAIN_48H_FACTOR,
        CYCLONE_RAIN_CONFIDENCE,
    )
}

// ---------- path ----------

/// Mean drift of western Pacific cyclones, degrees per hour
pub const DRIFT_LAT_PER_HOUR: f64 = 0.06;
pub const DRIFT_LNG_PER_HOUR: f64 = -0.17;

/// Forecast steps: (hours ahead, confidence)
pub const PATH_STEPS: [(u32, f64); 4] = [(12, 0.85), (24, 0.75), (36, 0.65), (48, 0.55)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub hours_ahead: u32,
    pub lat: f64,
    pub lng: f64,
    pub confidence: f64,
}

fn wrap_longitude(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

pub fn forecast_path(cyclone: &CycloneTelemetry) -> Vec<PathPoint> {
    PATH_STEPS
        .iter()
        .map(|(hours, confidence)| {
            let h = f64::from(*hours);
            PathPoint {
                hours_ahead: *hours,
                lat: (cyclone.lat + DRIFT_LAT_PER_HOUR * h).clamp(LATITUDE_RANGE.min, LATITUDE_RANGE.max),
                lng: wrap_longitude(cyclone.lng + DRIFT_LNG_PER_HOUR * h),
                confidence: *confidence,
            }
        })
        .collect()
}

// ---------- risk ----------

/// Proximity points: (distance below km, points)
pub const DISTANCE_POINTS: [(f64, u32); 5] = [(100.0, 50), (200.0, 40), (300.0, 30), (500.0, 20), (800.0, 10)];
/// Intensity points: (minimum km/h, points)
pub const INTENSITY_POINTS: [(f64, u32); 4] = [(185.0, 45), (118.0, 35), (89.0, 25), (62.0, 15)];
pub const WEAK_INTENSITY_POINTS: u32 = 5;
pub const INTENSIFYING_BONUS: u32 = 5;
pub const CYCLONE_RISK_CONFIDENCE: f64 = 0.80;

pub fn distance_points(distance_km: f64) -> u32 {
    DISTANCE_POINTS
        .iter()
        .find(|(below, _)| distance_km < *below)
        .map_or(0, |(_, points)| *points)
}

pub fn intensity_points(wind_kmh: f64) -> u32 {
    INTENSITY_POINTS
        .iter()
        .find(|(min, _)| wind_kmh >= *min)
        .map_or(WEAK_INTENSITY_POINTS, |(_, points)| *points)
}

fn points_severity(points: u32) -> Severity {
    match points {
        40.. => Severity::Critical,
        30..=39 => Severity::High,
        20..=29 => Severity::Moderate,
        10..=19 => Severity::Low,
        _ => Severity::Minimal,
    }
}

pub fn assess_cyclone_risk(
    cyclone: &CycloneTelemetry,
    intensity: &IntensityForecast,
    thresholds: &RiskThresholds,
) -> RiskAssessment {
    let mut factors = Vec::new();

    let proximity = distance_points(cyclone.distance_km);
    if proximity > 0 {
        factors.push(RiskFactor {
            factor: text::cyclone_distance_factor(cyclone),
            points: proximity,
            severity: points_severity(proximity),
        });
    }

    let strength = intensity_points(cyclone.wind_kmh);
    factors.push(RiskFactor {
        factor: text::cyclone_intensity_factor(cyclone),
        points: strength,
        severity: points_severity(strength),
    });

    if intensity.trend == IntensityTrend::Intensifying {
        factors.push(RiskFactor {
            factor: text::INTENSIFYING_FACTOR.to_string(),
            points: INTENSIFYING_BONUS,
            severity: Severity::Moderate,
        });
    }

    let overall_score = factors.iter().map(|f| f.points).sum::<u32>().min(100);
    let level = assign_risk_level_with_thresholds(overall_score, thresholds);

    tracing::debug!(
        cyclone = %cyclone.name,
        overall_score,
        level = level.as_str(),
        "cyclone risk calculated"
    );

    RiskAssessment {
        overall_score,
        level,
        factors,
        recommendation: text::cyclone_recommendation(level, cyclone),
        confidence: CYCLONE_RISK_CONFIDENCE,
    }
}

/// Everything forecast for one cyclone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycloneOutlook {
    pub cyclone: CycloneTelemetry,
    pub intensity: IntensityForecast,
    pub path: Vec<PathPoint>,
}

pub fn build_outlook(cyclone: CycloneTelemetry, conditions: &Conditions) -> CycloneOutlook {
    let intensity = forecast_intensity(&cyclone, conditions);
    let path = forecast_path(&cyclone);
    CycloneOutlook {
        cyclone,
        intensity,
        path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskLevel;
    use approx::assert_relative_eq;

    fn telemetry(lat: f64, lng: f64, wind: f64, distance: f64) -> CycloneTelemetry {
        CycloneSnapshot::new("Karding", lat, lng, wind, distance).telemetry()
    }

    #[test]
    fn test_sst_bands() {
        assert_eq!(estimate_sst(5.0), 29.5);
        assert_eq!(estimate_sst(-12.0), 29.0);
        assert_eq!(estimate_sst(19.9), 28.5);
        assert_eq!(estimate_sst(20.0), 27.5);
        assert_eq!(estimate_sst(40.0), 26.0);
    }

    #[test]
    fn test_intensity_score_and_trend() {
        let c = Conditions::new(30.0, 1000.0, 90.0, 29.0);
        let f = forecast_intensity(&telemetry(14.0, 128.0, 150.0, 400.0), &c);
        // 1.5 * 2.5 + 0.15 * 8 + 0.08 * 15
        assert_relative_eq!(f.score, 6.15, epsilon = 1e-9);
        assert_eq!(f.trend, IntensityTrend::Intensifying);
        assert_relative_eq!(f.forecast_24h_kmh, 150.0 * (1.0 + 0.04 * 6.15), epsilon = 1e-9);
        assert_relative_eq!(f.forecast_48h_kmh, 150.0 * (1.0 + 0.07 * 6.15), epsilon = 1e-9);
    }

    #[test]
    fn test_forecast_winds_are_bounded() {
        let c = Conditions::new(30.0, 950.0, 100.0, 30.0);
        let f = forecast_intensity(&telemetry(5.0, 128.0, 300.0, 50.0), &c);
        assert_eq!(f.forecast_48h_kmh, 350.0);

        let cold = Conditions::new(30.0, 1050.0, 0.0, 20.0);
        let f = forecast_intensity(&telemetry(40.0, 128.0, 100.0, 50.0), &cold);
        assert_eq!(f.trend, IntensityTrend::Weakening);
        assert!(f.forecast_24h_kmh >= 60.0);
        assert!(f.forecast_48h_kmh >= 60.0);
    }

    #[test]
    fn test_rainfall_decays_with_distance() {
        let c = Conditions::new(30.0, 1000.0, 80.0, 29.0);
        let near = forecast_cyclone_rainfall(&telemetry(14.0, 128.0, 130.0, 0.0), &c);
        assert_relative_eq!(near.expected_24h_mm, 180.0, epsilon = 1e-9);
        assert_relative_eq!(near.expected_48h_mm, 270.0, epsilon = 1e-9);
        let far = forecast_cyclone_rainfall(&telemetry(14.0, 128.0, 130.0, 2000.0), &c);
        assert_relative_eq!(far.expected_24h_mm, 180.0 * 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_path_drifts_northwest() {
        let path = forecast_path(&telemetry(14.0, 128.0, 130.0, 300.0));
        assert_eq!(path.len(), 4);
        assert_eq!(
            path.iter().map(|p| p.hours_ahead).collect::<Vec<_>>(),
            vec![12, 24, 36, 48]
        );
        assert_relative_eq!(path[1].lat, 14.0 + 0.06 * 24.0, epsilon = 1e-9);
        assert_relative_eq!(path[1].lng, 128.0 - 0.17 * 24.0, epsilon = 1e-9);
        assert!(path.windows(2).all(|w| w[0].confidence > w[1].confidence));
    }

    #[test]
    fn test_path_wraps_longitude() {
        let path = forecast_path(&telemetry(89.0, -178.0, 130.0, 300.0));
        assert!(path.iter().all(|p| p.lat <= 90.0));
        assert!(path.iter().all(|p| (-180.0..180.0).contains(&p.lng)));
        assert_relative_eq!(path[3].lng, -178.0 - 0.17 * 48.0 + 360.0, epsilon = 1e-9);
    }

    #[test]
    fn test_close_strong_cyclone_is_critical() {
        let c = Conditions::new(30.0, 1010.0, 80.0, 28.0);
        let cyclone = telemetry(14.0, 128.0, 200.0, 120.0);
        let intensity = forecast_intensity(&cyclone, &c);
        let risk = assess_cyclone_risk(&cyclone, &intensity, &RiskThresholds::default());
        assert!(risk.overall_score >= 85);
        assert_eq!(risk.level, RiskLevel::Critical);
        assert!(risk.recommendation.contains("EVACUATE"));
    }

    #[test]
    fn test_distant_weak_cyclone_is_minimal() {
        let c = Conditions::new(10.0, 1012.0, 70.0, 27.0);
        let cyclone = telemetry(30.0, 140.0, 50.0, 1500.0);
        let intensity = forecast_intensity(&cyclone, &c);
        let risk = assess_cyclone_risk(&cyclone, &intensity, &RiskThresholds::default());
        assert_eq!(risk.overall_score, 5);
        assert_eq!(risk.level, RiskLevel::Minimal);
    }

    #[test]
    fn test_closest_cyclone_and_defaults() {
        let cyclones = vec![
            CycloneSnapshot::new("Far", 20.0, 135.0, 150.0, 900.0),
            CycloneSnapshot::new("Near", 15.0, 125.0, 90.0, "240 km"),
            CycloneSnapshot::new("  ", RawReading::Missing, 500.0, "strong", 600.0),
        ];
        let closest = closest_cyclone(&cyclones).unwrap();
        assert_eq!(closest.name, "Near");
        assert_eq!(closest.distance_km, 240.0);

        let unnamed = cyclones[2].telemetry();
        assert_eq!(unnamed.name, text::UNNAMED_CYCLONE);
        assert_eq!(unnamed.lat, 0.0);
        assert_eq!(unnamed.lng, 180.0);
        assert_eq!(unnamed.wind_kmh, 175.0);
        assert!(closest_cyclone(&[]).is_none());
    }
}
