//! Human-readable wording for every string the engine emits
//!
//! Callers decide *what* to say; this module only decides *how*.

use crate::cyclone::{CycloneTelemetry, IntensityTrend};
use crate::hazards::{PressureAssessment, StormFormationAssessment, WindAssessment};
use crate::insights::{Advisory, Insight, PressureAlert, WindAlert};
use crate::patterns::{DetectedPattern, PatternKind};
use crate::rainfall::{RainIntensity, RainfallAssessment};
use crate::risk::{RecommendationFacts, RiskLevel};
use crate::trends::{TrendDirection, TrendOutlook, TrendVariable};

pub const TROPICAL_FLOOR_FACTOR: &str = "Normal tropical conditions";
pub const INTENSIFYING_FACTOR: &str = "Favorable conditions for intensification";
pub const UNNAMED_CYCLONE: &str = "UNNAMED";

// ---------- patterns ----------

pub fn pattern_name(kind: PatternKind) -> &'static str {
    match kind {
        PatternKind::SouthwestMonsoon => "Southwest Monsoon (Habagat)",
        PatternKind::NortheastMonsoon => "Northeast Monsoon (Amihan)",
        PatternKind::IntertropicalConvergence => "Intertropical Convergence Zone",
        PatternKind::ActiveLowPressure => "Active Low Pressure Area",
        PatternKind::ConvectiveDevelopment => "Convective Development",
        PatternKind::HighPressureRidge => "High Pressure Ridge",
    }
}

pub fn pattern_impact(kind: PatternKind) -> &'static str {
    match kind {
        PatternKind::SouthwestMonsoon => {
            "Enhanced rainfall from moist southwesterly flow, especially on western seaboards"
        }
        PatternKind::NortheastMonsoon => {
            "Cooler, drier air with light rains on eastern sections"
        }
        PatternKind::IntertropicalConvergence => {
            "Persistent cloud bands and heavy thunderstorms along the convergence zone"
        }
        PatternKind::ActiveLowPressure => {
            "Widespread rains; the disturbance may develop into a tropical depression"
        }
        PatternKind::ConvectiveDevelopment => {
            "Afternoon and evening thunderstorms with localized downpours"
        }
        PatternKind::HighPressureRidge => "Stable, fair weather with suppressed rainfall",
    }
}

// ---------- trends ----------

pub fn trend_interpretation(
    variable: TrendVariable,
    direction: TrendDirection,
    rate: f64,
    rapid: bool,
) -> String {
    let what = match variable {
        TrendVariable::Pressure => "Pressure",
        TrendVariable::Humidity => "Humidity",
        TrendVariable::Wind => "Wind speed",
    };
    let pace = if rapid { "rapidly " } else { "" };
    match direction {
        TrendDirection::Falling if rapid && variable == TrendVariable::Pressure => {
            format!("Rapid pressure drop ({:.1} hPa), a system may be approaching", rate)
        }
        TrendDirection::Stable => format!("{} is holding steady", what),
        TrendDirection::Rising => format!(
            "{} is {}rising (+{:.1} {})",
            what,
            pace,
            rate,
            variable.unit()
        ),
        TrendDirection::Falling => format!(
            "{} is {}falling ({:.1} {})",
            what,
            pace,
            rate,
            variable.unit()
        ),
    }
}

pub fn trend_summary(outlook: TrendOutlook) -> &'static str {
    match outlook {
        TrendOutlook::Deteriorating => "Conditions are deteriorating: falling pressure with rising humidity",
        TrendOutlook::Improving => "Conditions are improving: rising pressure with drying air",
        TrendOutlook::Intensifying => "Winds are strengthening as pressure falls",
        TrendOutlook::Stable => "No significant change in recent observations",
    }
}

// ---------- risk factors ----------

pub fn wind_factor(wind: &WindAssessment) -> String {
    format!("Wind: {} ({:.0} km/h)", wind.category.as_str(), wind.speed_kmh)
}

pub fn rain_factor(rain: &RainfallAssessment) -> String {
    format!(
        "Rainfall: {} ({:.1} mm in 24h)",
        rain.intensity.as_str(),
        rain.expected_24h_mm
    )
}

pub fn pressure_factor(pressure: &PressureAssessment) -> String {
    format!(
        "Pressure: {} ({:.1} hPa)",
        pressure.category.as_str(),
        pressure.pressure_hpa
    )
}

pub fn formation_factor(storm: &StormFormationAssessment) -> String {
    format!(
        "Storm formation: {} likelihood (score {:.0})",
        storm.likelihood.as_str(),
        storm.score
    )
}

pub fn pattern_factor(patterns: &[DetectedPattern]) -> String {
    let names: Vec<&str> = patterns
        .iter()
        .filter(|p| p.kind.risk_bonus() > 0)
        .map(|p| pattern_name(p.kind))
        .collect();
    format!("Weather patterns: {}", names.join(", "))
}

pub fn combined_threat_factor(hazards: usize) -> String {
    format!("Combined threat: {} major hazards at once", hazards)
}

pub fn risk_recommendation(facts: &RecommendationFacts) -> String {
    match facts.level {
        RiskLevel::Critical => {
            let mut text = String::from(
                "CRITICAL: Immediate action required. Follow evacuation orders from local authorities.",
            );
            if let Some(wind) = facts.wind_kmh {
                text.push_str(&format!(
                    " Winds of {:.0} km/h can cause serious damage; stay indoors away from windows.",
                    wind
                ));
            }
            if let Some(rain) = facts.rain_mm {
                text.push_str(&format!(
                    " Expected rainfall of {:.0} mm may cause flooding; move to higher ground if you live in a flood-prone area.",
                    rain
                ));
            }
            text
        }
        RiskLevel::High => {
            let mut text = String::from(
                "HIGH RISK: Prepare emergency kits and monitor official advisories closely.",
            );
            if let Some(wind) = facts.wind_kmh {
                text.push_str(&format!(" Secure loose objects against {:.0} km/h winds.", wind));
            }
            if let Some(rain) = facts.rain_mm {
                text.push_str(&format!(" Prepare for up to {:.0} mm of rain.", rain));
            }
            text
        }
        RiskLevel::Moderate => {
            "MODERATE RISK: Stay alert and review your emergency plan.".to_string()
        }
        RiskLevel::Low => {
            "LOW RISK: Normal activities can continue; monitor weather updates.".to_string()
        }
        RiskLevel::Minimal => "MINIMAL RISK: Weather conditions are favorable.".to_string(),
    }
}

// ---------- insights ----------

pub fn render_insight(insight: &Insight) -> String {
    match insight {
        Insight::PatternHeadline {
            kind,
            confidence,
            total,
        } => {
            let others = total.saturating_sub(1);
            let tail = match others {
                0 => String::new(),
                1 => " (plus 1 other pattern)".to_string(),
                n => format!(" (plus {} other patterns)", n),
            };
            format!(
                "{} detected with {:.0}% confidence{}",
                pattern_name(*kind),
                confidence * 100.0,
                tail
            )
        }
        Insight::CriticalAlert { score } => format!(
            "CRITICAL ALERT: Risk score {}/100. Multiple severe hazards are present.",
            score
        ),
        Insight::Rainfall { intensity, mm_24h } => match intensity {
            RainIntensity::Extreme => format!(
                "EXTREME RAINFALL: {:.0} mm expected in 24 hours. Severe flooding and landslides are likely.",
                mm_24h
            ),
            RainIntensity::Heavy => format!(
                "Heavy rainfall of {:.0} mm expected in 24 hours. Flooding is likely in low-lying areas.",
                mm_24h
            ),
            RainIntensity::Significant => format!(
                "Significant rainfall of {:.0} mm expected. Watch for localized flooding.",
                mm_24h
            ),
            RainIntensity::Moderate => format!(
                "Moderate rain of {:.0} mm expected over the next 24 hours.",
                mm_24h
            ),
            RainIntensity::Light => format!(
                "Light rainfall of about {:.0} mm expected; no flooding concerns.",
                mm_24h
            ),
        },
        Insight::Wind {
            alert,
            speed_kmh,
            signal,
        } => match alert {
            WindAlert::TyphoonForce => format!(
                "TYPHOON-FORCE WINDS DETECTED: {:.0} km/h - Signal No. {}",
                speed_kmh, signal
            ),
            WindAlert::StormForce => format!(
                "Storm-force winds of {:.0} km/h (Signal No. {}). Avoid travel.",
                speed_kmh, signal
            ),
            WindAlert::Gale => format!(
                "Gale-force winds of {:.0} km/h (Signal No. {}). Secure outdoor items.",
                speed_kmh, signal
            ),
            WindAlert::Strong => format!(
                "Strong winds of {:.0} km/h (Signal No. {}). Expect rough conditions at sea.",
                speed_kmh, signal
            ),
        },
        Insight::Pressure {
            alert,
            pressure_hpa,
        } => match alert {
            PressureAlert::Extreme => format!(
                "Extremely low pressure of {:.1} hPa indicates a mature tropical cyclone nearby.",
                pressure_hpa
            ),
            PressureAlert::VeryLow => format!(
                "Very low pressure of {:.1} hPa signals an organized weather disturbance.",
                pressure_hpa
            ),
            PressureAlert::Low => format!(
                "Low pressure of {:.1} hPa supports cloud development and rain.",
                pressure_hpa
            ),
        },
        Insight::RainMechanism {
            humidity_pct,
            pressure_hpa,
        } => format!(
            "Rain production is active: near-saturated air ({:.0}% humidity) is rising into a low of {:.1} hPa.",
            humidity_pct, pressure_hpa
        ),
        Insight::CombinedMoisture {
            humidity_pct,
            pressure_hpa,
        } => format!(
            "High humidity ({:.0}%) with lowering pressure ({:.1} hPa) favors scattered showers.",
            humidity_pct, pressure_hpa
        ),
        Insight::FormationAlert { score, timeframe } => format!(
            "Storm formation possible: formation score {:.0}/100, expected within {}.",
            score, timeframe
        ),
        Insight::MoisteningLow => {
            "Trend alert: pressure is falling while humidity rises. Conditions may worsen.".to_string()
        }
        Insight::ConfidenceDisclosure { confidence } => format!(
            "Rainfall forecast confidence: {:.0}%.",
            confidence * 100.0
        ),
        Insight::Reassurance => {
            "No significant weather threats detected. Enjoy your day and stay updated.".to_string()
        }
        Insight::CycloneTrack {
            name,
            distance_km,
            wind_kmh,
        } => format!(
            "Typhoon {} is {:.0} km away with maximum sustained winds of {:.0} km/h.",
            name, distance_km, wind_kmh
        ),
        Insight::CycloneIntensity {
            name,
            trend,
            wind_24h_kmh,
        } => match trend {
            IntensityTrend::Intensifying => format!(
                "Typhoon {} is expected to intensify, reaching about {:.0} km/h within 24 hours.",
                name, wind_24h_kmh
            ),
            IntensityTrend::Steady => format!(
                "Typhoon {} is expected to hold its strength near {:.0} km/h.",
                name, wind_24h_kmh
            ),
            IntensityTrend::Weakening => format!(
                "Typhoon {} is expected to weaken to about {:.0} km/h within 24 hours.",
                name, wind_24h_kmh
            ),
        },
    }
}

pub fn advisory(advisory: Advisory) -> &'static str {
    match advisory {
        Advisory::Itcz => {
            "ITCZ activity: expect sudden heavy downpours and thunderstorms. Avoid low-lying areas."
        }
        Advisory::SouthwestMonsoon => {
            "Southwest monsoon season: keep drainage clear and prepare for prolonged rains."
        }
        Advisory::NortheastMonsoon => {
            "Northeast monsoon: expect cooler temperatures and rough seas on eastern coasts."
        }
        Advisory::ActiveLow => {
            "Active low pressure area: monitor PAGASA bulletins for possible cyclone development."
        }
        Advisory::Evening => {
            "Evening hours: keep flashlights and charged phones ready in case of power outages."
        }
    }
}

// ---------- cyclone ----------

pub fn cyclone_distance_factor(cyclone: &CycloneTelemetry) -> String {
    format!("Proximity: {} at {:.0} km", cyclone.name, cyclone.distance_km)
}

pub fn cyclone_intensity_factor(cyclone: &CycloneTelemetry) -> String {
    format!("Intensity: {:.0} km/h sustained winds", cyclone.wind_kmh)
}

pub fn cyclone_recommendation(level: RiskLevel, cyclone: &CycloneTelemetry) -> String {
    let name = &cyclone.name;
    let d = cyclone.distance_km;
    let w = cyclone.wind_kmh;
    match level {
        RiskLevel::Critical => format!(
            "EVACUATE: Typhoon {} is {:.0} km away with {:.0} km/h winds. Follow local evacuation orders immediately.",
            name, d, w
        ),
        RiskLevel::High => format!(
            "HIGH RISK: Typhoon {} is approaching ({:.0} km). Prepare to evacuate and secure your home.",
            name, d
        ),
        RiskLevel::Moderate => format!(
            "MODERATE RISK: Monitor Typhoon {} closely and review your emergency plan.",
            name
        ),
        RiskLevel::Low => format!(
            "LOW RISK: Typhoon {} is {:.0} km away; stay informed through official advisories.",
            name, d
        ),
        RiskLevel::Minimal => format!(
            "MINIMAL RISK: Typhoon {} poses no immediate threat.",
            name
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typhoon_force_wording() {
        let text = render_insight(&Insight::Wind {
            alert: WindAlert::TyphoonForce,
            speed_kmh: 130.0,
            signal: 4,
        });
        assert_eq!(text, "TYPHOON-FORCE WINDS DETECTED: 130 km/h - Signal No. 4");
    }

    #[test]
    fn test_rain_messages_embed_amount() {
        for intensity in [
            RainIntensity::Light,
            RainIntensity::Moderate,
            RainIntensity::Significant,
            RainIntensity::Heavy,
            RainIntensity::Extreme,
        ] {
            let text = render_insight(&Insight::Rainfall {
                intensity,
                mm_24h: 117.4,
            });
            assert!(text.contains("117 mm"), "{}", text);
        }
    }

    #[test]
    fn test_headline_counts_other_patterns() {
        let one = render_insight(&Insight::PatternHeadline {
            kind: PatternKind::IntertropicalConvergence,
            confidence: 0.88,
            total: 1,
        });
        assert_eq!(one, "Intertropical Convergence Zone detected with 88% confidence");
        let three = render_insight(&Insight::PatternHeadline {
            kind: PatternKind::ActiveLowPressure,
            confidence: 0.90,
            total: 3,
        });
        assert!(three.ends_with("(plus 2 other patterns)"));
    }

    #[test]
    fn test_recommendation_clauses_only_when_contributing() {
        let bare = risk_recommendation(&RecommendationFacts {
            level: RiskLevel::Critical,
            wind_kmh: None,
            rain_mm: None,
        });
        assert!(!bare.contains("km/h"));
        let full = risk_recommendation(&RecommendationFacts {
            level: RiskLevel::Critical,
            wind_kmh: Some(130.0),
            rain_mm: Some(180.4),
        });
        assert!(full.contains("130 km/h"));
        assert!(full.contains("180 mm"));
    }

    #[test]
    fn test_trend_interpretation() {
        assert_eq!(
            trend_interpretation(TrendVariable::Pressure, TrendDirection::Falling, -4.0, true),
            "Rapid pressure drop (-4.0 hPa), a system may be approaching"
        );
        assert_eq!(
            trend_interpretation(TrendVariable::Pressure, TrendDirection::Falling, -2.0, false),
            "Pressure is falling (-2.0 hPa)"
        );
        assert_eq!(
            trend_interpretation(TrendVariable::Humidity, TrendDirection::Falling, -12.0, true),
            "Humidity is rapidly falling (-12.0 %)"
        );
        assert_eq!(
            trend_interpretation(TrendVariable::Wind, TrendDirection::Stable, 0.1, false),
            "Wind speed is holding steady"
        );
    }

    #[test]
    fn test_evacuate_recommendation() {
        let cyclone = CycloneTelemetry {
            name: "Odette".to_string(),
            lat: 10.0,
            lng: 126.0,
            wind_kmh: 200.0,
            distance_km: 120.0,
        };
        assert_eq!(
            cyclone_recommendation(RiskLevel::Critical, &cyclone),
            "EVACUATE: Typhoon Odette is 120 km away with 200 km/h winds. Follow local evacuation orders immediately."
        );
    }
}
