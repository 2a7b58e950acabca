//! Insight and recommendation selection
//!
//! Decides which facts deserve a message and in what order. Wording lives
//! in `text`; nothing here builds a sentence.

use crate::cyclone::{CycloneOutlook, IntensityTrend};
use crate::hazards::{PressureAssessment, StormFormationAssessment, WindAssessment};
use crate::input::Conditions;
use crate::patterns::{has_pattern, DetectedPattern, PatternKind};
use crate::rainfall::{RainIntensity, RainfallAssessment, RainfallForecast};
use crate::risk::{RiskAssessment, RiskLevel};
use crate::text;
use crate::trends::TrendAnalysis;
use chrono::{DateTime, FixedOffset, Timelike};

/// Rain confidence at or above which a disclosure line is added
pub const CONFIDENCE_DISCLOSURE_MIN: f64 = 0.70;
/// Formation score above which a formation alert is raised
pub const FORMATION_ALERT_MIN: f64 = 50.0;
/// Local hour from which the evening advisory applies
pub const EVENING_HOUR: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindAlert {
    TyphoonForce,
    StormForce,
    Gale,
    Strong,
}

impl WindAlert {
    pub fn for_speed(speed_kmh: f64) -> Option<Self> {
        if speed_kmh >= 118.0 {
            Some(WindAlert::TyphoonForce)
        } else if speed_kmh >= 89.0 {
            Some(WindAlert::StormForce)
        } else if speed_kmh >= 62.0 {
            Some(WindAlert::Gale)
        } else if speed_kmh >= 39.0 {
            Some(WindAlert::Strong)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureAlert {
    Extreme,
    VeryLow,
    Low,
}

impl PressureAlert {
    pub fn for_pressure(pressure_hpa: f64) -> Option<Self> {
        if pressure_hpa < 995.0 {
            Some(PressureAlert::Extreme)
        } else if pressure_hpa < 1000.0 {
            Some(PressureAlert::VeryLow)
        } else if pressure_hpa < 1004.0 {
            Some(PressureAlert::Low)
        } else {
            None
        }
    }
}

/// A fact worth telling the reader, with the values its message cites
#[derive(Debug, Clone, PartialEq)]
pub enum Insight {
    PatternHeadline {
        kind: PatternKind,
        confidence: f64,
        total: usize,
    },
    CriticalAlert {
        score: u32,
    },
    Rainfall {
        intensity: RainIntensity,
        mm_24h: f64,
    },
    Wind {
        alert: WindAlert,
        speed_kmh: f64,
        signal: u8,
    },
    Pressure {
        alert: PressureAlert,
        pressure_hpa: f64,
    },
    RainMechanism {
        humidity_pct: f64,
        pressure_hpa: f64,
    },
    CombinedMoisture {
        humidity_pct: f64,
        pressure_hpa: f64,
    },
    FormationAlert {
        score: f64,
        timeframe: &'static str,
    },
    MoisteningLow,
    ConfidenceDisclosure {
        confidence: f64,
    },
    Reassurance,
    CycloneTrack {
        name: String,
        distance_km: f64,
        wind_kmh: f64,
    },
    CycloneIntensity {
        name: String,
        trend: IntensityTrend,
        wind_24h_kmh: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    Itcz,
    SouthwestMonsoon,
    NortheastMonsoon,
    ActiveLow,
    Evening,
}

/// Everything a general analysis insight may draw on
#[derive(Debug, Clone, Copy)]
pub struct InsightContext<'a> {
    pub conditions: &'a Conditions,
    pub patterns: &'a [DetectedPattern],
    pub wind: &'a WindAssessment,
    pub rain: &'a RainfallAssessment,
    pub pressure: &'a PressureAssessment,
    pub storm: &'a StormFormationAssessment,
    pub trends: &'a TrendAnalysis,
    pub risk: &'a RiskAssessment,
}

fn pattern_headline(patterns: &[DetectedPattern]) -> Option<Insight> {
    let top = patterns
        .iter()
        .reduce(|best, p| if p.confidence > best.confidence { p } else { best })?;
    Some(Insight::PatternHeadline {
        kind: top.kind,
        confidence: top.confidence,
        total: patterns.len(),
    })
}

/// Ordered insights for a general analysis. Never empty.
pub fn generate_insights(ctx: &InsightContext<'_>) -> Vec<Insight> {
    let mut insights = Vec::new();
    let c = ctx.conditions;

    insights.extend(pattern_headline(ctx.patterns));

    if ctx.risk.level == RiskLevel::Critical {
        insights.push(Insight::CriticalAlert {
            score: ctx.risk.overall_score,
        });
    }

    insights.push(Insight::Rainfall {
        intensity: ctx.rain.intensity,
        mm_24h: ctx.rain.expected_24h_mm,
    });

    if let Some(alert) = WindAlert::for_speed(ctx.wind.speed_kmh) {
        insights.push(Insight::Wind {
            alert,
            speed_kmh: ctx.wind.speed_kmh,
            signal: ctx.wind.signal,
        });
    }

    if let Some(alert) = PressureAlert::for_pressure(ctx.pressure.pressure_hpa) {
        insights.push(Insight::Pressure {
            alert,
            pressure_hpa: ctx.pressure.pressure_hpa,
        });
    }

    if c.humidity_pct >= 92.0 && c.pressure_hpa < 1008.0 {
        insights.push(Insight::RainMechanism {
            humidity_pct: c.humidity_pct,
            pressure_hpa: c.pressure_hpa,
        });
    } else if c.humidity_pct >= 88.0 && c.pressure_hpa < 1010.0 {
        insights.push(Insight::CombinedMoisture {
            humidity_pct: c.humidity_pct,
            pressure_hpa: c.pressure_hpa,
        });
    }

    if ctx.storm.score > FORMATION_ALERT_MIN {
        insights.push(Insight::FormationAlert {
            score: ctx.storm.score,
            timeframe: ctx.storm.likelihood.timeframe(),
        });
    }

    if ctx.trends.is_moistening_low() {
        insights.push(Insight::MoisteningLow);
    }

    if ctx.rain.confidence >= CONFIDENCE_DISCLOSURE_MIN {
        insights.push(Insight::ConfidenceDisclosure {
            confidence: ctx.rain.confidence,
        });
    }

    if insights.is_empty() || ctx.risk.level == RiskLevel::Minimal {
        insights.push(Insight::Reassurance);
    }

    insights
}

/// Ordered insights for a cyclone analysis. Never empty.
pub fn generate_cyclone_insights(
    outlook: &CycloneOutlook,
    rain: &RainfallForecast,
    risk: &RiskAssessment,
) -> Vec<Insight> {
    let mut insights = Vec::new();
    if risk.level == RiskLevel::Critical {
        insights.push(Insight::CriticalAlert {
            score: risk.overall_score,
        });
    }
    insights.push(Insight::CycloneTrack {
        name: outlook.cyclone.name.clone(),
        distance_km: outlook.cyclone.distance_km,
        wind_kmh: outlook.cyclone.wind_kmh,
    });
    insights.push(Insight::CycloneIntensity {
        name: outlook.cyclone.name.clone(),
        trend: outlook.intensity.trend,
        wind_24h_kmh: outlook.intensity.forecast_24h_kmh,
    });
    insights.push(Insight::Rainfall {
        intensity: rain.intensity,
        mm_24h: rain.expected_24h_mm,
    });
    if risk.level == RiskLevel::Minimal {
        insights.push(Insight::Reassurance);
    }
    insights
}

/// Advisories that follow the primary recommendation
pub fn generate_advisories(
    patterns: &[DetectedPattern],
    level: RiskLevel,
    timestamp: DateTime<FixedOffset>,
) -> Vec<Advisory> {
    let mut advisories: Vec<Advisory> = [
        (PatternKind::IntertropicalConvergence, Advisory::Itcz),
        (PatternKind::SouthwestMonsoon, Advisory::SouthwestMonsoon),
        (PatternKind::NortheastMonsoon, Advisory::NortheastMonsoon),
        (PatternKind::ActiveLowPressure, Advisory::ActiveLow),
    ]
    .into_iter()
    .filter(|(kind, _)| has_pattern(patterns, *kind))
    .map(|(_, advisory)| advisory)
    .collect();

    if timestamp.hour() >= EVENING_HOUR && level != RiskLevel::Minimal {
        advisories.push(Advisory::Evening);
    }
    advisories
}

/// Primary recommendation followed by rendered advisories
pub fn generate_recommendations(
    risk: &RiskAssessment,
    patterns: &[DetectedPattern],
    timestamp: DateTime<FixedOffset>,
) -> Vec<String> {
    std::iter::once(risk.recommendation.clone())
        .chain(
            generate_advisories(patterns, risk.level, timestamp)
                .iter()
                .map(|a| text::advisory(*a).to_string()),
        )
        .collect()
}

pub fn render_all(insights: &[Insight]) -> Vec<String> {
    insights.iter().map(text::render_insight).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hazards::{assess_pressure, assess_storm_formation, assess_wind};
    use crate::patterns::{combined_modifier, detect_weather_patterns};
    use crate::rainfall::assess_rainfall;
    use crate::risk::{calculate_overall_risk, HazardInputs, RiskThresholds};

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    struct Parts {
        c: Conditions,
        patterns: Vec<DetectedPattern>,
        wind: WindAssessment,
        rain: RainfallAssessment,
        pressure: PressureAssessment,
        storm: StormFormationAssessment,
        risk: RiskAssessment,
    }

    fn parts(c: Conditions, when: DateTime<FixedOffset>) -> Parts {
        let patterns = detect_weather_patterns(&c, when);
        let wind = assess_wind(c.wind_kmh);
        let rain = assess_rainfall(&c, combined_modifier(&patterns));
        let pressure = assess_pressure(c.pressure_hpa);
        let storm = assess_storm_formation(&c, &patterns);
        let risk = calculate_overall_risk(
            HazardInputs {
                wind: &wind,
                rain: &rain,
                pressure: &pressure,
                storm: &storm,
            },
            &c,
            &patterns,
            &RiskThresholds::default(),
        );
        Parts {
            c,
            patterns,
            wind,
            rain,
            pressure,
            storm,
            risk,
        }
    }

    fn insights_of(p: &Parts) -> Vec<Insight> {
        let trends = TrendAnalysis::unavailable();
        generate_insights(&InsightContext {
            conditions: &p.c,
            patterns: &p.patterns,
            wind: &p.wind,
            rain: &p.rain,
            pressure: &p.pressure,
            storm: &p.storm,
            trends: &trends,
            risk: &p.risk,
        })
    }

    fn insights_for(c: Conditions, when: DateTime<FixedOffset>) -> (Vec<Insight>, RiskAssessment) {
        let p = parts(c, when);
        (insights_of(&p), p.risk)
    }

    fn moisture_kinds(insights: &[Insight]) -> (bool, bool) {
        (
            insights.iter().any(|i| matches!(i, Insight::RainMechanism { .. })),
            insights.iter().any(|i| matches!(i, Insight::CombinedMoisture { .. })),
        )
    }

    #[test]
    fn test_quiet_day_ends_with_reassurance() {
        let (insights, risk) =
            insights_for(Conditions::new(15.0, 1012.0, 75.0, 28.0), at("2024-04-10T09:00:00+08:00"));
        assert_eq!(risk.level, RiskLevel::Minimal);
        assert!(matches!(insights.first(), Some(Insight::Rainfall { .. })));
        assert_eq!(insights.last(), Some(&Insight::Reassurance));
        assert!(!insights.iter().any(|i| matches!(i, Insight::CriticalAlert { .. })));
    }

    #[test]
    fn test_typhoon_order() {
        let (insights, _) =
            insights_for(Conditions::new(130.0, 985.0, 95.0, 29.0), at("2024-04-10T09:00:00+08:00"));
        let positions: Vec<usize> = insights
            .iter()
            .map(|i| match i {
                Insight::PatternHeadline { .. } => 0,
                Insight::CriticalAlert { .. } => 1,
                Insight::Rainfall { .. } => 2,
                Insight::Wind { .. } => 3,
                Insight::Pressure { .. } => 4,
                Insight::RainMechanism { .. } | Insight::CombinedMoisture { .. } => 5,
                Insight::FormationAlert { .. } => 6,
                Insight::MoisteningLow => 7,
                Insight::ConfidenceDisclosure { .. } => 8,
                Insight::Reassurance => 9,
                _ => 10,
            })
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
        assert!(insights.contains(&Insight::Wind {
            alert: WindAlert::TyphoonForce,
            speed_kmh: 130.0,
            signal: 4,
        }));
        assert!(insights.contains(&Insight::Pressure {
            alert: PressureAlert::Extreme,
            pressure_hpa: 985.0,
        }));
    }

    #[test]
    fn test_headline_picks_most_confident_pattern() {
        let c = Conditions::new(18.0, 1002.0, 93.0, 29.0);
        let patterns = detect_weather_patterns(&c, at("2024-07-15T10:00:00+08:00"));
        assert_eq!(
            pattern_headline(&patterns),
            Some(Insight::PatternHeadline {
                kind: PatternKind::ActiveLowPressure,
                confidence: 0.90,
                total: 4,
            })
        );
        assert_eq!(pattern_headline(&[]), None);
    }

    #[test]
    fn test_wind_and_pressure_alert_tiers() {
        assert_eq!(WindAlert::for_speed(38.9), None);
        assert_eq!(WindAlert::for_speed(39.0), Some(WindAlert::Strong));
        assert_eq!(WindAlert::for_speed(200.0), Some(WindAlert::TyphoonForce));
        assert_eq!(PressureAlert::for_pressure(1004.0), None);
        assert_eq!(PressureAlert::for_pressure(999.9), Some(PressureAlert::VeryLow));
    }

    #[test]
    fn test_evening_advisory_requires_risk() {
        let c = Conditions::new(10.0, 1005.0, 93.0, 27.0);
        let patterns = detect_weather_patterns(&c, at("2024-04-10T19:30:00+08:00"));
        let evening = generate_advisories(&patterns, RiskLevel::Moderate, at("2024-04-10T19:30:00+08:00"));
        assert_eq!(evening, vec![Advisory::Itcz, Advisory::Evening]);
        let morning = generate_advisories(&patterns, RiskLevel::Moderate, at("2024-04-10T07:00:00+08:00"));
        assert_eq!(morning, vec![Advisory::Itcz]);
        let quiet = generate_advisories(&[], RiskLevel::Minimal, at("2024-04-10T21:00:00+08:00"));
        assert!(quiet.is_empty());
    }

    #[test]
    fn test_recommendations_start_with_primary() {
        let (_, risk) =
            insights_for(Conditions::new(130.0, 985.0, 95.0, 29.0), at("2024-04-10T20:00:00+08:00"));
        let recs = generate_recommendations(&risk, &[], at("2024-04-10T20:00:00+08:00"));
        assert_eq!(recs[0], risk.recommendation);
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn test_rain_mechanism_or_combined_moisture() {
        let when = at("2024-04-10T09:00:00+08:00");
        let cases = [
            ((92.0, 1007.9), (true, false)),
            ((91.9, 1007.0), (false, true)),
            ((95.0, 1008.0), (false, true)),
            ((88.0, 1009.9), (false, true)),
            ((87.9, 1009.0), (false, false)),
            ((95.0, 1010.0), (false, false)),
        ];
        for ((humidity, pressure), expected) in cases {
            let (insights, _) = insights_for(Conditions::new(10.0, pressure, humidity, 28.0), when);
            assert_eq!(moisture_kinds(&insights), expected, "h={} p={}", humidity, pressure);
        }

        let (insights, _) = insights_for(Conditions::new(10.0, 1005.0, 94.0, 28.0), when);
        assert!(insights.contains(&Insight::RainMechanism {
            humidity_pct: 94.0,
            pressure_hpa: 1005.0,
        }));
    }

    #[test]
    fn test_formation_alert_strictly_above_fifty() {
        let mut p = parts(Conditions::new(10.0, 1009.0, 80.0, 28.0), at("2024-04-10T09:00:00+08:00"));
        p.storm.score = 50.0;
        assert!(!insights_of(&p)
            .iter()
            .any(|i| matches!(i, Insight::FormationAlert { .. })));

        p.storm.score = 50.5;
        assert!(insights_of(&p)
            .iter()
            .any(|i| matches!(i, Insight::FormationAlert { score, .. } if *score == 50.5)));
    }

    #[test]
    fn test_confidence_disclosure_from_070() {
        let mut p = parts(Conditions::new(10.0, 1009.0, 80.0, 28.0), at("2024-04-10T09:00:00+08:00"));
        p.rain.confidence = 0.70;
        assert!(insights_of(&p).contains(&Insight::ConfidenceDisclosure { confidence: 0.70 }));

        p.rain.confidence = 0.69;
        assert!(!insights_of(&p)
            .iter()
            .any(|i| matches!(i, Insight::ConfidenceDisclosure { .. })));
    }

    #[test]
    fn test_seasonal_advisories() {
        let calm = Conditions::new(5.0, 1011.0, 78.0, 28.0);
        let advise = |c: &Conditions, when: &str| {
            let when = at(when);
            generate_advisories(&detect_weather_patterns(c, when), RiskLevel::Low, when)
        };

        assert_eq!(advise(&calm, "2024-07-15T09:00:00+08:00"), vec![Advisory::SouthwestMonsoon]);
        assert!(advise(&calm, "2024-05-15T09:00:00+08:00").is_empty());
        assert_eq!(advise(&calm, "2024-12-15T09:00:00+08:00"), vec![Advisory::NortheastMonsoon]);
        assert!(advise(&calm, "2024-03-15T09:00:00+08:00").is_empty());
    }

    #[test]
    fn test_active_low_advisory() {
        let when = "2024-04-10T09:00:00+08:00";
        let advise = |c: Conditions| {
            generate_advisories(&detect_weather_patterns(&c, at(when)), RiskLevel::Low, at(when))
        };
        assert_eq!(advise(Conditions::new(10.0, 1003.0, 86.0, 28.0)), vec![Advisory::ActiveLow]);
        assert!(advise(Conditions::new(10.0, 1003.0, 85.0, 28.0)).is_empty());
        assert!(advise(Conditions::new(10.0, 1004.0, 86.0, 28.0)).is_empty());
    }
}
