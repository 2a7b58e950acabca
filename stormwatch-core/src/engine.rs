//! The risk engine: owns observation memory and produces reports
//!
//! General analysis records the snapshot in memory before scoring it.
//! Cyclone analysis only reads memory.

use crate::config::EngineSettings;
use crate::cyclone::{
    assess_cyclone_risk, build_outlook, closest_cyclone, forecast_cyclone_rainfall, CycloneSnapshot,
    CycloneTelemetry,
};
use crate::hazards::{assess_pressure, assess_storm_formation, assess_wind};
use crate::input::{assess_data_quality, WeatherSnapshot};
use crate::insights::{
    generate_cyclone_insights, generate_insights, generate_recommendations, render_all,
    InsightContext,
};
use crate::memory::EngineMemory;
use crate::patterns::{combined_modifier, detect_weather_patterns};
use crate::rainfall::assess_rainfall;
use crate::report::{AnalysisReport, AnalysisType, HazardSet, ReportMetadata};
use crate::risk::{calculate_overall_risk, HazardInputs};
use crate::trends::analyze_trends;
use chrono::{DateTime, FixedOffset};

pub const MODEL_VERSION: &str = "stormwatch-rules-2.1";

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        chrono::Local::now().fixed_offset()
    }
}

/// A clock that always reports the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Rule-based weather and typhoon risk engine.
///
/// One engine per session; wrap in a `Mutex` to share across threads.
#[derive(Debug, Clone)]
pub struct RiskEngine<C: Clock = SystemClock> {
    memory: EngineMemory,
    settings: EngineSettings,
    clock: C,
}

impl RiskEngine<SystemClock> {
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        Self::with_clock(settings, SystemClock)
    }
}

impl Default for RiskEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> RiskEngine<C> {
    pub fn with_clock(settings: EngineSettings, clock: C) -> Self {
        RiskEngine {
            memory: EngineMemory::with_capacity(settings.memory_capacity),
            settings,
            clock,
        }
    }

    pub fn memory(&self) -> &EngineMemory {
        &self.memory
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn analyze_general_weather(
        &mut self,
        snapshot: &WeatherSnapshot,
        location: &str,
    ) -> AnalysisReport {
        let now = self.clock.now();
        self.analyze_general_weather_at(snapshot, location, now)
    }

    /// Record `snapshot` in memory and score current conditions.
    pub fn analyze_general_weather_at(
        &mut self,
        snapshot: &WeatherSnapshot,
        location: &str,
        timestamp: DateTime<FixedOffset>,
    ) -> AnalysisReport {
        self.memory.update(snapshot, timestamp);

        let conditions = snapshot.conditions();
        let patterns = detect_weather_patterns(&conditions, timestamp);
        let trends = analyze_trends(&self.memory, self.settings.trend_window);

        let wind = assess_wind(conditions.wind_kmh);
        let rain = assess_rainfall(&conditions, combined_modifier(&patterns));
        let pressure = assess_pressure(conditions.pressure_hpa);
        let storm = assess_storm_formation(&conditions, &patterns);

        let risk = calculate_overall_risk(
            HazardInputs {
                wind: &wind,
                rain: &rain,
                pressure: &pressure,
                storm: &storm,
            },
            &conditions,
            &patterns,
            &self.settings.thresholds,
        );

        let insights = generate_insights(&InsightContext {
            conditions: &conditions,
            patterns: &patterns,
            wind: &wind,
            rain: &rain,
            pressure: &pressure,
            storm: &storm,
            trends: &trends,
            risk: &risk,
        });
        let recommendations = generate_recommendations(&risk, &patterns, timestamp);

        tracing::debug!(
            location,
            score = risk.overall_score,
            level = risk.level.as_str(),
            patterns = patterns.len(),
            history = self.memory.len(),
            "general analysis complete"
        );

        AnalysisReport {
            timestamp,
            analysis_type: AnalysisType::General,
            location: location.to_string(),
            rainfall_forecast: rain.forecast(),
            metadata: self.metadata(snapshot, patterns.len()),
            hazards: Some(HazardSet {
                wind,
                rain,
                pressure,
                storm_formation: storm,
            }),
            cyclone: None,
            patterns,
            trends: Some(trends),
            risk_assessment: risk,
            ai_insights: render_all(&insights),
            recommendations,
        }
    }

    pub fn analyze_cyclone_threat(
        &self,
        cyclone: &CycloneSnapshot,
        snapshot: &WeatherSnapshot,
        location: &str,
    ) -> AnalysisReport {
        self.analyze_cyclone_threat_at(cyclone, snapshot, location, self.clock.now())
    }

    /// Forecast and score one cyclone. Memory is not touched.
    pub fn analyze_cyclone_threat_at(
        &self,
        cyclone: &CycloneSnapshot,
        snapshot: &WeatherSnapshot,
        location: &str,
        timestamp: DateTime<FixedOffset>,
    ) -> AnalysisReport {
        self.cyclone_report(cyclone.telemetry(), snapshot, location, timestamp)
    }

    pub fn analyze_active_cyclones(
        &self,
        cyclones: &[CycloneSnapshot],
        snapshot: &WeatherSnapshot,
        location: &str,
    ) -> Option<AnalysisReport> {
        self.analyze_active_cyclones_at(cyclones, snapshot, location, self.clock.now())
    }

    /// Typhoon report for the closest cyclone, `None` when there are none
    pub fn analyze_active_cyclones_at(
        &self,
        cyclones: &[CycloneSnapshot],
        snapshot: &WeatherSnapshot,
        location: &str,
        timestamp: DateTime<FixedOffset>,
    ) -> Option<AnalysisReport> {
        let closest = closest_cyclone(cyclones)?;
        Some(self.cyclone_report(closest, snapshot, location, timestamp))
    }

    fn cyclone_report(
        &self,
        telemetry: CycloneTelemetry,
        snapshot: &WeatherSnapshot,
        location: &str,
        timestamp: DateTime<FixedOffset>,
    ) -> AnalysisReport {
        let conditions = snapshot.conditions();
        let patterns = detect_weather_patterns(&conditions, timestamp);
        let rainfall = forecast_cyclone_rainfall(&telemetry, &conditions);
        let outlook = build_outlook(telemetry, &conditions);
        let risk = assess_cyclone_risk(&outlook.cyclone, &outlook.intensity, &self.settings.thresholds);

        let insights = generate_cyclone_insights(&outlook, &rainfall, &risk);
        let recommendations = generate_recommendations(&risk, &patterns, timestamp);

        tracing::debug!(
            location,
            cyclone = %outlook.cyclone.name,
            score = risk.overall_score,
            level = risk.level.as_str(),
            "cyclone analysis complete"
        );

        AnalysisReport {
            timestamp,
            analysis_type: AnalysisType::Typhoon,
            location: location.to_string(),
            hazards: None,
            cyclone: Some(outlook),
            metadata: self.metadata(snapshot, patterns.len()),
            patterns,
            trends: None,
            risk_assessment: risk,
            rainfall_forecast: rainfall,
            ai_insights: render_all(&insights),
            recommendations,
        }
    }

    fn metadata(&self, snapshot: &WeatherSnapshot, pattern_count: usize) -> ReportMetadata {
        ReportMetadata {
            model_version: MODEL_VERSION.to_string(),
            pattern_count,
            data_quality: assess_data_quality(snapshot),
            history_len: self.memory.len(),
            anomaly_count: self.memory.anomalies().len(),
        }
    }
}
