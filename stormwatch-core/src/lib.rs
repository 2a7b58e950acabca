//! Stormwatch core library - rule-based weather and tropical cyclone risk scoring

// Global invariants enforced in this crate:
// - Engine operations are infallible for any input
// - The only mutable state is the memory owned by each `RiskEngine`
// - Time enters only through `Clock` or an explicit timestamp
// - No randomness, threads, or I/O outside `config`
// - Identical input and call history yields identical reports

pub mod config;
pub mod cyclone;
pub mod engine;
pub mod hazards;
pub mod input;
pub mod insights;
pub mod memory;
pub mod patterns;
pub mod rainfall;
pub mod report;
pub mod risk;
pub mod text;
pub mod trends;

pub use config::{load_and_resolve, EngineSettings, StormwatchConfig};
pub use cyclone::CycloneSnapshot;
pub use engine::{Clock, FixedClock, RiskEngine, SystemClock, MODEL_VERSION};
pub use input::{Observation, RawReading, WeatherSnapshot};
pub use report::{render_json, render_json_all, render_text, AnalysisReport, AnalysisType};
pub use risk::{RiskLevel, RiskThresholds};

use chrono::{DateTime, FixedOffset};

/// Analyze a single snapshot with default settings and no history
pub fn analyze_snapshot(
    snapshot: &WeatherSnapshot,
    location: &str,
    timestamp: DateTime<FixedOffset>,
) -> AnalysisReport {
    RiskEngine::new().analyze_general_weather_at(snapshot, location, timestamp)
}
