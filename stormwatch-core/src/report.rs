//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Every report carries at least one insight
//! - Byte-for-byte identical output for identical reports

use crate::cyclone::CycloneOutlook;
use crate::hazards::{PressureAssessment, StormFormationAssessment, WindAssessment};
use crate::input::DataQuality;
use crate::patterns::DetectedPattern;
use crate::rainfall::{RainfallAssessment, RainfallForecast};
use crate::risk::RiskAssessment;
use crate::text;
use crate::trends::TrendAnalysis;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    General,
    Typhoon,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::General => "general",
            AnalysisType::Typhoon => "typhoon",
        }
    }
}

/// The four hazard assessments of a general analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardSet {
    pub wind: WindAssessment,
    pub rain: RainfallAssessment,
    pub pressure: PressureAssessment,
    pub storm_formation: StormFormationAssessment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub model_version: String,
    pub pattern_count: usize,
    pub data_quality: DataQuality,
    pub history_len: usize,
    pub anomaly_count: usize,
}

/// Complete analysis report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AnalysisReport {
    pub timestamp: DateTime<FixedOffset>,
    pub analysis_type: AnalysisType,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hazards: Option<HazardSet>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cyclone: Option<CycloneOutlook>,
    pub patterns: Vec<DetectedPattern>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub trends: Option<TrendAnalysis>,
    pub risk_assessment: RiskAssessment,
    pub rainfall_forecast: RainfallForecast,
    pub ai_insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub metadata: ReportMetadata,
}

/// Render a report as text output
pub fn render_text(report: &AnalysisReport) -> String {
    let mut output = String::new();
    let risk = &report.risk_assessment;

    output.push_str(&format!(
        "{} analysis for {} at {}\n",
        report.analysis_type.as_str(),
        report.location,
        report.timestamp.to_rfc3339()
    ));
    output.push_str(&format!(
        "Risk: {} ({}/100, confidence {:.0}%)\n",
        risk.level.as_str(),
        risk.overall_score,
        risk.confidence * 100.0
    ));

    if let Some(ref cyclone) = report.cyclone {
        output.push_str(&format!(
            "Cyclone: {} at {:.0} km, {:.0} km/h, {}\n",
            cyclone.cyclone.name,
            cyclone.cyclone.distance_km,
            cyclone.cyclone.wind_kmh,
            cyclone.intensity.trend.as_str()
        ));
    }

    let rain = &report.rainfall_forecast;
    output.push_str(&format!(
        "Rainfall: {:.1} mm / 24h, {:.1} mm / 48h ({}, flood risk {})\n",
        rain.expected_24h_mm,
        rain.expected_48h_mm,
        rain.intensity.as_str(),
        rain.flood_risk.as_str()
    ));

    if !report.patterns.is_empty() {
        let names: Vec<&str> = report
            .patterns
            .iter()
            .map(|p| text::pattern_name(p.kind))
            .collect();
        output.push_str(&format!("Patterns: {}\n", names.join(", ")));
    }

    if !risk.factors.is_empty() {
        output.push('\n');
        output.push_str(&format!("{:<6} {:<10} {}\n", "POINTS", "SEVERITY", "FACTOR"));
        for factor in &risk.factors {
            output.push_str(&format!(
                "{:<6} {:<10} {}\n",
                factor.points,
                factor.severity.as_str(),
                truncate_or_pad(&factor.factor, 60).trim_end()
            ));
        }
    }

    output.push_str("\nInsights:\n");
    for insight in &report.ai_insights {
        output.push_str(&format!("  - {}\n", insight));
    }

    output.push_str("\nRecommendations:\n");
    for recommendation in &report.recommendations {
        output.push_str(&format!("  - {}\n", recommendation));
    }

    output
}

/// Render a report as JSON output
pub fn render_json(report: &AnalysisReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

/// Render several reports as a JSON array
pub fn render_json_all(reports: &[AnalysisReport]) -> String {
    serde_json::to_string_pretty(reports).unwrap_or_else(|_| "[]".to_string())
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_or_pad() {
        assert_eq!(truncate_or_pad("abc", 5), "abc  ");
        assert_eq!(truncate_or_pad("abcdefgh", 6), "abc...");
        assert_eq!(truncate_or_pad("°°°°°°°", 6), "°°°...");
    }

    #[test]
    fn test_analysis_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(AnalysisType::Typhoon).unwrap(),
            serde_json::json!("typhoon")
        );
    }
}
