//! Input boundary - raw readings, validation and data quality
//!
//! Upstream forecast feeds deliver readings as loosely formatted text
//! ("27.5 °C", "88%", "N/A"). Everything past this module works on finite,
//! clamped `f64` values only.
//!
//! Global invariants enforced:
//! - Parse failure yields the range midpoint
//! - Out-of-range numbers are clamped to the nearest bound
//! - Validation never fails

use regex::Regex;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;
use std::sync::OnceLock;

/// Valid range for a single meteorological reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidRange {
    pub min: f64,
    pub max: f64,
}

impl ValidRange {
    pub const fn new(min: f64, max: f64) -> Self {
        ValidRange { min, max }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Sustained wind speed, km/h
pub const WIND_RANGE: ValidRange = ValidRange::new(0.0, 300.0);
/// Mean sea-level pressure, hPa
pub const PRESSURE_RANGE: ValidRange = ValidRange::new(950.0, 1050.0);
/// Relative humidity, percent
pub const HUMIDITY_RANGE: ValidRange = ValidRange::new(0.0, 100.0);
/// Air temperature, °C
pub const TEMPERATURE_RANGE: ValidRange = ValidRange::new(15.0, 45.0);

/// A reading as delivered by the upstream feed.
///
/// Deserializes from any JSON value. Numbers and strings are kept; null,
/// booleans, arrays and objects become `Missing`. Numbers beyond `f64`
/// range are kept as infinities and default at validation.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum RawReading {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl RawReading {
    /// Parse the reading the way a browser `parseFloat` would: the leading
    /// numeric prefix wins, trailing units are ignored.
    pub fn parse(&self) -> Option<f64> {
        match self {
            RawReading::Number(n) => Some(*n),
            RawReading::Text(text) => parse_leading_float(text),
            RawReading::Missing => None,
        }
    }

    /// True when the reading parses to a finite number inside `range`
    pub fn is_valid_in(&self, range: ValidRange) -> bool {
        matches!(self.parse(), Some(v) if v.is_finite() && range.contains(v))
    }
}

impl<'de> Deserialize<'de> for RawReading {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        Ok(RawReading::from_json_text(raw.get()))
    }
}

impl RawReading {
    /// Interpret one JSON value without rejecting it
    fn from_json_text(json: &str) -> Self {
        let json = json.trim();
        match json.as_bytes().first() {
            Some(b'"') => serde_json::from_str::<String>(json)
                .map(RawReading::Text)
                .unwrap_or(RawReading::Missing),
            Some(b'-' | b'0'..=b'9') => json
                .parse::<f64>()
                .map(RawReading::Number)
                .unwrap_or(RawReading::Missing),
            _ => RawReading::Missing,
        }
    }
}

impl From<f64> for RawReading {
    fn from(value: f64) -> Self {
        RawReading::Number(value)
    }
}

impl From<&str> for RawReading {
    fn from(value: &str) -> Self {
        RawReading::Text(value.to_string())
    }
}

impl From<String> for RawReading {
    fn from(value: String) -> Self {
        RawReading::Text(value)
    }
}

fn parse_leading_float(text: &str) -> Option<f64> {
    static NUMBER_RE: OnceLock<Regex> = OnceLock::new();
    let number_re = NUMBER_RE.get_or_init(|| {
        Regex::new(r"^\s*[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").unwrap()
    });
    let found = number_re.find(text)?;
    found.as_str().trim().parse::<f64>().ok()
}

/// Validate a raw reading against a range.
///
/// - parse failure or non-finite value → `(min + max) / 2`
/// - finite value outside the range → clamped to the nearest bound
pub fn validate_number(raw: &RawReading, min: f64, max: f64) -> f64 {
    match raw.parse() {
        Some(value) if value.is_finite() => value.clamp(min, max),
        _ => (min + max) / 2.0,
    }
}

/// Validate a raw reading against a named range
pub fn validate_in(raw: &RawReading, range: ValidRange) -> f64 {
    validate_number(raw, range.min, range.max)
}

/// Current weather observation as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(default, alias = "windSpeed")]
    pub wind_speed: RawReading,
    #[serde(default)]
    pub pressure: RawReading,
    #[serde(default)]
    pub humidity: RawReading,
    #[serde(default)]
    pub temperature: RawReading,
}

impl WeatherSnapshot {
    pub fn new(
        wind_speed: impl Into<RawReading>,
        pressure: impl Into<RawReading>,
        humidity: impl Into<RawReading>,
        temperature: impl Into<RawReading>,
    ) -> Self {
        WeatherSnapshot {
            wind_speed: wind_speed.into(),
            pressure: pressure.into(),
            humidity: humidity.into(),
            temperature: temperature.into(),
        }
    }

    /// Parsed but unclamped values; `None` where the text did not parse
    pub fn parse_raw(&self) -> RawConditions {
        let finite = |r: &RawReading| r.parse().filter(|v| v.is_finite());
        RawConditions {
            wind_kmh: finite(&self.wind_speed),
            pressure_hpa: finite(&self.pressure),
            humidity_pct: finite(&self.humidity),
            temperature_c: finite(&self.temperature),
        }
    }

    /// Validated readings used by every scoring stage
    pub fn conditions(&self) -> Conditions {
        Conditions {
            wind_kmh: validate_in(&self.wind_speed, WIND_RANGE),
            pressure_hpa: validate_in(&self.pressure, PRESSURE_RANGE),
            humidity_pct: validate_in(&self.humidity, HUMIDITY_RANGE),
            temperature_c: validate_in(&self.temperature, TEMPERATURE_RANGE),
        }
    }
}

/// One timestamped entry of an observation series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<FixedOffset>,
    #[serde(default, alias = "windSpeed")]
    pub wind_speed: RawReading,
    #[serde(default)]
    pub pressure: RawReading,
    #[serde(default)]
    pub humidity: RawReading,
    #[serde(default)]
    pub temperature: RawReading,
}

impl Observation {
    pub fn snapshot(&self) -> WeatherSnapshot {
        WeatherSnapshot {
            wind_speed: self.wind_speed.clone(),
            pressure: self.pressure.clone(),
            humidity: self.humidity.clone(),
            temperature: self.temperature.clone(),
        }
    }
}

/// Readings as parsed from the feed, before clamping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawConditions {
    pub wind_kmh: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub temperature_c: Option<f64>,
}

/// Validated, finite readings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    pub wind_kmh: f64,
    pub pressure_hpa: f64,
    pub humidity_pct: f64,
    pub temperature_c: f64,
}

impl Conditions {
    pub fn new(wind_kmh: f64, pressure_hpa: f64, humidity_pct: f64, temperature_c: f64) -> Self {
        WeatherSnapshot::new(wind_kmh, pressure_hpa, humidity_pct, temperature_c).conditions()
    }
}

/// Data quality label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLabel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLabel::Excellent => "excellent",
            QualityLabel::Good => "good",
            QualityLabel::Fair => "fair",
            QualityLabel::Poor => "poor",
        }
    }
}

/// Input data quality, reported in metadata only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQuality {
    pub score: u8,
    pub label: QualityLabel,
}

/// Score the snapshot: 100 minus 25 for every unusable field.
///
/// Does not influence scoring.
pub fn assess_data_quality(snapshot: &WeatherSnapshot) -> DataQuality {
    let checks = [
        snapshot.wind_speed.is_valid_in(WIND_RANGE),
        snapshot.pressure.is_valid_in(PRESSURE_RANGE),
        snapshot.humidity.is_valid_in(HUMIDITY_RANGE),
        snapshot.temperature.is_valid_in(TEMPERATURE_RANGE),
    ];
    let invalid = checks.iter().filter(|ok| !**ok).count() as u8;
    let score = 100 - invalid * 25;

    let label = match score {
        s if s >= 90 => QualityLabel::Excellent,
        s if s >= 70 => QualityLabel::Good,
        s if s >= 50 => QualityLabel::Fair,
        _ => QualityLabel::Poor,
    };

    DataQuality { score, label }
}
