//! Trend semantics - extract short-term tendencies from observation memory
//!
//! Compares the mean of the older half of the recent window against the
//! mean of the newer half for pressure, humidity and wind.
//!
//! Global invariants enforced:
//! - No memory mutation
//! - Trends are derived, not stored
//! - Fewer than `MIN_TREND_SAMPLES` observations is reported, never an error

use crate::input::Conditions;
use crate::memory::EngineMemory;
use crate::text;
use serde::{Deserialize, Serialize};

/// Default number of most recent observations considered
pub const DEFAULT_TREND_WINDOW: usize = 10;

/// Observations required before any trend is reported
pub const MIN_TREND_SAMPLES: usize = 3;

/// Half-window mean change below which a variable counts as stable
const DIRECTION_EPSILON: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendVariable {
    Pressure,
    Humidity,
    Wind,
}

impl TrendVariable {
    /// Absolute change beyond which the trend is "rapid"
    pub fn rapid_threshold(&self) -> f64 {
        match self {
            TrendVariable::Pressure => 3.0,
            TrendVariable::Humidity => 10.0,
            TrendVariable::Wind => 5.0,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            TrendVariable::Pressure => "hPa",
            TrendVariable::Humidity => "%",
            TrendVariable::Wind => "km/h",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
}

impl TrendDirection {
    pub fn from_change(change: f64) -> Self {
        if change > DIRECTION_EPSILON {
            TrendDirection::Rising
        } else if change < -DIRECTION_EPSILON {
            TrendDirection::Falling
        } else {
            TrendDirection::Stable
        }
    }
}

/// Trend of one variable across the window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableTrend {
    pub direction: TrendDirection,
    /// Signed change, second-half mean minus first-half mean
    pub rate: f64,
    pub rapid: bool,
    pub interpretation: String,
}

impl VariableTrend {
    fn compute(variable: TrendVariable, first_mean: f64, second_mean: f64) -> Self {
        let rate = second_mean - first_mean;
        let direction = TrendDirection::from_change(rate);
        let rapid = direction != TrendDirection::Stable && rate.abs() > variable.rapid_threshold();
        VariableTrend {
            direction,
            rate,
            rapid,
            interpretation: text::trend_interpretation(variable, direction, rate, rapid),
        }
    }
}

/// Combined outlook across the three variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendOutlook {
    Deteriorating,
    Improving,
    Intensifying,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSet {
    pub samples: usize,
    pub pressure: VariableTrend,
    pub humidity: VariableTrend,
    pub wind: VariableTrend,
    pub outlook: TrendOutlook,
    pub summary: String,
}

/// Result of trend analysis; `trends` is `None` when history is too short
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub available: bool,
    #[serde(flatten)]
    pub trends: Option<TrendSet>,
}

impl TrendAnalysis {
    pub fn unavailable() -> Self {
        TrendAnalysis {
            available: false,
            trends: None,
        }
    }

    /// True when pressure is falling while humidity rises
    pub fn is_moistening_low(&self) -> bool {
        self.trends.as_ref().is_some_and(|t| {
            t.pressure.direction == TrendDirection::Falling
                && t.humidity.direction == TrendDirection::Rising
        })
    }
}

/// Analyze the last `window` observations held in memory
pub fn analyze_trends(memory: &EngineMemory, window: usize) -> TrendAnalysis {
    if memory.len() < MIN_TREND_SAMPLES {
        return TrendAnalysis::unavailable();
    }

    let window = window.max(MIN_TREND_SAMPLES);
    let recent: Vec<Conditions> = memory
        .entries()
        .skip(memory.len().saturating_sub(window))
        .map(|e| e.conditions)
        .collect();
    let half = recent.len() / 2;
    let (older, newer) = recent.split_at(half);

    let pressure = VariableTrend::compute(
        TrendVariable::Pressure,
        mean(older, |c| c.pressure_hpa),
        mean(newer, |c| c.pressure_hpa),
    );
    let humidity = VariableTrend::compute(
        TrendVariable::Humidity,
        mean(older, |c| c.humidity_pct),
        mean(newer, |c| c.humidity_pct),
    );
    let wind = VariableTrend::compute(
        TrendVariable::Wind,
        mean(older, |c| c.wind_kmh),
        mean(newer, |c| c.wind_kmh),
    );

    let outlook = synthesize_trends(pressure.direction, humidity.direction, wind.direction);

    TrendAnalysis {
        available: true,
        trends: Some(TrendSet {
            samples: recent.len(),
            pressure,
            humidity,
            wind,
            outlook,
            summary: text::trend_summary(outlook).to_string(),
        }),
    }
}

fn mean(items: &[Conditions], field: impl Fn(&Conditions) -> f64) -> f64 {
    items.iter().map(field).sum::<f64>() / items.len() as f64
}

/// Collapse three directions into one outlook.
///
/// Priority: deteriorating, improving, intensifying, stable.
pub fn synthesize_trends(
    pressure: TrendDirection,
    humidity: TrendDirection,
    wind: TrendDirection,
) -> TrendOutlook {
    use TrendDirection::*;
    match (pressure, humidity, wind) {
        (Falling, Rising, _) => TrendOutlook::Deteriorating,
        (Rising, Falling, _) => TrendOutlook::Improving,
        (Falling, _, Rising) => TrendOutlook::Intensifying,
        _ => TrendOutlook::Stable,
    }
}
