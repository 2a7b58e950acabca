//! Rolling observation memory
//!
//! Bounded FIFO of timestamped observations plus the anomalies detected
//! between consecutive entries. Owned by exactly one engine; there is no
//! shared or global history.

use crate::input::{Conditions, RawConditions, WeatherSnapshot};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of observations retained
pub const DEFAULT_MEMORY_CAPACITY: usize = 50;

/// Pressure jump between consecutive observations that counts as anomalous, hPa
const PRESSURE_JUMP_HPA: f64 = 3.0;

/// Humidity jump between consecutive observations that counts as anomalous, pp
const HUMIDITY_JUMP_PCT: f64 = 10.0;

/// One stored observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub timestamp: DateTime<FixedOffset>,
    pub raw: RawConditions,
    pub conditions: Conditions,
}

/// A sudden change between two consecutive observations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub timestamp: DateTime<FixedOffset>,
    /// Signed pressure change, hPa (absent when either reading was unparsable)
    pub pressure_change: Option<f64>,
    /// Signed humidity change, pp (absent when either reading was unparsable)
    pub humidity_change: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct EngineMemory {
    capacity: usize,
    entries: VecDeque<MemoryEntry>,
    anomalies: Vec<Anomaly>,
}

impl Default for EngineMemory {
    fn default() -> Self {
        EngineMemory::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }
}

impl EngineMemory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        EngineMemory {
            capacity,
            entries: VecDeque::with_capacity(capacity),
            anomalies: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored observations, oldest first
    pub fn entries(&self) -> std::collections::vec_deque::Iter<'_, MemoryEntry> {
        self.entries.iter()
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// Append an observation, evicting the oldest beyond capacity, and
    /// record an anomaly when the latest two raw readings jump.
    ///
    /// Returns the anomaly recorded by this call, if any.
    pub fn update(
        &mut self,
        snapshot: &WeatherSnapshot,
        timestamp: DateTime<FixedOffset>,
    ) -> Option<&Anomaly> {
        self.entries.push_back(MemoryEntry {
            timestamp,
            raw: snapshot.parse_raw(),
            conditions: snapshot.conditions(),
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            tracing::trace!(capacity = self.capacity, "evicted oldest observation");
        }

        let anomaly = self.detect_anomaly()?;
        tracing::warn!(
            pressure_change = ?anomaly.pressure_change,
            humidity_change = ?anomaly.humidity_change,
            "sudden change between consecutive observations"
        );
        self.anomalies.push(anomaly);
        self.anomalies.last()
    }

    fn detect_anomaly(&self) -> Option<Anomaly> {
        let n = self.entries.len();
        if n < 2 {
            return None;
        }
        let prev = &self.entries[n - 2];
        let curr = &self.entries[n - 1];

        let delta = |a: Option<f64>, b: Option<f64>| match (a, b) {
            (Some(a), Some(b)) => Some(b - a),
            _ => None,
        };
        let pressure_change = delta(prev.raw.pressure_hpa, curr.raw.pressure_hpa);
        let humidity_change = delta(prev.raw.humidity_pct, curr.raw.humidity_pct);

        let pressure_jump = pressure_change.is_some_and(|d| d.abs() > PRESSURE_JUMP_HPA);
        let humidity_jump = humidity_change.is_some_and(|d| d.abs() > HUMIDITY_JUMP_PCT);

        (pressure_jump || humidity_jump).then(|| Anomaly {
            timestamp: curr.timestamp,
            pressure_change,
            humidity_change,
        })
    }
}
