// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use chrono::{DateTime, Utc};
use std::fmt;

/// One of the three orthogonal measurement directions.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-axis observation pair: the per-period delta and the running total.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AxisReading {
    pub delta: f64,
    pub cumulative: f64,
}

impl AxisReading {
    pub fn new(delta: f64, cumulative: f64) -> Self {
        Self { delta, cumulative }
    }
}

/// One observation epoch for one monitoring point.
///
/// A record without a timestamp cannot participate in recurrence checks; the
/// timestamp sort places it before every dated record so downstream indexing
/// stays stable.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodData {
    pub timestamp: Option<DateTime<Utc>>,
    pub row_number: u32,
    pub source_file: String,
    pub x: AxisReading,
    pub y: AxisReading,
    pub z: AxisReading,
}

impl PeriodData {
    pub fn new(timestamp: Option<DateTime<Utc>>, row_number: u32, source_file: &str) -> Self {
        Self {
            timestamp,
            row_number,
            source_file: source_file.to_string(),
            x: AxisReading::default(),
            y: AxisReading::default(),
            z: AxisReading::default(),
        }
    }

    pub fn reading(&self, axis: Axis) -> AxisReading {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn reading_mut(&mut self, axis: Axis) -> &mut AxisReading {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }

    pub fn delta(&self, axis: Axis) -> f64 {
        self.reading(axis).delta
    }

    pub fn cumulative(&self, axis: Axis) -> f64 {
        self.reading(axis).cumulative
    }

    pub fn set_delta(&mut self, axis: Axis, value: f64) {
        self.reading_mut(axis).delta = value;
    }

    pub fn set_cumulative(&mut self, axis: Axis, value: f64) {
        self.reading_mut(axis).cumulative = value;
    }
}

/// A physical monitoring point and its time-ordered observation epochs.
///
/// Callers are expected to deliver `periods` sorted ascending by timestamp;
/// consumers re-sort before trusting epoch indices.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct MonitoringPoint {
    pub point_name: String,
    pub mileage: f64,
    pub periods: Vec<PeriodData>,
}

impl MonitoringPoint {
    pub fn new(point_name: &str, mileage: f64) -> Self {
        Self {
            point_name: point_name.to_string(),
            mileage,
            periods: Vec::new(),
        }
    }

    pub fn period_count(&self) -> usize {
        self.periods.len()
    }

    pub fn is_sorted_by_timestamp(&self) -> bool {
        self.periods
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
    }

    /// Stable ascending sort by timestamp; undated epochs sort first.
    pub fn sort_by_timestamp(&mut self) {
        self.periods.sort_by_key(|period| period.timestamp);
    }

    /// Per-period deltas for one axis across all epochs, in series order.
    pub fn deltas(&self, axis: Axis) -> Vec<f64> {
        self.periods.iter().map(|p| p.delta(axis)).collect()
    }

    /// Cumulative values for one axis across all epochs, in series order.
    pub fn cumulatives(&self, axis: Axis) -> Vec<f64> {
        self.periods.iter().map(|p| p.cumulative(axis)).collect()
    }
}
