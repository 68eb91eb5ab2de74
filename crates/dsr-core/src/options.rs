// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::DsrError;

const DEFAULT_CUMULATIVE_TOLERANCE: f64 = 0.001;
const DEFAULT_ERROR_THRESHOLD: f64 = 0.1;
const DEFAULT_CRITICAL_THRESHOLD: f64 = 1.0;
const DEFAULT_MIN_VALUE_THRESHOLD: f64 = 0.001;
const DEFAULT_MAX_CURRENT_PERIOD: f64 = 10.0;
const DEFAULT_MAX_CUMULATIVE: f64 = 50.0;
const DEFAULT_MILEAGE_TOLERANCE: f64 = 1.0;
const DEFAULT_MAX_TIME_INTERVAL_DAYS: f64 = 30.0;
const DEFAULT_RANDOM_CHANGE_RANGE: f64 = 0.3;

/// Thresholds consumed by the invariant validator.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationOptions {
    /// Allowed drift between a cumulative value and the running delta sum.
    pub cumulative_tolerance: f64,
    /// Recurrence drift above this is reported as `Critical`.
    pub critical_threshold: f64,
    /// Recurrence drift above this (and below critical) is an `Error`.
    pub error_threshold: f64,
    /// Axis deltas all below this magnitude mark a suspiciously flat axis.
    pub min_value_threshold: f64,
    pub max_current_period_value: f64,
    pub max_cumulative_value: f64,
    /// Mileage gate for matching against an independent comparison series.
    pub mileage_tolerance: f64,
    /// Gap between consecutive dated epochs that earns a warning.
    pub max_time_interval_days: f64,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            cumulative_tolerance: DEFAULT_CUMULATIVE_TOLERANCE,
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD,
            error_threshold: DEFAULT_ERROR_THRESHOLD,
            min_value_threshold: DEFAULT_MIN_VALUE_THRESHOLD,
            max_current_period_value: DEFAULT_MAX_CURRENT_PERIOD,
            max_cumulative_value: DEFAULT_MAX_CUMULATIVE,
            mileage_tolerance: DEFAULT_MILEAGE_TOLERANCE,
            max_time_interval_days: DEFAULT_MAX_TIME_INTERVAL_DAYS,
        }
    }
}

impl ValidationOptions {
    pub fn validate(&self) -> Result<(), DsrError> {
        require_positive(self.cumulative_tolerance, "ValidationOptions.cumulative_tolerance")?;
        require_positive(self.critical_threshold, "ValidationOptions.critical_threshold")?;
        require_positive(self.error_threshold, "ValidationOptions.error_threshold")?;
        require_positive(self.min_value_threshold, "ValidationOptions.min_value_threshold")?;
        require_positive(
            self.max_current_period_value,
            "ValidationOptions.max_current_period_value",
        )?;
        require_positive(self.max_cumulative_value, "ValidationOptions.max_cumulative_value")?;
        require_positive(self.mileage_tolerance, "ValidationOptions.mileage_tolerance")?;
        require_positive(
            self.max_time_interval_days,
            "ValidationOptions.max_time_interval_days",
        )?;

        if self.error_threshold >= self.critical_threshold {
            return Err(DsrError::invalid_input(format!(
                "ValidationOptions.error_threshold must be < critical_threshold; got {} >= {}",
                self.error_threshold, self.critical_threshold
            )));
        }

        Ok(())
    }
}

/// Bounds and knobs consumed by the correction cascade.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct CorrectionOptions {
    pub max_current_period_value: f64,
    pub max_cumulative_value: f64,
    /// When set, the global tier attempts minimal cumulative-only rewrites
    /// before any synthetic regeneration is considered.
    pub enable_minimal_modification: bool,
    pub cumulative_tolerance: f64,
    /// Half-width of the signed-uniform band used by the partial tier.
    pub random_change_range: f64,
}

impl Default for CorrectionOptions {
    fn default() -> Self {
        Self {
            max_current_period_value: DEFAULT_MAX_CURRENT_PERIOD,
            max_cumulative_value: DEFAULT_MAX_CUMULATIVE,
            enable_minimal_modification: true,
            cumulative_tolerance: DEFAULT_CUMULATIVE_TOLERANCE,
            random_change_range: DEFAULT_RANDOM_CHANGE_RANGE,
        }
    }
}

impl CorrectionOptions {
    pub fn validate(&self) -> Result<(), DsrError> {
        require_positive(
            self.max_current_period_value,
            "CorrectionOptions.max_current_period_value",
        )?;
        require_positive(self.max_cumulative_value, "CorrectionOptions.max_cumulative_value")?;
        require_positive(self.cumulative_tolerance, "CorrectionOptions.cumulative_tolerance")?;
        require_positive(self.random_change_range, "CorrectionOptions.random_change_range")?;

        Ok(())
    }
}

fn require_positive(value: f64, name: &str) -> Result<(), DsrError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DsrError::invalid_input(format!(
            "{name} must be finite and > 0; got {value}"
        )));
    }
    Ok(())
}
