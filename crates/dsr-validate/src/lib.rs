// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Invariant validation for monitoring-point series.
//!
//! For every axis of a point, each epoch's cumulative value must equal the
//! previous cumulative plus the epoch's delta within tolerance, and both
//! fields must stay inside configured magnitude bounds. Recurrence drift is
//! repairable and reported as `NeedsAdjustment`; magnitude violations are
//! terminal and reported as `Invalid` with `can_adjust = false`.

use chrono::Duration;
use dsr_core::{
    tolerance, Axis, DsrError, MonitoringPoint, PeriodData, Severity, ValidationOptions,
    ValidationResult, ValidationStatus,
};
use std::collections::BTreeSet;

/// Recurrence and magnitude checker for one batch configuration.
#[derive(Clone, Debug)]
pub struct InvariantValidator {
    options: ValidationOptions,
}

impl InvariantValidator {
    pub fn new(options: ValidationOptions) -> Result<Self, DsrError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validates one point, re-sorting its epochs by timestamp first.
    ///
    /// Returns one result per located violation plus advisory warnings; a
    /// single `Valid` result stands in when nothing at all was found.
    pub fn validate_point(&self, point: &mut MonitoringPoint) -> Vec<ValidationResult> {
        if !point.is_sorted_by_timestamp() {
            point.sort_by_timestamp();
        }

        if point.period_count() < 2 {
            return vec![ValidationResult::success(
                &point.point_name,
                "fewer than two epochs; recurrence has nothing to check",
            )];
        }

        let mut results = Vec::new();
        for axis in Axis::ALL {
            self.check_recurrence(point, axis, &mut results);
            self.check_magnitudes(point, axis, &mut results);
            self.check_flat_axis(point, axis, &mut results);
        }
        self.check_time_intervals(point, &mut results);

        if results.is_empty() {
            return vec![ValidationResult::success(
                &point.point_name,
                "recurrence and magnitude checks passed on all axes",
            )];
        }
        results
    }

    /// Cross-checks a point against an independently sourced series for the
    /// same physical location. Reporting only; the cascade never consumes
    /// these findings.
    pub fn cross_check(
        &self,
        point: &MonitoringPoint,
        reference: &MonitoringPoint,
    ) -> Vec<ValidationResult> {
        let mileage_gap = tolerance::abs_diff(point.mileage, reference.mileage);
        if mileage_gap > self.options.mileage_tolerance {
            return vec![ValidationResult::failure(
                ValidationStatus::Valid,
                Severity::Warning,
                &point.point_name,
                None,
                None,
                None,
                format!(
                    "comparison series mileage {} is {mileage_gap:.3} away from {}; beyond the {} gate, no epochs compared",
                    reference.mileage, point.mileage, self.options.mileage_tolerance
                ),
                None,
                None,
                true,
            )];
        }

        let mut results = Vec::new();
        for period in &point.periods {
            let Some(ts) = period.timestamp else {
                continue;
            };
            let Some(matched) = reference
                .periods
                .iter()
                .find(|candidate| candidate.timestamp == Some(ts))
            else {
                continue;
            };

            for axis in Axis::ALL {
                let ours = period.cumulative(axis);
                let theirs = matched.cumulative(axis);
                if !tolerance::equal(ours, theirs, self.options.cumulative_tolerance) {
                    results.push(ValidationResult::failure(
                        ValidationStatus::Valid,
                        Severity::Warning,
                        &point.point_name,
                        Some(axis),
                        None,
                        Some(period.row_number),
                        format!(
                            "axis {axis} at {ts}: cumulative {ours:.6} disagrees with comparison source {theirs:.6}"
                        ),
                        Some(theirs),
                        Some(ours),
                        true,
                    ));
                }
            }
        }
        results
    }

    fn check_recurrence(
        &self,
        point: &MonitoringPoint,
        axis: Axis,
        results: &mut Vec<ValidationResult>,
    ) {
        for i in 1..point.period_count() {
            let prev = &point.periods[i - 1];
            let current = &point.periods[i];
            // Undated epochs are unorderable and sit outside the recurrence.
            if prev.timestamp.is_none() || current.timestamp.is_none() {
                continue;
            }

            let expected = prev.cumulative(axis) + current.delta(axis);
            let actual = current.cumulative(axis);
            let diff = tolerance::abs_diff(expected, actual);
            if diff.is_nan() || diff > self.options.cumulative_tolerance {
                results.push(ValidationResult::failure(
                    ValidationStatus::NeedsAdjustment,
                    self.recurrence_severity(diff),
                    &point.point_name,
                    Some(axis),
                    Some(i),
                    Some(current.row_number),
                    format!(
                        "axis {axis} epoch {i}: cumulative {actual:.6} drifts from running sum {expected:.6} by {diff:.6}"
                    ),
                    Some(expected),
                    Some(actual),
                    true,
                ));
            }
        }
    }

    fn recurrence_severity(&self, diff: f64) -> Severity {
        if diff.is_nan() || diff > self.options.critical_threshold {
            Severity::Critical
        } else if diff > self.options.error_threshold {
            Severity::Error
        } else {
            Severity::Warning
        }
    }

    fn check_magnitudes(
        &self,
        point: &MonitoringPoint,
        axis: Axis,
        results: &mut Vec<ValidationResult>,
    ) {
        for (i, period) in point.periods.iter().enumerate() {
            let delta = period.delta(axis);
            if !delta.is_finite() || tolerance::abs(delta) > self.options.max_current_period_value {
                results.push(self.magnitude_violation(
                    point,
                    period,
                    axis,
                    i,
                    "delta",
                    delta,
                    self.options.max_current_period_value,
                ));
            }

            let cumulative = period.cumulative(axis);
            if !cumulative.is_finite()
                || tolerance::abs(cumulative) > self.options.max_cumulative_value
            {
                results.push(self.magnitude_violation(
                    point,
                    period,
                    axis,
                    i,
                    "cumulative",
                    cumulative,
                    self.options.max_cumulative_value,
                ));
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn magnitude_violation(
        &self,
        point: &MonitoringPoint,
        period: &PeriodData,
        axis: Axis,
        epoch: usize,
        field: &str,
        value: f64,
        bound: f64,
    ) -> ValidationResult {
        ValidationResult::failure(
            ValidationStatus::Invalid,
            Severity::Error,
            &point.point_name,
            Some(axis),
            Some(epoch),
            Some(period.row_number),
            format!("axis {axis} epoch {epoch}: {field} {value:.6} exceeds magnitude bound {bound}"),
            Some(bound),
            Some(value),
            false,
        )
    }

    fn check_flat_axis(
        &self,
        point: &MonitoringPoint,
        axis: Axis,
        results: &mut Vec<ValidationResult>,
    ) {
        if point.period_count() < 3 {
            return;
        }
        let all_flat = point
            .periods
            .iter()
            .all(|p| tolerance::abs(p.delta(axis)) < self.options.min_value_threshold);
        if all_flat {
            results.push(ValidationResult::failure(
                ValidationStatus::Valid,
                Severity::Warning,
                &point.point_name,
                Some(axis),
                None,
                None,
                format!(
                    "axis {axis}: every delta sits below {}; series may be stuck or unit-mismatched",
                    self.options.min_value_threshold
                ),
                None,
                None,
                true,
            ));
        }
    }

    fn check_time_intervals(&self, point: &MonitoringPoint, results: &mut Vec<ValidationResult>) {
        let max_gap = Duration::try_seconds(
            (self.options.max_time_interval_days * 86_400.0) as i64,
        )
        .unwrap_or(Duration::MAX);

        for i in 1..point.period_count() {
            let (Some(prev), Some(current)) =
                (point.periods[i - 1].timestamp, point.periods[i].timestamp)
            else {
                continue;
            };
            let gap = current - prev;
            if gap > max_gap {
                results.push(ValidationResult::failure(
                    ValidationStatus::Valid,
                    Severity::Warning,
                    &point.point_name,
                    None,
                    Some(i),
                    Some(point.periods[i].row_number),
                    format!(
                        "epoch {i}: {} days since previous reading exceeds the {} day interval",
                        gap.num_days(),
                        self.options.max_time_interval_days
                    ),
                    None,
                    None,
                    true,
                ));
            }
        }
    }
}

/// True when any result breaks an invariant (advisory warnings excluded).
pub fn has_violations(results: &[ValidationResult]) -> bool {
    results.iter().any(ValidationResult::is_violation)
}

/// Distinct (epoch, axis) cells referenced by violations, in series order.
pub fn failing_cells(results: &[ValidationResult]) -> BTreeSet<(usize, Axis)> {
    results
        .iter()
        .filter(|r| r.is_violation())
        .filter_map(|r| match (r.epoch, r.axis) {
            (Some(epoch), Some(axis)) => Some((epoch, axis)),
            _ => None,
        })
        .collect()
}

/// Validation namespace placeholder.
pub fn crate_name() -> &'static str {
    let _ = dsr_core::crate_name();
    "dsr-validate"
}
