// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Escalating correction orchestrator.
//!
//! Tiers are pure planning functions; this module owns the state machine
//! that applies a plan, re-validates, and decides whether to escalate. A
//! tier's edits are never rolled back before the next tier runs: later
//! tiers layer on top of whatever the earlier ones already applied. The
//! terminal state is always `Recorded`, with every correction (no-ops
//! included) converted into a ledger entry.

use crate::{aggressive, apply, global, partial, regen};
use chrono::Utc;
use dsr_core::{
    AdjustmentRecord, CorrectionOptions, DataCorrection, DsrError, MonitoringPoint,
    PointCorrectionResult, PointStatus, StableRng, ValidationOptions, ValidationResult,
};
use dsr_ledger::AdjustmentLedger;
use dsr_validate::{failing_cells, has_violations, InvariantValidator};
use std::fmt;

/// Failure-ratio gate between the partial and final tiers.
const PARTIAL_RATIO_THRESHOLD: f64 = 0.20;

/// Stations of one point's trip through the cascade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadeState {
    Unchecked,
    GlobalApplied,
    AggressiveApplied,
    PartialApplied,
    FinalApplied,
    Recorded,
}

impl fmt::Display for CascadeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unchecked => "unchecked",
            Self::GlobalApplied => "global",
            Self::AggressiveApplied => "aggressive",
            Self::PartialApplied => "partial",
            Self::FinalApplied => "final",
            Self::Recorded => "recorded",
        };
        f.write_str(name)
    }
}

/// Fraction of (epoch, axis) cells still failing, out of every cell the
/// point carries across its three axes.
pub fn failure_ratio(results: &[ValidationResult], period_count: usize) -> f64 {
    if period_count == 0 {
        return 0.0;
    }
    failing_cells(results).len() as f64 / (period_count as f64 * 3.0)
}

/// Four-tier correction engine for one batch configuration.
#[derive(Clone, Debug)]
pub struct CorrectionCascade {
    validation: ValidationOptions,
    correction: CorrectionOptions,
}

impl CorrectionCascade {
    pub fn new(
        validation: ValidationOptions,
        correction: CorrectionOptions,
    ) -> Result<Self, DsrError> {
        validation.validate()?;
        correction.validate()?;
        Ok(Self {
            validation,
            correction,
        })
    }

    pub fn validation_options(&self) -> &ValidationOptions {
        &self.validation
    }

    pub fn correction_options(&self) -> &CorrectionOptions {
        &self.correction
    }

    /// Runs the cascade on one point, mutating its series in place and
    /// appending every applied correction to the ledger.
    pub fn run(
        &self,
        point: &mut MonitoringPoint,
        rng: &mut StableRng,
        ledger: &mut AdjustmentLedger,
    ) -> Result<PointCorrectionResult, DsrError> {
        let validator = InvariantValidator::new(self.validation.clone())?;
        let mut results = validator.validate_point(point);
        if !has_violations(&results) {
            return Ok(PointCorrectionResult {
                point_name: point.point_name.clone(),
                status: PointStatus::Success,
                message: "series already satisfies the recurrence invariant".to_string(),
                corrections: Vec::new(),
            });
        }

        // Tier 2 and 4 statistics derive from the untouched input, not from
        // whatever an earlier tier already rewrote.
        let original = point.periods.clone();
        let mut applied: Vec<DataCorrection> = Vec::new();
        let mut trail = vec![CascadeState::Unchecked];

        if self.correction.enable_minimal_modification {
            let tier_plan = global::plan(point, &self.correction);
            apply::apply_corrections(point, &tier_plan)?;
            applied.extend(tier_plan);
            trail.push(CascadeState::GlobalApplied);
            results = validator.validate_point(point);
        }

        if has_violations(&results) {
            let tier_plan = aggressive::plan(point, &original, &self.correction, rng);
            apply::apply_corrections(point, &tier_plan)?;
            applied.extend(tier_plan);
            trail.push(CascadeState::AggressiveApplied);
            results = validator.validate_point(point);
        }

        if has_violations(&results) {
            let ratio = failure_ratio(&results, point.period_count());
            if ratio < PARTIAL_RATIO_THRESHOLD {
                let cells = failing_cells(&results);
                let tier_plan = partial::plan(point, &cells, &self.correction, rng);
                apply::apply_corrections(point, &tier_plan)?;
                applied.extend(tier_plan);
                trail.push(CascadeState::PartialApplied);
            } else {
                let tier_plan = regen::plan(point, &original, &self.correction, rng);
                apply::apply_corrections(point, &tier_plan)?;
                applied.extend(tier_plan);
                trail.push(CascadeState::FinalApplied);
            }
            results = validator.validate_point(point);
        }

        let recorded_at = Utc::now();
        for correction in &applied {
            let source_file = point
                .periods
                .get(correction.epoch)
                .map(|p| p.source_file.as_str())
                .unwrap_or("");
            ledger.append(AdjustmentRecord::from_correction(
                correction,
                source_file,
                recorded_at,
            ));
        }
        trail.push(CascadeState::Recorded);

        let unrepairable = results
            .iter()
            .filter(|r| r.is_violation() && !r.can_adjust)
            .count();
        let residual = results
            .iter()
            .filter(|r| r.is_violation() && r.can_adjust)
            .count();

        let trail_text = trail
            .iter()
            .map(CascadeState::to_string)
            .collect::<Vec<_>>()
            .join(" -> ");
        let (status, message) = if unrepairable > 0 {
            (
                PointStatus::Skipped,
                format!(
                    "{unrepairable} magnitude violations cannot be repaired; do not persist this point ({trail_text})"
                ),
            )
        } else if residual > 0 {
            (
                PointStatus::Success,
                format!("{residual} recurrence violations remain after the last tier ({trail_text})"),
            )
        } else {
            (
                PointStatus::Success,
                format!(
                    "series repaired with {} corrections ({trail_text})",
                    applied.len()
                ),
            )
        };

        Ok(PointCorrectionResult {
            point_name: point.point_name.clone(),
            status,
            message,
            corrections: applied,
        })
    }
}
