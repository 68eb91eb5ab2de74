// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Batch runner over a materialized list of monitoring points.
//!
//! Points are mutually independent: each gets its own RNG stream derived
//! from the batch seed, failures stay contained at the point boundary, and
//! per-point ledgers are merged back in input order. With the `rayon`
//! feature the points fan out over the thread pool and the merged output is
//! bit-for-bit identical to a sequential run.

use dsr_core::{
    CorrectionOptions, CorrectionResult, DsrError, MonitoringPoint, PointCorrectionResult,
    PointStatus, ProgressSink, StableRng, ValidationOptions, ValidationResult,
};
use dsr_correct::CorrectionCascade;
use dsr_ledger::AdjustmentLedger;
use dsr_validate::{has_violations, InvariantValidator};
use log::warn;

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "rayon")]
use std::sync::atomic::{AtomicUsize, Ordering};

/// Batch-level knobs; everything else lives in the two option structs.
#[derive(Clone, Copy)]
pub struct BatchOptions<'a> {
    /// Base seed for the per-point RNG streams.
    pub seed: u64,
    /// Optional progress hook, reported once per completed point.
    pub progress: Option<&'a dyn ProgressSink>,
}

impl Default for BatchOptions<'_> {
    fn default() -> Self {
        Self {
            seed: 0,
            progress: None,
        }
    }
}

impl<'a> BatchOptions<'a> {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = Some(progress);
        self
    }
}

/// Validates every point without mutating values (beyond the timestamp
/// re-sort) and returns the concatenated findings.
pub fn validate_batch(
    points: &mut [MonitoringPoint],
    validation: &ValidationOptions,
) -> Result<Vec<ValidationResult>, DsrError> {
    let validator = InvariantValidator::new(validation.clone())?;
    let mut results = Vec::new();
    for point in points.iter_mut() {
        results.extend(validator.validate_point(point));
    }
    Ok(results)
}

/// Runs validation plus the correction cascade over every point, mutating
/// the series in place.
///
/// Option errors surface as a batch-level `Err` before any point is
/// touched; anything that goes wrong inside one point is logged and
/// becomes a `PointCorrectionResult` with `Error` status while the rest of
/// the batch keeps going.
pub fn run_batch(
    points: &mut [MonitoringPoint],
    validation: &ValidationOptions,
    correction: &CorrectionOptions,
    batch: &BatchOptions<'_>,
) -> Result<CorrectionResult, DsrError> {
    validation.validate()?;
    correction.validate()?;
    let cascade = CorrectionCascade::new(validation.clone(), correction.clone())?;
    let validator = InvariantValidator::new(validation.clone())?;

    let total = points.len();
    let outcomes = process_points(points, &cascade, &validator, batch, total);

    let mut result = CorrectionResult::default();
    let mut ledger = AdjustmentLedger::new();
    for (point_result, point_ledger) in outcomes {
        result.point_results.push(point_result);
        ledger.merge(point_ledger);
    }
    result.adjustment_records = ledger.into_records();
    Ok(result)
}

#[cfg(not(feature = "rayon"))]
fn process_points(
    points: &mut [MonitoringPoint],
    cascade: &CorrectionCascade,
    validator: &InvariantValidator,
    batch: &BatchOptions<'_>,
    total: usize,
) -> Vec<(PointCorrectionResult, AdjustmentLedger)> {
    points
        .iter_mut()
        .enumerate()
        .map(|(index, point)| {
            let outcome = process_point(point, index, cascade, validator, batch.seed);
            if let Some(sink) = batch.progress {
                sink.on_progress(index + 1, total);
            }
            outcome
        })
        .collect()
}

#[cfg(feature = "rayon")]
fn process_points(
    points: &mut [MonitoringPoint],
    cascade: &CorrectionCascade,
    validator: &InvariantValidator,
    batch: &BatchOptions<'_>,
    total: usize,
) -> Vec<(PointCorrectionResult, AdjustmentLedger)> {
    let completed = AtomicUsize::new(0);
    points
        .par_iter_mut()
        .enumerate()
        .map(|(index, point)| {
            let outcome = process_point(point, index, cascade, validator, batch.seed);
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(sink) = batch.progress {
                sink.on_progress(done, total);
            }
            outcome
        })
        .collect()
}

fn process_point(
    point: &mut MonitoringPoint,
    index: usize,
    cascade: &CorrectionCascade,
    validator: &InvariantValidator,
    seed: u64,
) -> (PointCorrectionResult, AdjustmentLedger) {
    let mut ledger = AdjustmentLedger::new();

    let results = validator.validate_point(point);
    if !has_violations(&results) {
        return (
            PointCorrectionResult {
                point_name: point.point_name.clone(),
                status: PointStatus::Success,
                message: "no corrections required".to_string(),
                corrections: Vec::new(),
            },
            ledger,
        );
    }

    let mut rng = StableRng::with_stream(seed, index as u64);
    match cascade.run(point, &mut rng, &mut ledger) {
        Ok(result) => (result, ledger),
        Err(err) => {
            warn!("point {} failed during correction: {err}", point.point_name);
            (
                PointCorrectionResult {
                    point_name: point.point_name.clone(),
                    status: PointStatus::Error,
                    message: err.to_string(),
                    corrections: Vec::new(),
                },
                ledger,
            )
        }
    }
}

/// Engine namespace placeholder.
pub fn crate_name() -> &'static str {
    let _ = (
        dsr_core::crate_name(),
        dsr_validate::crate_name(),
        dsr_correct::crate_name(),
        dsr_ledger::crate_name(),
    );
    "dsr-engine"
}
