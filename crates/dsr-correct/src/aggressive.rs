// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Second-tier correction: statistically plausible regeneration of every
//! epoch past the baseline.

use crate::sampling::{accumulate_clipped, delta_stats, sample_bounded_delta};
use dsr_core::{
    Axis, CorrectionKind, CorrectionOptions, CorrectionTier, DataCorrection, MonitoringPoint,
    PeriodData, StableRng,
};

/// Degenerate-spread cutoff as a fraction of the cumulative tolerance.
const DEGENERATE_STDDEV_FACTOR: f64 = 0.1;
/// Floor of the data-driven clip band.
const MIN_CLIP_BAND: f64 = 1.0;

/// Plans a full synthetic rewrite of epochs 1.. for every axis.
///
/// Sampling moments come from the pre-cascade `original` snapshot, not from
/// whatever an earlier tier already rewrote. The baseline epoch is left
/// untouched and documented with a `NoOp` correction per axis; cumulative
/// values re-accumulate from the previous *corrected* cumulative.
pub fn plan(
    point: &MonitoringPoint,
    original: &[PeriodData],
    options: &CorrectionOptions,
    rng: &mut StableRng,
) -> Vec<DataCorrection> {
    let mut corrections = Vec::new();
    if point.period_count() < 2 {
        return corrections;
    }

    for axis in Axis::ALL {
        plan_axis(point, original, axis, options, rng, &mut corrections);
    }
    corrections
}

fn plan_axis(
    point: &MonitoringPoint,
    original: &[PeriodData],
    axis: Axis,
    options: &CorrectionOptions,
    rng: &mut StableRng,
    corrections: &mut Vec<DataCorrection>,
) {
    let baseline = &point.periods[0];
    corrections.push(DataCorrection {
        point_name: point.point_name.clone(),
        axis,
        epoch: 0,
        row_number: baseline.row_number,
        kind: CorrectionKind::NoOp,
        tier: CorrectionTier::Aggressive,
        original_value: baseline.delta(axis),
        corrected_value: baseline.delta(axis),
        paired_cumulative: None,
        reason: "baseline epoch preserved".to_string(),
    });

    let observed: Vec<f64> = original.iter().skip(1).map(|p| p.delta(axis)).collect();
    let stats = delta_stats(
        &observed,
        DEGENERATE_STDDEV_FACTOR * options.cumulative_tolerance,
    );
    let clip = (2.0 * stats.max_abs)
        .max(MIN_CLIP_BAND)
        .min(options.max_current_period_value);

    let mut previous_cumulative = baseline.cumulative(axis);
    for epoch in 1..point.period_count() {
        let period = &point.periods[epoch];
        let sampled = sample_bounded_delta(rng, &stats, clip);
        let (delta, cumulative) =
            accumulate_clipped(previous_cumulative, sampled, options.max_cumulative_value);

        corrections.push(DataCorrection {
            point_name: point.point_name.clone(),
            axis,
            epoch,
            row_number: period.row_number,
            kind: CorrectionKind::Both,
            tier: CorrectionTier::Aggressive,
            original_value: period.delta(axis),
            corrected_value: delta,
            paired_cumulative: Some(cumulative),
            reason: "delta resampled from the observed distribution; cumulative re-accumulated"
                .to_string(),
        });
        previous_cumulative = cumulative;
    }
}
