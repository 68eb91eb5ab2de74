// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Fourth-tier correction: whole-axis regeneration from outlier-filtered
//! statistics, used when most cells are beyond targeted repair.

use crate::sampling::{accumulate_clipped, delta_stats, sample_bounded_delta, ROUND_DIGITS};
use dsr_core::{
    tolerance, Axis, CorrectionKind, CorrectionOptions, CorrectionTier, DataCorrection,
    MonitoringPoint, PeriodData, StableRng,
};

/// Outliers beyond this multiple of the delta bound are dropped from the
/// sampling statistics.
const OUTLIER_FILTER_FACTOR: f64 = 2.0;
/// Safety margin that keeps regenerated deltas off the configured maximum.
const CLIP_SAFETY_FACTOR: f64 = 0.8;
/// Uniform band used when every observed delta was an extreme value.
const EXTREME_FALLBACK_BAND: f64 = 0.1;
/// Degenerate-spread cutoff, matching the aggressive tier.
const DEGENERATE_STDDEV_FACTOR: f64 = 0.1;

/// Regenerates every non-baseline epoch of every axis.
///
/// Statistics come from the pre-cascade snapshot, filtered of outliers; the
/// cumulative chain restarts from the baseline epoch's actual cumulative.
/// When filtering discards everything, deltas come from a small uniform
/// band so the output does not flatline.
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
    let filtered: Vec<f64> = original
        .iter()
        .skip(1)
        .map(|p| p.delta(axis))
        .filter(|v| {
            v.is_finite()
                && tolerance::abs(*v) <= OUTLIER_FILTER_FACTOR * options.max_current_period_value
        })
        .collect();

    let stats = (!filtered.is_empty()).then(|| {
        delta_stats(
            &filtered,
            DEGENERATE_STDDEV_FACTOR * options.cumulative_tolerance,
        )
    });
    let clip = CLIP_SAFETY_FACTOR * options.max_current_period_value;

    let mut previous_cumulative = point.periods[0].cumulative(axis);
    for epoch in 1..point.period_count() {
        let period = &point.periods[epoch];
        let sampled = match &stats {
            Some(stats) => sample_bounded_delta(rng, stats, clip),
            None => tolerance::round(
                rng.uniform_in(-EXTREME_FALLBACK_BAND, EXTREME_FALLBACK_BAND),
                ROUND_DIGITS,
            ),
        };
        let (delta, cumulative) =
            accumulate_clipped(previous_cumulative, sampled, options.max_cumulative_value);

        corrections.push(DataCorrection {
            point_name: point.point_name.clone(),
            axis,
            epoch,
            row_number: period.row_number,
            kind: CorrectionKind::Both,
            tier: CorrectionTier::Final,
            original_value: period.delta(axis),
            corrected_value: delta,
            paired_cumulative: Some(cumulative),
            reason: "axis regenerated from outlier-filtered statistics".to_string(),
        });
        previous_cumulative = cumulative;
    }
}
