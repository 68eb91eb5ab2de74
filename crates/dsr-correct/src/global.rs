// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! First-tier correction: minimal cumulative rewrites along the expected
//! forward-recurrence chain.

use dsr_core::{
    tolerance, Axis, CorrectionKind, CorrectionOptions, CorrectionTier, DataCorrection,
    MonitoringPoint,
};

/// Plans minimal corrections for every axis of a point.
///
/// The expected cumulative chain is seeded by the baseline epoch's actual
/// cumulative and advances by the observed deltas. Where the actual
/// cumulative drifts outside tolerance, the preferred edit rewrites only
/// the cumulative; when that would break the cumulative bound, the
/// cumulative is clipped to the nearest signed bound and the delta is
/// back-solved so the chain stays exact. Each edit reseeds the chain for
/// every later epoch.
pub fn plan(point: &MonitoringPoint, options: &CorrectionOptions) -> Vec<DataCorrection> {
    let mut corrections = Vec::new();
    for axis in Axis::ALL {
        plan_axis(point, axis, options, &mut corrections);
    }
    corrections
}

fn plan_axis(
    point: &MonitoringPoint,
    axis: Axis,
    options: &CorrectionOptions,
    corrections: &mut Vec<DataCorrection>,
) {
    if point.period_count() < 2 {
        return;
    }

    let mut expected = point.periods[0].cumulative(axis);
    // A non-finite baseline cannot seed the chain, and the baseline itself
    // is immutable; leave the axis for the synthetic tiers to report on.
    if !expected.is_finite() {
        return;
    }

    for epoch in 1..point.period_count() {
        let period = &point.periods[epoch];
        let delta = period.delta(axis);
        let actual = period.cumulative(axis);
        let chained = expected + delta;
        let diff = tolerance::abs_diff(chained, actual);

        if !(diff.is_nan() || diff > options.cumulative_tolerance) {
            expected = chained;
            continue;
        }

        if chained.is_finite() && tolerance::abs(chained) <= options.max_cumulative_value {
            corrections.push(DataCorrection {
                point_name: point.point_name.clone(),
                axis,
                epoch,
                row_number: period.row_number,
                kind: CorrectionKind::CumulativeValueOnly,
                tier: CorrectionTier::Global,
                original_value: actual,
                corrected_value: chained,
                paired_cumulative: None,
                reason: "cumulative rewritten to the running sum of deltas".to_string(),
            });
            expected = chained;
        } else {
            let clipped = tolerance::sign(chained) * options.max_cumulative_value;
            let solved_delta = clipped - expected;
            corrections.push(DataCorrection {
                point_name: point.point_name.clone(),
                axis,
                epoch,
                row_number: period.row_number,
                kind: CorrectionKind::Both,
                tier: CorrectionTier::Global,
                original_value: delta,
                corrected_value: solved_delta,
                paired_cumulative: Some(clipped),
                reason: "cumulative clipped to the signed bound; delta back-solved from the corrected chain"
                    .to_string(),
            });
            expected = clipped;
        }
    }
}
