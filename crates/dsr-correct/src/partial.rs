// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Third-tier correction: targeted rewrites of the specific cells that are
//! still failing after the aggressive pass.

use crate::sampling::{accumulate_clipped, ROUND_DIGITS};
use dsr_core::{
    tolerance, Axis, CorrectionKind, CorrectionOptions, CorrectionTier, DataCorrection,
    MonitoringPoint, StableRng,
};
use std::collections::{BTreeSet, HashMap};

/// A targeted delta whose back-adjusted magnitude exceeds this collapses to
/// a flat no-movement cell instead.
const COLLAPSE_THRESHOLD: f64 = 0.5;

/// Plans small random corrections for the given failing (epoch, axis) cells
/// only. Baseline cells are skipped outright. Each cell's cumulative chains
/// from the immediately preceding epoch's cumulative, honoring edits this
/// plan already made to earlier epochs of the same axis.
pub fn plan(
    point: &MonitoringPoint,
    cells: &BTreeSet<(usize, Axis)>,
    options: &CorrectionOptions,
    rng: &mut StableRng,
) -> Vec<DataCorrection> {
    let mut corrections = Vec::new();
    let mut planned: HashMap<(Axis, usize), f64> = HashMap::new();

    for axis in Axis::ALL {
        for &(epoch, cell_axis) in cells {
            if cell_axis != axis || epoch == 0 || epoch >= point.period_count() {
                continue;
            }

            let previous = planned
                .get(&(axis, epoch - 1))
                .copied()
                .unwrap_or_else(|| point.periods[epoch - 1].cumulative(axis));

            let drawn = tolerance::round(
                rng.uniform_in(-options.random_change_range, options.random_change_range),
                ROUND_DIGITS,
            );
            let (mut delta, mut cumulative) =
                accumulate_clipped(previous, drawn, options.max_cumulative_value);
            if tolerance::abs(delta) > COLLAPSE_THRESHOLD || !delta.is_finite() {
                // Unsalvageable cell: hold the series flat instead.
                delta = 0.0;
                cumulative = previous;
            }

            let period = &point.periods[epoch];
            corrections.push(DataCorrection {
                point_name: point.point_name.clone(),
                axis,
                epoch,
                row_number: period.row_number,
                kind: CorrectionKind::Both,
                tier: CorrectionTier::Partial,
                original_value: period.delta(axis),
                corrected_value: delta,
                paired_cumulative: Some(cumulative),
                reason: "failing cell nudged by a small random delta".to_string(),
            });
            planned.insert((axis, epoch), cumulative);
        }
    }

    corrections
}
