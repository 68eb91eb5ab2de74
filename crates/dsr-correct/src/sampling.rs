// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Shared delta-sampling machinery for the synthetic tiers.

use dsr_core::{tolerance, StableRng};

pub(crate) const ROUND_DIGITS: u32 = 6;
pub(crate) const MAX_RESAMPLE_ATTEMPTS: usize = 100;
/// Synthetic deltas below this magnitude read as a dead sensor.
pub(crate) const MIN_DELTA_MAGNITUDE: f64 = 0.001;
/// Fallback magnitude once the resample budget is exhausted.
pub(crate) const MIN_FALLBACK_DELTA: f64 = 0.1;
/// Spread substitute when the observed series itself carries no spread.
const DEGENERATE_SPREAD: f64 = 0.1;

/// Moments of the observed per-period deltas that seed synthetic sampling.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DeltaStats {
    pub mean: f64,
    pub stddev: f64,
    pub max_abs: f64,
}

/// Computes sampling moments from observed deltas.
///
/// Non-finite observations are excluded. A standard deviation below
/// `degenerate_floor` is replaced by 0.3x the largest observed magnitude so
/// sampling never collapses onto a single value; an all-zero series falls
/// back to a fixed small spread.
pub(crate) fn delta_stats(values: &[f64], degenerate_floor: f64) -> DeltaStats {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let mean = tolerance::mean(&finite).unwrap_or(0.0);
    let max_abs = finite.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));

    let mut stddev = tolerance::stddev(&finite).unwrap_or(0.0);
    if stddev < degenerate_floor {
        stddev = 0.3 * max_abs;
        if stddev == 0.0 {
            stddev = DEGENERATE_SPREAD;
        }
    }

    DeltaStats {
        mean,
        stddev,
        max_abs,
    }
}

/// Draws a plausible per-period delta: normal around the observed mean,
/// rounded for report readability, clipped into `[-clip, clip]`, and
/// resampled away from near-zero magnitudes within a bounded retry budget.
pub(crate) fn sample_bounded_delta(rng: &mut StableRng, stats: &DeltaStats, clip: f64) -> f64 {
    for _ in 0..MAX_RESAMPLE_ATTEMPTS {
        let z = rng.standard_normal();
        let candidate = tolerance::round(stats.mean + z * stats.stddev, ROUND_DIGITS);
        let clipped = tolerance::clamp(candidate, -clip, clip);
        if tolerance::abs(clipped) >= MIN_DELTA_MAGNITUDE {
            return clipped;
        }
    }

    let fallback = if tolerance::sign(stats.mean) == 0.0 {
        MIN_FALLBACK_DELTA
    } else {
        tolerance::sign(stats.mean) * tolerance::abs(stats.mean).max(MIN_FALLBACK_DELTA)
    };
    tolerance::clamp(fallback, -clip, clip)
}

/// Accumulates a delta onto the previous corrected cumulative, clipping the
/// total to the signed bound and back-adjusting the delta when clipping
/// bites, so the recurrence stays exact.
pub(crate) fn accumulate_clipped(prev_cumulative: f64, delta: f64, max_cumulative: f64) -> (f64, f64) {
    let cumulative = prev_cumulative + delta;
    if tolerance::abs(cumulative) > max_cumulative {
        let clipped = tolerance::sign(cumulative) * max_cumulative;
        return (clipped - prev_cumulative, clipped);
    }
    (delta, cumulative)
}
