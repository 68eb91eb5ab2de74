// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Shared series builders for the benchmark targets.

use chrono::{TimeZone, Utc};
use dsr_core::{Axis, MonitoringPoint, PeriodData, StableRng};

/// Builds a point with `epochs` observations whose X/Y/Z series are
/// pseudo-random walks; `corrupt_every` > 0 breaks the cumulative at that
/// cadence so the cascade has work to do.
pub fn synthetic_point(name: &str, epochs: usize, corrupt_every: usize, seed: u64) -> MonitoringPoint {
    let base = Utc
        .with_ymd_and_hms(2024, 1, 1, 8, 0, 0)
        .single()
        .expect("valid base date");
    let mut rng = StableRng::new(seed);
    let mut point = MonitoringPoint::new(name, 100.0);
    let mut running = [0.0_f64; 3];

    for epoch in 0..epochs {
        let mut period = PeriodData::new(
            Some(base + chrono::Duration::hours(epoch as i64 * 12)),
            epoch as u32 + 2,
            "bench.xlsx",
        );
        for (slot, axis) in Axis::ALL.into_iter().enumerate() {
            let delta = rng.uniform_in(-0.4, 0.4);
            running[slot] += delta;
            let mut cumulative = running[slot];
            if corrupt_every > 0 && epoch > 0 && epoch % corrupt_every == 0 {
                cumulative += 5.0;
            }
            period.set_delta(axis, delta);
            period.set_cumulative(axis, cumulative);
        }
        point.periods.push(period);
    }
    point
}
