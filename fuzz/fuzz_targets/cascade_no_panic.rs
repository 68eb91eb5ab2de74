// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

use chrono::{Duration, TimeZone, Utc};
use dsr_core::{
    Axis, CorrectionOptions, MonitoringPoint, PeriodData, StableRng, ValidationOptions,
};
use dsr_correct::CorrectionCascade;
use dsr_ledger::AdjustmentLedger;
use libfuzzer_sys::fuzz_target;

fn f64_from(bytes: &[u8], index: usize) -> f64 {
    let start = index * 8;
    let mut raw = [0_u8; 8];
    raw.copy_from_slice(&bytes[start..start + 8]);
    f64::from_le_bytes(raw)
}

fuzz_target!(|data: &[u8]| {
    // Layout: one seed byte, then (delta, cumulative) f64 pairs.
    if data.len() < 1 + 16 * 2 {
        return;
    }
    let seed = u64::from(data[0]);
    let payload = &data[1..];
    let pairs = (payload.len() / 16).min(64);

    let base = Utc
        .with_ymd_and_hms(2024, 1, 1, 8, 0, 0)
        .single()
        .expect("valid base date");
    let mut point = MonitoringPoint::new("FUZZ-01", 0.0);
    for epoch in 0..pairs {
        let mut period = PeriodData::new(
            Some(base + Duration::days(epoch as i64)),
            epoch as u32 + 2,
            "fuzz.xlsx",
        );
        let delta = f64_from(payload, epoch * 2);
        let cumulative = f64_from(payload, epoch * 2 + 1);
        for axis in Axis::ALL {
            period.set_delta(axis, delta);
            period.set_cumulative(axis, cumulative);
        }
        point.periods.push(period);
    }

    let Ok(cascade) =
        CorrectionCascade::new(ValidationOptions::default(), CorrectionOptions::default())
    else {
        return;
    };
    let mut ledger = AdjustmentLedger::new();
    // Arbitrary input must never panic; errors are acceptable outcomes.
    let _ = cascade.run(&mut point, &mut StableRng::new(seed), &mut ledger);
});
