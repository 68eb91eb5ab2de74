// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use chrono::{TimeZone, Utc};
use dsr_core::{
    Axis, CorrectionKind, CorrectionOptions, CorrectionTier, MonitoringPoint, PeriodData,
    PointStatus, StableRng, ValidationOptions,
};
use dsr_correct::CorrectionCascade;
use dsr_ledger::AdjustmentLedger;
use dsr_validate::{has_violations, InvariantValidator};

fn dated(day: u32) -> Option<chrono::DateTime<Utc>> {
    Some(
        Utc.with_ymd_and_hms(2024, 3, day, 8, 0, 0)
            .single()
            .expect("valid test date"),
    )
}

/// Builds a point whose X axis carries the given series; Y and Z stay flat
/// zero, which is self-consistent.
fn point_on_x(deltas: &[f64], cumulatives: &[f64]) -> MonitoringPoint {
    assert_eq!(deltas.len(), cumulatives.len());
    let mut point = MonitoringPoint::new("DB-01", 125.0);
    for (i, (&delta, &cumulative)) in deltas.iter().zip(cumulatives).enumerate() {
        let mut period = PeriodData::new(dated(i as u32 + 1), i as u32 + 2, "section-a.xlsx");
        period.set_delta(Axis::X, delta);
        period.set_cumulative(Axis::X, cumulative);
        point.periods.push(period);
    }
    point
}

fn cascade(max_cumulative: f64) -> CorrectionCascade {
    CorrectionCascade::new(
        ValidationOptions {
            max_cumulative_value: max_cumulative,
            ..ValidationOptions::default()
        },
        CorrectionOptions {
            max_cumulative_value: max_cumulative,
            ..CorrectionOptions::default()
        },
    )
    .expect("options must validate")
}

#[test]
fn valid_point_is_left_untouched_with_zero_corrections() {
    let mut point = point_on_x(&[0.0, 1.0, -0.5], &[0.0, 1.0, 0.5]);
    let before = point.clone();
    let mut ledger = AdjustmentLedger::new();

    let result = cascade(10.0)
        .run(&mut point, &mut StableRng::new(1), &mut ledger)
        .expect("cascade runs");

    assert_eq!(result.status, PointStatus::Success);
    assert!(result.corrections.is_empty());
    assert!(ledger.is_empty());
    assert_eq!(point, before);
}

#[test]
fn simple_drift_is_repaired_by_one_cumulative_rewrite() {
    // Two epochs; epoch 1 claims cumulative 1.2 against a running sum of
    // 2.5. The minimal tier rewrites the cumulative and nothing else.
    let mut point = point_on_x(&[0.0, 2.5], &[0.0, 1.2]);
    let mut ledger = AdjustmentLedger::new();

    let result = cascade(10.0)
        .run(&mut point, &mut StableRng::new(1), &mut ledger)
        .expect("cascade runs");

    assert_eq!(result.status, PointStatus::Success);
    assert_eq!(result.corrections.len(), 1);
    let c = &result.corrections[0];
    assert_eq!(c.kind, CorrectionKind::CumulativeValueOnly);
    assert_eq!(c.tier, CorrectionTier::Global);
    assert_eq!(c.corrected_value, 2.5);
    assert_eq!(point.periods[1].cumulative(Axis::X), 2.5);
    assert_eq!(point.periods[1].delta(Axis::X), 2.5);

    assert_eq!(ledger.len(), 1);
    assert!(result.message.contains("unchecked -> global -> recorded"));
}

#[test]
fn tight_cumulative_bound_forces_a_clipped_both_correction() {
    // Same drift, but the cumulative bound sits at 2.0: the chain value
    // 2.5 cannot land, so the cumulative clips and the delta back-solves.
    let mut point = point_on_x(&[0.0, 2.5], &[0.0, 1.2]);
    let mut ledger = AdjustmentLedger::new();

    let result = cascade(2.0)
        .run(&mut point, &mut StableRng::new(1), &mut ledger)
        .expect("cascade runs");

    assert_eq!(result.status, PointStatus::Success);
    assert_eq!(result.corrections.len(), 1);
    let c = &result.corrections[0];
    assert_eq!(c.kind, CorrectionKind::Both);
    assert_eq!(c.corrected_value, 2.0);
    assert_eq!(c.paired_cumulative, Some(2.0));
    assert_eq!(point.periods[1].delta(Axis::X), 2.0);
    assert_eq!(point.periods[1].cumulative(Axis::X), 2.0);
}

#[test]
fn out_of_bound_delta_escalates_to_the_aggressive_tier() {
    // The recurrence is self-consistent, so the minimal tier has nothing
    // to rewrite, yet the 20.0 delta breaks the magnitude bound; only a
    // synthetic rewrite can produce a plausible series.
    let mut point = point_on_x(&[0.0, 20.0, 1.0], &[0.0, 20.0, 21.0]);
    let mut ledger = AdjustmentLedger::new();

    let result = cascade(50.0)
        .run(&mut point, &mut StableRng::new(7), &mut ledger)
        .expect("cascade runs");

    assert_eq!(result.status, PointStatus::Success);
    assert!(result.message.contains("global -> aggressive -> recorded"));

    // Audit symmetry: one NoOp per axis for the protected baseline.
    let noops = result
        .corrections
        .iter()
        .filter(|c| c.kind == CorrectionKind::NoOp)
        .count();
    assert_eq!(noops, 3);

    // The repaired series passes a fresh validation.
    let validator =
        InvariantValidator::new(ValidationOptions::default()).expect("default options");
    assert!(!has_violations(&validator.validate_point(&mut point)));
}

#[test]
fn aggressive_corrections_layer_on_top_of_global_ones() {
    // Epoch 1 both drifts and breaks the delta bound: the global tier
    // rewrites cumulatives first, the aggressive tier then reworks the
    // whole series without rolling those edits back.
    let mut point = point_on_x(&[0.0, 20.0, 1.0], &[0.0, 5.0, 9.0]);
    let mut ledger = AdjustmentLedger::new();

    let result = cascade(50.0)
        .run(&mut point, &mut StableRng::new(3), &mut ledger)
        .expect("cascade runs");

    let tiers: Vec<CorrectionTier> = result.corrections.iter().map(|c| c.tier).collect();
    let first_aggressive = tiers
        .iter()
        .position(|t| *t == CorrectionTier::Aggressive)
        .expect("aggressive tier must have run");
    assert!(
        tiers[..first_aggressive]
            .iter()
            .all(|t| *t == CorrectionTier::Global),
        "global corrections must precede aggressive ones, none rolled back"
    );
    assert!(
        tiers[first_aggressive..]
            .iter()
            .all(|t| *t == CorrectionTier::Aggressive)
    );

    // The global tier's cumulative rewrites are part of the record even
    // though the aggressive tier later replaced the values again.
    assert!(
        result
            .corrections
            .iter()
            .any(|c| c.tier == CorrectionTier::Global
                && c.kind == CorrectionKind::CumulativeValueOnly)
    );
    assert_eq!(ledger.len(), result.corrections.len());
}

#[test]
fn baseline_epoch_is_bit_identical_across_every_tier() {
    let mut point = point_on_x(&[0.4, 20.0, 1.0], &[0.4, 5.0, 9.0]);
    let before: Vec<u64> = Axis::ALL
        .iter()
        .flat_map(|&axis| {
            [
                point.periods[0].delta(axis).to_bits(),
                point.periods[0].cumulative(axis).to_bits(),
            ]
        })
        .collect();

    let mut ledger = AdjustmentLedger::new();
    cascade(50.0)
        .run(&mut point, &mut StableRng::new(11), &mut ledger)
        .expect("cascade runs");

    let after: Vec<u64> = Axis::ALL
        .iter()
        .flat_map(|&axis| {
            [
                point.periods[0].delta(axis).to_bits(),
                point.periods[0].cumulative(axis).to_bits(),
            ]
        })
        .collect();
    assert_eq!(before, after);
}

#[test]
fn unrepairable_baseline_violation_ends_skipped_via_the_partial_tier() {
    // The baseline delta breaks the magnitude bound and is immutable, so
    // after the aggressive pass exactly one cell keeps failing: a ratio of
    // 1/9 picks the partial tier, which cannot touch epoch 0 either. The
    // point must surface as Skipped with its audit trail intact.
    let mut point = point_on_x(&[15.0, 2.5, 1.0], &[0.0, 1.2, 9.0]);
    let mut ledger = AdjustmentLedger::new();

    let result = cascade(50.0)
        .run(&mut point, &mut StableRng::new(5), &mut ledger)
        .expect("cascade runs");

    assert_eq!(result.status, PointStatus::Skipped);
    assert!(result.message.contains("do not persist"));
    assert!(result.message.contains("-> partial -> recorded"));
    // Partial progress is recorded, never thrown away.
    assert!(!ledger.is_empty());
    assert_eq!(ledger.len(), result.corrections.len());
}

#[test]
fn widespread_failure_escalates_to_the_final_tier() {
    // A non-finite baseline cumulative poisons the X chain for every tier,
    // so after the aggressive pass the whole axis keeps failing: the
    // failure ratio reaches 1/3 and the final tier is selected.
    let mut point = point_on_x(&[0.0, 1.0, 1.0, 1.0], &[f64::NAN, 1.0, 2.0, 3.0]);
    let mut ledger = AdjustmentLedger::new();

    let result = cascade(50.0)
        .run(&mut point, &mut StableRng::new(13), &mut ledger)
        .expect("cascade runs");

    assert_eq!(result.status, PointStatus::Skipped);
    assert!(result.message.contains("-> final -> recorded"));
    assert!(
        result
            .corrections
            .iter()
            .any(|c| c.tier == CorrectionTier::Final)
    );
}

#[test]
fn disabling_minimal_modification_skips_the_global_tier() {
    let mut point = point_on_x(&[0.0, 2.5], &[0.0, 1.2]);
    let cascade = CorrectionCascade::new(
        ValidationOptions::default(),
        CorrectionOptions {
            enable_minimal_modification: false,
            ..CorrectionOptions::default()
        },
    )
    .expect("options must validate");

    let mut ledger = AdjustmentLedger::new();
    let result = cascade
        .run(&mut point, &mut StableRng::new(17), &mut ledger)
        .expect("cascade runs");

    assert!(!result.message.contains("global"));
    assert!(result.message.contains("unchecked -> aggressive"));
    assert!(
        result
            .corrections
            .iter()
            .all(|c| c.tier == CorrectionTier::Aggressive)
    );
}

#[test]
fn identical_seeds_produce_identical_outcomes() {
    let template = point_on_x(&[0.0, 20.0, 1.0, -2.0], &[0.0, 4.0, 9.0, 1.0]);

    let mut first = template.clone();
    let mut second = template.clone();
    let mut ledger_a = AdjustmentLedger::new();
    let mut ledger_b = AdjustmentLedger::new();

    let result_a = cascade(50.0)
        .run(&mut first, &mut StableRng::new(99), &mut ledger_a)
        .expect("cascade runs");
    let result_b = cascade(50.0)
        .run(&mut second, &mut StableRng::new(99), &mut ledger_b)
        .expect("cascade runs");

    assert_eq!(result_a, result_b);
    assert_eq!(first, second);

    let mut third = template.clone();
    let result_c = cascade(50.0)
        .run(&mut third, &mut StableRng::new(100), &mut AdjustmentLedger::new())
        .expect("cascade runs");
    // A different seed is allowed to differ (and does here).
    assert_ne!(result_a.corrections, result_c.corrections);
}

#[test]
fn ledger_records_carry_provenance_from_the_period() {
    let mut point = point_on_x(&[0.0, 2.5], &[0.0, 1.2]);
    let mut ledger = AdjustmentLedger::new();

    cascade(10.0)
        .run(&mut point, &mut StableRng::new(1), &mut ledger)
        .expect("cascade runs");

    let record = &ledger.records()[0];
    assert_eq!(record.point_name, "DB-01");
    assert_eq!(record.source_file, "section-a.xlsx");
    assert_eq!(record.row_number, 3);
    assert_eq!(record.epoch, 1);
    assert_eq!(record.tier, CorrectionTier::Global);
}
