// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Append-only audit log of applied corrections.
//!
//! One ledger lives for one batch run. Records are never mutated or removed
//! once appended; reporting collaborators consume the aggregate views.

use dsr_core::{AdjustmentRecord, Axis, CorrectionKind};
use std::collections::{BTreeMap, BTreeSet};

/// Process-wide audit log with aggregate statistics.
#[derive(Clone, Debug, Default)]
pub struct AdjustmentLedger {
    records: Vec<AdjustmentRecord>,
}

impl AdjustmentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from previously exported records, e.g. for
    /// reporting on a deserialized batch result.
    pub fn from_records(records: Vec<AdjustmentRecord>) -> Self {
        Self { records }
    }

    pub fn append(&mut self, record: AdjustmentRecord) {
        self.records.push(record);
    }

    /// Absorbs another ledger, preserving `other`'s internal order. Used to
    /// merge per-worker ledgers back in input order after a parallel run.
    pub fn merge(&mut self, other: AdjustmentLedger) {
        self.records.extend(other.records);
    }

    pub fn records(&self) -> &[AdjustmentRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<AdjustmentRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn distinct_point_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.point_name.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn distinct_file_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.source_file.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn counts_by_kind(&self) -> BTreeMap<CorrectionKind, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn counts_by_axis(&self) -> BTreeMap<Axis, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.axis).or_insert(0) += 1;
        }
        counts
    }

    pub fn counts_by_point(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.point_name.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// Ledger namespace placeholder.
pub fn crate_name() -> &'static str {
    let _ = dsr_core::crate_name();
    "dsr-ledger"
}
