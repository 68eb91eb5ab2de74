// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::series::Axis;
use crate::DsrError;
use chrono::{DateTime, Utc};
use std::fmt;

/// Outcome class of a single validation finding.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationStatus {
    Valid,
    /// A magnitude bound is broken; no correction tier may repair this.
    Invalid,
    /// The recurrence invariant is broken; the cascade can repair this.
    NeedsAdjustment,
}

/// Severity ladder for validation findings.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

/// One validation finding, success or violation.
///
/// Constructed through [`ValidationResult::success`] and
/// [`ValidationResult::failure`]; immutable afterwards.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationResult {
    pub status: ValidationStatus,
    pub severity: Severity,
    pub point_name: String,
    pub axis: Option<Axis>,
    pub epoch: Option<usize>,
    pub row_number: Option<u32>,
    pub description: String,
    pub expected: Option<f64>,
    pub actual: Option<f64>,
    /// False exactly for the unrepairable magnitude-violation class.
    pub can_adjust: bool,
}

impl ValidationResult {
    /// A whole-point success marker.
    pub fn success(point_name: &str, description: &str) -> Self {
        Self {
            status: ValidationStatus::Valid,
            severity: Severity::Info,
            point_name: point_name.to_string(),
            axis: None,
            epoch: None,
            row_number: None,
            description: description.to_string(),
            expected: None,
            actual: None,
            can_adjust: true,
        }
    }

    /// A located violation or advisory finding.
    #[allow(clippy::too_many_arguments)]
    pub fn failure(
        status: ValidationStatus,
        severity: Severity,
        point_name: &str,
        axis: Option<Axis>,
        epoch: Option<usize>,
        row_number: Option<u32>,
        description: String,
        expected: Option<f64>,
        actual: Option<f64>,
        can_adjust: bool,
    ) -> Self {
        Self {
            status,
            severity,
            point_name: point_name.to_string(),
            axis,
            epoch,
            row_number,
            description,
            expected,
            actual,
            can_adjust,
        }
    }

    /// True for anything that breaks an invariant (advisory warnings with
    /// `Valid` status do not count).
    pub fn is_violation(&self) -> bool {
        self.status != ValidationStatus::Valid
    }
}

/// Which fields of an epoch a correction rewrites.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CorrectionKind {
    NoOp,
    PeriodValueOnly,
    CumulativeValueOnly,
    Both,
}

impl fmt::Display for CorrectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoOp => "no-op",
            Self::PeriodValueOnly => "period-value",
            Self::CumulativeValueOnly => "cumulative-value",
            Self::Both => "period-and-cumulative",
        };
        f.write_str(name)
    }
}

/// Which escalation stage produced a correction.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CorrectionTier {
    Global,
    Aggressive,
    Partial,
    Final,
}

impl fmt::Display for CorrectionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Global => "global",
            Self::Aggressive => "aggressive",
            Self::Partial => "partial",
            Self::Final => "final",
        };
        f.write_str(name)
    }
}

/// A proposed edit to one (epoch, axis) cell.
///
/// `corrected_value` is the delta for `PeriodValueOnly`/`Both` kinds and the
/// cumulative for `CumulativeValueOnly`. The `Both` kind additionally carries
/// its new cumulative in `paired_cumulative`, since one scalar cannot hold a
/// delta and a cumulative at once.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct DataCorrection {
    pub point_name: String,
    pub axis: Axis,
    pub epoch: usize,
    pub row_number: u32,
    pub kind: CorrectionKind,
    pub tier: CorrectionTier,
    pub original_value: f64,
    pub corrected_value: f64,
    pub paired_cumulative: Option<f64>,
    pub reason: String,
}

impl DataCorrection {
    /// Shape check: `Both` requires a paired cumulative, the other kinds
    /// must not carry one.
    pub fn validate(&self) -> Result<(), DsrError> {
        match (self.kind, self.paired_cumulative) {
            (CorrectionKind::Both, None) => Err(DsrError::invalid_input(format!(
                "correction for {} axis {} epoch {} has kind {} but no paired cumulative",
                self.point_name, self.axis, self.epoch, self.kind
            ))),
            (CorrectionKind::Both, Some(_)) => Ok(()),
            (_, Some(_)) => Err(DsrError::invalid_input(format!(
                "correction for {} axis {} epoch {} has kind {} with a stray paired cumulative",
                self.point_name, self.axis, self.epoch, self.kind
            ))),
            (_, None) => Ok(()),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.kind == CorrectionKind::NoOp
    }
}

/// Permanent audit entry derived from one applied correction.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct AdjustmentRecord {
    pub kind: CorrectionKind,
    pub tier: CorrectionTier,
    pub axis: Axis,
    pub point_name: String,
    pub source_file: String,
    pub row_number: u32,
    pub epoch: usize,
    pub original_value: f64,
    pub adjusted_value: f64,
    pub paired_cumulative: Option<f64>,
    pub reason: String,
    pub adjusted_at: DateTime<Utc>,
}

impl AdjustmentRecord {
    pub fn from_correction(
        correction: &DataCorrection,
        source_file: &str,
        adjusted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind: correction.kind,
            tier: correction.tier,
            axis: correction.axis,
            point_name: correction.point_name.clone(),
            source_file: source_file.to_string(),
            row_number: correction.row_number,
            epoch: correction.epoch,
            original_value: correction.original_value,
            adjusted_value: correction.corrected_value,
            paired_cumulative: correction.paired_cumulative,
            reason: correction.reason.clone(),
            adjusted_at,
        }
    }
}

/// Terminal status of one point's pass through the engine.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointStatus {
    Success,
    /// Unrepairable violations remain; the caller must not persist output.
    Skipped,
    Error,
}

/// Per-point outcome handed to reporting and persistence collaborators.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct PointCorrectionResult {
    pub point_name: String,
    pub status: PointStatus,
    pub message: String,
    pub corrections: Vec<DataCorrection>,
}

/// Whole-batch outcome.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CorrectionResult {
    pub point_results: Vec<PointCorrectionResult>,
    pub adjustment_records: Vec<AdjustmentRecord>,
}

impl CorrectionResult {
    pub fn count_with_status(&self, status: PointStatus) -> usize {
        self.point_results
            .iter()
            .filter(|r| r.status == status)
            .count()
    }
}
