// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! JSON ingestion/serialization and report rendering for the `dsr` binary.
//!
//! The engine core stays I/O-free; everything file-shaped lives here.

use dsr_core::{
    CorrectionResult, DsrError, MonitoringPoint, PointStatus, Severity, ValidationResult,
};
use dsr_ledger::AdjustmentLedger;
use log::debug;

/// Parses a batch of monitoring points from JSON.
pub fn parse_points(json: &str) -> Result<Vec<MonitoringPoint>, DsrError> {
    serde_json::from_str(json)
        .map_err(|err| DsrError::invalid_input(format!("invalid points JSON: {err}")))
}

/// Serializes the (possibly corrected) batch back to pretty JSON.
pub fn points_to_json(points: &[MonitoringPoint]) -> Result<String, DsrError> {
    serde_json::to_string_pretty(points)
        .map_err(|err| DsrError::invalid_input(format!("points not serializable: {err}")))
}

/// Serializes a batch outcome to pretty JSON.
pub fn result_to_json(result: &CorrectionResult) -> Result<String, DsrError> {
    serde_json::to_string_pretty(result)
        .map_err(|err| DsrError::invalid_input(format!("result not serializable: {err}")))
}

/// Serializes validation findings to pretty JSON.
pub fn validation_to_json(results: &[ValidationResult]) -> Result<String, DsrError> {
    serde_json::to_string_pretty(results)
        .map_err(|err| DsrError::invalid_input(format!("findings not serializable: {err}")))
}

/// Human-readable summary of a correction run, including the ledger's
/// aggregate views.
pub fn render_summary(result: &CorrectionResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "points: {} total, {} corrected or clean, {} skipped, {} errored\n",
        result.point_results.len(),
        result.count_with_status(PointStatus::Success),
        result.count_with_status(PointStatus::Skipped),
        result.count_with_status(PointStatus::Error),
    ));

    let ledger = AdjustmentLedger::from_records(result.adjustment_records.clone());
    out.push_str(&format!(
        "adjustments: {} across {} points in {} files\n",
        ledger.len(),
        ledger.distinct_point_count(),
        ledger.distinct_file_count(),
    ));

    for (kind, count) in ledger.counts_by_kind() {
        out.push_str(&format!("  by kind: {kind} = {count}\n"));
    }
    for (axis, count) in ledger.counts_by_axis() {
        out.push_str(&format!("  by axis: {axis} = {count}\n"));
    }

    for point in &result.point_results {
        if point.status != PointStatus::Success {
            out.push_str(&format!(
                "  {:?} {}: {}\n",
                point.status, point.point_name, point.message
            ));
        }
    }

    debug!("rendered summary for {} points", result.point_results.len());
    out
}

/// Human-readable summary of a validation-only run.
pub fn render_validation_summary(results: &[ValidationResult]) -> String {
    let violations = results.iter().filter(|r| r.is_violation()).count();
    let critical = results
        .iter()
        .filter(|r| r.severity == Severity::Critical)
        .count();
    let unrepairable = results
        .iter()
        .filter(|r| r.is_violation() && !r.can_adjust)
        .count();

    let mut out = format!(
        "findings: {} total, {violations} violations ({critical} critical, {unrepairable} unrepairable)\n",
        results.len()
    );
    for finding in results.iter().filter(|r| r.is_violation()) {
        out.push_str(&format!(
            "  {:?} {}: {}\n",
            finding.severity, finding.point_name, finding.description
        ));
    }
    out
}

/// CLI namespace placeholder.
pub fn crate_name() -> &'static str {
    let _ = (
        dsr_core::crate_name(),
        dsr_validate::crate_name(),
        dsr_correct::crate_name(),
        dsr_ledger::crate_name(),
        dsr_engine::crate_name(),
    );
    "dsr-cli"
}
