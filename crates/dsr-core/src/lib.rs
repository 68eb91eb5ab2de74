// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod error;
pub mod observability;
pub mod options;
pub mod results;
pub mod rng;
pub mod series;
pub mod tolerance;

pub use error::DsrError;
pub use observability::{NoopProgress, ProgressSink};
pub use options::{CorrectionOptions, ValidationOptions};
pub use results::{
    AdjustmentRecord, CorrectionKind, CorrectionResult, CorrectionTier, DataCorrection,
    PointCorrectionResult, PointStatus, Severity, ValidationResult, ValidationStatus,
};
pub use rng::StableRng;
pub use series::{Axis, AxisReading, MonitoringPoint, PeriodData};

/// Core shared types for dsr-rs.
pub fn crate_name() -> &'static str {
    "dsr-core"
}
