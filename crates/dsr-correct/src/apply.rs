// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use dsr_core::{CorrectionKind, DataCorrection, DsrError, MonitoringPoint};

/// Applies a planned correction batch to the point's series in place.
///
/// The baseline epoch is immutable: any non-`NoOp` correction addressing
/// epoch 0 is rejected before a single edit lands.
pub fn apply_corrections(
    point: &mut MonitoringPoint,
    corrections: &[DataCorrection],
) -> Result<(), DsrError> {
    for correction in corrections {
        correction.validate()?;
        if correction.epoch == 0 && !correction.is_noop() {
            return Err(DsrError::invalid_input(format!(
                "baseline epoch of {} is immutable; rejected a {} correction on axis {}",
                correction.point_name, correction.kind, correction.axis
            )));
        }
        if correction.epoch >= point.period_count() {
            return Err(DsrError::invalid_input(format!(
                "correction epoch {} out of range for {} with {} periods",
                correction.epoch,
                correction.point_name,
                point.period_count()
            )));
        }
    }

    for correction in corrections {
        let period = &mut point.periods[correction.epoch];
        match correction.kind {
            CorrectionKind::NoOp => {}
            CorrectionKind::PeriodValueOnly => {
                period.set_delta(correction.axis, correction.corrected_value);
            }
            CorrectionKind::CumulativeValueOnly => {
                period.set_cumulative(correction.axis, correction.corrected_value);
            }
            CorrectionKind::Both => {
                period.set_delta(correction.axis, correction.corrected_value);
                if let Some(paired) = correction.paired_cumulative {
                    period.set_cumulative(correction.axis, paired);
                }
            }
        }
    }

    Ok(())
}
