// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod aggressive;
pub mod apply;
pub mod cascade;
pub mod global;
pub mod partial;
pub mod regen;
mod sampling;

pub use apply::apply_corrections;
pub use cascade::{failure_ratio, CascadeState, CorrectionCascade};

/// Correction namespace placeholder.
pub fn crate_name() -> &'static str {
    let _ = (
        dsr_core::crate_name(),
        dsr_validate::crate_name(),
        dsr_ledger::crate_name(),
    );
    "dsr-correct"
}
