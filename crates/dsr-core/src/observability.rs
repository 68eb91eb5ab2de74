// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Progress hook for long batch runs.
///
/// Reporting only; implementations must not influence processing. `Sync` so
/// a single sink can serve a parallel batch.
pub trait ProgressSink: Sync {
    fn on_progress(&self, processed: usize, total: usize);
}

/// Sink that drops every report; useful as an explicit default.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_progress(&self, _processed: usize, _total: usize) {}
}
