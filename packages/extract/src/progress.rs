//! Progress reporting for batch extraction.
//!
//! [`ProgressCallback`] decouples the batch job from how progress is
//! rendered (progress bars, logs, or nothing). The CLI provides an
//! `indicatif` implementation.

use std::sync::Arc;

/// Receives progress updates from a batch run.
pub trait ProgressCallback: Send + Sync {
    /// Set the total number of reports.
    fn set_total(&self, total: u64);

    /// Advance progress by `delta` reports.
    fn inc(&self, delta: u64);

    /// Update the message shown next to the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// Ignores every progress update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
