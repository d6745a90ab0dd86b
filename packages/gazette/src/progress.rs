//! Progress reporting for a mirror run.
//!
//! [`ProgressCallback`] keeps the pipeline independent of how progress is
//! drawn. The CLI renders it with `indicatif`; tests use [`NullProgress`].

use std::sync::Arc;

/// Receives progress updates from a mirror run.
pub trait ProgressCallback: Send + Sync {
    /// Number of dates the run will process.
    fn set_total(&self, total: u64);

    /// Marks `delta` more dates as done.
    fn inc(&self, delta: u64);

    /// Describes the date currently being mirrored.
    fn set_message(&self, msg: String);

    /// Ends the run with a summary line.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// A shared [`NullProgress`], the default for [`crate::processor::Mirror`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
