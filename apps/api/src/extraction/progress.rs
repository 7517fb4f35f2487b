//! Optional progress side-channel.
//!
//! A sink receives `(stage, percent)` after each stage completes. Calls are
//! fire-and-forget: the pipeline never waits on or reads back from a sink.

use tracing::debug;

use crate::extraction::error::Stage;

pub trait ProgressSink {
    fn report(&self, stage: Stage, percent: u8);
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _stage: Stage, _percent: u8) {}
}

/// Emits each report as a `debug!` event tagged with the upload name.
#[derive(Debug, Clone)]
pub struct TracingProgress {
    pub filename: String,
}

impl ProgressSink for TracingProgress {
    fn report(&self, stage: Stage, percent: u8) {
        debug!(filename = %self.filename, stage = %stage, percent, "parse progress");
    }
}

impl<F: Fn(Stage, u8)> ProgressSink for F {
    fn report(&self, stage: Stage, percent: u8) {
        self(stage, percent)
    }
}
