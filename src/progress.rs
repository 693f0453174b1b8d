//! Progress-callback trait and event types for a conversion run.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline reads, analyses, and saves the document.
//!
//! A successful run emits, in order:
//!
//! ```text
//!   0%  Starting
//!  10%  Reading
//!  30%  Analyzing      ("analyzing structure")
//!  30–70%  Analyzing   (one event per source line)
//!  70%  Saving
//! 100%  Done
//! ```
//!
//! followed by exactly one [`ConversionProgressCallback::on_complete`]. A
//! failed run ends with a 0% `Failed` event instead, then `on_complete`.
//!
//! # Example
//!
//! ```rust
//! use txt2md::{ConversionConfig, ConversionProgressCallback, ProgressEvent};
//! use std::sync::Arc;
//!
//! struct PrintPercent;
//!
//! impl ConversionProgressCallback for PrintPercent {
//!     fn on_progress(&self, event: &ProgressEvent) {
//!         eprintln!("{:>3}% {}", event.percent, event.status);
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(PrintPercent))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::ConversionResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Stage of the pipeline a [`ProgressEvent`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionPhase {
    Starting,
    Reading,
    Analyzing,
    Saving,
    Done,
    Failed,
}

impl ConversionPhase {
    /// Stable identifier, used as the throttle key.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionPhase::Starting => "starting",
            ConversionPhase::Reading => "reading",
            ConversionPhase::Analyzing => "analyzing",
            ConversionPhase::Saving => "saving",
            ConversionPhase::Done => "done",
            ConversionPhase::Failed => "failed",
        }
    }
}

/// One progress notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// 0–100. Non-decreasing within a run, except the final `Failed` event.
    pub percent: u8,
    pub phase: ConversionPhase,
    /// Human-readable status line.
    pub status: String,
}

impl ProgressEvent {
    pub fn new(percent: u8, phase: ConversionPhase, status: impl Into<String>) -> Self {
        Self {
            percent,
            phase,
            status: status.into(),
        }
    }
}

/// Percentage reported while analysing line `index` (0-based) of `total`.
///
/// Maps the analysis pass linearly onto 30–70%, capped at 70.
pub fn analyzing_percent(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 70;
    }
    let scaled = (index + 1).saturating_mul(40) / total;
    (30 + scaled).min(70) as u8
}

/// Observer for a conversion run.
///
/// Implementations must be `Send + Sync`: per-line events are emitted from
/// the blocking thread pool that runs the classification pass. Both methods
/// default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called for every progress notification, in order.
    fn on_progress(&self, event: &ProgressEvent) {
        let _ = event;
    }

    /// Called exactly once when the run finishes, successfully or not.
    fn on_complete(&self, result: &ConversionResult) {
        let _ = result;
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

/// Emits events to the configured callback (if any) and mirrors them to
/// the trace log.
#[derive(Clone, Default)]
pub(crate) struct Reporter {
    callback: Option<ProgressCallback>,
}

impl Reporter {
    pub(crate) fn new(callback: Option<ProgressCallback>) -> Self {
        Self { callback }
    }

    pub(crate) fn emit(&self, percent: u8, phase: ConversionPhase, status: impl Into<String>) {
        let event = ProgressEvent::new(percent, phase, status);
        if phase != ConversionPhase::Analyzing {
            debug!("{:>3}% {}", event.percent, event.status);
        }
        if let Some(ref cb) = self.callback {
            cb.on_progress(&event);
        }
    }

    pub(crate) fn complete(&self, result: &ConversionResult) {
        if let Some(ref cb) = self.callback {
            cb.on_complete(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        events: Mutex<Vec<ProgressEvent>>,
        completions: Mutex<Vec<ConversionResult>>,
    }

    impl ConversionProgressCallback for Recording {
        fn on_progress(&self, event: &ProgressEvent) {
            self.events.lock().unwrap().push(event.clone());
        }

        fn on_complete(&self, result: &ConversionResult) {
            self.completions.lock().unwrap().push(result.clone());
        }
    }

    #[test]
    fn analyzing_percent_spans_30_to_70() {
        assert_eq!(analyzing_percent(0, 4), 40);
        assert_eq!(analyzing_percent(1, 4), 50);
        assert_eq!(analyzing_percent(3, 4), 70);
        assert_eq!(analyzing_percent(0, 1000), 30);
        assert_eq!(analyzing_percent(999, 1000), 70);
    }

    #[test]
    fn analyzing_percent_is_capped() {
        assert_eq!(analyzing_percent(10, 3), 70);
        assert_eq!(analyzing_percent(0, 0), 70);
    }

    #[test]
    fn analyzing_percent_is_monotonic() {
        let total = 37;
        let percents: Vec<u8> = (0..total).map(|i| analyzing_percent(i, total)).collect();
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_progress(&ProgressEvent::new(0, ConversionPhase::Starting, "start"));
        cb.on_complete(&ConversionResult::failed("x"));
    }

    #[test]
    fn reporter_forwards_to_callback() {
        let recording = Arc::new(Recording::default());
        let reporter = Reporter::new(Some(recording.clone() as ProgressCallback));

        reporter.emit(0, ConversionPhase::Starting, "Starting conversion…");
        reporter.emit(10, ConversionPhase::Reading, "Reading file…");
        reporter.complete(&ConversionResult::failed("nope"));

        let events = recording.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].percent, 10);
        assert_eq!(events[1].phase, ConversionPhase::Reading);
        assert_eq!(recording.completions.lock().unwrap().len(), 1);
    }

    #[test]
    fn reporter_without_callback_is_silent() {
        let reporter = Reporter::default();
        reporter.emit(100, ConversionPhase::Done, "done");
        reporter.complete(&ConversionResult::failed("x"));
    }

    #[test]
    fn phase_serialises_snake_case() {
        let json = serde_json::to_string(&ConversionPhase::Analyzing).unwrap();
        assert_eq!(json, "\"analyzing\"");
        assert_eq!(ConversionPhase::Failed.as_str(), "failed");
    }
}
