//! Streaming conversion API: receive progress as a `Stream` of typed events.
//!
//! [`convert_stream`] spawns the conversion on the current Tokio runtime and
//! returns immediately. The returned stream yields every
//! [`ProgressEvent`] in emission order, then exactly one
//! [`ConversionEvent::Completed`], then ends. This suits callers that would
//! rather `while let Some(ev) = stream.next().await` than implement
//! [`ConversionProgressCallback`], e.g. a UI loop or a WebSocket forwarder.

use crate::config::ConversionConfig;
use crate::convert::convert;
use crate::output::ConversionResult;
use crate::progress::{ConversionProgressCallback, ProgressCallback, ProgressEvent};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;
use tracing::debug;

/// One item of a conversion event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ConversionEvent {
    /// A progress notification.
    Progress(ProgressEvent),
    /// The terminal result. Always the last item.
    Completed(ConversionResult),
}

impl ConversionEvent {
    /// Serialise as a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> String {
        // Plain structs and strings only; serialisation cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ConversionEvent::Completed(_))
    }
}

/// A boxed stream of conversion events.
pub type EventStream = Pin<Box<dyn Stream<Item = ConversionEvent> + Send>>;

/// Forwards callbacks into the channel, and to the caller's own observer.
struct ChannelCallback {
    tx: mpsc::UnboundedSender<ConversionEvent>,
    inner: Option<ProgressCallback>,
}

impl ConversionProgressCallback for ChannelCallback {
    fn on_progress(&self, event: &ProgressEvent) {
        if let Some(ref cb) = self.inner {
            cb.on_progress(event);
        }
        // The receiver may have been dropped; the run continues regardless.
        let _ = self.tx.send(ConversionEvent::Progress(event.clone()));
    }

    fn on_complete(&self, result: &ConversionResult) {
        if let Some(ref cb) = self.inner {
            cb.on_complete(result);
        }
        let _ = self.tx.send(ConversionEvent::Completed(result.clone()));
    }
}

/// Convert `input_path` to `output_path`, streaming events as they happen.
///
/// Must be called from within a Tokio runtime. Dropping the stream does not
/// cancel the conversion; the spawned task runs to completion.
///
/// # Example
/// ```rust,no_run
/// use futures::StreamExt;
/// use txt2md::{convert_stream, ConversionConfig, ConversionEvent};
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut events = convert_stream("novel.txt", "novel.md", &ConversionConfig::default());
/// while let Some(event) = events.next().await {
///     match event {
///         ConversionEvent::Progress(p) => eprintln!("{:>3}% {}", p.percent, p.status),
///         ConversionEvent::Completed(r) => println!("success: {}", r.is_success()),
///     }
/// }
/// # }
/// ```
pub fn convert_stream(
    input_path: impl Into<PathBuf>,
    output_path: impl Into<PathBuf>,
    config: &ConversionConfig,
) -> EventStream {
    let (tx, rx) = mpsc::unbounded_channel();

    let mut config = config.clone();
    let inner = config.progress_callback.take();
    config.progress_callback = Some(Arc::new(ChannelCallback { tx, inner }));

    let input_path = input_path.into();
    let output_path = output_path.into();
    debug!("Spawning streaming conversion: {}", input_path.display());

    // The task owns the only sender (inside `config`); the stream ends when
    // the task finishes and drops it.
    tokio::spawn(async move {
        convert(&input_path, &output_path, &config).await;
    });

    Box::pin(UnboundedReceiverStream::new(rx))
}
