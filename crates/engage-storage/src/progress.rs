//! Upload progress reporting.
//!
//! A [`ProgressTracker`] sits between a storage backend and whoever observes
//! the transfer. It enforces the progress invariants so backends don't have
//! to: values are monotonically non-decreasing within one attempt, reset to
//! zero when the attempt starts, and reach the full byte count only when the
//! backend confirms durable completion.

use engage_core::models::UploadProgress;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Receiver of progress events for one upload attempt.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: UploadProgress);
}

/// Monotone progress tracker for a single upload attempt.
pub struct ProgressTracker {
    bytes_total: u64,
    bytes_sent: AtomicU64,
    sink: Arc<dyn ProgressSink>,
}

impl ProgressTracker {
    /// Start a new attempt. Emits the zero event immediately so observers of
    /// a retried upload see the reset.
    pub fn new(bytes_total: u64, sink: Arc<dyn ProgressSink>) -> Self {
        sink.report(UploadProgress::started(bytes_total));
        ProgressTracker {
            bytes_total,
            bytes_sent: AtomicU64::new(0),
            sink,
        }
    }

    /// Report bytes transferred so far. Regressions are ignored, and the
    /// final byte is withheld: only [`confirm_complete`](Self::confirm_complete)
    /// can take the attempt to 100 percent.
    pub fn transferred(&self, bytes_sent: u64) {
        let capped = bytes_sent.min(self.bytes_total.saturating_sub(1));
        let previous = self.bytes_sent.fetch_max(capped, Ordering::SeqCst);
        if capped > previous {
            self.sink.report(UploadProgress {
                bytes_sent: capped,
                bytes_total: self.bytes_total,
            });
        }
    }

    /// The backend confirmed durable completion; emit the 100 percent event.
    pub fn confirm_complete(&self) {
        self.bytes_sent.store(self.bytes_total, Ordering::SeqCst);
        self.sink.report(UploadProgress {
            bytes_sent: self.bytes_total,
            bytes_total: self.bytes_total,
        });
    }

    pub fn snapshot(&self) -> UploadProgress {
        UploadProgress {
            bytes_sent: self.bytes_sent.load(Ordering::SeqCst),
            bytes_total: self.bytes_total,
        }
    }
}

/// Progress sink backed by a tokio watch channel.
pub struct WatchProgress(watch::Sender<UploadProgress>);

impl ProgressSink for WatchProgress {
    fn report(&self, progress: UploadProgress) {
        // Nobody listening is fine; the upload proceeds regardless.
        let _ = self.0.send(progress);
    }
}

/// Create a watch-backed progress sink and its receiver.
pub fn watch_progress() -> (Arc<WatchProgress>, watch::Receiver<UploadProgress>) {
    let (tx, rx) = watch::channel(UploadProgress::started(0));
    (Arc::new(WatchProgress(tx)), rx)
}
