//! Ingestion: raw broker payloads in, validated readings out.
//!
//! [`Ingestor`] is the write side of the pipeline. Each delivered
//! payload is decoded, parsed as a finite number, stamped with the
//! arrival time, and appended to the shared [`History`]. The fresh
//! snapshot is then handed to the render worker through a watch channel
//! so that a slow render never blocks the delivery task.

pub mod broker;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::data::{History, Reading};
use crate::error::PipelineError;

/// Parse a payload as a finite `f64`.
///
/// Accepts UTF-8 text with surrounding whitespace. `NaN` and infinities
/// parse as numbers but are rejected here, before a [`Reading`] exists.
pub fn parse_value(payload: &[u8]) -> Result<f64, PipelineError> {
    let text = std::str::from_utf8(payload)
        .map_err(|e| PipelineError::Parse(format!("payload is not UTF-8: {e}")))?;
    let trimmed = text.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| PipelineError::Parse(format!("not a number: {trimmed:?}")))?;
    if !value.is_finite() {
        return Err(PipelineError::Parse(format!("non-finite value: {trimmed}")));
    }
    Ok(value)
}

/// Bridges delivered messages to the bounded history.
///
/// Sole writer of the [`History`] it holds. Unparseable payloads are
/// counted and discarded without touching the history or the delivery
/// loop.
#[derive(Debug)]
pub struct Ingestor {
    history: Arc<History>,
    render_tx: watch::Sender<Vec<Reading>>,
    dropped: AtomicU64,
}

impl Ingestor {
    /// Create an ingestor writing to `history` and notifying the render
    /// worker on `render_tx`.
    pub fn new(history: Arc<History>, render_tx: watch::Sender<Vec<Reading>>) -> Self {
        Self {
            history,
            render_tx,
            dropped: AtomicU64::new(0),
        }
    }

    /// Handle one delivered payload.
    ///
    /// On success the reading is appended and the latest snapshot
    /// replaces whatever the render worker had queued; bursts coalesce
    /// to the newest state. On parse failure the message is dropped and
    /// counted. Never panics, never propagates to the consumer loop.
    pub fn on_message(&self, payload: &[u8]) {
        match parse_value(payload) {
            Ok(value) => {
                let reading = Reading::now(value);
                self.history.append(reading);
                self.render_tx.send_replace(self.history.snapshot());
                debug!(value, len = self.history.len(), "appended reading");
            }
            Err(err) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(error = %err, dropped, "discarding message");
            }
        }
    }

    /// The shared history this ingestor writes to.
    pub fn history(&self) -> &Arc<History> {
        &self.history
    }

    /// Number of messages discarded because they failed to parse.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
