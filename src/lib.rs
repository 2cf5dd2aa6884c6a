//! # sensorview
//!
//! Live dashboard for scalar sensor readings published over an AMQP
//! topic. A subscription task feeds readings into a bounded history
//! window, a worker re-renders an SVG chart of that window, and an HTTP
//! server exposes the chart, the raw history, and a health summary.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────┐   deliveries   ┌──────────┐  append   ┌─────────┐
//! │ broker │───────────────▶│ Ingestor │──────────▶│ History │
//! └────────┘                └────┬─────┘           └────┬────┘
//!                                │ watch (latest         │ snapshot
//!                                │  snapshot wins)       │
//!                           ┌────▼─────────┐       ┌────▼────────┐
//!                           │ render worker│       │ QueryFacade │
//!                           └────┬─────────┘       └────┬────────┘
//!                                │ atomic publish       │
//!                           ┌────▼─────────┐       ┌────▼────────┐
//!                           │  chart.svg   │◀──────│ HTTP server │
//!                           └──────────────┘  read └─────────────┘
//! ```
//!
//! - **[`data`]**: the [`Reading`] sample type and the bounded,
//!   thread-safe [`History`] window
//! - **[`ingest`]**: payload parsing, the append path, and the AMQP
//!   subscription that drives it
//! - **[`render`]**: SVG chart rendering with atomic artifact publish,
//!   plus the coalescing render worker
//! - **[`query`]**: snapshot-to-JSON translation for the dashboard
//! - **[`serve`]**: the hyper HTTP server
//!
//! ## Library usage
//!
//! ```
//! use std::sync::Arc;
//! use sensorview::{History, Ingestor};
//! use tokio::sync::watch;
//!
//! let history = Arc::new(History::new(100));
//! let (render_tx, _render_rx) = watch::channel(Vec::new());
//! let ingestor = Ingestor::new(history.clone(), render_tx);
//!
//! ingestor.on_message(b"22.5");
//! assert_eq!(history.snapshot()[0].value, 22.5);
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod ingest;
pub mod query;
pub mod render;
pub mod serve;

pub use config::Settings;
pub use data::{History, Reading};
pub use error::PipelineError;
pub use ingest::Ingestor;
pub use query::{QueryFacade, ReadingRecord};
pub use render::ChartRenderer;
