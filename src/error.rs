//! Error types for the ingestion pipeline.

use thiserror::Error;

/// Errors that can occur while ingesting, rendering, or configuring.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Payload was not a finite number.
    #[error("payload rejected: {0}")]
    Parse(String),

    /// Broker connection failed.
    #[error("broker connection failed: {0}")]
    Connection(String),

    /// Queue declare, bind, or consume failed after connecting.
    #[error("subscription failed: {0}")]
    Subscribe(String),

    /// Chart could not be drawn or published.
    #[error("chart render failed: {0}")]
    Render(String),

    /// Configuration file or environment could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<lapin::Error> for PipelineError {
    fn from(err: lapin::Error) -> Self {
        PipelineError::Connection(err.to_string())
    }
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        PipelineError::Config(err.to_string())
    }
}
