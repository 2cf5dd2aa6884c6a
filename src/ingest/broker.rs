//! Broker subscription for sensor readings.
//!
//! Connects to an AMQP broker, binds a server-named queue to the
//! `amq.topic` exchange with the configured topic, and feeds every
//! delivery to the [`Ingestor`](super::Ingestor). Reconnect policy is
//! deliberately out of scope: a failed connection is reported and the
//! rest of the process (dashboard, last rendered chart) keeps running.

use std::fmt;
use std::sync::Arc;

use futures_util::StreamExt;
use lapin::options::{BasicConsumeOptions, QueueBindOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{Connection, ConnectionProperties};
use parking_lot::RwLock;
use tracing::{error, info, warn};

use super::Ingestor;
use crate::error::PipelineError;

/// Consumer tag presented to the broker.
const CONSUMER_TAG: &str = "sensorview";

/// Where the subscription currently stands.
///
/// `Connected` means connected and subscribed; `Failed` is terminal for
/// this process since retrying is left to the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connected => "connected",
            ConnectionState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Shared, cheaply clonable view of the connection state.
#[derive(Debug, Clone, Default)]
pub struct ConnectionStatus(Arc<RwLock<ConnectionState>>);

impl ConnectionStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> ConnectionState {
        *self.0.read()
    }

    fn set(&self, state: ConnectionState) {
        *self.0.write() = state;
    }
}

/// Run the subscription until the broker closes it.
///
/// Every failure path lands here: it is logged and recorded in
/// `status`, and the task ends without taking the process down.
pub async fn run(uri: String, topic: String, ingestor: Arc<Ingestor>, status: ConnectionStatus) {
    match subscribe_and_consume(&uri, &topic, &ingestor, &status).await {
        Ok(()) => {
            status.set(ConnectionState::Disconnected);
            info!("broker closed the subscription");
        }
        Err(err) => {
            status.set(ConnectionState::Failed);
            error!(error = %err, "broker subscription ended");
        }
    }
}

async fn subscribe_and_consume(
    uri: &str,
    topic: &str,
    ingestor: &Ingestor,
    status: &ConnectionStatus,
) -> Result<(), PipelineError> {
    info!(uri, "connecting to broker");
    let connection = Connection::connect(uri, ConnectionProperties::default()).await?;
    let channel = connection.create_channel().await?;

    // Server-named exclusive queue bound to the topic exchange; it
    // disappears with the connection.
    let queue = channel
        .queue_declare(
            "",
            QueueDeclareOptions {
                exclusive: true,
                auto_delete: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|e| PipelineError::Subscribe(e.to_string()))?;
    channel
        .queue_bind(
            queue.name().as_str(),
            "amq.topic",
            topic,
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await
        .map_err(|e| PipelineError::Subscribe(e.to_string()))?;

    let mut consumer = channel
        .basic_consume(
            queue.name().as_str(),
            CONSUMER_TAG,
            BasicConsumeOptions {
                no_ack: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|e| PipelineError::Subscribe(e.to_string()))?;

    status.set(ConnectionState::Connected);
    info!(topic, queue = queue.name().as_str(), "subscribed");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => ingestor.on_message(&delivery.data),
            Err(err) => warn!(error = %err, "delivery error"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_starts_disconnected() {
        let status = ConnectionStatus::new();
        assert_eq!(status.get(), ConnectionState::Disconnected);
    }

    #[test]
    fn status_is_shared_between_clones() {
        let status = ConnectionStatus::new();
        let view = status.clone();

        status.set(ConnectionState::Connected);
        assert_eq!(view.get(), ConnectionState::Connected);
    }

    #[test]
    fn state_displays_lowercase_labels() {
        assert_eq!(ConnectionState::Connected.to_string(), "connected");
        assert_eq!(ConnectionState::Failed.to_string(), "failed");
    }
}
