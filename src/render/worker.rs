//! Single-consumer render worker.
//!
//! The ingestion side publishes each fresh snapshot into a watch
//! channel; this task wakes on change, takes the newest value, and
//! renders it on the blocking pool. The single-slot channel means at
//! most one render is in flight and a burst of appends collapses to one
//! render of the latest state, so the delivery task is never held up by
//! chart I/O.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, warn};

use super::ChartRenderer;
use crate::data::Reading;

/// Spawn the render loop. The task ends when every sender is dropped.
pub fn spawn(renderer: ChartRenderer, mut rx: watch::Receiver<Vec<Reading>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            let renderer = renderer.clone();
            match tokio::task::spawn_blocking(move || renderer.render(&snapshot)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(error = %err, "render failed; previous chart stays published")
                }
                Err(err) => error!(error = %err, "render task panicked"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::data::Reading;

    #[tokio::test(flavor = "multi_thread")]
    async fn worker_renders_latest_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path().join("chart.svg"), (320, 200));
        let artifact = renderer.artifact_path().to_path_buf();

        let (tx, rx) = watch::channel(Vec::new());
        let handle = spawn(renderer, rx);

        tx.send_replace(vec![Reading::now(1.0)]);
        tx.send_replace(vec![Reading::now(1.0), Reading::now(2.0)]);

        // Wait for the worker to catch up with the newest snapshot.
        let mut published = false;
        for _ in 0..100 {
            if artifact.exists() {
                published = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(published, "worker never published an artifact");

        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn worker_exits_when_sender_drops() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path().join("chart.svg"), (320, 200));

        let (tx, rx) = watch::channel(Vec::new());
        let handle = spawn(renderer, rx);
        drop(tx);

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("worker did not exit")
            .unwrap();
    }
}
