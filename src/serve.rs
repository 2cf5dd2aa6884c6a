//! Dashboard HTTP server.
//!
//! Serves the dashboard page, the raw history as JSON, the rendered
//! chart artifact, and a health summary. The query and artifact routes
//! only ever read: the history through point-in-time snapshots, the
//! chart from the atomically published artifact file, so they can run
//! concurrently with ingestion without further coordination.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::ingest::broker::ConnectionStatus;
use crate::ingest::Ingestor;
use crate::query::QueryFacade;

/// Minimal dashboard page: the chart plus a live readout of `/data`.
const DASHBOARD_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>sensorview</title>
<style>
  body { font-family: sans-serif; margin: 2em; color: #222; }
  img { border: 1px solid #ccc; max-width: 100%; }
  pre { background: #f4f4f4; padding: 1em; overflow-x: auto; }
</style>
</head>
<body>
<h1>sensorview</h1>
<img id="chart" src="/chart.svg" alt="recent readings">
<h2>Latest readings</h2>
<pre id="data">loading...</pre>
<script>
  async function refresh() {
    document.getElementById('chart').src = '/chart.svg?' + Date.now();
    const response = await fetch('/data');
    const readings = await response.json();
    document.getElementById('data').textContent = JSON.stringify(readings, null, 2);
  }
  refresh();
  setInterval(refresh, 2000);
</script>
</body>
</html>
"#;

/// Served when the artifact file cannot be read, so the chart route
/// always returns a valid image.
const PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="800" height="480">
<rect width="100%" height="100%" fill="white"/>
<text x="400" y="240" text-anchor="middle" font-family="sans-serif" font-size="20" fill="#6e6e6e">chart not available yet</text>
</svg>
"##;

/// Everything the request handler needs, cheap to clone per connection.
#[derive(Debug, Clone)]
pub struct AppState {
    pub query: QueryFacade,
    pub ingestor: Arc<Ingestor>,
    pub artifact: PathBuf,
    pub status: ConnectionStatus,
}

/// Accept connections on `listen` and serve the dashboard until the
/// process exits.
pub async fn run(listen: &str, state: AppState) -> Result<()> {
    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("invalid listen address {listen:?}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "dashboard listening");

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let state = state.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                let state = state.clone();
                async move { handle_request(req, &state).await }
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                warn!(error = %err, "connection error");
            }
        });
    }
}

async fn handle_request<B>(
    req: Request<B>,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let response = match req.uri().path() {
        "/" => text_response(StatusCode::OK, "text/html; charset=utf-8", DASHBOARD_PAGE),
        "/data" => {
            let body = serde_json::to_vec(&state.query.latest()).unwrap();
            bytes_response(StatusCode::OK, "application/json", body)
        }
        "/chart.svg" => match tokio::fs::read(&state.artifact).await {
            Ok(bytes) => bytes_response(StatusCode::OK, "image/svg+xml", bytes),
            Err(err) => {
                warn!(error = %err, artifact = %state.artifact.display(), "artifact unreadable");
                text_response(StatusCode::OK, "image/svg+xml", PLACEHOLDER_SVG)
            }
        },
        "/health" => {
            let body = serde_json::json!({
                "status": "ok",
                "connection": state.status.get().to_string(),
                "history": state.ingestor.history().len(),
                "dropped": state.ingestor.dropped(),
            })
            .to_string();
            text_response(StatusCode::OK, "application/json", &body)
        }
        _ => text_response(StatusCode::NOT_FOUND, "text/plain", "Not Found"),
    };

    Ok(response)
}

fn text_response(status: StatusCode, content_type: &str, body: &str) -> Response<Full<Bytes>> {
    bytes_response(status, content_type, body.as_bytes().to_vec())
}

fn bytes_response(status: StatusCode, content_type: &str, body: Vec<u8>) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}
