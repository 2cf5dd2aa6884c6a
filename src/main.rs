use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sensorview::ingest::broker::{self, ConnectionStatus};
use sensorview::render::worker;
use sensorview::serve::{self, AppState};
use sensorview::{ChartRenderer, History, Ingestor, QueryFacade, Settings};

#[derive(Parser, Debug)]
#[command(name = "sensorview")]
#[command(about = "Live dashboard for scalar sensor readings published over an AMQP topic")]
struct Args {
    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Broker hostname
    #[arg(long)]
    host: Option<String>,

    /// Broker port
    #[arg(long)]
    port: Option<u16>,

    /// Topic carrying the sensor readings
    #[arg(long)]
    topic: Option<String>,

    /// Number of readings to retain
    #[arg(long)]
    capacity: Option<usize>,

    /// Dashboard listen address (host:port)
    #[arg(long)]
    listen: Option<String>,

    /// Path to publish the rendered chart to
    #[arg(long)]
    artifact: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(topic) = args.topic {
        settings.topic = topic;
    }
    if let Some(capacity) = args.capacity {
        settings.capacity = capacity;
    }
    if let Some(listen) = args.listen {
        settings.listen = listen;
    }
    if let Some(artifact) = args.artifact {
        settings.artifact = artifact;
    }

    info!(
        broker = %settings.broker_uri(),
        topic = %settings.topic,
        capacity = settings.capacity,
        "starting"
    );

    let history = Arc::new(History::new(settings.capacity));
    let renderer = ChartRenderer::new(
        &settings.artifact,
        (settings.chart_width, settings.chart_height),
    );

    // Publish a placeholder before the first message so the chart route
    // always has an artifact to serve.
    if let Err(err) = renderer.render(&[]) {
        warn!(error = %err, "initial placeholder render failed");
    }

    let (render_tx, render_rx) = watch::channel(Vec::new());
    worker::spawn(renderer, render_rx);

    let ingestor = Arc::new(Ingestor::new(history.clone(), render_tx));
    let status = ConnectionStatus::new();
    tokio::spawn(broker::run(
        settings.broker_uri(),
        settings.topic.clone(),
        ingestor.clone(),
        status.clone(),
    ));

    let state = AppState {
        query: QueryFacade::new(history),
        ingestor,
        artifact: settings.artifact.clone(),
        status,
    };
    serve::run(&settings.listen, state).await
}
