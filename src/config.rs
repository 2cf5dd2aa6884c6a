//! Runtime settings.
//!
//! Defaults can be overridden by a TOML file (`--config`), then by
//! `SENSORVIEW_`-prefixed environment variables, then by explicit CLI
//! flags applied in `main`.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::DEFAULT_CAPACITY;
use crate::error::PipelineError;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5672;
const DEFAULT_TOPIC: &str = "sensors.readings";
const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
const DEFAULT_ARTIFACT: &str = "chart.svg";
const DEFAULT_CHART_WIDTH: u32 = 800;
const DEFAULT_CHART_HEIGHT: u32 = 480;

/// Settings for the broker subscription, history window, and dashboard.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Broker hostname.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Topic (routing key) carrying the sensor readings.
    pub topic: String,
    /// Number of readings retained in the history window.
    pub capacity: usize,
    /// Address the dashboard HTTP server listens on.
    pub listen: String,
    /// Path the rendered chart is published to.
    pub artifact: PathBuf,
    /// Chart width in pixels.
    pub chart_width: u32,
    /// Chart height in pixels.
    pub chart_height: u32,
}

impl Settings {
    /// Load settings from defaults, an optional TOML file, and the
    /// environment (`SENSORVIEW_HOST`, `SENSORVIEW_TOPIC`, ...).
    pub fn load(file: Option<&Path>) -> Result<Self, PipelineError> {
        let mut builder = Config::builder()
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", DEFAULT_PORT as i64)?
            .set_default("topic", DEFAULT_TOPIC)?
            .set_default("capacity", DEFAULT_CAPACITY as i64)?
            .set_default("listen", DEFAULT_LISTEN)?
            .set_default("artifact", DEFAULT_ARTIFACT)?
            .set_default("chart_width", DEFAULT_CHART_WIDTH as i64)?
            .set_default("chart_height", DEFAULT_CHART_HEIGHT as i64)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(Environment::with_prefix("SENSORVIEW"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// AMQP connection URI for the configured broker.
    pub fn broker_uri(&self) -> String {
        format!("amqp://{}:{}/%2f", self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            topic: DEFAULT_TOPIC.to_string(),
            capacity: DEFAULT_CAPACITY,
            listen: DEFAULT_LISTEN.to_string(),
            artifact: PathBuf::from(DEFAULT_ARTIFACT),
            chart_width: DEFAULT_CHART_WIDTH,
            chart_height: DEFAULT_CHART_HEIGHT,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_without_file_matches_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.capacity, 100);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "topic = \"lab.temperature\"").unwrap();
        writeln!(file, "capacity = 3").unwrap();
        file.flush().unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.topic, "lab.temperature");
        assert_eq!(settings.capacity, 3);
        assert_eq!(settings.port, DEFAULT_PORT);
    }

    #[test]
    fn broker_uri_includes_host_and_port() {
        let settings = Settings {
            host: "broker.example".to_string(),
            port: 5673,
            ..Settings::default()
        };
        assert_eq!(settings.broker_uri(), "amqp://broker.example:5673/%2f");
    }
}
