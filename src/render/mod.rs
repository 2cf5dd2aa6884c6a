//! Chart rendering.
//!
//! Draws the history snapshot as an SVG time-series chart and publishes
//! it atomically: the chart is written to a temporary sibling file and
//! renamed over the artifact path only once complete, so the dashboard
//! never reads a torn image. A failed render leaves the previous
//! artifact in place.

pub mod worker;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use plotters::prelude::*;
use tracing::debug;

use crate::data::Reading;
use crate::error::PipelineError;

/// Fraction of the value span added as headroom above and below.
const VALUE_PAD: f64 = 0.05;

fn render_err<E: std::fmt::Display>(err: E) -> PipelineError {
    PipelineError::Render(err.to_string())
}

/// Renders history snapshots to an SVG artifact on disk.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    artifact: PathBuf,
    size: (u32, u32),
}

impl ChartRenderer {
    /// Create a renderer publishing to `artifact` at `size` pixels.
    pub fn new(artifact: impl Into<PathBuf>, size: (u32, u32)) -> Self {
        Self {
            artifact: artifact.into(),
            size,
        }
    }

    /// Path the rendered chart is published to.
    pub fn artifact_path(&self) -> &Path {
        &self.artifact
    }

    /// Render `readings` and atomically publish the artifact.
    ///
    /// An empty slice produces a placeholder chart and a single reading
    /// a lone marker, so the artifact is always a valid image. On any
    /// draw or I/O error the temporary file is removed and the previous
    /// artifact survives untouched.
    pub fn render(&self, readings: &[Reading]) -> Result<(), PipelineError> {
        let tmp = self.tmp_path();
        match self.draw(&tmp, readings) {
            Ok(()) => {
                std::fs::rename(&tmp, &self.artifact)
                    .map_err(|e| PipelineError::Render(format!("publishing chart: {e}")))?;
                debug!(readings = readings.len(), artifact = %self.artifact.display(), "chart published");
                Ok(())
            }
            Err(err) => {
                let _ = std::fs::remove_file(&tmp);
                Err(err)
            }
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut path = self.artifact.clone().into_os_string();
        path.push(".tmp");
        PathBuf::from(path)
    }

    fn draw(&self, path: &Path, readings: &[Reading]) -> Result<(), PipelineError> {
        let root = SVGBackend::new(path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        if readings.is_empty() {
            let (width, height) = self.size;
            let style = ("sans-serif", 20)
                .into_font()
                .color(&RGBColor(110, 110, 110));
            root.draw(&Text::new(
                "waiting for readings",
                (width as i32 / 2 - 90, height as i32 / 2),
                style,
            ))
            .map_err(render_err)?;
            root.present().map_err(render_err)?;
            return Ok(());
        }

        let (t0, t1) = time_range(readings);
        let (lo, hi) = value_range(readings);

        let mut chart = ChartBuilder::on(&root)
            .margin(12)
            .caption("recent readings", ("sans-serif", 22).into_font())
            .x_label_area_size(36)
            .y_label_area_size(52)
            .build_cartesian_2d(t0..t1, lo..hi)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_labels(6)
            .x_label_formatter(&|ts: &DateTime<Utc>| ts.format("%H:%M:%S").to_string())
            .y_desc("value")
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(LineSeries::new(
                readings.iter().map(|r| (r.timestamp, r.value)),
                &BLUE,
            ))
            .map_err(render_err)?;
        chart
            .draw_series(
                readings
                    .iter()
                    .map(|r| Circle::new((r.timestamp, r.value), 3, BLUE.filled())),
            )
            .map_err(render_err)?;

        root.present().map_err(render_err)
    }
}

/// Time axis bounds, widened for a single reading so the range is
/// never empty.
fn time_range(readings: &[Reading]) -> (DateTime<Utc>, DateTime<Utc>) {
    let first = readings[0].timestamp;
    let last = readings[readings.len() - 1].timestamp;
    if first == last {
        (first - Duration::seconds(30), last + Duration::seconds(30))
    } else {
        (first, last)
    }
}

/// Value axis bounds with headroom; flat series get a fixed band.
fn value_range(readings: &[Reading]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for reading in readings {
        lo = lo.min(reading.value);
        hi = hi.max(reading.value);
    }
    if (hi - lo).abs() < f64::EPSILON {
        (lo - 1.0, hi + 1.0)
    } else {
        let pad = (hi - lo) * VALUE_PAD;
        (lo - pad, hi + pad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Reading;

    fn readings(values: &[f64]) -> Vec<Reading> {
        values.iter().map(|&v| Reading::now(v)).collect()
    }

    fn renderer_in(dir: &Path) -> ChartRenderer {
        ChartRenderer::new(dir.join("chart.svg"), (640, 400))
    }

    #[test]
    fn empty_input_produces_placeholder_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer_in(dir.path());

        renderer.render(&[]).unwrap();

        let svg = std::fs::read_to_string(renderer.artifact_path()).unwrap();
        assert!(svg.starts_with("<?xml") || svg.starts_with("<svg"));
        assert!(svg.contains("waiting for readings"));
    }

    #[test]
    fn single_reading_renders_marker_only() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer_in(dir.path());

        renderer.render(&readings(&[42.0])).unwrap();

        let svg = std::fs::read_to_string(renderer.artifact_path()).unwrap();
        assert!(svg.contains("circle"));
    }

    #[test]
    fn series_renders_line_and_markers() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer_in(dir.path());

        renderer.render(&readings(&[1.0, 2.5, 2.0, 3.5])).unwrap();

        let svg = std::fs::read_to_string(renderer.artifact_path()).unwrap();
        assert!(svg.contains("polyline") || svg.contains("path"));
        assert!(svg.contains("circle"));
    }

    #[test]
    fn rerender_overwrites_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer_in(dir.path());

        renderer.render(&readings(&[1.0])).unwrap();
        renderer.render(&readings(&[1.0, 2.0])).unwrap();

        assert!(renderer.artifact_path().exists());
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("chart.svg")]);
    }

    #[test]
    fn failed_render_keeps_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer_in(dir.path());
        renderer.render(&readings(&[1.0, 2.0])).unwrap();
        let before = std::fs::read(renderer.artifact_path()).unwrap();

        // Point a second renderer at a directory that does not exist so
        // the draw fails before publish.
        let broken = ChartRenderer::new(dir.path().join("missing").join("chart.svg"), (640, 400));
        assert!(broken.render(&readings(&[3.0])).is_err());

        let after = std::fs::read(renderer.artifact_path()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn flat_series_still_renders() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer_in(dir.path());

        renderer.render(&readings(&[5.0, 5.0, 5.0])).unwrap();

        assert!(renderer.artifact_path().exists());
    }

    #[test]
    fn value_range_pads_span() {
        let (lo, hi) = value_range(&readings(&[0.0, 10.0]));
        assert!(lo < 0.0);
        assert!(hi > 10.0);
    }
}
