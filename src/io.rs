//! Plot session configuration files (JSON) and series table export.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use anyhow::Result;
use log::info;
use serde::Deserialize;

use crate::error::PlotResult;
use crate::plotter::Plotter;
use crate::series::{ErrorGraph, Histogram, Series};

/// A plot session described in a JSON file.
#[derive(Debug, Deserialize)]
pub struct PlotConfig {
    /// Output base name, extension is appended at save time
    pub out: String,
    #[serde(default)]
    pub log_x: bool,
    #[serde(default)]
    pub log_y: bool,
    #[serde(default)]
    pub x_label: Option<String>,
    #[serde(default)]
    pub y_label: Option<String>,
    /// Legend placement string, e.g. "UpLeft"
    #[serde(default)]
    pub legend_placement: Option<String>,
    #[serde(default = "default_true")]
    pub draw_legend: bool,
    #[serde(default)]
    pub notes: Vec<String>,
    pub series: Vec<SeriesConfig>,
}

fn default_true() -> bool {
    true
}

/// One series in a [`PlotConfig`].
#[derive(Debug, Deserialize)]
pub struct SeriesConfig {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub x_title: Option<String>,
    #[serde(default)]
    pub y_title: Option<String>,
    #[serde(flatten)]
    pub data: SeriesData,
}

/// The data payload of a configured series, selected by its `kind` field.
///
/// Function curves cannot be described in a config file; they only exist on
/// the API side.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeriesData {
    Histogram {
        x_low: f64,
        x_high: f64,
        contents: Vec<f64>,
        /// Symmetric per-bin errors
        #[serde(default)]
        errors: Option<Vec<f64>>,
        #[serde(default)]
        err_low: Option<Vec<f64>>,
        #[serde(default)]
        err_high: Option<Vec<f64>>,
    },
    Graph {
        points: Vec<PointConfig>,
    },
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointConfig {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub err_low: f64,
    #[serde(default)]
    pub err_high: f64,
}

/// Load a plot configuration from a JSON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<PlotConfig> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| anyhow::anyhow!("Failed to open plot config {}: {}", path.display(), e))?;
    let config = read_config(BufReader::new(file))
        .map_err(|e| anyhow::anyhow!("Failed to parse plot config {}: {}", path.display(), e))?;
    Ok(config)
}

/// Parse a plot configuration from any reader.
pub fn read_config<R: Read>(reader: R) -> Result<PlotConfig> {
    let config: PlotConfig = serde_json::from_reader(reader)?;
    Ok(config)
}

/// Build a ready-to-draw plot session from a configuration.
pub fn build_plotter(config: &PlotConfig) -> Result<Plotter> {
    let mut plotter = Plotter::new(config.out.clone());
    plotter.set_log_x(config.log_x);
    plotter.set_log_y(config.log_y);
    plotter.set_draw_legend(config.draw_legend);
    if let Some(ref placement) = config.legend_placement {
        plotter.set_legend_placement(placement);
    }
    if let Some(ref label) = config.x_label {
        plotter.set_x_label(label.clone());
    }
    if let Some(ref label) = config.y_label {
        plotter.set_y_label(label.clone());
    }

    for series in &config.series {
        let title = series.title.clone().unwrap_or_else(|| series.name.clone());
        let x_title = series.x_title.clone().unwrap_or_default();
        let y_title = series.y_title.clone().unwrap_or_default();
        match &series.data {
            SeriesData::Histogram {
                x_low,
                x_high,
                contents,
                errors,
                err_low,
                err_high,
            } => {
                let hist = match (err_low, err_high, errors) {
                    (Some(lo), Some(hi), _) => Histogram::with_asymmetric_errors(
                        series.name.as_str(),
                        *x_low,
                        *x_high,
                        contents.clone(),
                        lo.clone(),
                        hi.clone(),
                    ),
                    (_, _, Some(errs)) => Histogram::with_errors(
                        series.name.as_str(),
                        *x_low,
                        *x_high,
                        contents.clone(),
                        errs.clone(),
                    ),
                    _ => Histogram::new(series.name.as_str(), *x_low, *x_high, contents.clone()),
                }
                .map_err(|e| anyhow::anyhow!("Series '{}': {}", series.name, e))?
                .title(title)
                .axis_titles(x_title, y_title);
                plotter
                    .add_histogram(&hist)
                    .map_err(|e| anyhow::anyhow!("Series '{}': {}", series.name, e))?;
            }
            SeriesData::Graph { points } => {
                let coords: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
                let err_low: Vec<f64> = points.iter().map(|p| p.err_low).collect();
                let err_high: Vec<f64> = points.iter().map(|p| p.err_high).collect();
                let graph = ErrorGraph::with_asymmetric_errors(
                    series.name.as_str(),
                    &coords,
                    &err_low,
                    &err_high,
                )
                .map_err(|e| anyhow::anyhow!("Series '{}': {}", series.name, e))?
                .title(title)
                .axis_titles(x_title, y_title);
                plotter
                    .add_graph(&graph)
                    .map_err(|e| anyhow::anyhow!("Series '{}': {}", series.name, e))?;
            }
        }
    }

    for note in &config.notes {
        plotter.add_note(note.clone());
    }

    Ok(plotter)
}

/// Write a registered series as a tab separated table: a name line, a header
/// line, one row per sample.
pub fn write_series_table<W: Write>(series: &Series, mut writer: W) -> PlotResult<()> {
    writeln!(writer, "{}", series.name())?;
    writeln!(writer, "x\ty\terr_low\terr_high")?;
    for s in series.samples() {
        writeln!(writer, "{}\t{}\t{}\t{}", s.x, s.y, s.err_low, s.err_high)?;
    }
    Ok(())
}

/// Write a registered series table to a file.
pub fn save_series_table(series: &Series, path: impl AsRef<Path>) -> PlotResult<()> {
    let file = File::create(path.as_ref())?;
    write_series_table(series, file)?;
    info!("series table written to {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const CONFIG: &str = r#"{
        "out": "comparison",
        "log_y": true,
        "legend_placement": "DownLeft",
        "notes": ["trial run"],
        "series": [
            {
                "name": "data",
                "kind": "graph",
                "points": [
                    {"x": 0.0, "y": 10.0, "err_low": 1.0, "err_high": 2.0},
                    {"x": 1.0, "y": 20.0}
                ]
            },
            {
                "name": "model",
                "title": "Model A",
                "kind": "histogram",
                "x_low": -0.5,
                "x_high": 1.5,
                "contents": [12.0, 18.0],
                "errors": [1.0, 1.0]
            }
        ]
    }"#;

    #[test]
    fn test_read_config() {
        let config = read_config(Cursor::new(CONFIG)).unwrap();
        assert_eq!(config.out, "comparison");
        assert!(config.log_y);
        assert!(!config.log_x);
        assert!(config.draw_legend);
        assert_eq!(config.series.len(), 2);
        match &config.series[0].data {
            SeriesData::Graph { points } => {
                assert_eq!(points.len(), 2);
                assert_eq!(points[0].err_high, 2.0);
                assert_eq!(points[1].err_low, 0.0);
            }
            _ => panic!("expected graph data"),
        }
    }

    #[test]
    fn test_read_config_rejects_unknown_kind() {
        let bad = r#"{"out": "x", "series": [{"name": "s", "kind": "pie"}]}"#;
        assert!(read_config(Cursor::new(bad)).is_err());
    }

    #[test]
    fn test_build_plotter_from_config() {
        let config = read_config(Cursor::new(CONFIG)).unwrap();
        let plotter = build_plotter(&config).unwrap();
        assert_eq!(plotter.overlay().len(), 2);
        assert_eq!(plotter.out_name(), "comparison");
        // histogram and graph both contribute to the range
        let (min, max) = plotter.overlay().resolve_axis_range(false).unwrap();
        assert!((min - 8.1).abs() < 1e-9);
        assert!((max - 22.0).abs() < 1e-9);
        // titles default to the series name unless given
        assert_eq!(plotter.overlay().get(0).unwrap().series().title(), "data");
        assert_eq!(plotter.overlay().get(1).unwrap().series().title(), "Model A");
    }

    #[test]
    fn test_build_plotter_surfaces_series_errors() {
        let bad = r#"{
            "out": "x",
            "series": [{
                "name": "h", "kind": "histogram",
                "x_low": 0.0, "x_high": 1.0,
                "contents": [1.0, 2.0], "errors": [0.1]
            }]
        }"#;
        let config = read_config(Cursor::new(bad)).unwrap();
        let err = build_plotter(&config).unwrap_err().to_string();
        assert!(err.contains("'h'"));
    }

    #[test]
    fn test_write_series_table() {
        let graph = ErrorGraph::with_asymmetric_errors(
            "g",
            &[(0.0, 10.0), (1.0, 20.0)],
            &[1.0, 0.0],
            &[2.0, 0.0],
        )
        .unwrap();
        let mut plotter = Plotter::new("out");
        plotter.add_graph(&graph).unwrap();

        let mut buffer = Vec::new();
        write_series_table(plotter.overlay().get(0).unwrap().series(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("g_"));
        assert_eq!(lines.next().unwrap(), "x\ty\terr_low\terr_high");
        assert_eq!(lines.next().unwrap(), "0\t10\t1\t2");
        assert_eq!(lines.next().unwrap(), "1\t20\t0\t0");
    }
}
