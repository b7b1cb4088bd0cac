//! Plottable series: sample points, kinds, and the sources a caller can
//! register (histograms, error-bar graphs, function curves).

use rand::Rng;

use crate::error::{PlotError, PlotResult};

/// One plotted point with optional asymmetric y errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub err_low: f64,
    pub err_high: f64,
}

impl Sample {
    /// A point without errors.
    pub fn new(x: f64, y: f64) -> Self {
        Sample {
            x,
            y,
            err_low: 0.0,
            err_high: 0.0,
        }
    }

    /// A point with asymmetric errors.
    pub fn with_errors(x: f64, y: f64, err_low: f64, err_high: f64) -> Self {
        Sample {
            x,
            y,
            err_low,
            err_high,
        }
    }

    /// Lower edge of the error bar.
    pub fn y_low(&self) -> f64 {
        self.y - self.err_low
    }

    /// Upper edge of the error bar.
    pub fn y_high(&self) -> f64 {
        self.y + self.err_high
    }
}

/// What a series represents, which controls default draw options and whether
/// it participates in axis ranging and style rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    /// Binned distribution; samples are bin centers
    Histogram,
    /// Point measurements with error bars
    Graph,
    /// Sampled function curve; display only, excluded from axis ranging
    Function,
}

/// Which visual components to draw for a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOptions {
    pub line: bool,
    pub markers: bool,
    pub error_bars: bool,
}

impl DrawOptions {
    /// Defaults per kind: histograms draw line, errors and markers; graphs
    /// draw errors and markers; function curves draw the line only.
    pub fn for_kind(kind: SeriesKind) -> Self {
        match kind {
            SeriesKind::Histogram => DrawOptions {
                line: true,
                markers: true,
                error_bars: true,
            },
            SeriesKind::Graph => DrawOptions {
                line: false,
                markers: true,
                error_bars: true,
            },
            SeriesKind::Function => DrawOptions {
                line: true,
                markers: false,
                error_bars: false,
            },
        }
    }
}

/// Capability interface for anything that can be registered on an overlay.
///
/// Concrete chart objects expose their points through this trait; the
/// allocator never needs to know the concrete type.
pub trait Plottable {
    fn name(&self) -> &str;
    /// Legend label.
    fn title(&self) -> &str;
    fn kind(&self) -> SeriesKind;
    /// The points, in display order.
    fn samples(&self) -> Vec<Sample>;
    fn x_title(&self) -> &str {
        ""
    }
    fn y_title(&self) -> &str {
        ""
    }
}

/// Check samples before registration. A failed check must leave the caller's
/// aggregate state untouched, so this runs before anything is stored.
pub(crate) fn validate_samples(name: &str, samples: &[Sample]) -> PlotResult<()> {
    if samples.is_empty() {
        return Err(PlotError::InvalidSeries(format!(
            "series '{}' has no samples",
            name
        )));
    }
    for (i, s) in samples.iter().enumerate() {
        if !s.x.is_finite() || !s.y.is_finite() {
            return Err(PlotError::InvalidSeries(format!(
                "series '{}' sample {} has non-finite coordinates",
                name, i
            )));
        }
        if !s.err_low.is_finite() || !s.err_high.is_finite() {
            return Err(PlotError::InvalidSeries(format!(
                "series '{}' sample {} has non-finite errors",
                name, i
            )));
        }
        if s.err_low < 0.0 || s.err_high < 0.0 {
            return Err(PlotError::InvalidSeries(format!(
                "series '{}' sample {} has negative error",
                name, i
            )));
        }
    }
    Ok(())
}

/// Random alphanumeric suffix appended to absorbed copies so they never
/// collide with caller-side names.
fn random_suffix(length: usize) -> String {
    const CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// A private copy of a registered series.
///
/// The overlay owns these for the lifetime of one plot session; the caller's
/// original object is never touched after registration.
#[derive(Debug, Clone)]
pub struct Series {
    name: String,
    title: String,
    kind: SeriesKind,
    samples: Vec<Sample>,
    x_title: String,
    y_title: String,
}

impl Series {
    /// Absorb a validated copy of a source. The stored name gets a random
    /// suffix so repeated registrations of the same object stay distinct.
    pub(crate) fn absorb(source: &dyn Plottable, samples: Vec<Sample>) -> Self {
        Series {
            name: format!("{}_{}", source.name(), random_suffix(6)),
            title: source.title().to_string(),
            kind: source.kind(),
            samples,
            x_title: source.x_title().to_string(),
            y_title: source.y_title().to_string(),
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn kind(&self) -> SeriesKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn x_title(&self) -> &str {
        &self.x_title
    }

    pub fn y_title(&self) -> &str {
        &self.y_title
    }
}

/// A uniformly binned distribution with per-bin uncertainties.
#[derive(Debug, Clone)]
pub struct Histogram {
    name: String,
    title: String,
    x_low: f64,
    x_high: f64,
    contents: Vec<f64>,
    err_low: Vec<f64>,
    err_high: Vec<f64>,
    x_title: String,
    y_title: String,
}

impl Histogram {
    /// A histogram without uncertainties.
    pub fn new(
        name: impl Into<String>,
        x_low: f64,
        x_high: f64,
        contents: Vec<f64>,
    ) -> PlotResult<Self> {
        let zeros = vec![0.0; contents.len()];
        Self::with_asymmetric_errors(name, x_low, x_high, contents, zeros.clone(), zeros)
    }

    /// A histogram with symmetric per-bin errors.
    pub fn with_errors(
        name: impl Into<String>,
        x_low: f64,
        x_high: f64,
        contents: Vec<f64>,
        errors: Vec<f64>,
    ) -> PlotResult<Self> {
        Self::with_asymmetric_errors(name, x_low, x_high, contents, errors.clone(), errors)
    }

    /// A histogram with asymmetric per-bin errors. All arrays must have the
    /// same length and the bin range must be non-degenerate.
    pub fn with_asymmetric_errors(
        name: impl Into<String>,
        x_low: f64,
        x_high: f64,
        contents: Vec<f64>,
        err_low: Vec<f64>,
        err_high: Vec<f64>,
    ) -> PlotResult<Self> {
        let name = name.into();
        if contents.is_empty() {
            return Err(PlotError::InvalidSeries(format!(
                "histogram '{}' has no bins",
                name
            )));
        }
        if err_low.len() != contents.len() || err_high.len() != contents.len() {
            return Err(PlotError::InvalidSeries(format!(
                "histogram '{}' error arrays do not match bin count ({} bins, {}/{} errors)",
                name,
                contents.len(),
                err_low.len(),
                err_high.len()
            )));
        }
        if !(x_high > x_low) {
            return Err(PlotError::InvalidSeries(format!(
                "histogram '{}' has an empty bin range [{}, {}]",
                name, x_low, x_high
            )));
        }
        Ok(Histogram {
            title: name.clone(),
            name,
            x_low,
            x_high,
            contents,
            err_low,
            err_high,
            x_title: String::new(),
            y_title: String::new(),
        })
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn axis_titles(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_title = x.into();
        self.y_title = y.into();
        self
    }

    pub fn bin_count(&self) -> usize {
        self.contents.len()
    }

    /// Center of a bin, 0-indexed.
    pub fn bin_center(&self, bin: usize) -> f64 {
        let width = (self.x_high - self.x_low) / self.contents.len() as f64;
        self.x_low + (bin as f64 + 0.5) * width
    }
}

impl Plottable for Histogram {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn kind(&self) -> SeriesKind {
        SeriesKind::Histogram
    }

    fn samples(&self) -> Vec<Sample> {
        self.contents
            .iter()
            .enumerate()
            .map(|(i, &y)| Sample::with_errors(self.bin_center(i), y, self.err_low[i], self.err_high[i]))
            .collect()
    }

    fn x_title(&self) -> &str {
        &self.x_title
    }

    fn y_title(&self) -> &str {
        &self.y_title
    }
}

/// Point measurements with asymmetric errors.
#[derive(Debug, Clone)]
pub struct ErrorGraph {
    name: String,
    title: String,
    samples: Vec<Sample>,
    x_title: String,
    y_title: String,
}

impl ErrorGraph {
    /// A graph without errors.
    pub fn from_points(name: impl Into<String>, points: &[(f64, f64)]) -> Self {
        let name = name.into();
        ErrorGraph {
            title: name.clone(),
            name,
            samples: points.iter().map(|&(x, y)| Sample::new(x, y)).collect(),
            x_title: String::new(),
            y_title: String::new(),
        }
    }

    /// A graph with asymmetric errors. Error arrays must match the point
    /// count.
    pub fn with_asymmetric_errors(
        name: impl Into<String>,
        points: &[(f64, f64)],
        err_low: &[f64],
        err_high: &[f64],
    ) -> PlotResult<Self> {
        let name = name.into();
        if err_low.len() != points.len() || err_high.len() != points.len() {
            return Err(PlotError::InvalidSeries(format!(
                "graph '{}' error arrays do not match point count ({} points, {}/{} errors)",
                name,
                points.len(),
                err_low.len(),
                err_high.len()
            )));
        }
        Ok(ErrorGraph {
            title: name.clone(),
            name,
            samples: points
                .iter()
                .zip(err_low.iter().zip(err_high.iter()))
                .map(|(&(x, y), (&lo, &hi))| Sample::with_errors(x, y, lo, hi))
                .collect(),
            x_title: String::new(),
            y_title: String::new(),
        })
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn axis_titles(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_title = x.into();
        self.y_title = y.into();
        self
    }
}

impl Plottable for ErrorGraph {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn kind(&self) -> SeriesKind {
        SeriesKind::Graph
    }

    fn samples(&self) -> Vec<Sample> {
        self.samples.clone()
    }

    fn x_title(&self) -> &str {
        &self.x_title
    }

    fn y_title(&self) -> &str {
        &self.y_title
    }
}

/// A function sampled over an interval. Display only: curves never widen the
/// shared axis range.
#[derive(Debug, Clone)]
pub struct Curve {
    name: String,
    title: String,
    samples: Vec<Sample>,
}

impl Curve {
    /// Sample `f` at `n` evenly spaced points over `[x_low, x_high]`.
    pub fn sample(
        name: impl Into<String>,
        f: impl Fn(f64) -> f64,
        x_low: f64,
        x_high: f64,
        n: usize,
    ) -> PlotResult<Self> {
        let name = name.into();
        if n < 2 {
            return Err(PlotError::InvalidSeries(format!(
                "curve '{}' needs at least 2 sample points",
                name
            )));
        }
        if !(x_high > x_low) {
            return Err(PlotError::InvalidSeries(format!(
                "curve '{}' has an empty interval [{}, {}]",
                name, x_low, x_high
            )));
        }
        let step = (x_high - x_low) / (n - 1) as f64;
        let samples = (0..n)
            .map(|i| {
                let x = x_low + i as f64 * step;
                Sample::new(x, f(x))
            })
            .collect();
        Ok(Curve {
            title: name.clone(),
            name,
            samples,
        })
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl Plottable for Curve {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn kind(&self) -> SeriesKind {
        SeriesKind::Function
    }

    fn samples(&self) -> Vec<Sample> {
        self.samples.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_bin_centers() {
        let hist = Histogram::new("h", 0.0, 10.0, vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let samples = hist.samples();
        assert_eq!(samples.len(), 5);
        assert!((samples[0].x - 1.0).abs() < 1e-12);
        assert!((samples[4].x - 9.0).abs() < 1e-12);
        assert_eq!(samples[2].y, 3.0);
    }

    #[test]
    fn test_histogram_error_length_mismatch() {
        let result = Histogram::with_errors("h", 0.0, 1.0, vec![1.0, 2.0], vec![0.1]);
        assert!(matches!(result, Err(PlotError::InvalidSeries(_))));
    }

    #[test]
    fn test_graph_error_length_mismatch() {
        let result =
            ErrorGraph::with_asymmetric_errors("g", &[(0.0, 1.0), (1.0, 2.0)], &[0.1], &[0.1, 0.2]);
        assert!(matches!(result, Err(PlotError::InvalidSeries(_))));
    }

    #[test]
    fn test_curve_sampling() {
        let curve = Curve::sample("c", |x| x * x, 0.0, 2.0, 5).unwrap();
        let samples = curve.samples();
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0].y, 0.0);
        assert_eq!(samples[4].y, 4.0);
        assert_eq!(curve.kind(), SeriesKind::Function);
    }

    #[test]
    fn test_validate_rejects_nan_and_negative_errors() {
        assert!(validate_samples("s", &[]).is_err());
        assert!(validate_samples("s", &[Sample::new(f64::NAN, 1.0)]).is_err());
        assert!(validate_samples("s", &[Sample::new(0.0, f64::INFINITY)]).is_err());
        assert!(validate_samples("s", &[Sample::with_errors(0.0, 1.0, -0.5, 0.0)]).is_err());
        assert!(validate_samples("s", &[Sample::with_errors(0.0, 1.0, 0.5, 0.5)]).is_ok());
    }

    #[test]
    fn test_absorbed_copy_gets_fresh_name() {
        let graph = ErrorGraph::from_points("measurement", &[(0.0, 1.0)]);
        let a = Series::absorb(&graph, graph.samples());
        let b = Series::absorb(&graph, graph.samples());
        assert!(a.name().starts_with("measurement_"));
        assert_ne!(a.name(), b.name());
        assert_eq!(a.title(), "measurement");
    }

    #[test]
    fn test_sample_error_edges() {
        let s = Sample::with_errors(0.0, 10.0, 2.0, 1.0);
        assert_eq!(s.y_low(), 8.0);
        assert_eq!(s.y_high(), 11.0);
    }
}
