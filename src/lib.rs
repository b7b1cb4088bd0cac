//! Overlay plotting front end.
//!
//! Collects histograms, error-bar graphs and function curves into one plot
//! session, hands every series a deterministic color and marker from fixed
//! cyclic palettes, tracks running y-bounds with and without error bars, and
//! resolves padded axis ranges for linear or logarithmic display. A finished
//! plot is described as a render command list and written out as SVG.
//!
//! ```no_run
//! use overplot::prelude::*;
//!
//! let mut plotter = Plotter::new("comparison");
//! let measured = ErrorGraph::from_points("measured", &[(0.0, 10.0), (1.0, 20.0)]);
//! plotter.add_graph(&measured)?;
//! plotter.save()?;
//! # Ok::<(), overplot::PlotError>(())
//! ```

pub mod backend;
pub mod command;
pub mod error;
pub mod io;
pub mod legend;
pub mod overlay;
pub mod plotter;
pub mod range;
pub mod series;
pub mod style;

pub use command::{LegendItem, RenderCommand};
pub use error::{PlotError, PlotResult};
pub use overlay::{Overlay, RegisteredSeries};
pub use plotter::Plotter;
pub use range::{RangeState, SeriesRange};
pub use series::{Curve, DrawOptions, ErrorGraph, Histogram, Plottable, Sample, Series, SeriesKind};
pub use style::{Color, Marker, Palette, StyleAssignment};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{PlotError, PlotResult};
    pub use crate::overlay::Overlay;
    pub use crate::plotter::Plotter;
    pub use crate::series::{
        Curve, DrawOptions, ErrorGraph, Histogram, Plottable, Sample, SeriesKind,
    };
    pub use crate::style::{Color, Marker, Palette, StyleAssignment};
}
