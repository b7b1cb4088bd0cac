//! Render commands.
//!
//! The plotter describes a finished plot as a flat command list; only the
//! backend turns commands into draw calls. The range/style bookkeeping never
//! touches a rendering surface directly.

/// One legend row: either a registered series (sampled with its style) or a
/// plain text note.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendItem {
    pub label: String,
    /// Index into the overlay for style lookup; `None` for notes.
    pub series: Option<usize>,
}

/// Drawing instructions for one plot, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Canvas setup. Always first.
    Frame {
        width: f64,
        height: f64,
        log_x: bool,
        log_y: bool,
        /// Tick length as a fraction of the plot area height
        tick_length: f64,
    },
    /// Resolved y-axis bounds applied before any series is drawn.
    AxisRange { y_min: f64, y_max: f64 },
    /// Axis titles and their offsets from the axis lines.
    AxisTitles {
        x: String,
        y: String,
        x_offset: f64,
        y_offset: f64,
    },
    /// Draw one registered series. `overlay` is false exactly once, for the
    /// series that establishes the frame.
    DrawSeries { index: usize, overlay: bool },
    /// Legend box with its rows.
    Legend {
        items: Vec<LegendItem>,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    /// Free-standing annotation text.
    TextBox {
        lines: Vec<String>,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
}
