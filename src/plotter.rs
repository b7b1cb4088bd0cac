//! Plot session facade: collects series, presentation settings and notes,
//! then describes the finished plot as a render command list.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::backend::svg;
use crate::command::{LegendItem, RenderCommand};
use crate::error::PlotResult;
use crate::legend::{LegendBox, TextBox};
use crate::overlay::{Overlay, RegisteredSeries};
use crate::series::{Curve, DrawOptions, ErrorGraph, Histogram, Plottable, SeriesKind};
use crate::style::StyleAssignment;

/// One output artifact in the making.
///
/// Construction takes the output base name; the fixed extension is owned by
/// the backend and appended at save time.
#[derive(Debug, Clone)]
pub struct Plotter {
    overlay: Overlay,
    out_name: String,
    width: f64,
    height: f64,
    x_label: String,
    y_label: String,
    x_offset: f64,
    y_offset: f64,
    tick_length: f64,
    log_x: bool,
    log_y: bool,
    legend: LegendBox,
    notes: Vec<String>,
    text_box: TextBox,
}

impl Plotter {
    pub fn new(out_name: impl Into<String>) -> Self {
        Plotter {
            overlay: Overlay::new(),
            out_name: out_name.into(),
            width: 350.0,
            height: 350.0,
            x_label: String::new(),
            y_label: String::new(),
            x_offset: 1.0,
            y_offset: 1.5,
            tick_length: 0.03,
            log_x: false,
            log_y: false,
            legend: LegendBox::default(),
            notes: Vec::new(),
            text_box: TextBox::default(),
        }
    }

    /// Register any plottable source.
    ///
    /// Axis labels are captured from the first registered series when the
    /// caller has not set them explicitly.
    pub fn add_series(&mut self, source: &dyn Plottable) -> PlotResult<StyleAssignment> {
        let capture_labels = self.overlay.is_empty();
        let style = self.overlay.register(source)?;
        if capture_labels {
            if self.x_label.is_empty() {
                self.x_label = source.x_title().to_string();
            }
            if self.y_label.is_empty() {
                self.y_label = source.y_title().to_string();
            }
        }
        debug!(
            "registered series '{}' as object {}",
            source.name(),
            style.draw_order
        );
        Ok(style)
    }

    pub fn add_histogram(&mut self, hist: &Histogram) -> PlotResult<StyleAssignment> {
        self.add_series(hist)
    }

    pub fn add_graph(&mut self, graph: &ErrorGraph) -> PlotResult<StyleAssignment> {
        self.add_series(graph)
    }

    pub fn add_curve(&mut self, curve: &Curve) -> PlotResult<StyleAssignment> {
        self.add_series(curve)
    }

    pub fn set_x_label(&mut self, label: impl Into<String>) {
        self.x_label = label.into();
    }

    pub fn set_y_label(&mut self, label: impl Into<String>) {
        self.y_label = label.into();
    }

    pub fn x_label(&self) -> &str {
        &self.x_label
    }

    pub fn y_label(&self) -> &str {
        &self.y_label
    }

    pub fn set_log_x(&mut self, val: bool) {
        self.log_x = val;
    }

    pub fn set_log_y(&mut self, val: bool) {
        self.log_y = val;
    }

    pub fn set_x_offset(&mut self, val: f64) {
        self.x_offset = val;
    }

    pub fn set_y_offset(&mut self, val: f64) {
        self.y_offset = val;
    }

    pub fn set_tick_length(&mut self, val: f64) {
        self.tick_length = val;
    }

    pub fn tick_length(&self) -> f64 {
        self.tick_length
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn set_draw_legend(&mut self, val: bool) {
        self.legend.visible = val;
    }

    /// Move the legend by naming halves of the canvas, e.g. "UpLeft".
    pub fn set_legend_placement(&mut self, placement: &str) {
        self.legend.place(placement);
    }

    pub fn legend_mut(&mut self) -> &mut LegendBox {
        &mut self.legend
    }

    pub fn text_box_mut(&mut self) -> &mut TextBox {
        &mut self.text_box
    }

    /// Append a text-only legend row.
    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn add_notes(&mut self, notes: &[String]) {
        for note in notes {
            self.notes.push(note.clone());
        }
    }

    /// Append the render date as a note.
    pub fn add_date_note(&mut self) {
        self.notes
            .push(chrono::Local::now().format("%d %b %Y").to_string());
    }

    /// Replace the draw options of a registered series.
    pub fn set_draw_options(&mut self, index: usize, draw: DrawOptions) -> PlotResult<()> {
        self.overlay.set_draw_options(index, draw)
    }

    /// Re-style all graph-kind series, see [`Overlay::rotate_graph_styles`].
    pub fn rotate_graph_styles(&mut self, offset: i32) {
        self.overlay.rotate_graph_styles(offset);
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn out_name(&self) -> &str {
        &self.out_name
    }

    pub fn set_out_name(&mut self, name: impl Into<String>) {
        self.out_name = name.into();
    }

    /// Indices of registered series grouped for drawing: histograms first,
    /// then graphs, then function curves, each group in registration order.
    fn draw_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.overlay.len());
        for kind in [SeriesKind::Histogram, SeriesKind::Graph, SeriesKind::Function] {
            for (i, entry) in self.overlay.iter().enumerate() {
                if entry.series().kind() == kind {
                    order.push(i);
                }
            }
        }
        order
    }

    /// Describe the finished plot as a command list.
    ///
    /// Resolves the axis range for the current scale, then emits frame, axis,
    /// series, legend and annotation commands. The plotter state is not
    /// modified, so `draw` can be called again after toggling settings.
    pub fn draw(&self) -> PlotResult<Vec<RenderCommand>> {
        let (y_min, y_max) = self.overlay.resolve_axis_range(self.log_y)?;

        let mut commands = Vec::new();
        commands.push(RenderCommand::Frame {
            width: self.width,
            height: self.height,
            log_x: self.log_x,
            log_y: self.log_y,
            tick_length: self.tick_length,
        });
        commands.push(RenderCommand::AxisRange { y_min, y_max });
        commands.push(RenderCommand::AxisTitles {
            x: self.x_label.clone(),
            y: self.y_label.clone(),
            x_offset: self.x_offset,
            y_offset: self.y_offset,
        });

        for (n_drawn, index) in self.draw_order().into_iter().enumerate() {
            commands.push(RenderCommand::DrawSeries {
                index,
                overlay: n_drawn > 0,
            });
        }

        if self.legend.visible {
            let mut items: Vec<LegendItem> = self
                .draw_order()
                .into_iter()
                .map(|index| LegendItem {
                    label: self
                        .overlay
                        .get(index)
                        .map(|e: &RegisteredSeries| e.series().title().to_string())
                        .unwrap_or_default(),
                    series: Some(index),
                })
                .collect();
            for note in &self.notes {
                items.push(LegendItem {
                    label: note.clone(),
                    series: None,
                });
            }
            commands.push(RenderCommand::Legend {
                items,
                x1: self.legend.x1,
                y1: self.legend.y1,
                x2: self.legend.x2,
                y2: self.legend.y2,
            });
        }

        if self.text_box.visible && !self.text_box.lines.is_empty() {
            commands.push(RenderCommand::TextBox {
                lines: self.text_box.lines.clone(),
                x1: self.text_box.x1,
                y1: self.text_box.y1,
                x2: self.text_box.x2,
                y2: self.text_box.y2,
            });
        }

        Ok(commands)
    }

    /// Render and write `<out_name>.svg`.
    pub fn save(&self) -> PlotResult<PathBuf> {
        let path = PathBuf::from(format!("{}.svg", self.out_name));
        self.save_to(&path)?;
        Ok(path)
    }

    /// Render and write to an explicit path.
    pub fn save_to(&self, path: impl AsRef<Path>) -> PlotResult<()> {
        let commands = self.draw()?;
        let rendered = svg::render(&self.overlay, &commands)?;
        let mut file = File::create(path.as_ref())?;
        file.write_all(rendered.as_bytes())?;
        info!("plot written to {}", path.as_ref().display());
        Ok(())
    }
}
