//! SVG rendering backend.

use log::warn;

use crate::command::{LegendItem, RenderCommand};
use crate::error::{PlotError, PlotResult};
use crate::overlay::Overlay;
use crate::range::LOG_FLOOR;
use crate::series::Sample;

// Pad margins as fractions of the canvas.
const MARGIN_TOP: f64 = 0.05;
const MARGIN_LEFT: f64 = 0.10;
const MARGIN_BOTTOM: f64 = 0.10;
const MARGIN_RIGHT: f64 = 0.05;

const FONT_SIZE: f64 = 9.0;
const MARKER_SIZE: f64 = 5.0;
const LINE_WIDTH: f64 = 2.0;

/// Accumulates SVG elements and assembles the document.
#[derive(Debug)]
pub struct SvgBackend {
    width: f64,
    height: f64,
    content: Vec<String>,
    defs: Vec<String>,
}

impl SvgBackend {
    pub fn new(width: f64, height: f64) -> Self {
        SvgBackend {
            width,
            height,
            content: Vec::new(),
            defs: Vec::new(),
        }
    }

    pub fn add_content(&mut self, content: String) {
        self.content.push(content);
    }

    pub fn add_def(&mut self, def: String) {
        self.defs.push(def);
    }

    pub fn render(self) -> String {
        let defs_section = if self.defs.is_empty() {
            String::new()
        } else {
            format!("  <defs>\n    {}\n  </defs>\n", self.defs.join("\n    "))
        };

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
{}  {}
</svg>"#,
            self.width,
            self.height,
            self.width,
            self.height,
            defs_section,
            self.content.join("\n  ")
        )
    }
}

/// Escape special XML characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Axis value to pixel mapping for one axis, optionally logarithmic.
#[derive(Debug, Clone, Copy)]
struct AxisMap {
    min: f64,
    max: f64,
    log: bool,
}

impl AxisMap {
    fn new(min: f64, max: f64, log: bool) -> Self {
        AxisMap { min, max, log }
    }

    /// Normalize a value to 0..1 along the axis.
    fn normalize(&self, value: f64) -> f64 {
        if self.log {
            let lo = self.min.max(LOG_FLOOR).log10();
            let hi = self.max.max(LOG_FLOOR).log10();
            if hi == lo {
                return 0.5;
            }
            (value.max(LOG_FLOOR).log10() - lo) / (hi - lo)
        } else {
            if self.max == self.min {
                return 0.5;
            }
            (value - self.min) / (self.max - self.min)
        }
    }

    /// Tick values inside the axis range.
    fn ticks(&self) -> Vec<f64> {
        if self.log {
            log_ticks(self.min, self.max)
        } else {
            nice_ticks(self.min, self.max, 6)
        }
    }
}

/// Compute "nice" numbers for tick spacing.
fn nice_number(range: f64, round: bool) -> f64 {
    let exponent = range.log10().floor();
    let fraction = range / 10_f64.powf(exponent);

    let nice_fraction = if round {
        if fraction < 1.5 {
            1.0
        } else if fraction < 3.0 {
            2.0
        } else if fraction < 7.0 {
            5.0
        } else {
            10.0
        }
    } else if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };

    nice_fraction * 10_f64.powf(exponent)
}

/// Generate nice tick positions inside a range.
fn nice_ticks(min: f64, max: f64, num_ticks: usize) -> Vec<f64> {
    if !(max > min) || num_ticks < 2 {
        return vec![min];
    }

    let range = nice_number(max - min, false);
    let spacing = nice_number(range / (num_ticks - 1) as f64, true);
    let nice_min = (min / spacing).floor() * spacing;
    let nice_max = (max / spacing).ceil() * spacing;

    let mut ticks = Vec::new();
    let mut tick = nice_min;
    while tick <= nice_max + spacing * 0.5 {
        if tick >= min - spacing * 0.001 && tick <= max + spacing * 0.001 {
            ticks.push(tick);
        }
        tick += spacing;
    }
    ticks
}

/// Decade ticks for a logarithmic axis.
fn log_ticks(min: f64, max: f64) -> Vec<f64> {
    let lo = min.max(LOG_FLOOR).log10().ceil() as i32;
    let hi = max.max(LOG_FLOOR).log10().floor() as i32;
    (lo..=hi).map(|exp| 10_f64.powi(exp)).collect()
}

fn format_tick(value: f64) -> String {
    let abs = value.abs();
    if value == 0.0 {
        "0".to_string()
    } else if !(1e-3..1e4).contains(&abs) {
        format!("{:e}", value)
    } else if abs.fract() == 0.0 || abs >= 100.0 {
        format!("{:.0}", value)
    } else {
        let s = format!("{:.3}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// X bounds over every registered series, padded when degenerate.
fn x_bounds(overlay: &Overlay, log_x: bool) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for entry in overlay.iter() {
        for s in entry.series().samples() {
            if s.x < min {
                min = s.x;
            }
            if s.x > max {
                max = s.x;
            }
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if min == max {
        min -= 0.5;
        max += 0.5;
    }
    if log_x && min <= 0.0 {
        warn!("x values not positive, clamping log x axis minimum");
        min = LOG_FLOOR;
    }
    (min, max)
}

/// Render a command list against its overlay into an SVG document.
pub fn render(overlay: &Overlay, commands: &[RenderCommand]) -> PlotResult<String> {
    let (width, height, log_x, log_y, tick_length) = commands
        .iter()
        .find_map(|c| match c {
            RenderCommand::Frame {
                width,
                height,
                log_x,
                log_y,
                tick_length,
            } => Some((*width, *height, *log_x, *log_y, *tick_length)),
            _ => None,
        })
        .ok_or_else(|| PlotError::InvalidConfig("command list has no frame".to_string()))?;
    let (y_min, y_max) = commands
        .iter()
        .find_map(|c| match c {
            RenderCommand::AxisRange { y_min, y_max } => Some((*y_min, *y_max)),
            _ => None,
        })
        .ok_or_else(|| PlotError::InvalidConfig("command list has no axis range".to_string()))?;

    let (x_min, x_max) = x_bounds(overlay, log_x);
    let x_map = AxisMap::new(x_min, x_max, log_x);
    let y_map = AxisMap::new(y_min, y_max, log_y);

    // Plot area in pixels
    let px_left = MARGIN_LEFT * width;
    let px_right = (1.0 - MARGIN_RIGHT) * width;
    let px_top = MARGIN_TOP * height;
    let px_bottom = (1.0 - MARGIN_BOTTOM) * height;

    let to_px = |x: f64| px_left + x_map.normalize(x) * (px_right - px_left);
    let to_py = |y: f64| px_bottom - y_map.normalize(y) * (px_bottom - px_top);
    // Normalized canvas coordinates (bottom-origin) to pixels
    let ndc_x = |v: f64| v * width;
    let ndc_y = |v: f64| (1.0 - v) * height;

    let mut backend = SvgBackend::new(width, height);
    backend.add_content(format!(
        "<rect width=\"{}\" height=\"{}\" fill=\"white\"/>",
        width, height
    ));

    draw_axes(&mut backend, &x_map, &y_map, px_left, px_right, px_top, px_bottom, tick_length);

    // Series are clipped to the plot area
    backend.add_def(format!(
        "<clipPath id=\"plot-area\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\"/></clipPath>",
        px_left,
        px_top,
        px_right - px_left,
        px_bottom - px_top
    ));
    backend.add_content("<g clip-path=\"url(#plot-area)\">".to_string());
    for command in commands {
        if let RenderCommand::DrawSeries { index, .. } = command {
            if let Some(entry) = overlay.get(*index) {
                draw_series(&mut backend, entry.series().samples(), entry, &to_px, &to_py);
            }
        }
    }
    backend.add_content("</g>".to_string());

    for command in commands {
        match command {
            RenderCommand::AxisTitles { x, y, x_offset, y_offset } => {
                draw_axis_titles(&mut backend, x, y, *x_offset, *y_offset, px_left, px_right, px_top, px_bottom, height);
            }
            RenderCommand::Legend { items, x1, y1, x2, y2 } => {
                draw_legend(&mut backend, overlay, items, ndc_x(*x1), ndc_y(*y2), ndc_x(*x2), ndc_y(*y1));
            }
            RenderCommand::TextBox { lines, x1, y1, x2, y2 } => {
                draw_text_box(&mut backend, lines, ndc_x(*x1), ndc_y(*y2), ndc_x(*x2), ndc_y(*y1));
            }
            _ => {}
        }
    }

    Ok(backend.render())
}

#[allow(clippy::too_many_arguments)]
fn draw_axes(
    backend: &mut SvgBackend,
    x_map: &AxisMap,
    y_map: &AxisMap,
    px_left: f64,
    px_right: f64,
    px_top: f64,
    px_bottom: f64,
    tick_length: f64,
) {
    let tick_px = tick_length * (px_bottom - px_top);

    backend.add_content(format!(
        "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"black\" stroke-width=\"1\"/>",
        px_left, px_bottom, px_right, px_bottom
    ));
    backend.add_content(format!(
        "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"black\" stroke-width=\"1\"/>",
        px_left, px_top, px_left, px_bottom
    ));

    for tick in x_map.ticks() {
        let px = px_left + x_map.normalize(tick) * (px_right - px_left);
        backend.add_content(format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"black\" stroke-width=\"1\"/>",
            px,
            px_bottom,
            px,
            px_bottom - tick_px
        ));
        backend.add_content(format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"{}\">{}</text>",
            px,
            px_bottom + FONT_SIZE + 2.0,
            FONT_SIZE,
            format_tick(tick)
        ));
    }

    for tick in y_map.ticks() {
        let py = px_bottom - y_map.normalize(tick) * (px_bottom - px_top);
        backend.add_content(format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"black\" stroke-width=\"1\"/>",
            px_left,
            py,
            px_left + tick_px,
            py
        ));
        backend.add_content(format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\" dominant-baseline=\"middle\" font-size=\"{}\">{}</text>",
            px_left - 3.0,
            py,
            FONT_SIZE,
            format_tick(tick)
        ));
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_axis_titles(
    backend: &mut SvgBackend,
    x_title: &str,
    y_title: &str,
    x_offset: f64,
    y_offset: f64,
    px_left: f64,
    px_right: f64,
    px_top: f64,
    px_bottom: f64,
    height: f64,
) {
    if !x_title.is_empty() {
        let x = (px_left + px_right) / 2.0;
        let y = (px_bottom + (FONT_SIZE + 10.0) * x_offset).min(height - 2.0);
        backend.add_content(format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"{}\">{}</text>",
            x,
            y,
            FONT_SIZE,
            escape_xml(x_title)
        ));
    }
    if !y_title.is_empty() {
        let x = (px_left - (FONT_SIZE + 8.0) * y_offset).max(FONT_SIZE);
        let y = (px_top + px_bottom) / 2.0;
        backend.add_content(format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"{}\" transform=\"rotate(-90,{:.2},{:.2})\">{}</text>",
            x,
            y,
            FONT_SIZE,
            x,
            y,
            escape_xml(y_title)
        ));
    }
}

fn draw_series(
    backend: &mut SvgBackend,
    samples: &[Sample],
    entry: &crate::overlay::RegisteredSeries,
    to_px: &dyn Fn(f64) -> f64,
    to_py: &dyn Fn(f64) -> f64,
) {
    let color = entry.style().color;
    let opts = entry.draw_options();

    if opts.line {
        let points: String = samples
            .iter()
            .map(|s| format!("{:.2},{:.2}", to_px(s.x), to_py(s.y)))
            .collect::<Vec<_>>()
            .join(" ");
        backend.add_content(format!(
            "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
            points,
            color.to_svg_string(),
            LINE_WIDTH
        ));
    }

    if opts.error_bars {
        for s in samples {
            if s.err_low == 0.0 && s.err_high == 0.0 {
                continue;
            }
            backend.add_content(format!(
                "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"1\"/>",
                to_px(s.x),
                to_py(s.y_low()),
                to_px(s.x),
                to_py(s.y_high()),
                color.to_svg_string()
            ));
        }
    }

    if opts.markers {
        for s in samples {
            backend.add_content(
                entry
                    .style()
                    .marker
                    .render_at(to_px(s.x), to_py(s.y), MARKER_SIZE, color)
                    .trim_end()
                    .to_string(),
            );
        }
    }
}

fn draw_legend(
    backend: &mut SvgBackend,
    overlay: &Overlay,
    items: &[LegendItem],
    left: f64,
    top: f64,
    _right: f64,
    bottom: f64,
) {
    if items.is_empty() {
        return;
    }
    let row_height = ((bottom - top) / items.len() as f64).min(FONT_SIZE * 1.6);
    let sample_len = 16.0;

    for (i, item) in items.iter().enumerate() {
        let y = top + (i as f64 + 0.5) * row_height;
        let mut text_x = left;

        if let Some(entry) = item.series.and_then(|index| overlay.get(index)) {
            let color = entry.style().color;
            let opts = entry.draw_options();
            if opts.line {
                backend.add_content(format!(
                    "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{}\"/>",
                    left,
                    y,
                    left + sample_len,
                    y,
                    color.to_svg_string(),
                    LINE_WIDTH
                ));
            }
            if opts.markers {
                backend.add_content(
                    entry
                        .style()
                        .marker
                        .render_at(left + sample_len / 2.0, y, MARKER_SIZE, color)
                        .trim_end()
                        .to_string(),
                );
            }
            text_x += sample_len + 5.0;
        }

        backend.add_content(format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" dominant-baseline=\"middle\" font-size=\"{}\">{}</text>",
            text_x,
            y,
            FONT_SIZE,
            escape_xml(&item.label)
        ));
    }
}

fn draw_text_box(
    backend: &mut SvgBackend,
    lines: &[String],
    left: f64,
    top: f64,
    _right: f64,
    bottom: f64,
) {
    if lines.is_empty() {
        return;
    }
    let row_height = ((bottom - top) / lines.len() as f64).min(FONT_SIZE * 1.6);
    for (i, line) in lines.iter().enumerate() {
        let y = top + (i as f64 + 0.5) * row_height;
        backend.add_content(format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" dominant-baseline=\"middle\" font-size=\"{}\">{}</text>",
            left,
            y,
            FONT_SIZE,
            escape_xml(line)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plotter::Plotter;
    use crate::series::ErrorGraph;

    fn session() -> Plotter {
        let mut plotter = Plotter::new("test");
        let graph = ErrorGraph::with_asymmetric_errors(
            "signal",
            &[(0.0, 10.0), (1.0, 20.0), (2.0, 30.0)],
            &[1.0, 1.0, 1.0],
            &[1.0, 1.0, 1.0],
        )
        .unwrap();
        plotter.add_graph(&graph).unwrap();
        plotter
    }

    #[test]
    fn test_render_produces_document() {
        let plotter = session();
        let commands = plotter.draw().unwrap();
        let svg = render(plotter.overlay(), &commands).unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("<svg"));
        assert!(svg.ends_with("</svg>"));
        // markers, error bars and the legend label all present
        assert!(svg.contains("<circle"));
        assert!(svg.contains("signal"));
    }

    #[test]
    fn test_render_without_frame_fails() {
        let plotter = session();
        let result = render(plotter.overlay(), &[]);
        assert!(matches!(result, Err(PlotError::InvalidConfig(_))));
    }

    #[test]
    fn test_nice_ticks_cover_range() {
        let ticks = nice_ticks(0.0, 10.0, 6);
        assert!(ticks.len() >= 3);
        assert!(ticks.iter().all(|&t| (-0.01..=10.01).contains(&t)));
    }

    #[test]
    fn test_log_ticks_are_decades() {
        let ticks = log_ticks(0.5, 2000.0);
        assert_eq!(ticks, vec![1.0, 10.0, 100.0, 1000.0]);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(5.0), "5");
        assert_eq!(format_tick(2.5), "2.5");
        assert_eq!(format_tick(1e-6), "1e-6");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
