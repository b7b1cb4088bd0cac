//! The overlay: deterministic style assignment plus running bound tracking
//! for every series that will share one set of axes.

use crate::error::{PlotError, PlotResult};
use crate::range::{RangeState, SeriesRange};
use crate::series::{validate_samples, DrawOptions, Plottable, Series, SeriesKind};
use crate::style::{Palette, StyleAssignment};

/// One registered series together with its session state.
#[derive(Debug, Clone)]
pub struct RegisteredSeries {
    series: Series,
    style: StyleAssignment,
    draw: DrawOptions,
}

impl RegisteredSeries {
    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn style(&self) -> &StyleAssignment {
        &self.style
    }

    pub fn draw_options(&self) -> DrawOptions {
        self.draw
    }
}

/// Collects series for one plot session.
///
/// Each registration absorbs a private copy of the caller's object, hands it
/// the next color/marker from the palette cycles and folds its y-bounds into
/// the shared [`RangeState`]. Function curves are display only and skip the
/// bound update.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    entries: Vec<RegisteredSeries>,
    palette: Palette,
    range: RangeState,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// An overlay with custom style cycles.
    pub fn with_palette(palette: Palette) -> Self {
        Overlay {
            entries: Vec::new(),
            palette,
            range: RangeState::new(),
        }
    }

    /// Register a series and return its style.
    ///
    /// The k-th registration (0-based) gets `draw_order = k`, the k-th color
    /// and the k-th marker of the cycles. The assignment is stable for the
    /// whole session. A rejected series leaves every aggregate exactly as it
    /// was.
    pub fn register(&mut self, source: &dyn Plottable) -> PlotResult<StyleAssignment> {
        let samples = source.samples();
        validate_samples(source.name(), &samples)?;

        let order = self.entries.len();
        let style = StyleAssignment {
            color: self.palette.pick_color(order),
            marker: self.palette.pick_marker(order),
            draw_order: order,
        };

        if source.kind() != SeriesKind::Function {
            // scan cannot fail here, validation guarantees samples exist
            if let Some(range) = SeriesRange::scan(&samples) {
                self.range.observe(&range);
            }
        }

        let draw = DrawOptions::for_kind(source.kind());
        self.entries.push(RegisteredSeries {
            series: Series::absorb(source, samples),
            style,
            draw,
        });

        Ok(style)
    }

    /// Resolve displayed axis bounds for the current data.
    ///
    /// Fails with [`PlotError::EmptyRange`] while no range-contributing
    /// series is registered. Pure with respect to the overlay, so it can be
    /// called repeatedly with either scale.
    pub fn resolve_axis_range(&self, log_scale: bool) -> PlotResult<(f64, f64)> {
        self.range.resolve(log_scale)
    }

    /// Re-style all graph-kind series by shifting their cycle position.
    ///
    /// Histograms and function curves keep their styles; `draw_order` is not
    /// touched. Offsets of any sign are normalized with a true modulo.
    pub fn rotate_graph_styles(&mut self, offset: i32) {
        for entry in &mut self.entries {
            if entry.series.kind() != SeriesKind::Graph {
                continue;
            }
            let order = entry.style.draw_order;
            entry.style.color = self.palette.pick_color_offset(order, offset);
            entry.style.marker = self.palette.pick_marker_offset(order, offset);
        }
    }

    /// Replace the draw options of a registered series.
    pub fn set_draw_options(&mut self, index: usize, draw: DrawOptions) -> PlotResult<()> {
        let len = self.entries.len();
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.draw = draw;
                Ok(())
            }
            None => Err(PlotError::IndexOutOfRange { index, len }),
        }
    }

    pub fn get(&self, index: usize) -> Option<&RegisteredSeries> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredSeries> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn range_state(&self) -> &RangeState {
        &self.range
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{Curve, ErrorGraph, Histogram, Sample};

    fn graph(name: &str, values: &[f64]) -> ErrorGraph {
        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, &y)| (i as f64, y))
            .collect();
        ErrorGraph::from_points(name, &points)
    }

    #[test]
    fn test_styles_follow_registration_order() {
        let mut overlay = Overlay::new();
        for i in 0..8 {
            let style = overlay.register(&graph(&format!("g{}", i), &[1.0])).unwrap();
            assert_eq!(style.draw_order, i);
            assert_eq!(style.color, overlay.palette().pick_color(i));
            assert_eq!(style.marker, overlay.palette().pick_marker(i));
        }
        // 7th and 8th series wrap the cycles
        let first = overlay.get(0).unwrap().style();
        let seventh = overlay.get(6).unwrap().style();
        assert_eq!(first.color, seventh.color);
        assert_ne!(first.marker, seventh.marker);
    }

    #[test]
    fn test_register_merges_ranges() {
        let mut overlay = Overlay::new();
        overlay.register(&graph("a", &[10.0, 20.0])).unwrap();
        overlay.register(&graph("b", &[5.0, 25.0])).unwrap();
        assert_eq!(overlay.range_state().y_min(), 5.0);
        assert_eq!(overlay.range_state().y_max(), 25.0);
    }

    #[test]
    fn test_function_curves_do_not_contribute_to_range() {
        let mut overlay = Overlay::new();
        let curve = Curve::sample("big", |_| 1e6, 0.0, 1.0, 10).unwrap();
        overlay.register(&curve).unwrap();
        assert!(overlay.range_state().is_empty());
        assert!(matches!(
            overlay.resolve_axis_range(false),
            Err(PlotError::EmptyRange)
        ));

        overlay.register(&graph("g", &[1.0, 2.0])).unwrap();
        assert_eq!(overlay.range_state().y_max(), 2.0);
        // the curve still consumed a style slot
        assert_eq!(overlay.get(1).unwrap().style().draw_order, 1);
    }

    #[test]
    fn test_failed_register_leaves_state_untouched() {
        let mut overlay = Overlay::new();
        overlay.register(&graph("good", &[1.0, 2.0])).unwrap();
        let before = overlay.range_state().clone();

        let bad = ErrorGraph::from_points("bad", &[(0.0, f64::NAN)]);
        assert!(overlay.register(&bad).is_err());

        assert_eq!(overlay.len(), 1);
        assert_eq!(overlay.range_state().y_min(), before.y_min());
        assert_eq!(overlay.range_state().y_max(), before.y_max());
        // the next good series picks up the ordinal the bad one did not take
        let style = overlay.register(&graph("next", &[3.0])).unwrap();
        assert_eq!(style.draw_order, 1);
    }

    #[test]
    fn test_rotation_shifts_graph_styles_only() {
        let mut overlay = Overlay::new();
        let hist = Histogram::new("h", 0.0, 1.0, vec![1.0]).unwrap();
        overlay.register(&hist).unwrap();
        overlay.register(&graph("g1", &[1.0])).unwrap();
        overlay.register(&graph("g2", &[2.0])).unwrap();

        let hist_style = *overlay.get(0).unwrap().style();
        overlay.rotate_graph_styles(1);

        // histogram untouched
        assert_eq!(*overlay.get(0).unwrap().style(), hist_style);
        // graphs re-indexed by +1, draw order unchanged
        let g1 = overlay.get(1).unwrap().style();
        assert_eq!(g1.color, overlay.palette().pick_color(2));
        assert_eq!(g1.draw_order, 1);
        let g2 = overlay.get(2).unwrap().style();
        assert_eq!(g2.color, overlay.palette().pick_color(3));
    }

    #[test]
    fn test_rotation_example_three_graphs() {
        let mut overlay = Overlay::new();
        for name in ["a", "b", "c"] {
            overlay.register(&graph(name, &[1.0])).unwrap();
        }
        overlay.rotate_graph_styles(1);
        for (i, entry) in overlay.iter().enumerate() {
            assert_eq!(entry.style().color, overlay.palette().pick_color(i + 1));
        }
    }

    #[test]
    fn test_rotation_negative_offset_wraps() {
        let mut overlay = Overlay::new();
        overlay.register(&graph("g", &[1.0])).unwrap();
        overlay.rotate_graph_styles(-1);
        let style = overlay.get(0).unwrap().style();
        assert_eq!(style.color, overlay.palette().pick_color(5));
        assert_eq!(style.marker, overlay.palette().pick_marker(4));
    }

    #[test]
    fn test_error_widening_single_series() {
        let mut overlay = Overlay::new();
        let g = ErrorGraph::with_asymmetric_errors("g", &[(0.0, 10.0)], &[2.0], &[1.0]).unwrap();
        overlay.register(&g).unwrap();
        let state = overlay.range_state();
        assert_eq!(state.y_min(), 8.0);
        assert_eq!(state.y_max(), 11.0);
        assert_eq!(state.y_min_no_err(), 10.0);
    }

    #[test]
    fn test_set_draw_options_bounds_check() {
        let mut overlay = Overlay::new();
        overlay.register(&graph("g", &[1.0])).unwrap();
        let opts = DrawOptions {
            line: true,
            markers: false,
            error_bars: false,
        };
        assert!(overlay.set_draw_options(0, opts).is_ok());
        assert_eq!(overlay.get(0).unwrap().draw_options(), opts);
        assert!(matches!(
            overlay.set_draw_options(5, opts),
            Err(PlotError::IndexOutOfRange { index: 5, len: 1 })
        ));
    }

    #[test]
    fn test_custom_palette_cycles() {
        use crate::style::{Color, Marker, Palette};

        let palette = Palette::new(
            vec![Color::RED, Color::BLUE],
            vec![Marker::OpenCircle],
        )
        .unwrap();
        let mut overlay = Overlay::with_palette(palette);
        for i in 0..3 {
            overlay.register(&graph(&format!("g{}", i), &[1.0])).unwrap();
        }
        assert_eq!(overlay.get(0).unwrap().style().color, Color::RED);
        assert_eq!(overlay.get(1).unwrap().style().color, Color::BLUE);
        assert_eq!(overlay.get(2).unwrap().style().color, Color::RED);
        assert_eq!(overlay.get(2).unwrap().style().marker, Marker::OpenCircle);
    }

    #[test]
    fn test_absorbed_samples_survive_caller_changes() {
        let mut overlay = Overlay::new();
        let samples = [Sample::new(0.0, 1.0), Sample::new(1.0, 2.0)];
        let g = ErrorGraph::from_points("g", &[(0.0, 1.0), (1.0, 2.0)]);
        overlay.register(&g).unwrap();
        drop(g);
        assert_eq!(overlay.get(0).unwrap().series().samples(), &samples);
    }
}
