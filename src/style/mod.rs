//! Style assignment: cyclic color/marker palettes shared by all series of a
//! plot session.

mod color;
mod marker;

pub use color::Color;
pub use marker::Marker;

use crate::error::{PlotError, PlotResult};

/// The style handed to a series when it is registered.
///
/// `draw_order` is the 0-based registration ordinal and never changes for the
/// lifetime of the session, even when colors are later rotated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleAssignment {
    pub color: Color,
    pub marker: Marker,
    pub draw_order: usize,
}

/// Fixed color and marker cycles, read-only after construction.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Color>,
    markers: Vec<Marker>,
}

impl Palette {
    /// Build a palette from explicit cycles. Both cycles must be non-empty.
    pub fn new(colors: Vec<Color>, markers: Vec<Marker>) -> PlotResult<Self> {
        if colors.is_empty() || markers.is_empty() {
            return Err(PlotError::InvalidConfig(
                "Palette cycles must be non-empty".to_string(),
            ));
        }
        Ok(Palette { colors, markers })
    }

    /// Pick the color for a registration ordinal.
    pub fn pick_color(&self, index: usize) -> Color {
        self.colors[index % self.colors.len()]
    }

    /// Pick the marker for a registration ordinal.
    pub fn pick_marker(&self, index: usize) -> Marker {
        self.markers[index % self.markers.len()]
    }

    /// Pick the color for an ordinal shifted by a possibly negative offset.
    /// Normalizes with a true modulo, so any offset maps into the cycle.
    pub fn pick_color_offset(&self, index: usize, offset: i32) -> Color {
        let len = self.colors.len() as i64;
        let i = (index as i64 + offset as i64).rem_euclid(len);
        self.colors[i as usize]
    }

    /// Pick the marker for an ordinal shifted by a possibly negative offset.
    pub fn pick_marker_offset(&self, index: usize, offset: i32) -> Marker {
        let len = self.markers.len() as i64;
        let i = (index as i64 + offset as i64).rem_euclid(len);
        self.markers[i as usize]
    }

    pub fn color_count(&self) -> usize {
        self.colors.len()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }
}

impl Default for Palette {
    /// Six colors and five markers; series beyond those counts repeat the
    /// cycle deterministically.
    fn default() -> Self {
        Palette {
            colors: vec![
                Color::BLACK,
                Color::BLUE,
                Color::RED,
                Color::VIOLET,
                Color::ORANGE,
                Color::GREEN,
            ],
            markers: vec![
                Marker::FullCircle,
                Marker::FullSquare,
                Marker::TriangleUp,
                Marker::TriangleDown,
                Marker::OpenCircle,
            ],
        }
    }
}
