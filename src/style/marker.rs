//! Marker shapes for data points.

use super::color::Color;

/// Marker shapes for data points.
///
/// The set mirrors the classic full/open point styles used for overlaid
/// measurement series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Filled circle
    FullCircle,
    /// Filled square
    FullSquare,
    /// Filled upward-pointing triangle
    TriangleUp,
    /// Filled downward-pointing triangle
    TriangleDown,
    /// Hollow circle
    OpenCircle,
}

impl Marker {
    /// Whether the marker is drawn hollow (stroked, not filled).
    pub fn is_open(&self) -> bool {
        matches!(self, Marker::OpenCircle)
    }

    /// Generate an SVG path for the marker centered at origin.
    /// Circles render as `<circle>` elements instead and return `None`.
    pub fn to_svg_path(&self, size: f64) -> Option<String> {
        match self {
            Marker::FullCircle | Marker::OpenCircle => None,
            Marker::FullSquare => {
                let s = size;
                Some(format!(
                    "M{},{} L{},{} L{},{} L{},{} Z",
                    -s, -s, s, -s, s, s, -s, s
                ))
            }
            Marker::TriangleUp => {
                let h = size * 1.1547;
                Some(format!("M0,{} L{},{} L{},{} Z", -h, -size, h * 0.5, size, h * 0.5))
            }
            Marker::TriangleDown => {
                let h = size * 1.1547;
                Some(format!("M0,{} L{},{} L{},{} Z", h, -size, -h * 0.5, size, -h * 0.5))
            }
        }
    }

    /// Render the marker at a position, returning SVG elements.
    pub fn render_at(&self, x: f64, y: f64, size: f64, color: Color) -> String {
        let radius = size / 2.0;
        let style = if self.is_open() {
            format!(
                "fill=\"none\" stroke=\"{}\" stroke-width=\"1\"",
                color.to_svg_string()
            )
        } else {
            format!("fill=\"{}\"", color.to_svg_string())
        };

        match self.to_svg_path(radius) {
            None => format!(
                "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" {}/>\n",
                x, y, radius, style
            ),
            Some(path) => format!(
                "<path d=\"{}\" transform=\"translate({:.2},{:.2})\" {}/>\n",
                path, x, y, style
            ),
        }
    }
}

impl Default for Marker {
    fn default() -> Self {
        Marker::FullCircle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circles_have_no_path() {
        assert!(Marker::FullCircle.to_svg_path(3.0).is_none());
        assert!(Marker::OpenCircle.to_svg_path(3.0).is_none());
        assert!(Marker::FullSquare.to_svg_path(3.0).is_some());
    }

    #[test]
    fn test_open_marker_renders_unfilled() {
        let svg = Marker::OpenCircle.render_at(10.0, 20.0, 4.0, Color::RED);
        assert!(svg.contains("fill=\"none\""));
        assert!(svg.contains("stroke=\"rgb(255,0,0)\""));
    }
}
