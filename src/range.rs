//! Running y-bounds across registered series and axis-range resolution with
//! linear or logarithmic padding.

use log::{debug, warn};

use crate::error::{PlotError, PlotResult};
use crate::series::Sample;

/// Fractional padding applied to each bound under linear scale.
const LINEAR_PAD: f64 = 0.1;
/// Lower/upper scale factors under logarithmic scale.
const LOG_LOW_SCALE: f64 = 0.5;
const LOG_HIGH_SCALE: f64 = 1.5;
/// Fraction of the maximum used as the last data-derived fallback minimum.
const LOG_FALLBACK_SCALE: f64 = 0.1;
/// Display floor when no positive minimum can be derived at all. A sentinel,
/// not a statistically meaningful bound.
pub const LOG_FLOOR: f64 = 1e-9;

/// Per-series y-bounds from one scan over its samples.
///
/// The minimum is tracked twice: once widened by the low error and once on
/// the bare values. The maximum is always error-inclusive; that asymmetry
/// matches the long-observed behavior of this layer and is kept as is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesRange {
    pub min_with_err: f64,
    pub max_with_err: f64,
    pub min_no_err: f64,
}

impl SeriesRange {
    /// Scan samples for their bounds. Returns `None` for an empty slice.
    pub fn scan(samples: &[Sample]) -> Option<Self> {
        let first = samples.first()?;
        let mut range = SeriesRange {
            min_with_err: first.y_low(),
            max_with_err: first.y_high(),
            min_no_err: first.y,
        };
        for s in &samples[1..] {
            if s.y_low() < range.min_with_err {
                range.min_with_err = s.y_low();
            }
            if s.y_high() > range.max_with_err {
                range.max_with_err = s.y_high();
            }
            if s.y < range.min_no_err {
                range.min_no_err = s.y;
            }
        }
        Some(range)
    }
}

/// Aggregate y-bounds over all range-contributing series of one session.
///
/// Resets only when a new session begins; there is no cross-session state.
#[derive(Debug, Clone, Default)]
pub struct RangeState {
    y_min: f64,
    y_max: f64,
    y_min_no_err: f64,
    observed: usize,
}

impl RangeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one series' bounds into the aggregate. The first observation
    /// initializes all fields; later ones merge elementwise.
    pub fn observe(&mut self, range: &SeriesRange) {
        if self.observed == 0 {
            self.y_min = range.min_with_err;
            self.y_max = range.max_with_err;
            self.y_min_no_err = range.min_no_err;
        } else {
            if range.min_with_err < self.y_min {
                self.y_min = range.min_with_err;
            }
            if range.max_with_err > self.y_max {
                self.y_max = range.max_with_err;
            }
            if range.min_no_err < self.y_min_no_err {
                self.y_min_no_err = range.min_no_err;
            }
        }
        self.observed += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.observed == 0
    }

    /// Error-inclusive minimum.
    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    /// Error-inclusive maximum.
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Minimum of bare y values, the log-scale fallback.
    pub fn y_min_no_err(&self) -> f64 {
        self.y_min_no_err
    }

    /// Resolve displayed axis bounds from the raw data bounds.
    ///
    /// Linear scale pads each bound by 10% of its own magnitude. Logarithmic
    /// scale starts from half the minimum and 1.5x the maximum, then walks a
    /// fallback chain until the lower bound is positive: the bare-value
    /// minimum, a tenth of the maximum, and finally a fixed display floor.
    ///
    /// Pure: reads the aggregate, never writes it, so callers may re-resolve
    /// freely (e.g. when toggling log scale).
    pub fn resolve(&self, log_scale: bool) -> PlotResult<(f64, f64)> {
        if self.is_empty() {
            return Err(PlotError::EmptyRange);
        }

        let (resolved_min, resolved_max) = if log_scale {
            let max = LOG_HIGH_SCALE * self.y_max;
            let mut min = LOG_LOW_SCALE * self.y_min;
            if min <= 0.0 {
                debug!("log-scale minimum not positive, falling back to bare values");
                min = LOG_LOW_SCALE * self.y_min_no_err;
            }
            if min <= 0.0 {
                debug!("log-scale minimum still not positive, deriving from the maximum");
                min = LOG_FALLBACK_SCALE * self.y_max;
            }
            if min <= 0.0 {
                warn!(
                    "no usable positive minimum for log scale, clamping to {:e}",
                    LOG_FLOOR
                );
                min = LOG_FLOOR;
            }
            (min, max)
        } else {
            (
                self.y_min - LINEAR_PAD * self.y_min.abs(),
                self.y_max + LINEAR_PAD * self.y_max.abs(),
            )
        };

        if resolved_max <= resolved_min {
            warn!(
                "resolved axis range is not increasing ({} .. {})",
                resolved_min, resolved_max
            );
        }

        Ok((resolved_min, resolved_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> SeriesRange {
        let samples: Vec<Sample> = values
            .iter()
            .enumerate()
            .map(|(i, &y)| Sample::new(i as f64, y))
            .collect();
        SeriesRange::scan(&samples).unwrap()
    }

    #[test]
    fn test_scan_empty_is_none() {
        assert!(SeriesRange::scan(&[]).is_none());
    }

    #[test]
    fn test_scan_errors_widen_outward() {
        let samples = [Sample::with_errors(0.0, 10.0, 2.0, 1.0)];
        let range = SeriesRange::scan(&samples).unwrap();
        assert_eq!(range.min_with_err, 8.0);
        assert_eq!(range.max_with_err, 11.0);
        assert_eq!(range.min_no_err, 10.0);
        assert!(range.min_no_err > range.min_with_err);
    }

    #[test]
    fn test_observe_merges_elementwise() {
        let mut state = RangeState::new();
        state.observe(&series(&[10.0, 20.0]));
        state.observe(&series(&[5.0, 15.0]));
        state.observe(&series(&[12.0, 30.0]));
        assert_eq!(state.y_min(), 5.0);
        assert_eq!(state.y_max(), 30.0);
        assert_eq!(state.y_min_no_err(), 5.0);
    }

    #[test]
    fn test_first_observation_initializes() {
        let mut state = RangeState::new();
        state.observe(&series(&[100.0, 200.0]));
        assert_eq!(state.y_min(), 100.0);
        assert_eq!(state.y_max(), 200.0);
    }

    #[test]
    fn test_linear_padding() {
        let mut state = RangeState::new();
        state.observe(&series(&[10.0, 20.0, 30.0]));
        let (min, max) = state.resolve(false).unwrap();
        assert!((min - 9.0).abs() < 1e-12);
        assert!((max - 33.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_padding_negative_bound() {
        let mut state = RangeState::new();
        state.observe(&series(&[-10.0, 30.0]));
        let (min, max) = state.resolve(false).unwrap();
        assert!((min - -11.0).abs() < 1e-12);
        assert!((max - 33.0).abs() < 1e-12);
    }

    #[test]
    fn test_log_fallback_to_fraction_of_max() {
        let mut state = RangeState::new();
        state.observe(&series(&[-5.0, 0.0, 5.0]));
        let (min, max) = state.resolve(true).unwrap();
        assert!((min - 0.5).abs() < 1e-12);
        assert!((max - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_log_all_nonpositive_clamps_to_floor() {
        let mut state = RangeState::new();
        state.observe(&series(&[-3.0, -1.0]));
        let (min, _) = state.resolve(true).unwrap();
        assert_eq!(min, LOG_FLOOR);
    }

    #[test]
    fn test_log_bare_value_fallback() {
        // Error bars push the inclusive minimum below zero while the bare
        // values stay positive.
        let samples = [
            Sample::with_errors(0.0, 1.0, 2.0, 0.0),
            Sample::new(1.0, 4.0),
        ];
        let mut state = RangeState::new();
        state.observe(&SeriesRange::scan(&samples).unwrap());
        let (min, max) = state.resolve(true).unwrap();
        assert!((min - 0.5).abs() < 1e-12);
        assert!((max - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut state = RangeState::new();
        state.observe(&series(&[1.0, 2.0, 3.0]));
        assert_eq!(state.resolve(false).unwrap(), state.resolve(false).unwrap());
        assert_eq!(state.resolve(true).unwrap(), state.resolve(true).unwrap());
    }

    #[test]
    fn test_resolve_empty_fails() {
        let state = RangeState::new();
        assert!(matches!(state.resolve(false), Err(PlotError::EmptyRange)));
        assert!(matches!(state.resolve(true), Err(PlotError::EmptyRange)));
    }

    #[test]
    fn test_log_inverted_range_returned_unchanged() {
        // All values negative: the maximum stays negative while the minimum
        // clamps to the floor. The range comes back inverted by design.
        let mut state = RangeState::new();
        state.observe(&series(&[-3.0, -1.0]));
        let (min, max) = state.resolve(true).unwrap();
        assert_eq!(min, LOG_FLOOR);
        assert!(max < min);
    }
}
