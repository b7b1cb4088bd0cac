//! Error types for overplot operations.

use std::fmt;
use std::io;

/// The main error type for overplot operations.
#[derive(Debug)]
pub enum PlotError {
    /// Error during IO operations (file writing, etc.)
    Io(io::Error),
    /// A series was rejected before registration (empty, non-finite
    /// coordinates, negative errors, mismatched arrays)
    InvalidSeries(String),
    /// An axis range was requested while no range-contributing series
    /// is registered
    EmptyRange,
    /// A series index outside the registered range
    IndexOutOfRange { index: usize, len: usize },
    /// Invalid configuration or parameters
    InvalidConfig(String),
}

impl fmt::Display for PlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotError::Io(err) => write!(f, "IO error: {}", err),
            PlotError::InvalidSeries(msg) => write!(f, "Invalid series: {}", msg),
            PlotError::EmptyRange => write!(f, "No series registered, axis range is undefined"),
            PlotError::IndexOutOfRange { index, len } => {
                write!(f, "Series index {} out of range (have {})", index, len)
            }
            PlotError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for PlotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlotError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for PlotError {
    fn from(err: io::Error) -> Self {
        PlotError::Io(err)
    }
}

/// Result type alias for overplot operations.
pub type PlotResult<T> = Result<T, PlotError>;
