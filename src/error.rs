use thiserror::Error;

/// Everything that can stop a trace from being smoothed.
///
/// The first five variants are contract violations in the input or the
/// configuration. None of them is retried; the caller gets no partial result.
#[derive(Error, Debug)]
pub enum GradeError {
    #[error("distance and elevation lengths differ ({distances} vs {elevations})")]
    Shape { distances: usize, elevations: usize },
    #[error("series needs at least 2 samples, got {0}")]
    EmptySeries(usize),
    #[error("insufficient data: {0} usable samples after preparation")]
    InsufficientData(usize),
    #[error("distance decreases at index {index}: {previous} -> {current}")]
    NonMonotonic {
        index: usize,
        previous: f64,
        current: f64,
    },
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("non-finite {field} at index {index}")]
    NonFinite { field: &'static str, index: usize },
    #[error("GPX error: {0}")]
    Gpx(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GradeError>;
