//! Adaptive grade smoothing for noisy (distance, elevation) traces.
//!
//! Raw GPS or DEM elevation is split into variable-length windows, each long
//! enough that its elevation change clears the sensor noise floor. One grade
//! per window is fitted and clamped, the elevation trace is rebuilt from those
//! grades, and gain/loss is accumulated with a second noise floor.
//!
//! ```no_run
//! use grade_smoother::{process, SmoothingConfig};
//!
//! let distances = [0.0, 10.0, 20.0, 30.0, 40.0];
//! let elevations = [100.0, 100.3, 99.8, 105.0, 104.9];
//! let profile = process(&distances, &elevations, &SmoothingConfig::foot())?;
//! println!("gain {:.1} m, loss {:.1} m", profile.gain_loss.gain, profile.gain_loss.loss);
//! # Ok::<(), grade_smoother::GradeError>(())
//! ```

pub mod config;
pub mod csv_io;
pub mod error;
pub mod filters;
pub mod gpx_io;
pub mod pipeline;
pub mod series;
pub mod smoother;
pub mod stats;

pub use config::{GradeFit, SmoothingConfig};
pub use error::{GradeError, Result};
pub use pipeline::{
    process, process_batch, process_trace, GradeProfile, RawTrace, SummaryRow, TraceOutcome,
};
pub use series::{prepare, Advisory, Sample, Series};
pub use smoother::{smooth, windows, GradeSeries, Smoothed, SmoothedElevationSeries, Window};
pub use stats::{accumulate, raw_gain_loss, summarize, GainLossResult, TraceSummary};
