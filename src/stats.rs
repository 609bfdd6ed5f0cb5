//! Gain/loss accumulation and trace summaries over a smoothed elevation
//! trace. Deltas smaller than the noise floor are dropped from both totals so
//! residual jitter on flat ground does not add up.

use serde::Serialize;

use crate::config::check_non_negative;
use crate::error::{GradeError, Result};
use crate::smoother::{GradeSeries, SmoothedElevationSeries};

/// Segments with |grade| below this count as flat in [`TraceSummary`].
pub const FLAT_GRADE: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GainLossResult {
    pub gain: f64,
    /// Magnitude, never negative.
    pub loss: f64,
}

impl GainLossResult {
    pub fn net(&self) -> f64 {
        self.gain - self.loss
    }
}

/// Filtered gain and loss of a smoothed trace.
pub fn accumulate(series: &SmoothedElevationSeries, noise_floor: f64) -> Result<GainLossResult> {
    check_non_negative("noise_floor", noise_floor)?;
    Ok(accumulate_elevations(series.elevations(), noise_floor))
}

/// Same as [`accumulate`] over a bare elevation slice; the floor is assumed
/// valid.
pub fn accumulate_elevations(elevations: &[f64], noise_floor: f64) -> GainLossResult {
    let mut gain = 0.0;
    let mut loss = 0.0;

    for w in elevations.windows(2) {
        let delta = w[1] - w[0];
        if delta.abs() < noise_floor {
            continue;
        }
        if delta > 0.0 {
            gain += delta;
        } else {
            loss += -delta;
        }
    }

    GainLossResult { gain, loss }
}

/// Unfiltered gain and loss: every rise is gain, every drop is loss.
pub fn raw_gain_loss(elevations: &[f64]) -> GainLossResult {
    accumulate_elevations(elevations, 0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceSummary {
    pub total_distance: f64,
    pub min_elevation: f64,
    pub max_elevation: f64,
    pub net_elevation: f64,
    pub gain: f64,
    pub loss: f64,
    /// Distance-weighted mean of |grade|.
    pub mean_abs_grade: f64,
    pub max_climb_grade: f64,
    /// Steepest descent as a negative grade (0 when the trace never drops).
    pub max_descent_grade: f64,
    pub climbing_distance: f64,
    pub descending_distance: f64,
    pub flat_distance: f64,
}

pub fn summarize(
    series: &SmoothedElevationSeries,
    grades: &GradeSeries,
    noise_floor: f64,
) -> Result<TraceSummary> {
    if series.len() != grades.len() {
        return Err(GradeError::Shape {
            distances: series.len(),
            elevations: grades.len(),
        });
    }
    if series.len() < 2 {
        return Err(GradeError::InsufficientData(series.len()));
    }

    let gain_loss = accumulate(series, noise_floor)?;
    let distances = series.distances();
    let elevations = series.elevations();
    let grades = grades.values();

    let min_elevation = elevations.iter().copied().fold(f64::INFINITY, f64::min);
    let max_elevation = elevations.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut weighted_grade = 0.0;
    let mut max_climb_grade: f64 = 0.0;
    let mut max_descent_grade: f64 = 0.0;
    let mut climbing_distance = 0.0;
    let mut descending_distance = 0.0;
    let mut flat_distance = 0.0;

    for i in 1..distances.len() {
        let run = distances[i] - distances[i - 1];
        let grade = grades[i];
        weighted_grade += grade.abs() * run;
        max_climb_grade = max_climb_grade.max(grade);
        max_descent_grade = max_descent_grade.min(grade);

        if grade >= FLAT_GRADE {
            climbing_distance += run;
        } else if grade <= -FLAT_GRADE {
            descending_distance += run;
        } else {
            flat_distance += run;
        }
    }

    let total_distance = distances[distances.len() - 1] - distances[0];
    let mean_abs_grade = if total_distance > 0.0 {
        weighted_grade / total_distance
    } else {
        0.0
    };

    Ok(TraceSummary {
        total_distance,
        min_elevation,
        max_elevation,
        net_elevation: elevations[elevations.len() - 1] - elevations[0],
        gain: gain_loss.gain,
        loss: gain_loss.loss,
        mean_abs_grade,
        max_climb_grade,
        max_descent_grade,
        climbing_distance,
        descending_distance,
        flat_distance,
    })
}
