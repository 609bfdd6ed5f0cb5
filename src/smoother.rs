//! Adaptive window smoother
//!
//! Walks the distance axis and grows each window until its net elevation
//! change clears the noise floor and it covers at least the minimum span.
//! Every closed window yields one grade (clamped to the configured ceiling),
//! and the smoothed elevation trace is rebuilt by integrating those grades
//! from the first raw elevation. Flat stretches that never clear the floor
//! end up in a single terminal window.
//!
//! Windows do not overlap. The closing sample of one window is the anchor
//! the next window measures its change and span from, but it keeps the
//! grade of the window it closed.

use std::ops::Range;

use serde::Serialize;

use crate::config::{GradeFit, SmoothingConfig};
use crate::error::{GradeError, Result};
use crate::series::{Advisory, Series};

/// One grade value per sample, rise over run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeSeries(Vec<f64>);

impl GradeSeries {
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    /// Grades as percentages, the way route profiles usually print them.
    pub fn as_percent(&self) -> Vec<f64> {
        self.0.iter().map(|g| g * 100.0).collect()
    }
}

/// Elevation rebuilt from a [`GradeSeries`]; indexed like the prepared series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmoothedElevationSeries {
    distances: Vec<f64>,
    elevations: Vec<f64>,
}

impl SmoothedElevationSeries {
    pub fn len(&self) -> usize {
        self.elevations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elevations.is_empty()
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    pub fn elevations(&self) -> &[f64] {
        &self.elevations
    }

    /// Linear interpolation of the smoothed trace, held flat past either end.
    pub fn elevation_at(&self, distance: f64) -> f64 {
        interpolate(&self.distances, &self.elevations, distance)
    }

    /// Re-wrap as a prepared series, e.g. to smooth it a second time.
    pub fn to_series(&self) -> Series {
        Series::from_parts(self.distances.clone(), self.elevations.clone(), Vec::new())
    }
}

/// Linear interpolation over strictly increasing `xs`, held flat past the ends.
pub(crate) fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let (first, last) = match (xs.first(), xs.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return f64::NAN,
    };
    if x <= first {
        return ys[0];
    }
    if x >= last {
        return ys[ys.len() - 1];
    }

    let upper = xs.partition_point(|&d| d < x);
    let (x1, x2) = (xs[upper - 1], xs[upper]);
    let (y1, y2) = (ys[upper - 1], ys[upper]);
    let t = (x - x1) / (x2 - x1);
    y1 + t * (y2 - y1)
}

/// A closed window. Samples `start..=end` receive its grade; the fit and the
/// closing test run over `anchor..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub anchor: usize,
    pub start: usize,
    pub end: usize,
}

impl Window {
    /// Half-open range of the samples that take this window's grade.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end + 1
    }

    pub fn is_first(&self) -> bool {
        self.anchor == self.start
    }
}

#[derive(Debug, Clone, Copy)]
enum WindowState {
    Accumulating { anchor: usize, start: usize },
    Closed,
}

/// Iterator over the window boundaries of a series.
pub struct Windows<'a> {
    distances: &'a [f64],
    elevations: &'a [f64],
    noise_floor: f64,
    min_window_span: f64,
    state: WindowState,
}

impl<'a> Windows<'a> {
    fn closes(&self, anchor: usize, end: usize) -> bool {
        let change = (self.elevations[end] - self.elevations[anchor]).abs();
        let span = self.distances[end] - self.distances[anchor];
        change >= self.noise_floor && span >= self.min_window_span
    }
}

impl<'a> Iterator for Windows<'a> {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        let (anchor, start) = match self.state {
            WindowState::Accumulating { anchor, start } => (anchor, start),
            WindowState::Closed => return None,
        };

        let last = self.distances.len().checked_sub(1)?;
        if anchor >= last {
            self.state = WindowState::Closed;
            return None;
        }

        let mut end = anchor + 1;
        while end < last && !self.closes(anchor, end) {
            end += 1;
        }

        self.state = if end >= last {
            WindowState::Closed
        } else {
            WindowState::Accumulating {
                anchor: end,
                start: end + 1,
            }
        };

        Some(Window { anchor, start, end })
    }
}

/// Window boundaries for `series` under `config`. The configuration is not
/// validated here; [`smooth`] does that.
pub fn windows<'a>(series: &'a Series, config: &SmoothingConfig) -> Windows<'a> {
    Windows {
        distances: series.distances(),
        elevations: series.elevations(),
        noise_floor: config.noise_floor,
        min_window_span: config.min_window_span,
        state: WindowState::Accumulating {
            anchor: 0,
            start: 0,
        },
    }
}

/// Slope of the samples in one window. Slices hold at least two samples with
/// strictly increasing distance.
pub(crate) fn fit_grade(distances: &[f64], elevations: &[f64], fit: GradeFit) -> f64 {
    let n = distances.len();
    let endpoint = (elevations[n - 1] - elevations[0]) / (distances[n - 1] - distances[0]);
    if fit == GradeFit::Endpoint || n == 2 {
        return endpoint;
    }

    let mean_d = distances.iter().sum::<f64>() / n as f64;
    let mean_e = elevations.iter().sum::<f64>() / n as f64;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (d, e) in distances.iter().zip(elevations) {
        let dx = d - mean_d;
        sxy += dx * (e - mean_e);
        sxx += dx * dx;
    }

    // Huge elevations can overflow the sums to inf - inf.
    let slope = sxy / sxx;
    if sxx > 0.0 && slope.is_finite() {
        slope
    } else {
        endpoint
    }
}

/// Result of one smoothing call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Smoothed {
    pub grades: GradeSeries,
    pub elevation: SmoothedElevationSeries,
    pub windows: usize,
    /// Grade clamps, one per clamped window.
    pub notes: Vec<Advisory>,
}

/// Smooth a prepared series into a grade series and a matching elevation
/// trace.
pub fn smooth(series: &Series, config: &SmoothingConfig) -> Result<Smoothed> {
    config.validate()?;
    if series.len() < 2 {
        return Err(GradeError::InsufficientData(series.len()));
    }

    let distances = series.distances();
    let elevations = series.elevations();
    let mut grades = vec![0.0; series.len()];
    let mut notes = Vec::new();
    let mut window_count = 0;

    for window in windows(series, config) {
        window_count += 1;
        let fit = window.anchor..window.end + 1;
        let raw_grade = fit_grade(&distances[fit.clone()], &elevations[fit], config.grade_fit);
        let grade = raw_grade.clamp(-config.max_grade, config.max_grade);

        if grade != raw_grade {
            log::debug!(
                "window {}..={} grade {:.3} clamped to {:.3}",
                window.start,
                window.end,
                raw_grade,
                grade
            );
            notes.push(Advisory::GradeClamped {
                start: window.start,
                end: window.end,
                raw_grade,
                clamped_grade: grade,
            });
        }

        grades[window.range()].fill(grade);
    }

    if !notes.is_empty() {
        log::warn!(
            "{} of {} windows exceeded the grade ceiling of {:.2}",
            notes.len(),
            window_count,
            config.max_grade
        );
    }

    let smoothed = integrate(distances, elevations[0], &grades);

    Ok(Smoothed {
        grades: GradeSeries(grades),
        elevation: SmoothedElevationSeries {
            distances: distances.to_vec(),
            elevations: smoothed,
        },
        windows: window_count,
        notes,
    })
}

/// Rebuild elevation from grades, starting at `start_elevation`.
fn integrate(distances: &[f64], start_elevation: f64, grades: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(distances.len());
    out.push(start_elevation);
    for i in 1..distances.len() {
        let previous = out[i - 1];
        out.push(previous + grades[i] * (distances[i] - distances[i - 1]));
    }
    out
}
