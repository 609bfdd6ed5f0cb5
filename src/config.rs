use serde::{Deserialize, Serialize};

use crate::error::{GradeError, Result};

/// How a closed window turns its samples into one grade value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeFit {
    /// Ordinary least-squares slope over every sample in the window.
    /// Falls back to the endpoint difference for two-sample windows.
    LeastSquares,
    /// Rise over run between the window's first and last sample.
    Endpoint,
}

impl Default for GradeFit {
    fn default() -> Self {
        GradeFit::LeastSquares
    }
}

/// Tunables for one smoothing call. Passed explicitly into every entry
/// point; nothing is read from global state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Vertical measurement uncertainty. A window closes only once its net
    /// elevation change reaches this value.
    pub noise_floor: f64,
    /// Minimum horizontal distance a window must cover before it may close.
    pub min_window_span: f64,
    /// Grade ceiling (rise/run). Window grades are clamped to +/- this.
    pub max_grade: f64,
    pub grade_fit: GradeFit,
    /// Per-segment floor used when accumulating gain and loss. The smoothed
    /// trace is piecewise linear, so any positive floor drops every segment
    /// of a densely sampled climb whose `grade * spacing` falls below it.
    pub gain_noise_floor: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self::foot()
    }
}

impl SmoothingConfig {
    /// Consumer GPS on foot: a couple of meters of vertical jitter, grades up
    /// to 100% on steep trail.
    pub fn foot() -> Self {
        SmoothingConfig {
            noise_floor: 2.0,
            min_window_span: 10.0,
            max_grade: 1.0,
            grade_fit: GradeFit::LeastSquares,
            gain_noise_floor: 0.0,
        }
    }

    /// Road vehicles: longer windows, gentler grade ceiling.
    pub fn vehicle() -> Self {
        SmoothingConfig {
            noise_floor: 1.0,
            min_window_span: 50.0,
            max_grade: 0.3,
            grade_fit: GradeFit::LeastSquares,
            gain_noise_floor: 0.0,
        }
    }

    pub fn with_noise_floor(mut self, noise_floor: f64) -> Self {
        self.noise_floor = noise_floor;
        self
    }

    pub fn with_min_window_span(mut self, min_window_span: f64) -> Self {
        self.min_window_span = min_window_span;
        self
    }

    pub fn with_max_grade(mut self, max_grade: f64) -> Self {
        self.max_grade = max_grade;
        self
    }

    pub fn with_grade_fit(mut self, grade_fit: GradeFit) -> Self {
        self.grade_fit = grade_fit;
        self
    }

    pub fn with_gain_noise_floor(mut self, gain_noise_floor: f64) -> Self {
        self.gain_noise_floor = gain_noise_floor;
        self
    }

    /// Reject out-of-domain tunables before any data is looked at.
    pub fn validate(&self) -> Result<()> {
        check_positive("noise_floor", self.noise_floor)?;
        check_positive("max_grade", self.max_grade)?;
        check_non_negative("min_window_span", self.min_window_span)?;
        check_non_negative("gain_noise_floor", self.gain_noise_floor)?;
        Ok(())
    }
}

pub(crate) fn check_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(GradeError::Configuration(format!(
            "{} must be a positive finite number, got {}",
            name, value
        )));
    }
    Ok(())
}

pub(crate) fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(GradeError::Configuration(format!(
            "{} must be a non-negative finite number, got {}",
            name, value
        )));
    }
    Ok(())
}
