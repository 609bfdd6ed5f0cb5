//! End-to-end processing: prepare -> smooth -> accumulate, for one trace or a
//! batch of independent traces smoothed in parallel.

use rayon::prelude::*;
use serde::Serialize;

use crate::config::SmoothingConfig;
use crate::error::Result;
use crate::series::{prepare, Advisory, Series};
use crate::smoother::{smooth, GradeSeries, SmoothedElevationSeries};
use crate::stats::{accumulate, raw_gain_loss, summarize, GainLossResult, TraceSummary};

/// Raw distance/elevation columns as handed over by a loader.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTrace {
    pub name: String,
    pub distances: Vec<f64>,
    pub elevations: Vec<f64>,
}

impl RawTrace {
    pub fn new(name: impl Into<String>, distances: Vec<f64>, elevations: Vec<f64>) -> Self {
        RawTrace {
            name: name.into(),
            distances,
            elevations,
        }
    }
}

/// Everything one pipeline call produces.
#[derive(Debug, Clone)]
pub struct GradeProfile {
    pub series: Series,
    pub grades: GradeSeries,
    pub smoothed: SmoothedElevationSeries,
    pub gain_loss: GainLossResult,
    /// Gain/loss of the prepared, unsmoothed elevations.
    pub raw_gain_loss: GainLossResult,
    pub summary: TraceSummary,
    pub windows: usize,
    /// Merges from preparation followed by clamps from smoothing.
    pub notes: Vec<Advisory>,
}

pub fn process(
    distances: &[f64],
    elevations: &[f64],
    config: &SmoothingConfig,
) -> Result<GradeProfile> {
    config.validate()?;

    let series = prepare(distances, elevations)?;
    let smoothed = smooth(&series, config)?;
    let gain_loss = accumulate(&smoothed.elevation, config.gain_noise_floor)?;
    let summary = summarize(&smoothed.elevation, &smoothed.grades, config.gain_noise_floor)?;
    let raw = raw_gain_loss(series.elevations());

    log::debug!(
        "{} samples in {} windows: gain {:.1} (raw {:.1}), loss {:.1} (raw {:.1})",
        series.len(),
        smoothed.windows,
        gain_loss.gain,
        raw.gain,
        gain_loss.loss,
        raw.loss
    );

    let mut notes = series.notes().to_vec();
    notes.extend(smoothed.notes);

    Ok(GradeProfile {
        series,
        grades: smoothed.grades,
        smoothed: smoothed.elevation,
        gain_loss,
        raw_gain_loss: raw,
        summary,
        windows: smoothed.windows,
        notes,
    })
}

pub fn process_trace(trace: &RawTrace, config: &SmoothingConfig) -> Result<GradeProfile> {
    process(&trace.distances, &trace.elevations, config)
}

/// Per-trace result of a batch run.
#[derive(Debug)]
pub struct TraceOutcome {
    pub name: String,
    pub result: Result<GradeProfile>,
}

/// Smooth independent traces in parallel. Output order matches input order
/// and a failing trace does not affect the others.
pub fn process_batch(traces: &[RawTrace], config: &SmoothingConfig) -> Vec<TraceOutcome> {
    traces
        .par_iter()
        .map(|trace| TraceOutcome {
            name: trace.name.clone(),
            result: process_trace(trace, config),
        })
        .collect()
}

/// One row of a batch summary.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub name: String,
    pub samples: usize,
    pub windows: usize,
    pub distance_km: f64,
    pub raw_gain_m: f64,
    pub raw_loss_m: f64,
    pub gain_m: f64,
    pub loss_m: f64,
    pub max_climb_grade_percent: f64,
    pub max_descent_grade_percent: f64,
    pub clamped_windows: usize,
    pub merged_duplicates: usize,
}

impl SummaryRow {
    pub fn from_profile(name: &str, profile: &GradeProfile) -> Self {
        let clamped_windows = profile
            .notes
            .iter()
            .filter(|note| matches!(note, Advisory::GradeClamped { .. }))
            .count();
        let merged_duplicates = profile
            .notes
            .iter()
            .map(|note| match note {
                Advisory::MergedDuplicates { count, .. } => count - 1,
                _ => 0,
            })
            .sum();

        SummaryRow {
            name: name.to_string(),
            samples: profile.series.len(),
            windows: profile.windows,
            distance_km: profile.summary.total_distance / 1000.0,
            raw_gain_m: profile.raw_gain_loss.gain,
            raw_loss_m: profile.raw_gain_loss.loss,
            gain_m: profile.gain_loss.gain,
            loss_m: profile.gain_loss.loss,
            max_climb_grade_percent: profile.summary.max_climb_grade * 100.0,
            max_descent_grade_percent: profile.summary.max_descent_grade * 100.0,
            clamped_windows,
            merged_duplicates,
        }
    }
}
