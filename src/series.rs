//! Series preparation - turn raw (distance, elevation) pairs into a validated
//! series with strictly increasing distance.
//!
//! Decreasing distance is a pairing bug upstream and is rejected. Repeated
//! distances carry no slope information, so their elevations are averaged
//! into one sample and the merge is reported as an advisory note.

use serde::{Deserialize, Serialize};

use crate::error::{GradeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub distance: f64,
    pub elevation: f64,
}

/// Non-fatal anomalies found while preparing or smoothing a trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Advisory {
    /// `count` raw samples shared `distance` and were averaged into one.
    MergedDuplicates { distance: f64, count: usize },
    /// The window covering samples `start..=end` fitted a grade outside the
    /// configured ceiling.
    GradeClamped {
        start: usize,
        end: usize,
        raw_grade: f64,
        clamped_grade: f64,
    },
}

/// Ordered samples with strictly increasing distance. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    distances: Vec<f64>,
    elevations: Vec<f64>,
    notes: Vec<Advisory>,
}

impl Series {
    /// Callers guarantee strictly increasing, finite distances.
    pub(crate) fn from_parts(
        distances: Vec<f64>,
        elevations: Vec<f64>,
        notes: Vec<Advisory>,
    ) -> Self {
        debug_assert_eq!(distances.len(), elevations.len());
        Series {
            distances,
            elevations,
            notes,
        }
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    pub fn elevations(&self) -> &[f64] {
        &self.elevations
    }

    pub fn sample(&self, index: usize) -> Option<Sample> {
        Some(Sample {
            distance: *self.distances.get(index)?,
            elevation: *self.elevations.get(index)?,
        })
    }

    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.distances
            .iter()
            .zip(&self.elevations)
            .map(|(&distance, &elevation)| Sample {
                distance,
                elevation,
            })
    }

    /// Advisory notes raised while this series was prepared.
    pub fn notes(&self) -> &[Advisory] {
        &self.notes
    }

    pub fn total_distance(&self) -> f64 {
        match (self.distances.first(), self.distances.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}

/// Pair, validate and normalize raw distance/elevation sequences.
pub fn prepare(distances: &[f64], elevations: &[f64]) -> Result<Series> {
    if distances.len() != elevations.len() {
        return Err(GradeError::Shape {
            distances: distances.len(),
            elevations: elevations.len(),
        });
    }
    if distances.len() < 2 {
        return Err(GradeError::EmptySeries(distances.len()));
    }

    for (index, (d, e)) in distances.iter().zip(elevations).enumerate() {
        if !d.is_finite() {
            return Err(GradeError::NonFinite {
                field: "distance",
                index,
            });
        }
        if !e.is_finite() {
            return Err(GradeError::NonFinite {
                field: "elevation",
                index,
            });
        }
    }

    for index in 1..distances.len() {
        if distances[index] < distances[index - 1] {
            return Err(GradeError::NonMonotonic {
                index,
                previous: distances[index - 1],
                current: distances[index],
            });
        }
    }

    let mut out_distances = Vec::with_capacity(distances.len());
    let mut out_elevations = Vec::with_capacity(elevations.len());
    let mut notes = Vec::new();
    let mut merged_samples = 0;

    let mut i = 0;
    while i < distances.len() {
        let mut j = i + 1;
        while j < distances.len() && distances[j] == distances[i] {
            j += 1;
        }

        let run = j - i;
        let elevation = if run == 1 {
            elevations[i]
        } else {
            notes.push(Advisory::MergedDuplicates {
                distance: distances[i],
                count: run,
            });
            merged_samples += run - 1;
            elevations[i..j].iter().sum::<f64>() / run as f64
        };

        out_distances.push(distances[i]);
        out_elevations.push(elevation);
        i = j;
    }

    if !notes.is_empty() {
        log::warn!(
            "merged {} zero-length segments at {} distinct distances",
            merged_samples,
            notes.len()
        );
    }

    if out_distances.len() < 2 {
        return Err(GradeError::InsufficientData(out_distances.len()));
    }

    Ok(Series::from_parts(out_distances, out_elevations, notes))
}
