//! CSV adapters for traces, smoothed profiles and batch summaries.

use std::path::Path;

use csv::{Reader, Writer};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pipeline::{GradeProfile, RawTrace, SummaryRow};

#[derive(Debug, Deserialize)]
struct TraceRecord {
    distance: f64,
    elevation: f64,
}

#[derive(Debug, Serialize)]
struct ProfileRecord {
    distance_m: f64,
    raw_elevation_m: f64,
    smoothed_elevation_m: f64,
    grade_percent: f64,
}

/// Read a `distance,elevation` CSV (with headers) into a trace named after
/// the file.
pub fn read_trace_csv(path: &Path) -> Result<RawTrace> {
    let mut rdr = Reader::from_path(path)?;
    let mut distances = Vec::new();
    let mut elevations = Vec::new();

    for record in rdr.deserialize::<TraceRecord>() {
        let record = record?;
        distances.push(record.distance);
        elevations.push(record.elevation);
    }

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();

    Ok(RawTrace::new(name, distances, elevations))
}

/// One row per prepared sample.
pub fn write_profile_csv(profile: &GradeProfile, path: &Path) -> Result<()> {
    let mut wtr = Writer::from_path(path)?;
    let grades = profile.grades.as_percent();

    for (i, sample) in profile.series.samples().enumerate() {
        wtr.serialize(ProfileRecord {
            distance_m: sample.distance,
            raw_elevation_m: sample.elevation,
            smoothed_elevation_m: profile.smoothed.elevations()[i],
            grade_percent: grades[i],
        })?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_summary_csv(rows: &[SummaryRow], path: &Path) -> Result<()> {
    let mut wtr = Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
