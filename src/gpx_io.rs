//! GPX adapters: pull a (distance, elevation) trace out of a GPX file and
//! write a copy of the file carrying smoothed elevations.
//!
//! Only track points with an elevation take part. Distance is cumulative
//! haversine distance between consecutive such points, in meters.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use geo::{HaversineDistance, Point};
use gpx::{read, write, Gpx};

use crate::error::{GradeError, Result};
use crate::pipeline::{GradeProfile, RawTrace};

pub fn read_gpx(path: &Path) -> Result<Gpx> {
    let file = File::open(path)?;
    read(BufReader::new(file)).map_err(|e| GradeError::Gpx(format!("{}: {}", path.display(), e)))
}

/// Cumulative distance and elevation of every track point with elevation.
pub fn track_profile(gpx: &Gpx) -> (Vec<f64>, Vec<f64>) {
    let mut distances = Vec::new();
    let mut elevations = Vec::new();
    let mut previous: Option<Point<f64>> = None;

    for track in &gpx.tracks {
        for segment in &track.segments {
            for pt in &segment.points {
                if let Some(ele) = pt.elevation {
                    let here = pt.point();
                    let distance = match (previous, distances.last()) {
                        (Some(prev), Some(&total)) => total + prev.haversine_distance(&here),
                        _ => 0.0,
                    };
                    distances.push(distance);
                    elevations.push(ele);
                    previous = Some(here);
                }
            }
        }
    }

    (distances, elevations)
}

pub fn load_gpx(path: &Path) -> Result<RawTrace> {
    let gpx = read_gpx(path)?;
    let (distances, elevations) = track_profile(&gpx);
    if elevations.is_empty() {
        return Err(GradeError::Gpx(format!(
            "{}: no track points with elevation",
            path.display()
        )));
    }

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();

    log::debug!("loaded {} points from {}", elevations.len(), name);
    Ok(RawTrace::new(name, distances, elevations))
}

/// Copy `source` to `output`, replacing each track point's elevation with
/// the smoothed elevation at its cumulative distance. Returns the number of
/// points rewritten.
pub fn write_smoothed_gpx(source: &Path, profile: &GradeProfile, output: &Path) -> Result<usize> {
    let mut gpx = read_gpx(source)?;
    let mut previous: Option<Point<f64>> = None;
    let mut distance = 0.0;
    let mut rewritten = 0;

    for track in gpx.tracks.iter_mut() {
        for segment in track.segments.iter_mut() {
            for pt in segment.points.iter_mut() {
                if pt.elevation.is_none() {
                    continue;
                }
                let here = pt.point();
                if let Some(prev) = previous {
                    distance += prev.haversine_distance(&here);
                }
                pt.elevation = Some(profile.smoothed.elevation_at(distance));
                previous = Some(here);
                rewritten += 1;
            }
        }
    }

    gpx.creator = Some(format!(
        "{} - grade smoothed",
        gpx.creator.as_deref().unwrap_or("unknown")
    ));

    let writer = BufWriter::new(File::create(output)?);
    write(&gpx, writer).map_err(|e| GradeError::Gpx(format!("{}: {}", output.display(), e)))?;
    Ok(rewritten)
}
