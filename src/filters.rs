//! Classic elevation filters kept alongside the adaptive smoother for
//! comparison: stepped thresholding, flattening and Savitzky-Golay smoothing
//! over time or over uniformly resampled distance.

use crate::config::check_positive;
use crate::error::{GradeError, Result};
use crate::series::Series;
use crate::smoother::interpolate;

pub const DEFAULT_WINDOW_LEN: usize = 21;
pub const DEFAULT_POLYORDER: usize = 2;
pub const DEFAULT_SAMPLE_LEN: f64 = 5.0;

/// Hold a reference elevation until the trace moves more than `step` away
/// from it, then jump to the new value. Produces a staircase trace.
pub fn threshold_filter(elevations: &[f64], step: f64) -> Vec<f64> {
    let mut reference = match elevations.first() {
        Some(&first) => first,
        None => return Vec::new(),
    };

    elevations
        .iter()
        .map(|&elevation| {
            if (elevation - reference).abs() > step {
                reference = elevation;
            }
            reference
        })
        .collect()
}

/// Replace every elevation with the series mean.
pub fn flatten(elevations: &[f64]) -> Vec<f64> {
    if elevations.is_empty() {
        return Vec::new();
    }
    let mean = elevations.iter().sum::<f64>() / elevations.len() as f64;
    vec![mean; elevations.len()]
}

/// Savitzky-Golay smoothing of samples assumed evenly spaced in time.
pub fn time_smooth(elevations: &[f64], window_len: usize, polyorder: usize) -> Result<Vec<f64>> {
    savgol_filter(elevations, window_len, polyorder)
}

/// Resample onto a uniform distance grid, run Savitzky-Golay over it and
/// interpolate the result back onto the series' own distances.
pub fn distance_smooth(
    series: &Series,
    sample_len: f64,
    window_len: usize,
    polyorder: usize,
) -> Result<Vec<f64>> {
    check_positive("sample_len", sample_len)?;

    let (grid, resampled) = resample_uniform(series.distances(), series.elevations(), sample_len);
    let filtered = savgol_filter(&resampled, window_len, polyorder)?;

    Ok(series
        .distances()
        .iter()
        .map(|&d| interpolate(&grid, &filtered, d))
        .collect())
}

/// `ceil(span / spacing) + 1` evenly spaced points from the first to the
/// last distance, with linearly interpolated elevations.
pub fn resample_uniform(
    distances: &[f64],
    elevations: &[f64],
    spacing: f64,
) -> (Vec<f64>, Vec<f64>) {
    let (first, last) = match (distances.first(), distances.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return (Vec::new(), Vec::new()),
    };

    let intervals = ((last - first) / spacing).ceil().max(1.0) as usize;
    let step = (last - first) / intervals as f64;

    let grid: Vec<f64> = (0..=intervals)
        .map(|i| if i == intervals { last } else { first + step * i as f64 })
        .collect();
    let resampled = grid
        .iter()
        .map(|&d| interpolate(distances, elevations, d))
        .collect();

    (grid, resampled)
}

/// Least-squares Savitzky-Golay filter. The first and last `window_len / 2`
/// samples are evaluated from a polynomial fitted to the edge window.
pub fn savgol_filter(data: &[f64], window_len: usize, polyorder: usize) -> Result<Vec<f64>> {
    if window_len % 2 == 0 {
        return Err(GradeError::Configuration(format!(
            "window_len must be odd, got {}",
            window_len
        )));
    }
    if polyorder >= window_len {
        return Err(GradeError::Configuration(format!(
            "polyorder {} must be less than window_len {}",
            polyorder, window_len
        )));
    }
    if window_len > data.len() {
        return Err(GradeError::Configuration(format!(
            "series too short to smooth: {} samples, window_len {}",
            data.len(),
            window_len
        )));
    }

    let half = window_len / 2;
    let offsets: Vec<f64> = (0..window_len).map(|j| j as f64 - half as f64).collect();
    let weights = center_weights(&offsets, polyorder)?;

    let n = data.len();
    let mut out = vec![0.0; n];

    for i in half..n - half {
        out[i] = weights
            .iter()
            .zip(&data[i - half..=i + half])
            .map(|(w, y)| w * y)
            .sum();
    }

    if half > 0 {
        let head = polyfit(&offsets, &data[..window_len], polyorder)?;
        for (i, value) in out.iter_mut().enumerate().take(half) {
            *value = polyval(&head, offsets[i]);
        }

        let tail = polyfit(&offsets, &data[n - window_len..], polyorder)?;
        for i in n - half..n {
            out[i] = polyval(&tail, offsets[i - (n - window_len)]);
        }
    }

    Ok(out)
}

/// Convolution weights that evaluate the local fit at offset zero.
fn center_weights(offsets: &[f64], order: usize) -> Result<Vec<f64>> {
    let mut e0 = vec![0.0; order + 1];
    e0[0] = 1.0;
    let z = solve(normal_matrix(offsets, order), e0)?;
    Ok(offsets.iter().map(|&x| polyval(&z, x)).collect())
}

/// Polynomial coefficients, lowest power first.
fn polyfit(xs: &[f64], ys: &[f64], order: usize) -> Result<Vec<f64>> {
    let mut rhs = vec![0.0; order + 1];
    for (&x, &y) in xs.iter().zip(ys) {
        let mut power = 1.0;
        for r in rhs.iter_mut() {
            *r += power * y;
            power *= x;
        }
    }
    solve(normal_matrix(xs, order), rhs)
}

fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn normal_matrix(xs: &[f64], order: usize) -> Vec<Vec<f64>> {
    let size = order + 1;
    let mut sums = vec![0.0; 2 * order + 1];
    for &x in xs {
        let mut power = 1.0;
        for s in sums.iter_mut() {
            *s += power;
            power *= x;
        }
    }
    (0..size)
        .map(|r| (0..size).map(|c| sums[r + c]).collect())
        .collect()
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-12 {
            return Err(GradeError::Configuration(
                "polynomial fit is singular for this window".to_string(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_point_quadratic_weights() {
        let offsets = [-2.0, -1.0, 0.0, 1.0, 2.0];
        let weights = center_weights(&offsets, 2).unwrap();
        let expected = [-3.0, 12.0, 17.0, 12.0, -3.0];
        for (w, e) in weights.iter().zip(expected) {
            assert!((w - e / 35.0).abs() < 1e-12);
        }
    }

    #[test]
    fn polyfit_recovers_a_parabola() {
        let xs = [-2.0, -1.0, 0.0, 1.0, 2.0];
        let ys: Vec<f64> = xs.iter().map(|x| 1.0 + 2.0 * x + 0.5 * x * x).collect();
        let c = polyfit(&xs, &ys, 2).unwrap();
        assert!((c[0] - 1.0).abs() < 1e-9);
        assert!((c[1] - 2.0).abs() < 1e-9);
        assert!((c[2] - 0.5).abs() < 1e-9);
    }
}
