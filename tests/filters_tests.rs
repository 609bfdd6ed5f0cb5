use approx::assert_abs_diff_eq;
use grade_smoother::filters::{
    distance_smooth, flatten, resample_uniform, savgol_filter, threshold_filter, time_smooth,
    DEFAULT_POLYORDER, DEFAULT_SAMPLE_LEN, DEFAULT_WINDOW_LEN,
};
use grade_smoother::{prepare, GradeError};

// ============================================================================
// Threshold / flatten
// ============================================================================

#[test]
fn test_threshold_filter_steps() {
    let out = threshold_filter(&[0.0, 1.0, 2.0, 6.0, 7.0, 12.0, 11.0], 5.0);
    assert_eq!(out, vec![0.0, 0.0, 0.0, 6.0, 6.0, 12.0, 12.0]);
}

#[test]
fn test_threshold_filter_empty() {
    assert!(threshold_filter(&[], 5.0).is_empty());
}

#[test]
fn test_flatten_uses_mean() {
    assert_eq!(flatten(&[1.0, 2.0, 6.0]), vec![3.0, 3.0, 3.0]);
    assert!(flatten(&[]).is_empty());
}

// ============================================================================
// Savitzky-Golay
// ============================================================================

#[test]
fn test_savgol_preserves_quadratic() {
    let data: Vec<f64> = (0..30)
        .map(|i| {
            let x = i as f64;
            0.5 * x * x - 3.0 * x + 7.0
        })
        .collect();
    let out = savgol_filter(&data, 7, 2).unwrap();

    assert_eq!(out.len(), data.len());
    for (a, b) in out.iter().zip(&data) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-8);
    }
}

#[test]
fn test_savgol_attenuates_alternating_noise() {
    let data: Vec<f64> = (0..41).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
    let out = savgol_filter(&data, 11, 2).unwrap();
    for value in &out[5..36] {
        assert!(value.abs() < 0.5);
    }
}

#[test]
fn test_savgol_rejects_bad_windows() {
    let data = vec![0.0; 10];
    assert!(matches!(savgol_filter(&data, 4, 2), Err(GradeError::Configuration(_))));
    assert!(matches!(savgol_filter(&data, 5, 5), Err(GradeError::Configuration(_))));
    assert!(matches!(savgol_filter(&data, 11, 2), Err(GradeError::Configuration(_))));
}

#[test]
fn test_time_smooth_on_a_ramp() {
    let elevations: Vec<f64> = (0..60).map(|i| i as f64).collect();
    let out = time_smooth(&elevations, DEFAULT_WINDOW_LEN, DEFAULT_POLYORDER).unwrap();
    for (a, b) in out.iter().zip(&elevations) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-8);
    }
}

// ============================================================================
// Distance resampling
// ============================================================================

#[test]
fn test_resample_uniform_grid() {
    let (grid, values) = resample_uniform(&[0.0, 10.0, 23.0], &[0.0, 10.0, 23.0], 5.0);
    assert_eq!(grid.len(), 6);
    assert_eq!(grid[0], 0.0);
    assert_eq!(*grid.last().unwrap(), 23.0);
    for (d, e) in grid.iter().zip(&values) {
        assert_abs_diff_eq!(d, e, epsilon = 1e-12);
    }
}

#[test]
fn test_distance_smooth_keeps_a_straight_climb() {
    let distances: Vec<f64> = (0..1000).map(|i| 3.0 * i as f64).collect();
    let elevations: Vec<f64> = (0..1000).map(|i| i as f64).collect();
    let series = prepare(&distances, &elevations).unwrap();

    let out = distance_smooth(
        &series,
        DEFAULT_SAMPLE_LEN,
        DEFAULT_WINDOW_LEN,
        DEFAULT_POLYORDER,
    )
    .unwrap();

    assert_eq!(out.len(), series.len());
    for (a, b) in out.iter().zip(&elevations) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-6);
    }
}

#[test]
fn test_distance_smooth_too_short() {
    let series = prepare(&[0.0, 10.0, 20.0], &[0.0, 1.0, 2.0]).unwrap();
    assert!(matches!(
        distance_smooth(&series, 5.0, 21, 2),
        Err(GradeError::Configuration(_))
    ));
    assert!(matches!(
        distance_smooth(&series, 0.0, 3, 1),
        Err(GradeError::Configuration(_))
    ));
}
