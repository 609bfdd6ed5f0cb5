use approx::assert_relative_eq;
use grade_smoother::{
    process, process_batch, Advisory, GradeError, GradeFit, RawTrace, SmoothingConfig, SummaryRow,
};

fn worked_config() -> SmoothingConfig {
    SmoothingConfig::foot()
        .with_noise_floor(2.0)
        .with_min_window_span(5.0)
        .with_max_grade(1.0)
        .with_grade_fit(GradeFit::Endpoint)
        .with_gain_noise_floor(0.5)
}

#[test]
fn test_worked_example_end_to_end() {
    let profile = process(
        &[0.0, 10.0, 20.0, 30.0, 40.0],
        &[100.0, 100.3, 99.8, 105.0, 104.9],
        &worked_config(),
    )
    .unwrap();

    assert_eq!(profile.windows, 2);
    assert_relative_eq!(profile.grades.values()[1], 1.0 / 6.0, epsilon = 1e-12);
    assert_relative_eq!(profile.smoothed.elevations()[3], 105.0, epsilon = 1e-9);
    assert_relative_eq!(profile.gain_loss.gain, 5.0, epsilon = 1e-9);
    assert_eq!(profile.gain_loss.loss, 0.0);
    assert_relative_eq!(profile.raw_gain_loss.gain, 5.5, epsilon = 1e-9);
    assert_relative_eq!(profile.raw_gain_loss.loss, 0.6, epsilon = 1e-9);
    assert_eq!(profile.summary.gain, profile.gain_loss.gain);
    assert!(profile.notes.is_empty());
}

#[test]
fn test_configuration_checked_before_data() {
    let bad = SmoothingConfig::foot().with_max_grade(-1.0);
    let err = process(&[0.0], &[1.0, 2.0], &bad).unwrap_err();
    assert!(matches!(err, GradeError::Configuration(_)));
}

#[test]
fn test_notes_carry_merges_and_clamps() {
    let config = SmoothingConfig::foot().with_min_window_span(0.0);
    let profile = process(
        &[0.0, 1.0, 1.0, 2.0, 3.0, 4.0],
        &[0.0, 0.0, 0.0, 40.0, 40.0, 40.0],
        &config,
    )
    .unwrap();

    assert!(matches!(
        profile.notes[0],
        Advisory::MergedDuplicates {
            distance: _,
            count: 2
        }
    ));
    assert!(profile
        .notes
        .iter()
        .any(|n| matches!(n, Advisory::GradeClamped { .. })));
    assert!(profile.grades.iter().all(|g| g.abs() <= 1.0));

    let row = SummaryRow::from_profile("spike", &profile);
    assert_eq!(row.merged_duplicates, 1);
    assert!(row.clamped_windows >= 1);
    assert_eq!(row.samples, 5);
}

#[test]
fn test_batch_keeps_order_and_isolates_failures() {
    let traces = vec![
        RawTrace::new("a", vec![0.0, 10.0, 20.0], vec![1.0, 2.0, 3.0]),
        RawTrace::new("broken", vec![0.0, 10.0, 5.0], vec![1.0, 2.0, 3.0]),
        RawTrace::new("c", vec![0.0, 10.0, 20.0, 30.0], vec![5.0, 9.0, 13.0, 17.0]),
    ];

    let outcomes = process_batch(&traces, &SmoothingConfig::foot());

    let names: Vec<&str> = outcomes.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["a", "broken", "c"]);
    assert!(outcomes[0].result.is_ok());
    assert!(matches!(
        outcomes[1].result,
        Err(GradeError::NonMonotonic { index: 2, .. })
    ));

    let c = outcomes[2].result.as_ref().unwrap();
    assert_relative_eq!(c.gain_loss.gain, 12.0, epsilon = 1e-9);
    assert_relative_eq!(c.summary.max_climb_grade, 0.4, epsilon = 1e-12);
}

#[test]
fn test_batch_matches_sequential() {
    let traces: Vec<RawTrace> = (0..16)
        .map(|k| {
            let distances: Vec<f64> = (0..200).map(|i| i as f64 * 4.0).collect();
            let elevations: Vec<f64> = distances
                .iter()
                .map(|d| 50.0 + (d / (40.0 + k as f64)).sin() * 15.0)
                .collect();
            RawTrace::new(format!("trace-{k}"), distances, elevations)
        })
        .collect();
    let config = SmoothingConfig::foot();

    let outcomes = process_batch(&traces, &config);

    for (trace, outcome) in traces.iter().zip(&outcomes) {
        let parallel = outcome.result.as_ref().unwrap();
        let sequential = process(&trace.distances, &trace.elevations, &config).unwrap();
        assert_eq!(parallel.smoothed, sequential.smoothed);
        assert_eq!(parallel.gain_loss, sequential.gain_loss);
    }
}

#[test]
fn test_dense_clean_climb_keeps_its_gain() {
    let distances: Vec<f64> = (0..=1000).map(|i| i as f64).collect();
    let elevations: Vec<f64> = distances.iter().map(|d| 100.0 + 0.05 * d).collect();

    let profile = process(&distances, &elevations, &SmoothingConfig::foot()).unwrap();

    assert_relative_eq!(profile.raw_gain_loss.gain, 50.0, epsilon = 1e-6);
    assert_relative_eq!(profile.gain_loss.gain, 50.0, epsilon = 1e-6);
    assert_relative_eq!(profile.summary.gain, 50.0, epsilon = 1e-6);
    assert_eq!(profile.gain_loss.loss, 0.0);
}
