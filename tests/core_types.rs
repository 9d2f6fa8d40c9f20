use gammaindex::{gamma, DoseGrid, GammaConfig, GammaError, NormalisationMode, Thresholds};

fn line(n: usize, dose: f64) -> DoseGrid {
    DoseGrid::new_1d((0..n).map(|i| i as f64).collect(), vec![dose; n]).unwrap()
}

#[test]
fn dose_grid_rejects_bad_dimensions() {
    let err = DoseGrid::new(Vec::new(), Vec::new()).err().unwrap();
    assert_eq!(err, GammaError::InvalidDimensions { ndim: 0 });

    let axes = vec![vec![0.0]; 4];
    let err = DoseGrid::new(axes, vec![1.0]).err().unwrap();
    assert_eq!(err, GammaError::InvalidDimensions { ndim: 4 });
}

#[test]
fn dose_grid_rejects_bad_axes() {
    let err = DoseGrid::new_1d(Vec::new(), Vec::new()).err().unwrap();
    assert_eq!(
        err,
        GammaError::InvalidAxis {
            axis: 0,
            reason: "axis is empty",
        }
    );

    let err = DoseGrid::new(vec![vec![0.0, 1.0], vec![0.0, 2.0, 1.0]], vec![1.0; 6])
        .err()
        .unwrap();
    assert_eq!(
        err,
        GammaError::InvalidAxis {
            axis: 1,
            reason: "axis must be strictly ascending",
        }
    );

    let err = DoseGrid::new_1d(vec![0.0, f64::NAN], vec![1.0; 2])
        .err()
        .unwrap();
    assert_eq!(
        err,
        GammaError::InvalidAxis {
            axis: 0,
            reason: "axis contains non-finite coordinates",
        }
    );
}

#[test]
fn dose_grid_rejects_shape_and_dose_errors() {
    let err = DoseGrid::new(vec![vec![0.0, 1.0], vec![0.0, 1.0, 2.0]], vec![1.0; 5])
        .err()
        .unwrap();
    assert_eq!(err, GammaError::ShapeMismatch { expected: 6, got: 5 });

    let err = DoseGrid::new_1d(vec![0.0, 1.0, 2.0], vec![1.0, -0.5, 1.0])
        .err()
        .unwrap();
    assert_eq!(
        err,
        GammaError::InvalidDose {
            index: 1,
            value: -0.5,
        }
    );
}

#[test]
fn dose_grid_indexing_is_row_major() {
    let values: Vec<f64> = (0..24).map(|v| v as f64).collect();
    let grid = DoseGrid::new(
        vec![vec![0.0, 1.0], vec![0.0, 1.0, 2.0], vec![0.0, 0.5, 1.0, 1.5]],
        values,
    )
    .unwrap();
    assert_eq!(grid.shape(), &[2, 3, 4]);
    assert_eq!(grid.get(&[1, 2, 3]), Some(23.0));
    assert_eq!(grid.get(&[0, 1, 2]), Some(6.0));
    assert_eq!(grid.get(&[2, 0, 0]), None);
    assert_eq!(grid.max_value(), 23.0);
    assert_eq!(grid.bounds(), vec![(0.0, 1.0), (0.0, 2.0), (0.0, 1.5)]);
}

#[test]
fn gamma_rejects_dimension_mismatch() {
    let reference = line(4, 1.0);
    let evaluation = DoseGrid::new(vec![vec![0.0, 1.0], vec![0.0, 1.0]], vec![1.0; 4]).unwrap();
    let err = gamma(&reference, &evaluation, 3.0, 1.0, &GammaConfig::default())
        .err()
        .unwrap();
    assert_eq!(
        err,
        GammaError::DimensionMismatch {
            reference: 1,
            evaluation: 2,
        }
    );
}

#[test]
fn gamma_rejects_bad_thresholds() {
    let grid = line(4, 1.0);
    let cfg = GammaConfig::default();

    let err = gamma(&grid, &grid, Vec::<f64>::new(), 1.0, &cfg)
        .err()
        .unwrap();
    assert_eq!(err, GammaError::EmptyThresholds { kind: "dose percent" });

    let err = gamma(&grid, &grid, 3.0, vec![1.0, 0.0], &cfg)
        .err()
        .unwrap();
    assert_eq!(
        err,
        GammaError::InvalidThreshold {
            kind: "distance",
            value: 0.0,
        }
    );

    let err = gamma(&grid, &grid, -3.0, 1.0, &cfg).err().unwrap();
    assert_eq!(
        err,
        GammaError::InvalidThreshold {
            kind: "dose percent",
            value: -3.0,
        }
    );
}

#[test]
fn gamma_rejects_invalid_config() {
    let grid = line(4, 1.0);

    let cfg = GammaConfig {
        lower_percent_dose_cutoff: 100.0,
        ..GammaConfig::default()
    };
    assert!(matches!(
        gamma(&grid, &grid, 3.0, 1.0, &cfg),
        Err(GammaError::InvalidConfig { .. })
    ));

    let cfg = GammaConfig {
        interp_fraction: 0.5,
        ..GammaConfig::default()
    };
    assert!(matches!(
        gamma(&grid, &grid, 3.0, 1.0, &cfg),
        Err(GammaError::InvalidConfig { .. })
    ));

    let cfg = GammaConfig {
        max_gamma: -1.0,
        ..GammaConfig::default()
    };
    assert!(matches!(
        gamma(&grid, &grid, 3.0, 1.0, &cfg),
        Err(GammaError::InvalidConfig { .. })
    ));

    let cfg = GammaConfig {
        global_normalisation: Some(0.0),
        ..GammaConfig::default()
    };
    assert!(matches!(
        gamma(&grid, &grid, 3.0, 1.0, &cfg),
        Err(GammaError::InvalidConfig { .. })
    ));

    let cfg = GammaConfig {
        ram_available: 0,
        ..GammaConfig::default()
    };
    assert!(matches!(
        gamma(&grid, &grid, 3.0, 1.0, &cfg),
        Err(GammaError::InvalidConfig { .. })
    ));
}

#[test]
fn local_mode_requires_positive_cutoff() {
    let grid = line(4, 1.0);
    let cfg = GammaConfig {
        mode: NormalisationMode::Local,
        lower_percent_dose_cutoff: 0.0,
        ..GammaConfig::default()
    };
    assert_eq!(
        gamma(&grid, &grid, 3.0, 1.0, &cfg).err().unwrap(),
        GammaError::InvalidConfig {
            reason: "local normalisation requires lower_percent_dose_cutoff > 0",
        }
    );
}

#[test]
fn all_zero_reference_without_normalisation_is_rejected() {
    let reference = line(4, 0.0);
    let evaluation = line(4, 1.0);
    let cfg = GammaConfig::default();
    let err = gamma(&reference, &evaluation, 3.0, 1.0, &cfg)
        .err()
        .unwrap();
    assert_eq!(
        err,
        GammaError::InvalidConfig {
            reason: "reference dose is all zero, so the derived global normalisation is 0; \
                     pass global_normalisation",
        }
    );

    let explicit = GammaConfig {
        global_normalisation: Some(1.0),
        ..GammaConfig::default()
    };
    let map = gamma(&reference, &evaluation, 3.0, 1.0, &explicit)
        .unwrap()
        .into_single()
        .unwrap();
    assert_eq!(map.valid_count(), 0);
}

#[test]
fn thresholds_convert_from_scalars_and_lists() {
    assert_eq!(Thresholds::from(3.0).values(), &[3.0]);
    assert_eq!(Thresholds::from(vec![1.0, 2.0]).len(), 2);
    assert_eq!(Thresholds::from([1.0, 2.0, 3.0]).len(), 3);
    let slice: &[f64] = &[0.5];
    assert_eq!(Thresholds::from(slice).values(), &[0.5]);
}
