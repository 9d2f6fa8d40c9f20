#![allow(dead_code)]

use gammaindex::DoseGrid;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const CUBE_SHAPE: [usize; 3] = [10, 12, 14];

/// Uniform axis `0, spacing, 2 * spacing, ...` with `n` samples.
pub fn axis(n: usize, spacing: f64) -> Vec<f64> {
    (0..n).map(|i| i as f64 * spacing).collect()
}

/// Zero-filled cube with `value` written into the half-open index box.
pub fn cube(ranges: [(usize, usize); 3], value: f64) -> Vec<f64> {
    let [nx, ny, nz] = CUBE_SHAPE;
    let mut out = vec![0.0; nx * ny * nz];
    paint(&mut out, ranges, value);
    out
}

/// Overwrites the half-open index box of a cube with `value`.
pub fn paint(out: &mut [f64], ranges: [(usize, usize); 3], value: f64) {
    let [_, ny, nz] = CUBE_SHAPE;
    for i in ranges[0].0..ranges[0].1 {
        for j in ranges[1].0..ranges[1].1 {
            for k in ranges[2].0..ranges[2].1 {
                out[(i * ny + j) * nz + k] = value;
            }
        }
    }
}

/// Reference and evaluation doses of the dummy cube plus the rounded gamma
/// expected at `(3%, 0.3)` with no lower cutoff.
pub struct DummyCube {
    pub axes: Vec<Vec<f64>>,
    pub reference: Vec<f64>,
    pub evaluation: Vec<f64>,
    pub expected: Vec<f64>,
}

pub fn dummy_cube() -> DummyCube {
    let axes = CUBE_SHAPE.iter().map(|&n| axis(n, 0.1)).collect();
    let reference = cube([(3, 8), (4, 10), (5, 12)], 1.015);
    let evaluation = cube([(2, 8), (2, 10), (2, 12)], 1.0);

    let mut expected = cube([(2, 8), (2, 10), (2, 12)], 0.4);
    paint(&mut expected, [(3, 7), (3, 9), (3, 11)], 0.7);
    paint(&mut expected, [(4, 6), (4, 8), (4, 10)], 1.0);
    paint(&mut expected, [(3, 8), (4, 10), (5, 12)], 0.5);

    DummyCube {
        axes,
        reference,
        evaluation,
        expected,
    }
}

/// Random 2-D dose grid on a unit-spaced axis pair.
pub fn random_grid_2d(nx: usize, ny: usize, seed: u64) -> DoseGrid {
    let mut rng = StdRng::seed_from_u64(seed);
    let values = (0..nx * ny).map(|_| rng.random::<f64>()).collect();
    DoseGrid::new(vec![axis(nx, 1.0), axis(ny, 1.0)], values).unwrap()
}

/// Returns a copy of `grid` with every dose perturbed by up to `+-amplitude`.
pub fn perturbed(grid: &DoseGrid, amplitude: f64, seed: u64) -> DoseGrid {
    let mut rng = StdRng::seed_from_u64(seed);
    let values = grid
        .values()
        .iter()
        .map(|&v| (v + rng.random_range(-amplitude..=amplitude)).max(0.0))
        .collect();
    DoseGrid::new(grid.axes().to_vec(), values).unwrap()
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Asserts two gamma arrays agree, treating `NaN` as equal to `NaN`.
pub fn assert_same_gamma(actual: &[f64], expected: &[f64], tol: f64) {
    assert_eq!(actual.len(), expected.len());
    for (idx, (&a, &e)) in actual.iter().zip(expected).enumerate() {
        if e.is_nan() {
            assert!(a.is_nan(), "index {idx}: expected NaN, got {a}");
        } else {
            assert!((a - e).abs() <= tol, "index {idx}: expected {e}, got {a}");
        }
    }
}
