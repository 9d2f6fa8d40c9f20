//! Multi-linear interpolation over a `DoseGrid`.
//!
//! Queries inside the grid's bounding box (inclusive) blend the `2^D`
//! surrounding samples. Queries outside, or with non-finite coordinates,
//! return `+inf` so that they never produce a finite gamma candidate.

use crate::grid::{DoseGrid, MAX_DIMS};

/// Borrowed linear sampler over an evaluation grid.
#[derive(Copy, Clone, Debug)]
pub struct GridInterpolator<'a> {
    grid: &'a DoseGrid,
}

impl<'a> GridInterpolator<'a> {
    /// Wraps a grid for interpolation.
    pub fn new(grid: &'a DoseGrid) -> Self {
        Self { grid }
    }

    /// Returns the dimensionality of query points.
    pub fn ndim(&self) -> usize {
        self.grid.ndim()
    }

    /// Returns the underlying grid.
    pub fn grid(&self) -> &'a DoseGrid {
        self.grid
    }

    /// Samples the grid at one point.
    ///
    /// `point` must have length `ndim()`.
    pub fn sample(&self, point: &[f64]) -> f64 {
        let ndim = self.grid.ndim();
        debug_assert_eq!(point.len(), ndim);

        let mut lower = [0usize; MAX_DIMS];
        let mut upper = [0usize; MAX_DIMS];
        let mut frac = [0.0f64; MAX_DIMS];
        for (dim, axis) in self.grid.axes().iter().enumerate() {
            match locate(axis, point[dim]) {
                Some((lo, hi, t)) => {
                    lower[dim] = lo;
                    upper[dim] = hi;
                    frac[dim] = t;
                }
                None => return f64::INFINITY,
            }
        }

        let values = self.grid.values();
        let strides = self.grid.strides();
        let mut acc = 0.0f64;
        for corner in 0..(1usize << ndim) {
            let mut weight = 1.0f64;
            let mut idx = 0usize;
            for dim in 0..ndim {
                if (corner >> dim) & 1 == 1 {
                    weight *= frac[dim];
                    idx += upper[dim] * strides[dim];
                } else {
                    weight *= 1.0 - frac[dim];
                    idx += lower[dim] * strides[dim];
                }
            }
            if weight != 0.0 {
                acc += weight * values[idx];
            }
        }
        acc
    }

    /// Samples a packed `(M, D)` batch of points into `out` (length `M`).
    pub fn sample_into(&self, points: &[f64], out: &mut [f64]) {
        let ndim = self.grid.ndim();
        debug_assert_eq!(points.len(), out.len() * ndim);
        for (point, value) in points.chunks_exact(ndim).zip(out.iter_mut()) {
            *value = self.sample(point);
        }
    }
}

/// Finds the bracketing sample indices and blend weight for `x`.
fn locate(axis: &[f64], x: f64) -> Option<(usize, usize, f64)> {
    let n = axis.len();
    // Written this way so NaN falls outside.
    if !(x >= axis[0] && x <= axis[n - 1]) {
        return None;
    }
    if n == 1 {
        return Some((0, 0, 0.0));
    }
    let lo = axis
        .partition_point(|&a| a <= x)
        .saturating_sub(1)
        .min(n - 2);
    let t = (x - axis[lo]) / (axis[lo + 1] - axis[lo]);
    Some((lo, lo + 1, t))
}
