//! Search shells: offset vectors of fixed magnitude around a reference point.
//!
//! A shell of radius `r` holds points on the circle (2D) or sphere (3D) of
//! that radius, spaced so that no point is farther than `step` from its
//! nearest neighbour. In 1D the shell is the pair `{-r, +r}`. A zero radius
//! always yields a single offset at the origin.

use crate::util::math::{closed_linspace_at, covering_count, open_linspace_at};
use crate::util::{GammaError, GammaResult};
use std::f64::consts::{PI, TAU};

/// Packed set of shell offsets, one row of `ndim` coordinates per point.
#[derive(Clone, Debug)]
pub struct Shell {
    ndim: usize,
    radius: f64,
    offsets: Vec<f64>,
}

impl Shell {
    /// Builds the shell for `radius` in `ndim` dimensions with maximum gap `step`.
    pub fn new(radius: f64, ndim: usize, step: f64) -> GammaResult<Self> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(GammaError::InvalidShell {
                reason: "radius must be finite and >= 0",
            });
        }
        if !step.is_finite() || step <= 0.0 {
            return Err(GammaError::InvalidShell {
                reason: "step must be finite and > 0",
            });
        }

        let offsets = match ndim {
            1 => shell_1d(radius),
            2 => shell_2d(radius, step),
            3 => shell_3d(radius, step),
            _ => return Err(GammaError::InvalidDimensions { ndim }),
        };

        Ok(Self {
            ndim,
            radius,
            offsets,
        })
    }

    /// Returns the number of offsets in the shell.
    pub fn len(&self) -> usize {
        self.offsets.len() / self.ndim
    }

    /// Returns true if the shell holds no offsets.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Returns the dimensionality of each offset.
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// Returns the shell radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the packed `(len, ndim)` offset buffer.
    pub fn as_slice(&self) -> &[f64] {
        &self.offsets
    }

    /// Returns the offset at `idx`.
    pub fn offset(&self, idx: usize) -> &[f64] {
        &self.offsets[idx * self.ndim..(idx + 1) * self.ndim]
    }

    /// Iterates over all offsets.
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.offsets.chunks_exact(self.ndim)
    }
}

fn shell_1d(radius: f64) -> Vec<f64> {
    if radius == 0.0 {
        vec![0.0]
    } else {
        vec![radius, -radius]
    }
}

fn shell_2d(radius: f64, step: f64) -> Vec<f64> {
    let count = covering_count(TAU * radius, step);
    let mut offsets = Vec::with_capacity(count * 2);
    for idx in 0..count {
        let theta = open_linspace_at(TAU, count, idx);
        let (sin_t, cos_t) = theta.sin_cos();
        offsets.push(radius * cos_t);
        offsets.push(radius * sin_t);
    }
    offsets
}

fn shell_3d(radius: f64, step: f64) -> Vec<f64> {
    let rows = covering_count(PI * radius, step);
    let mut offsets = Vec::new();
    for row in 0..rows {
        let phi = closed_linspace_at(PI, rows, row);
        let (sin_p, cos_p) = phi.sin_cos();
        let z = radius * cos_p;

        // Poles collapse to a single point.
        if row == 0 || row == rows - 1 {
            offsets.extend_from_slice(&[0.0, 0.0, z]);
            continue;
        }

        let ring_radius = radius * sin_p;
        let count = covering_count(TAU * ring_radius, step);
        offsets.reserve(count * 3);
        for idx in 0..count {
            let azimuth = open_linspace_at(TAU, count, idx);
            let (sin_a, cos_a) = azimuth.sin_cos();
            offsets.push(ring_radius * cos_a);
            offsets.push(ring_radius * sin_a);
            offsets.push(z);
        }
    }
    offsets
}
