//! Dose grids on axis-aligned rectilinear coordinates.
//!
//! A `DoseGrid` owns one coordinate axis per spatial dimension and a flat
//! dose buffer in row-major order: the last axis varies fastest, so the flat
//! index of `(i, j, k)` is `(i * ny + j) * nz + k`. Axes must be strictly
//! ascending but need not be uniformly spaced.

use crate::util::{GammaError, GammaResult};

pub mod interp;

/// Largest supported grid dimensionality.
pub const MAX_DIMS: usize = 3;

/// Owned dose distribution sampled on a rectilinear grid.
#[derive(Clone, Debug)]
pub struct DoseGrid {
    axes: Vec<Vec<f64>>,
    values: Vec<f64>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl DoseGrid {
    /// Creates a grid from per-dimension axes and a row-major dose buffer.
    pub fn new(axes: Vec<Vec<f64>>, values: Vec<f64>) -> GammaResult<Self> {
        let ndim = axes.len();
        if ndim == 0 || ndim > MAX_DIMS {
            return Err(GammaError::InvalidDimensions { ndim });
        }
        for (axis_idx, axis) in axes.iter().enumerate() {
            validate_axis(axis_idx, axis)?;
        }

        let shape: Vec<usize> = axes.iter().map(Vec::len).collect();
        let expected = shape.iter().product::<usize>();
        if values.len() != expected {
            return Err(GammaError::ShapeMismatch {
                expected,
                got: values.len(),
            });
        }
        if let Some((index, &value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(GammaError::InvalidDose { index, value });
        }

        let mut strides = vec![1usize; ndim];
        for dim in (0..ndim - 1).rev() {
            strides[dim] = strides[dim + 1] * shape[dim + 1];
        }

        Ok(Self {
            axes,
            values,
            shape,
            strides,
        })
    }

    /// Creates a 1D grid.
    pub fn new_1d(x: Vec<f64>, values: Vec<f64>) -> GammaResult<Self> {
        Self::new(vec![x], values)
    }

    /// Returns the number of spatial dimensions.
    pub fn ndim(&self) -> usize {
        self.axes.len()
    }

    /// Returns the number of samples along each axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns all coordinate axes.
    pub fn axes(&self) -> &[Vec<f64>] {
        &self.axes
    }

    /// Returns the coordinates of one axis.
    pub fn axis(&self, dim: usize) -> Option<&[f64]> {
        self.axes.get(dim).map(Vec::as_slice)
    }

    /// Returns the flat row-major dose buffer.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the total number of grid points.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Grids always hold at least one point.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the element stride of each dimension in the flat buffer.
    pub(crate) fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Returns the dose at a multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        self.flat_index(index).map(|idx| self.values[idx])
    }

    /// Converts a multi-dimensional index into a flat buffer index.
    pub fn flat_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.ndim() {
            return None;
        }
        let mut flat = 0usize;
        for ((&i, &n), &stride) in index.iter().zip(&self.shape).zip(&self.strides) {
            if i >= n {
                return None;
            }
            flat += i * stride;
        }
        Some(flat)
    }

    /// Writes the coordinates of the point at `flat` into `out`.
    ///
    /// `out` must have length `ndim()`.
    pub fn point(&self, flat: usize, out: &mut [f64]) {
        debug_assert_eq!(out.len(), self.ndim());
        debug_assert!(flat < self.len());
        for (dim, coord) in out.iter_mut().enumerate() {
            let i = (flat / self.strides[dim]) % self.shape[dim];
            *coord = self.axes[dim][i];
        }
    }

    /// Returns the maximum dose value.
    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Returns the inclusive `(min, max)` coordinate range of each axis.
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.axes
            .iter()
            .map(|axis| (axis[0], axis[axis.len() - 1]))
            .collect()
    }
}

fn validate_axis(axis_idx: usize, axis: &[f64]) -> GammaResult<()> {
    if axis.is_empty() {
        return Err(GammaError::InvalidAxis {
            axis: axis_idx,
            reason: "axis is empty",
        });
    }
    if axis.iter().any(|v| !v.is_finite()) {
        return Err(GammaError::InvalidAxis {
            axis: axis_idx,
            reason: "axis contains non-finite coordinates",
        });
    }
    if axis.windows(2).any(|pair| pair[1] <= pair[0]) {
        return Err(GammaError::InvalidAxis {
            axis: axis_idx,
            reason: "axis must be strictly ascending",
        });
    }
    Ok(())
}
