//! Field Grid - the 4D scalar array produced by the integrator

use crate::config::Extents;
use crate::error::{FieldError, Result};
use ndarray::{s, Array4, ArrayView1, ArrayView3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scalar field values indexed by (t, x, y, z).
///
/// Fully materialized: every time slice is held at once. The grid is
/// allocated by [`FieldGrid::zeros`] and filled by the integrator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldGrid {
    /// Cell values.
    values: Array4<f64>,

    /// Extents the grid was built with.
    extents: Extents,
}

impl FieldGrid {
    /// Allocate an all-zero grid.
    pub fn zeros(extents: Extents) -> Self {
        Self {
            values: Array4::zeros(extents.shape()),
            extents,
        }
    }

    // =========================================================================
    // SHAPE
    // =========================================================================

    /// Get extents.
    pub fn extents(&self) -> Extents {
        self.extents
    }

    /// Whether (t, x, y, z) lies on a boundary shell.
    ///
    /// Boundary cells are pinned: the stepping rule never writes them.
    pub fn is_boundary(&self, t: usize, x: usize, y: usize, z: usize) -> bool {
        let e = &self.extents;
        t == 0
            || t + 1 >= e.t
            || x == 0
            || x + 1 >= e.x
            || y == 0
            || y + 1 >= e.y
            || z == 0
            || z + 1 >= e.z
    }

    // =========================================================================
    // READING
    // =========================================================================

    /// Value at (t, x, y, z). Panics when out of range.
    #[inline]
    pub fn get(&self, t: usize, x: usize, y: usize, z: usize) -> f64 {
        self.values[[t, x, y, z]]
    }

    /// Spatial slice at time t.
    pub fn slice_at(&self, t: usize) -> ArrayView3<'_, f64> {
        self.values.slice(s![t, .., .., ..])
    }

    /// Time series at one spatial point.
    pub fn time_series(&self, x: usize, y: usize, z: usize) -> Result<Vec<f64>> {
        Ok(self.time_series_view(x, y, z)?.to_vec())
    }

    /// Borrowed time series at one spatial point.
    pub fn time_series_view(&self, x: usize, y: usize, z: usize) -> Result<ArrayView1<'_, f64>> {
        if !self.extents.contains_point(x, y, z) {
            return Err(FieldError::Configuration(format!(
                "point ({x}, {y}, {z}) outside grid {:?}",
                self.extents.shape()
            )));
        }
        Ok(self.values.slice(s![.., x, y, z]))
    }

    /// Raw array view.
    pub fn values(&self) -> &Array4<f64> {
        &self.values
    }

    /// Consume the grid, returning the raw array.
    pub fn into_values(self) -> Array4<f64> {
        self.values
    }

    // =========================================================================
    // WRITING
    // =========================================================================

    /// Set value at (t, x, y, z).
    #[inline]
    pub fn set(&mut self, t: usize, x: usize, y: usize, z: usize, value: f64) {
        self.values[[t, x, y, z]] = value;
    }

    /// Overwrite the spatial slice at time t from a flat iterator in x/y/z order.
    pub(crate) fn fill_slice(&mut self, t: usize, samples: impl IntoIterator<Item = f64>) {
        let mut slice = self.values.slice_mut(s![t, .., .., ..]);
        for (cell, v) in slice.iter_mut().zip(samples) {
            *cell = v;
        }
    }

    // =========================================================================
    // METRICS
    // =========================================================================

    /// Get maximum absolute value in the grid.
    pub fn max_abs(&self) -> f64 {
        self.values.iter().map(|v| v.abs()).fold(0.0f64, f64::max)
    }

    /// Get total non-zero count.
    pub fn non_zero_count(&self) -> usize {
        self.values.iter().filter(|&&v| v != 0.0).count()
    }

    /// Whether every cell is finite.
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}

/// Population standard deviation of a series (0.0 for empty input).
pub fn fluctuation(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    ArrayView1::from(series).std(0.0)
}
