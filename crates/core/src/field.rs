//! Two-dimensional scalar raster with values clamped to [0, 1].
//!
//! A `Field` is the raster form of a density map: a greyscale image, a
//! painted mask or a precomputed function. Values are stored row-major.
//! Unlike the drawing domain, raster coordinates are integer cell indices;
//! [`Field::bilinear`] bridges the two with normalized `(u, v)` lookups.

use crate::error::HatchError;

/// A 2D scalar raster with values clamped to [0, 1] and edge-clamped access.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

fn checked_len(width: usize, height: usize) -> Result<usize, HatchError> {
    if width == 0 || height == 0 {
        return Err(HatchError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .ok_or(HatchError::InvalidDimensions)
}

impl Field {
    /// Creates a zero-filled field.
    ///
    /// Returns `HatchError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, HatchError> {
        Self::filled(width, height, 0.0)
    }

    /// Creates a field filled with `value`, clamped to [0, 1].
    pub fn filled(width: usize, height: usize, value: f64) -> Result<Self, HatchError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![value.clamp(0.0, 1.0); len],
        })
    }

    /// Creates a field by evaluating `f(x, y)` at every cell.
    pub fn from_fn(
        width: usize,
        height: usize,
        f: impl Fn(usize, usize) -> f64,
    ) -> Result<Self, HatchError> {
        let len = checked_len(width, height)?;
        let data = (0..len)
            .map(|i| f(i % width, i / width).clamp(0.0, 1.0))
            .collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Creates a field from row-major data, clamping every value.
    ///
    /// Returns `HatchError::InvalidDimensions` if `data.len()` does not match.
    pub fn from_data(width: usize, height: usize, data: Vec<f64>) -> Result<Self, HatchError> {
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(HatchError::InvalidDimensions);
        }
        Ok(Self {
            width,
            height,
            data: data.into_iter().map(|v| v.clamp(0.0, 1.0)).collect(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y.min(self.height - 1) * self.width + x.min(self.width - 1)
    }

    /// Value at `(x, y)`; coordinates past the edge read the edge.
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[self.index(x, y)]
    }

    /// Sets the value at `(x, y)`, clamped to [0, 1]. Coordinates past the
    /// edge write the edge.
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        let idx = self.index(x, y);
        self.data[idx] = value.clamp(0.0, 1.0);
    }

    /// Bilinear sample at normalized coordinates `u, v ∈ [0, 1]`.
    ///
    /// Cell centres sit at `(i + 0.5) / width`. Outside the centre lattice the
    /// nearest edge value is used.
    pub fn bilinear(&self, u: f64, v: f64) -> f64 {
        let fx = (u * self.width as f64 - 0.5).clamp(0.0, (self.width - 1) as f64);
        let fy = (v * self.height as f64 - 0.5).clamp(0.0, (self.height - 1) as f64);
        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let tx = fx - x0 as f64;
        let ty = fy - y0 as f64;
        let top = self.get(x0, y0) * (1.0 - tx) + self.get(x0 + 1, y0) * tx;
        let bottom = self.get(x0, y0 + 1) * (1.0 - tx) + self.get(x0 + 1, y0 + 1) * tx;
        top * (1.0 - ty) + bottom * ty
    }
}
