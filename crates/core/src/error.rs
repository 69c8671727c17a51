//! Error types for the flowhatch core.
//!
//! Only construction and configuration can fail. A missing field sample or a
//! rejected integration step is an `Option`, never an error.

use thiserror::Error;

/// Errors produced while configuring a generator or its collaborators.
#[derive(Debug, Error)]
pub enum HatchError {
    /// Width or height was zero, negative or non-finite.
    #[error("invalid dimensions: width and height must be positive and finite")]
    InvalidDimensions,

    /// Integration step size was zero or non-finite.
    #[error("invalid step size {0}: must be non-zero and finite")]
    InvalidStepSize(f64),

    /// Level count was zero or wider than the occupancy bitmask.
    #[error("invalid level count {count}: must be between 1 and {max}")]
    InvalidLevelCount { count: usize, max: usize },

    /// Cell sizes were non-positive or out of order.
    #[error("invalid cell sizes: min {min} and max {max} must be positive with min <= max")]
    InvalidCellSize { min: f64, max: f64 },

    /// A grid level rounded to zero cells along one axis.
    #[error("grid level {level} is degenerate: {nx} x {ny} cells")]
    DegenerateGrid { level: usize, nx: usize, ny: usize },

    /// A grid level had more cells than a seed index can address.
    #[error("grid level {level} is too large: {nx} x {ny} cells exceeds {max}")]
    GridTooLarge {
        level: usize,
        nx: usize,
        ny: usize,
        max: usize,
    },

    /// A parameter existed but had the wrong JSON type.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// No field source is registered under this name.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// No density map is registered under this name.
    #[error("unknown density: {0}")]
    UnknownDensity(String),

    /// Reading or writing an external resource failed.
    #[error("I/O error: {0}")]
    Io(String),
}
