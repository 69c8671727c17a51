//! Generator configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HatchError;
use crate::grid::{self, CellScale};
use crate::params::{checked_bool, checked_f64, checked_u64, checked_usize};

const DEFAULT_WIDTH: f64 = 800.0;
const DEFAULT_HEIGHT: f64 = 800.0;
const DEFAULT_STEP_SIZE: f64 = 1.0;
/// Unbounded.
const DEFAULT_MAX_LENGTH: f64 = 0.0;
const DEFAULT_MIN_CELL_SIZE: f64 = 6.0;
const DEFAULT_MAX_CELL_SIZE: f64 = 6.0;
const DEFAULT_LEVEL_COUNT: usize = 1;
/// No iteration cap; lines stop only when both ends die or at `max_length`.
const DEFAULT_MAX_STEPS: usize = 0;
const DEFAULT_SEED: u64 = 42;

/// Everything a [`FlowLineGenerator`](crate::flow::FlowLineGenerator) needs
/// besides its field and density callbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Domain width; points live in `[0, width)`.
    pub width: f64,
    /// Domain height; points live in `[0, height)`.
    pub height: f64,
    /// RK4 step. The sign flips which end of the line counts as forward.
    pub step_size: f64,
    /// Length cap per line. `<= 0` means unbounded.
    pub max_length: f64,
    /// Cell size of occupancy level 0.
    pub min_cell_size: f64,
    /// Cell size of the last occupancy level.
    pub max_cell_size: f64,
    /// Number of occupancy levels, 1 to 32.
    pub level_count: usize,
    pub cell_scale: CellScale,
    /// Optional growth iterations per line before giving up. `0`, the
    /// default, means unbounded.
    pub max_steps: usize,
    /// PRNG seed for seed order and jitter.
    pub seed: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            step_size: DEFAULT_STEP_SIZE,
            max_length: DEFAULT_MAX_LENGTH,
            min_cell_size: DEFAULT_MIN_CELL_SIZE,
            max_cell_size: DEFAULT_MAX_CELL_SIZE,
            level_count: DEFAULT_LEVEL_COUNT,
            cell_scale: CellScale::Linear,
            max_steps: DEFAULT_MAX_STEPS,
            seed: DEFAULT_SEED,
        }
    }
}

impl FlowConfig {
    /// Config for a `width × height` domain with every other value defaulted.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Reads a config from a JSON object, defaulting missing keys.
    ///
    /// The cell scale is read from `cell_scale` (`"linear"` or
    /// `"logarithmic"`, as serialized) or, when that key is absent, from a
    /// `logarithmic: bool` shorthand. Present keys with the wrong JSON type
    /// are reported rather than ignored.
    pub fn from_json(params: &Value) -> Result<Self, HatchError> {
        let d = Self::default();
        Ok(Self {
            width: checked_f64(params, "width", d.width)?,
            height: checked_f64(params, "height", d.height)?,
            step_size: checked_f64(params, "step_size", d.step_size)?,
            max_length: checked_f64(params, "max_length", d.max_length)?,
            min_cell_size: checked_f64(params, "min_cell_size", d.min_cell_size)?,
            max_cell_size: checked_f64(params, "max_cell_size", d.max_cell_size)?,
            level_count: checked_usize(params, "level_count", d.level_count)?,
            cell_scale: cell_scale_from_json(params)?,
            max_steps: checked_usize(params, "max_steps", d.max_steps)?,
            seed: checked_u64(params, "seed", d.seed)?,
        })
    }

    /// Sets both cell sizes and the level count in one go.
    pub fn with_cells(mut self, min: f64, max: f64, levels: usize, scale: CellScale) -> Self {
        self.min_cell_size = min;
        self.max_cell_size = max;
        self.level_count = levels;
        self.cell_scale = scale;
        self
    }

    pub fn with_step(mut self, step_size: f64, max_length: f64) -> Self {
        self.step_size = step_size;
        self.max_length = max_length;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Whether `max_length` caps lines at all.
    pub fn is_length_bounded(&self) -> bool {
        self.max_length > 0.0
    }

    /// Checks every parameter that can be checked without allocating a grid.
    pub fn validate(&self) -> Result<(), HatchError> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(HatchError::InvalidDimensions);
        }
        if !self.step_size.is_finite() || self.step_size == 0.0 {
            return Err(HatchError::InvalidStepSize(self.step_size));
        }
        grid::check_schedule(self.min_cell_size, self.max_cell_size, self.level_count)
    }
}

fn cell_scale_from_json(params: &Value) -> Result<CellScale, HatchError> {
    match params.get("cell_scale") {
        None | Some(Value::Null) => Ok(CellScale::from_logarithmic(checked_bool(
            params,
            "logarithmic",
            false,
        )?)),
        Some(v) => CellScale::deserialize(v).map_err(|_| HatchError::ParamTypeMismatch {
            name: "cell_scale".to_owned(),
            expected: "\"linear\" or \"logarithmic\"".to_owned(),
            got: v.to_string(),
        }),
    }
}
