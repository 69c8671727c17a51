#![deny(unsafe_code)]
//! Core types for the flowhatch flow-line generator.
//!
//! Provides `Vector` (2D with cached length), the `Xorshift64` PRNG and
//! Fisher–Yates `shuffle`, the multi-resolution `OccupancyGrid`, the
//! `VectorField` and `DensityMap` contracts with ready-made sources,
//! `FlowConfig`, `FlowLineGenerator`, `Seed`, and parameter helpers.

pub mod config;
pub mod density;
pub mod error;
pub mod field;
pub mod field_source;
pub mod flow;
pub mod grid;
pub mod params;
pub mod prng;
pub mod seed;
pub mod vector;

pub use config::FlowConfig;
pub use density::{Density, DensityMap, RadialDensity, RasterDensity};
pub use error::HatchError;
pub use field::Field;
pub use field_source::VectorField;
pub use flow::{rk4_step, FlowLine, FlowLineGenerator};
pub use grid::{CellScale, GridLevel, OccupancyGrid, MAX_LEVELS};
pub use prng::{shuffle, Xorshift64};
pub use seed::Seed;
pub use vector::Vector;
