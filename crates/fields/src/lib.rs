#![deny(unsafe_code)]
//! Field registry: maps field-source and density-map names to
//! implementations built from JSON parameters.
//!
//! This crate sits between `flowhatch-core` (which defines `VectorField`,
//! `DensityMap` and the concrete sources) and the CLI, so name-based
//! dispatch lives in one place.

use flowhatch_core::density::{Density, RadialDensity, RasterDensity};
use flowhatch_core::error::HatchError;
use flowhatch_core::field::Field;
use flowhatch_core::field_source::{
    Composite, Curl, DiskMask, NoiseAngle, NoiseVector, Radial, Uniform, VectorField, Vortex,
};
use flowhatch_core::params::checked_f64;
use flowhatch_core::vector::Vector;
use noise::{NoiseFn, Perlin};
use serde_json::Value;

/// All available field-source names.
const FIELD_NAMES: &[&str] = &["uniform", "noise", "noise-vector", "curl", "vortex", "radial"];

/// All available density-map names.
const DENSITY_NAMES: &[&str] = &["none", "radial", "noise"];

/// Cells per axis of the raster behind the `noise` density map.
const DENSITY_RASTER: usize = 128;

/// Folds a 64-bit run seed into the 32-bit seed Perlin noise takes.
fn noise_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

/// Enumeration of the built-in field sources.
///
/// Use [`FieldKind::from_name`] for string-based construction and
/// [`build_field`] to also apply the shared `bias` and `mask_radius`
/// parameters.
pub enum FieldKind {
    /// Constant direction, `angle` degrees from +x.
    Uniform(Uniform),
    /// Unit vectors whose angle follows Perlin noise.
    Noise(NoiseAngle),
    /// Two independent Perlin channels.
    NoiseVector(NoiseVector),
    /// Curl of Perlin noise.
    Curl(Curl),
    /// Rotation about a centre.
    Vortex(Vortex),
    /// Outward (or inward) from a centre.
    Radial(Radial),
}

impl FieldKind {
    /// Constructs a field source by name. Centres default to the middle of
    /// the `width × height` domain.
    ///
    /// Returns `HatchError::UnknownField` if the name is not recognized.
    pub fn from_name(
        name: &str,
        width: f64,
        height: f64,
        seed: u64,
        params: &Value,
    ) -> Result<Self, HatchError> {
        let scale = || checked_f64(params, "scale", 0.01);
        let strength = || checked_f64(params, "strength", 1.0);
        let cx = || checked_f64(params, "cx", width / 2.0);
        let cy = || checked_f64(params, "cy", height / 2.0);
        match name {
            "uniform" => Ok(FieldKind::Uniform(Uniform::from_degrees(checked_f64(
                params, "angle", 0.0,
            )?))),
            "noise" => Ok(FieldKind::Noise(NoiseAngle::new(
                scale()?,
                checked_f64(params, "turns", 1.0)?,
                noise_seed(seed),
            ))),
            "noise-vector" => Ok(FieldKind::NoiseVector(NoiseVector::new(
                scale()?,
                strength()?,
                noise_seed(seed),
            ))),
            "curl" => Ok(FieldKind::Curl(Curl::new(
                scale()?,
                strength()?,
                noise_seed(seed),
            ))),
            "vortex" => Ok(FieldKind::Vortex(Vortex {
                cx: cx()?,
                cy: cy()?,
                strength: strength()?,
                radius: checked_f64(params, "radius", 0.0)?,
            })),
            "radial" => Ok(FieldKind::Radial(Radial {
                cx: cx()?,
                cy: cy()?,
                strength: strength()?,
            })),
            _ => Err(HatchError::UnknownField(name.to_string())),
        }
    }

    /// Returns a slice of all recognized field names.
    pub fn list_fields() -> &'static [&'static str] {
        FIELD_NAMES
    }
}

impl VectorField for FieldKind {
    fn sample(&self, p: &Vector) -> Option<Vector> {
        match self {
            FieldKind::Uniform(f) => f.sample(p),
            FieldKind::Noise(f) => f.sample(p),
            FieldKind::NoiseVector(f) => f.sample(p),
            FieldKind::Curl(f) => f.sample(p),
            FieldKind::Vortex(f) => f.sample(p),
            FieldKind::Radial(f) => f.sample(p),
        }
    }
}

/// Builds a named field source with the shared modifiers applied.
///
/// `bias` (with `bias_angle` in degrees) adds a constant drift of that
/// magnitude. `mask_radius` restricts the result to a disk centred on the
/// domain; the field is absent outside it.
pub fn build_field(
    name: &str,
    width: f64,
    height: f64,
    seed: u64,
    params: &Value,
) -> Result<Box<dyn VectorField>, HatchError> {
    let mut field: Box<dyn VectorField> =
        Box::new(FieldKind::from_name(name, width, height, seed, params)?);

    let bias = checked_f64(params, "bias", 0.0)?;
    if bias != 0.0 {
        let (sin, cos) = checked_f64(params, "bias_angle", 0.0)?.to_radians().sin_cos();
        field = Box::new(
            Composite::new()
                .add_boxed(field)
                .add(Uniform::new(cos * bias, sin * bias)),
        );
    }

    let mask_radius = checked_f64(params, "mask_radius", 0.0)?;
    if mask_radius > 0.0 {
        field = Box::new(DiskMask::boxed(
            field,
            width / 2.0,
            height / 2.0,
            mask_radius,
        ));
    }
    Ok(field)
}

/// Returns a slice of all recognized density-map names.
pub fn list_densities() -> &'static [&'static str] {
    DENSITY_NAMES
}

/// Constructs a density strategy by name.
///
/// - `none`: uniform spacing at the finest level.
/// - `radial`: `density_inner` (default 0) at the centre ramping to
///   `density_outer` (default 1) at `density_radius` (default half the
///   shorter side).
/// - `noise`: Perlin noise at `density_scale` (default 0.005), rasterised
///   over the domain.
///
/// Returns `HatchError::UnknownDensity` if the name is not recognized.
pub fn density_from_name(
    name: &str,
    width: f64,
    height: f64,
    seed: u64,
    params: &Value,
) -> Result<Density, HatchError> {
    match name {
        "none" => Ok(Density::Uniform),
        "radial" => Ok(Density::mapped(RadialDensity {
            cx: checked_f64(params, "cx", width / 2.0)?,
            cy: checked_f64(params, "cy", height / 2.0)?,
            radius: checked_f64(params, "density_radius", width.min(height) / 2.0)?,
            inner: checked_f64(params, "density_inner", 0.0)?,
            outer: checked_f64(params, "density_outer", 1.0)?,
        })),
        "noise" => {
            let scale = checked_f64(params, "density_scale", 0.005)?;
            let perlin = Perlin::new(noise_seed(seed.wrapping_add(1)));
            let (step_x, step_y) = (
                width / DENSITY_RASTER as f64,
                height / DENSITY_RASTER as f64,
            );
            let raster = Field::from_fn(DENSITY_RASTER, DENSITY_RASTER, |i, j| {
                let x = (i as f64 + 0.5) * step_x * scale;
                let y = (j as f64 + 0.5) * step_y * scale;
                perlin.get([x, y]) * 0.5 + 0.5
            })?;
            Ok(Density::mapped(RasterDensity::new(raster, width, height)))
        }
        _ => Err(HatchError::UnknownDensity(name.to_string())),
    }
}
