//! Density maps: where lines should be packed tightly and where loosely.
//!
//! A density value is a fraction of the occupancy level range. `0` selects
//! level 0, the smallest cells and tightest spacing; `1` selects the last
//! level, the largest cells. See [`Density::level`].

use crate::field::Field;
use crate::vector::Vector;

/// Maps a drawing-space point to a density value in [0, 1].
///
/// Implemented for any `Send` closure `Fn(&Vector) -> f64`.
pub trait DensityMap: Send {
    fn density(&self, p: &Vector) -> f64;
}

impl<F> DensityMap for F
where
    F: Fn(&Vector) -> f64 + Send,
{
    fn density(&self, p: &Vector) -> f64 {
        self(p)
    }
}

/// Strategy for picking the occupancy level that governs spacing at a point.
#[derive(Default)]
pub enum Density {
    /// No density map: every point is checked at level 0.
    #[default]
    Uniform,
    /// Level follows the map.
    Mapped(Box<dyn DensityMap>),
}

impl Density {
    pub fn mapped(map: impl DensityMap + 'static) -> Self {
        Density::Mapped(Box::new(map))
    }

    /// Occupancy level for `p` in a grid with `level_count` levels.
    ///
    /// `round((level_count - 1) * clamp(density, 0, 1))`, rounding halves
    /// away from zero. Non-finite densities select level 0.
    pub fn level(&self, p: &Vector, level_count: usize) -> usize {
        match self {
            Density::Uniform => 0,
            Density::Mapped(map) => {
                let d = map.density(p);
                if !d.is_finite() || level_count == 0 {
                    return 0;
                }
                let top = (level_count - 1) as f64;
                (top * d.clamp(0.0, 1.0)).round() as usize
            }
        }
    }

    pub fn is_uniform(&self) -> bool {
        matches!(self, Density::Uniform)
    }
}

impl std::fmt::Debug for Density {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Density::Uniform => f.write_str("Uniform"),
            Density::Mapped(_) => f.write_str("Mapped(..)"),
        }
    }
}

/// Density read from a raster stretched over the drawing domain.
#[derive(Debug, Clone)]
pub struct RasterDensity {
    field: Field,
    width: f64,
    height: f64,
    invert: bool,
}

impl RasterDensity {
    /// Stretches `field` over a `width × height` domain.
    pub fn new(field: Field, width: f64, height: f64) -> Self {
        Self {
            field,
            width,
            height,
            invert: false,
        }
    }

    /// Reads `1 - value` instead, so dark (low) raster cells get the
    /// tightest spacing.
    pub fn inverted(mut self) -> Self {
        self.invert = !self.invert;
        self
    }
}

impl DensityMap for RasterDensity {
    fn density(&self, p: &Vector) -> f64 {
        let v = self
            .field
            .bilinear(p.x() / self.width, p.y() / self.height);
        if self.invert {
            1.0 - v
        } else {
            v
        }
    }
}

/// Density interpolated from `inner` at a centre to `outer` at `radius`.
#[derive(Debug, Clone, Copy)]
pub struct RadialDensity {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub inner: f64,
    pub outer: f64,
}

impl DensityMap for RadialDensity {
    fn density(&self, p: &Vector) -> f64 {
        if self.radius <= 0.0 {
            return self.outer;
        }
        let dist = (p.x() - self.cx).hypot(p.y() - self.cy);
        let t = (dist / self.radius).min(1.0);
        self.inner + (self.outer - self.inner) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(d: f64) -> Density {
        Density::mapped(move |_: &Vector| d)
    }

    #[test]
    fn uniform_always_selects_level_zero() {
        let p = Vector::new(5.0, 5.0);
        assert_eq!(Density::Uniform.level(&p, 1), 0);
        assert_eq!(Density::Uniform.level(&p, 8), 0);
        assert!(Density::default().is_uniform());
    }

    #[test]
    fn two_levels_pin_rounding_at_boundaries() {
        let p = Vector::ZERO;
        assert_eq!(constant(0.0).level(&p, 2), 0);
        assert_eq!(constant(0.5).level(&p, 2), 1, "halves round away from zero");
        assert_eq!(constant(1.0).level(&p, 2), 1);
    }

    #[test]
    fn three_levels_pin_rounding_at_boundaries() {
        let p = Vector::ZERO;
        assert_eq!(constant(0.0).level(&p, 3), 0);
        assert_eq!(constant(0.25).level(&p, 3), 1);
        assert_eq!(constant(0.5).level(&p, 3), 1);
        assert_eq!(constant(1.0).level(&p, 3), 2);
    }

    #[test]
    fn out_of_range_and_nan_densities_are_tamed() {
        let p = Vector::ZERO;
        assert_eq!(constant(-3.0).level(&p, 4), 0);
        assert_eq!(constant(7.0).level(&p, 4), 3);
        assert_eq!(constant(f64::NAN).level(&p, 4), 0);
    }

    #[test]
    fn single_level_grid_ignores_density() {
        assert_eq!(constant(1.0).level(&Vector::ZERO, 1), 0);
    }

    #[test]
    fn radial_density_falls_off_to_outer() {
        let map = RadialDensity {
            cx: 50.0,
            cy: 50.0,
            radius: 10.0,
            inner: 1.0,
            outer: 0.0,
        };
        assert!((map.density(&Vector::new(50.0, 50.0)) - 1.0).abs() < 1e-12);
        assert!((map.density(&Vector::new(55.0, 50.0)) - 0.5).abs() < 1e-12);
        assert!(map.density(&Vector::new(90.0, 90.0)).abs() < 1e-12);
    }

    #[test]
    fn raster_density_stretches_over_domain() {
        let field = Field::from_data(2, 1, vec![0.0, 1.0]).unwrap();
        let map = RasterDensity::new(field, 200.0, 100.0);
        assert!(map.density(&Vector::new(10.0, 50.0)).abs() < 1e-12);
        assert!((map.density(&Vector::new(190.0, 50.0)) - 1.0).abs() < 1e-12);
        let inverted = map.inverted();
        assert!((inverted.density(&Vector::new(10.0, 50.0)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn debug_hides_callback() {
        assert_eq!(format!("{:?}", constant(0.3)), "Mapped(..)");
        assert_eq!(format!("{:?}", Density::Uniform), "Uniform");
    }
}
