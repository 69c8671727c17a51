//! Vector fields that flow lines follow.
//!
//! A [`VectorField`] returns a direction at a point, or `None` where the
//! field is undefined (outside a mask, past a singularity). Lines stop where
//! the field is absent. Noise sources come from the `noise` crate; the rest
//! are closed-form. All of them are deterministic.

use std::f64::consts::TAU;

use glam::DVec2;
use noise::{NoiseFn, Perlin};

use crate::vector::Vector;

/// A 2D direction field, possibly undefined in places.
///
/// Implemented for any `Send` closure `Fn(&Vector) -> Option<Vector>`.
/// Fields are `Send` so a generator that owns one can move to another thread.
pub trait VectorField: Send {
    fn sample(&self, p: &Vector) -> Option<Vector>;
}

impl<F> VectorField for F
where
    F: Fn(&Vector) -> Option<Vector> + Send,
{
    fn sample(&self, p: &Vector) -> Option<Vector> {
        self(p)
    }
}

/// Distances below this count as zero.
const SINGULARITY_EPS: f64 = 1e-10;

/// Offset between the two noise samples of a 2-channel noise vector.
const CHANNEL_OFFSET: f64 = 100.0;

// ---------------------------------------------------------------------------
// Closed-form sources
// ---------------------------------------------------------------------------

/// The same direction everywhere.
#[derive(Debug, Clone, Copy)]
pub struct Uniform {
    direction: DVec2,
}

impl Uniform {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self {
            direction: DVec2::new(dx, dy),
        }
    }

    /// Unit direction at `degrees` counter-clockwise from +x.
    pub fn from_degrees(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(cos, sin)
    }
}

impl VectorField for Uniform {
    fn sample(&self, _p: &Vector) -> Option<Vector> {
        Some(Vector::from(self.direction))
    }
}

/// Rotation about a centre, counter-clockwise for positive strength.
///
/// With a positive `radius` the magnitude falls off as a Gaussian of the
/// distance; otherwise it is constant. The centre itself samples as zero.
#[derive(Debug, Clone, Copy)]
pub struct Vortex {
    pub cx: f64,
    pub cy: f64,
    pub strength: f64,
    pub radius: f64,
}

impl VectorField for Vortex {
    fn sample(&self, p: &Vector) -> Option<Vector> {
        let r = DVec2::new(p.x() - self.cx, p.y() - self.cy);
        let dist = r.length();
        if dist < SINGULARITY_EPS {
            return Some(Vector::ZERO);
        }
        let falloff = if self.radius > 0.0 {
            (-(dist * dist) / (2.0 * self.radius * self.radius)).exp()
        } else {
            1.0
        };
        Some(Vector::from(r.perp() / dist * self.strength * falloff))
    }
}

/// Points away from a centre; negative strength points toward it.
#[derive(Debug, Clone, Copy)]
pub struct Radial {
    pub cx: f64,
    pub cy: f64,
    pub strength: f64,
}

impl VectorField for Radial {
    fn sample(&self, p: &Vector) -> Option<Vector> {
        let r = DVec2::new(p.x() - self.cx, p.y() - self.cy);
        let dist = r.length();
        if dist < SINGULARITY_EPS {
            return Some(Vector::ZERO);
        }
        Some(Vector::from(r / dist * self.strength))
    }
}

// ---------------------------------------------------------------------------
// Noise sources
// ---------------------------------------------------------------------------

/// Unit vectors whose angle is driven by Perlin noise.
///
/// The noise value in roughly [-1, 1] is scaled by `turns` full rotations.
pub struct NoiseAngle {
    noise: Perlin,
    scale: f64,
    turns: f64,
}

impl NoiseAngle {
    pub fn new(scale: f64, turns: f64, seed: u32) -> Self {
        Self {
            noise: Perlin::new(seed),
            scale,
            turns,
        }
    }
}

impl VectorField for NoiseAngle {
    fn sample(&self, p: &Vector) -> Option<Vector> {
        let n = self.noise.get([p.x() * self.scale, p.y() * self.scale]);
        let (sin, cos) = (n * self.turns * TAU).sin_cos();
        Some(Vector::new(cos, sin))
    }
}

/// Curl of a scalar Perlin potential: approximately divergence-free flow.
pub struct Curl {
    noise: Perlin,
    scale: f64,
    strength: f64,
    eps: f64,
}

impl Curl {
    /// Curl field with a finite-difference epsilon of 0.001 noise units.
    pub fn new(scale: f64, strength: f64, seed: u32) -> Self {
        Self {
            noise: Perlin::new(seed),
            scale,
            strength,
            eps: 0.001,
        }
    }
}

impl VectorField for Curl {
    fn sample(&self, p: &Vector) -> Option<Vector> {
        let sx = p.x() * self.scale;
        let sy = p.y() * self.scale;
        let eps = self.eps;
        // curl F = (dF/dy, -dF/dx)
        let df_dy =
            (self.noise.get([sx, sy + eps]) - self.noise.get([sx, sy - eps])) / (2.0 * eps);
        let df_dx =
            (self.noise.get([sx + eps, sy]) - self.noise.get([sx - eps, sy])) / (2.0 * eps);
        Some(Vector::new(df_dy * self.strength, -df_dx * self.strength))
    }
}

/// Two independent Perlin channels as the x and y components.
pub struct NoiseVector {
    noise: Perlin,
    scale: f64,
    strength: f64,
}

impl NoiseVector {
    pub fn new(scale: f64, strength: f64, seed: u32) -> Self {
        Self {
            noise: Perlin::new(seed),
            scale,
            strength,
        }
    }
}

impl VectorField for NoiseVector {
    fn sample(&self, p: &Vector) -> Option<Vector> {
        let sx = p.x() * self.scale;
        let sy = p.y() * self.scale;
        let dx = self.noise.get([sx, sy]);
        let dy = self.noise.get([sx + CHANNEL_OFFSET, sy + CHANNEL_OFFSET]);
        Some(Vector::new(dx * self.strength, dy * self.strength))
    }
}

// ---------------------------------------------------------------------------
// Combinators
// ---------------------------------------------------------------------------

/// Sum of several fields. Absent wherever any component is absent.
#[derive(Default)]
pub struct Composite {
    sources: Vec<Box<dyn VectorField>>,
}

impl Composite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source (builder pattern).
    #[allow(clippy::should_implement_trait)]
    pub fn add(self, source: impl VectorField + 'static) -> Self {
        self.add_boxed(Box::new(source))
    }

    pub fn add_boxed(mut self, source: Box<dyn VectorField>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl VectorField for Composite {
    fn sample(&self, p: &Vector) -> Option<Vector> {
        self.sources
            .iter()
            .try_fold(DVec2::ZERO, |acc, source| {
                source.sample(p).map(|v| acc + DVec2::from(&v))
            })
            .map(Vector::from)
    }
}

/// Restricts a field to a disk; absent outside it.
pub struct DiskMask {
    inner: Box<dyn VectorField>,
    cx: f64,
    cy: f64,
    radius: f64,
}

impl DiskMask {
    pub fn new(inner: impl VectorField + 'static, cx: f64, cy: f64, radius: f64) -> Self {
        Self::boxed(Box::new(inner), cx, cy, radius)
    }

    pub fn boxed(inner: Box<dyn VectorField>, cx: f64, cy: f64, radius: f64) -> Self {
        Self {
            inner,
            cx,
            cy,
            radius,
        }
    }

    /// Whether `p` lies inside the disk (boundary included).
    pub fn contains(&self, p: &Vector) -> bool {
        (p.x() - self.cx).hypot(p.y() - self.cy) <= self.radius
    }
}

impl VectorField for DiskMask {
    fn sample(&self, p: &Vector) -> Option<Vector> {
        if self.contains(p) {
            self.inner.sample(p)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn closures_are_fields() {
        let f = |p: &Vector| (p.x() > 0.0).then(|| Vector::new(1.0, 0.0));
        assert!(f.sample(&Vector::new(1.0, 0.0)).is_some());
        assert!(f.sample(&Vector::new(-1.0, 0.0)).is_none());
    }

    #[test]
    fn uniform_is_constant() {
        let f = Uniform::new(0.0, 2.0);
        for p in [Vector::ZERO, Vector::new(500.0, -3.0)] {
            assert_eq!(f.sample(&p), Some(Vector::new(0.0, 2.0)));
        }
    }

    #[test]
    fn uniform_from_degrees_points_up_at_ninety() {
        let v = Uniform::from_degrees(90.0).sample(&Vector::ZERO).unwrap();
        assert!(approx(v.x(), 0.0) && approx(v.y(), 1.0), "{v:?}");
    }

    #[test]
    fn vortex_is_tangential_and_counter_clockwise() {
        let f = Vortex {
            cx: 0.0,
            cy: 0.0,
            strength: 1.0,
            radius: 0.0,
        };
        // East of the centre, counter-clockwise flow points north.
        let v = f.sample(&Vector::new(5.0, 0.0)).unwrap();
        assert!(approx(v.x(), 0.0) && approx(v.y(), 1.0), "{v:?}");
    }

    #[test]
    fn vortex_falloff_weakens_with_distance() {
        let f = Vortex {
            cx: 0.0,
            cy: 0.0,
            strength: 1.0,
            radius: 5.0,
        };
        let near = f.sample(&Vector::new(1.0, 0.0)).unwrap().length();
        let far = f.sample(&Vector::new(10.0, 0.0)).unwrap().length();
        assert!(near > far, "near {near} should exceed far {far}");
    }

    #[test]
    fn singular_centres_sample_as_zero() {
        let vortex = Vortex {
            cx: 3.0,
            cy: 3.0,
            strength: 1.0,
            radius: 1.0,
        };
        let radial = Radial {
            cx: 3.0,
            cy: 3.0,
            strength: 1.0,
        };
        let c = Vector::new(3.0, 3.0);
        assert_eq!(vortex.sample(&c).unwrap().length(), 0.0);
        assert_eq!(radial.sample(&c).unwrap().length(), 0.0);
    }

    #[test]
    fn radial_points_outward_for_positive_strength() {
        let f = Radial {
            cx: 0.0,
            cy: 0.0,
            strength: 2.0,
        };
        let v = f.sample(&Vector::new(0.0, -4.0)).unwrap();
        assert!(approx(v.x(), 0.0) && approx(v.y(), -2.0), "{v:?}");
    }

    #[test]
    fn noise_angle_yields_unit_vectors() {
        let f = NoiseAngle::new(0.01, 1.0, 7);
        for i in 0..50 {
            let p = Vector::new(i as f64 * 13.7, i as f64 * 5.3);
            let v = f.sample(&p).unwrap();
            assert!(approx(v.length(), 1.0), "|v| = {} at {p:?}", v.length());
        }
    }

    #[test]
    fn noise_sources_are_deterministic() {
        let p = Vector::new(123.4, 56.7);
        assert_eq!(
            Curl::new(0.02, 1.0, 3).sample(&p),
            Curl::new(0.02, 1.0, 3).sample(&p)
        );
        assert_eq!(
            NoiseVector::new(0.02, 1.0, 3).sample(&p),
            NoiseVector::new(0.02, 1.0, 3).sample(&p)
        );
        assert_eq!(
            NoiseAngle::new(0.02, 1.0, 3).sample(&p),
            NoiseAngle::new(0.02, 1.0, 3).sample(&p)
        );
    }

    #[test]
    fn curl_output_is_finite() {
        let f = Curl::new(0.05, 1.0, 11);
        for i in 0..50 {
            let v = f.sample(&Vector::new(i as f64 * 3.1, 40.0)).unwrap();
            assert!(v.is_finite(), "non-finite curl {v:?}");
        }
    }

    #[test]
    fn composite_sums_components() {
        let f = Composite::new()
            .add(Uniform::new(1.0, 0.0))
            .add(Uniform::new(0.0, 2.0));
        assert_eq!(f.len(), 2);
        assert_eq!(f.sample(&Vector::ZERO), Some(Vector::new(1.0, 2.0)));
    }

    #[test]
    fn composite_is_absent_if_any_component_is() {
        let f = Composite::new()
            .add(Uniform::new(1.0, 0.0))
            .add(|_: &Vector| None::<Vector>);
        assert!(f.sample(&Vector::ZERO).is_none());
    }

    #[test]
    fn empty_composite_is_zero() {
        let f = Composite::new();
        assert!(f.is_empty());
        assert_eq!(f.sample(&Vector::new(4.0, 4.0)), Some(Vector::ZERO));
    }

    #[test]
    fn disk_mask_is_absent_outside() {
        let f = DiskMask::new(Uniform::new(1.0, 0.0), 50.0, 50.0, 10.0);
        assert!(f.sample(&Vector::new(55.0, 50.0)).is_some());
        assert!(f.sample(&Vector::new(60.0, 50.0)).is_some(), "boundary is inside");
        assert!(f.sample(&Vector::new(61.0, 50.0)).is_none());
        assert!(f.sample(&Vector::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn boxed_fields_compose() {
        let boxed: Box<dyn VectorField> = Box::new(Uniform::new(0.5, 0.5));
        let masked = DiskMask::boxed(boxed, 0.0, 0.0, 1.0);
        assert_eq!(masked.sample(&Vector::ZERO), Some(Vector::new(0.5, 0.5)));
        let summed = Composite::new().add_boxed(Box::new(masked));
        assert!(summed.sample(&Vector::new(2.0, 0.0)).is_none());
    }
}
