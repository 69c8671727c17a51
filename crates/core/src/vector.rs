//! Immutable 2D vector with a lazily cached magnitude.
//!
//! Every operation returns a new [`Vector`]; nothing mutates `x` or `y` after
//! construction, so the cached length can never go stale.

use std::cell::OnceCell;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use glam::DVec2;

/// A 2D point or direction in drawing-space units.
#[derive(Clone, Default)]
pub struct Vector {
    v: DVec2,
    len: OnceCell<f64>,
}

impl Vector {
    /// The zero vector.
    #[allow(clippy::declare_interior_mutable_const)]
    pub const ZERO: Vector = Vector {
        v: DVec2::ZERO,
        len: OnceCell::new(),
    };

    /// Creates a vector from its components.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            v: DVec2::new(x, y),
            len: OnceCell::new(),
        }
    }

    pub fn x(&self) -> f64 {
        self.v.x
    }

    pub fn y(&self) -> f64 {
        self.v.y
    }

    /// Components as `[x, y]`.
    pub fn to_array(&self) -> [f64; 2] {
        self.v.to_array()
    }

    /// Euclidean magnitude, computed on the first call and cached.
    pub fn length(&self) -> f64 {
        *self.len.get_or_init(|| self.v.length())
    }

    /// Returns the unit vector in the same direction.
    ///
    /// A zero-length vector normalizes to itself rather than to NaN.
    pub fn normalize(&self) -> Vector {
        let len = self.length();
        if len == 0.0 {
            return self.clone();
        }
        Vector::from(self.v / len)
    }

    pub fn multiply(&self, scalar: f64) -> Vector {
        Vector::from(self.v * scalar)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add(&self, other: &Vector) -> Vector {
        Vector::from(self.v + other.v)
    }

    pub fn subtract(&self, other: &Vector) -> Vector {
        Vector::from(self.v - other.v)
    }

    /// Euclidean distance between two points.
    pub fn distance(&self, other: &Vector) -> f64 {
        self.subtract(other).length()
    }

    /// Whether both components are finite.
    pub fn is_finite(&self) -> bool {
        self.v.is_finite()
    }
}

impl From<DVec2> for Vector {
    fn from(v: DVec2) -> Self {
        Self {
            v,
            len: OnceCell::new(),
        }
    }
}

impl From<(f64, f64)> for Vector {
    fn from((x, y): (f64, f64)) -> Self {
        Vector::new(x, y)
    }
}

impl From<[f64; 2]> for Vector {
    fn from([x, y]: [f64; 2]) -> Self {
        Vector::new(x, y)
    }
}

impl From<&Vector> for DVec2 {
    fn from(v: &Vector) -> Self {
        v.v
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.v == other.v
    }
}

impl fmt::Debug for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vector")
            .field("x", &self.v.x)
            .field("y", &self.v.y)
            .finish()
    }
}

// Operators are implemented on references only. A by-value `Add` would
// shadow the inherent `add(&self, &Vector)` in method-call position.
impl Add for &Vector {
    type Output = Vector;
    fn add(self, rhs: &Vector) -> Vector {
        Vector::add(self, rhs)
    }
}

impl Sub for &Vector {
    type Output = Vector;
    fn sub(self, rhs: &Vector) -> Vector {
        self.subtract(rhs)
    }
}

impl Mul<f64> for &Vector {
    type Output = Vector;
    fn mul(self, rhs: f64) -> Vector {
        self.multiply(rhs)
    }
}

impl Neg for &Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        Vector::from(-self.v)
    }
}
