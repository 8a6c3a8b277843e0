//! 2D geometric primitives and angle utilities.
//!
//! All lengths are in millimetres and all angles in radians. The rotation
//! helpers here are anti-clockwise positive, which is the opposite sense to
//! the chassis orientation convention (clockwise from the positive Y axis);
//! callers negate the angle when crossing between the two.

use core::ops::{Add, Div, Mul, Neg, Sub};

use libm::{cos, sin, sqrt};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 2D displacement or velocity in millimetres (or mm/s).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
}

impl Vector2 {
    /// Construct a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Vector2 { x, y }
    }

    /// Dot product with another vector.
    #[must_use]
    pub fn dot(self, other: Vector2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Squared magnitude (avoids the square root).
    #[must_use]
    pub fn magnitude_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Magnitude.
    #[must_use]
    pub fn magnitude(self) -> f64 {
        sqrt(self.magnitude_squared())
    }

    /// The clockwise perpendicular `(y, -x)`.
    ///
    /// For a point rotating clockwise about an origin, the perpendicular of
    /// its radius vector points along the direction of travel, which is why
    /// this sense is used for the rotational velocity field and the arc
    /// centre construction.
    #[must_use]
    pub fn perpendicular(self) -> Vector2 {
        Vector2::new(self.y, -self.x)
    }
}

impl Add for Vector2 {
    type Output = Vector2;
    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;
    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;
    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;
    fn mul(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vector2 {
    type Output = Vector2;
    fn div(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x / rhs, self.y / rhs)
    }
}

impl core::fmt::Display for Vector2 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// A 2D position in millimetres.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point2 {
    /// The origin `(0, 0)`.
    pub const ORIGIN: Point2 = Point2 { x: 0.0, y: 0.0 };

    /// Construct a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Point2 { x, y }
    }
}

impl Sub for Point2 {
    type Output = Vector2;
    fn sub(self, rhs: Point2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<Vector2> for Point2 {
    type Output = Point2;
    fn add(self, rhs: Vector2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub<Vector2> for Point2 {
    type Output = Point2;
    fn sub(self, rhs: Vector2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl core::fmt::Display for Point2 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Rotate a point about an origin.
///
/// # Arguments
///
/// * `point`: The point to rotate.
/// * `angle`: Rotation angle in radians, anti-clockwise positive.
/// * `origin`: Centre of the rotation.
///
/// # Returns
///
/// A new point containing the rotated input point.
#[must_use]
pub fn rotate_point(point: Point2, angle: f64, origin: Point2) -> Point2 {
    let s = sin(angle);
    let c = cos(angle);
    Point2::new(
        c * (point.x - origin.x) - s * (point.y - origin.y) + origin.x,
        s * (point.x - origin.x) + c * (point.y - origin.y) + origin.y,
    )
}

/// Rotate a vector.
///
/// # Arguments
///
/// * `vector`: The vector to rotate.
/// * `angle`: Rotation angle in radians, anti-clockwise positive.
///
/// # Returns
///
/// A new vector containing the rotated input vector.
#[must_use]
pub fn rotate_vector(vector: Vector2, angle: f64) -> Vector2 {
    let s = sin(angle);
    let c = cos(angle);
    Vector2::new(c * vector.x - s * vector.y, s * vector.x + c * vector.y)
}

/// Reduce a value into `[0, modulus)`.
///
/// The `%` operator keeps the sign of the dividend, so a second fold is
/// needed for negative inputs.
pub(crate) fn wrap(value: f64, modulus: f64) -> f64 {
    let r = value % modulus;
    if r < 0.0 { r + modulus } else { r }
}

/// The minimal-magnitude delta `d` such that `(a + d) % modulus == b % modulus`.
///
/// Both inputs are first reduced into `[0, modulus)`. When the direct path
/// from `a` to `b` spans at most half the cycle it is returned as-is;
/// otherwise the complementary wraparound path is shorter and is returned
/// instead. The result always satisfies `|d| <= modulus / 2`.
///
/// This is the primitive behind shortest-turn bearing corrections; pose
/// integration never uses it.
///
/// # Arguments
///
/// * `a`: Start value.
/// * `b`: Target value.
/// * `modulus`: Cycle length, e.g. `2 * PI` for angles in radians.
#[must_use]
pub fn smallest_signed_difference(a: f64, b: f64, modulus: f64) -> f64 {
    let direct = wrap(b, modulus) - wrap(a, modulus);
    if direct > modulus / 2.0 {
        direct - modulus
    } else if direct < -modulus / 2.0 {
        direct + modulus
    } else {
        direct
    }
}
