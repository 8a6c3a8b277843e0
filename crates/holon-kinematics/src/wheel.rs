//! Single omni-wheel model.
//!
//! An omni-wheel is built from free rollers perpendicular to its primary
//! rotation axis, so it can slip sideways while driving along its own axis.
//! Several such wheels with non-parallel drive vectors combine into a
//! holonomic chassis.

use core::f64::consts::PI;

use libm::{cos, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::KinematicsError;
use crate::geometry::{Point2, Vector2};

/// How a wheel's drive vector is specified at construction.
///
/// The drive vector is the displacement of the wheel's contact point after
/// one full revolution; its direction encodes the drive axis and its
/// magnitude the effective circumference. Exactly one of the two encodings
/// is chosen at the type level, so there is no ambiguous-argument case to
/// check at runtime.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelSpec {
    /// The drive vector given directly, in millimetres per revolution.
    Vector(Vector2),
    /// The drive vector derived from a mounting angle and wheel radius.
    AngleRadius {
        /// Direction of travel under positive drive, in radians clockwise
        /// from the positive Y axis.
        angle: f64,
        /// Wheel radius in millimetres, measured from the centre to the
        /// contact point. For wheels with cylindrical rollers it is often
        /// easier to measure the assembly circumference and derive this.
        radius: f64,
    },
}

impl WheelSpec {
    /// Resolve the specification into a concrete drive vector.
    fn resolve(self) -> Vector2 {
        match self {
            WheelSpec::Vector(vector) => vector,
            WheelSpec::AngleRadius { angle, radius } => {
                let circumference = 2.0 * PI * radius;
                Vector2::new(sin(angle) * circumference, cos(angle) * circumference)
            }
        }
    }
}

/// A single omni-wheel within a chassis assembly.
///
/// A wheel has a contact point relative to the chassis centre and a drive
/// vector describing the motion of that contact point when the wheel is
/// driven through one positive revolution. Three scalar coefficients used by
/// both kinematic directions are cached at construction and never change, so
/// wheels are freely shareable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OmniWheel {
    position: Point2,
    drive_vector: Vector2,
    max_speed: Option<f64>,
    magnitude_squared: f64,
    co_x: f64,
    co_y: f64,
    co_theta: f64,
}

impl OmniWheel {
    /// Construct a new omni-wheel.
    ///
    /// # Arguments
    ///
    /// * `position`: The wheel's contact point relative to the chassis
    ///   centre, in millimetres.
    /// * `spec`: Drive vector specification, see [`WheelSpec`].
    /// * `max_speed`: Maximum revolutions per second allowed for this wheel,
    ///   or `None` for no limit. Used to scale back whole-chassis requests
    ///   that would drive any wheel past its limit.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidDriveVector)` if the resolved
    /// drive vector has zero magnitude (this includes an `AngleRadius` spec
    /// with zero radius), since every kinematic query divides by it.
    pub fn new(
        position: Point2,
        spec: WheelSpec,
        max_speed: Option<f64>,
    ) -> Result<Self, KinematicsError> {
        let drive_vector = spec.resolve();
        let magnitude_squared = drive_vector.magnitude_squared();
        if magnitude_squared == 0.0 {
            return Err(KinematicsError::InvalidDriveVector(
                "must have nonzero magnitude",
            ));
        }
        Ok(OmniWheel {
            position,
            drive_vector,
            max_speed,
            magnitude_squared,
            co_x: drive_vector.x / magnitude_squared,
            co_y: drive_vector.y / magnitude_squared,
            co_theta: (drive_vector.x * position.y - drive_vector.y * position.x)
                / magnitude_squared,
        })
    }

    /// Returns the contact point relative to the chassis centre.
    pub fn position(&self) -> Point2 {
        self.position
    }

    /// Returns the drive vector, in millimetres per revolution.
    pub fn drive_vector(&self) -> Vector2 {
        self.drive_vector
    }

    /// Returns the speed limit in revolutions per second, if any.
    pub fn max_speed(&self) -> Option<f64> {
        self.max_speed
    }

    /// The forward-kinematics coefficient row `[co_x, co_y, co_theta]`.
    pub(crate) fn coefficients(&self) -> [f64; 3] {
        [self.co_x, self.co_y, self.co_theta]
    }

    /// The drive speed, in revolutions per second, needed to match a given
    /// velocity at the wheel's contact point.
    ///
    /// Projecting the velocity onto the unit drive direction gives the
    /// linear speed along the drive axis; dividing by the drive vector's
    /// magnitude again converts mm/s into rev/s. The two divisions combine
    /// into a single division by the squared magnitude, which is cached.
    ///
    /// # Arguments
    ///
    /// * `velocity`: Velocity at the contact point, in mm/s.
    pub fn speed_for(&self, velocity: Vector2) -> f64 {
        velocity.dot(self.drive_vector) / self.magnitude_squared
    }
}

impl core::fmt::Display for OmniWheel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "OmniWheel (at {}, drive {}",
            self.position, self.drive_vector
        )?;
        match self.max_speed {
            Some(limit) => write!(f, ", max {:.2} rev/s)", limit),
            None => write!(f, ")"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_angle_radius_resolves_to_vector() {
        // Angle 0 points along +Y; radius 60 mm gives a circumference of
        // 2 * PI * 60 = 376.99 mm per revolution.
        let by_angle = OmniWheel::new(
            Point2::new(1.0, 0.0),
            WheelSpec::AngleRadius { angle: 0.0, radius: 60.0 },
            None,
        )
        .unwrap();
        let circumference = 2.0 * PI * 60.0;
        assert!((by_angle.drive_vector().x - 0.0).abs() < EPSILON);
        assert!((by_angle.drive_vector().y - circumference).abs() < 1e-6);

        let by_vector = OmniWheel::new(
            Point2::new(1.0, 0.0),
            WheelSpec::Vector(Vector2::new(0.0, circumference)),
            None,
        )
        .unwrap();
        assert_eq!(by_angle.coefficients(), by_vector.coefficients());
    }

    #[test]
    fn test_angle_is_clockwise_from_y() {
        // Angle PI/2 points along +X.
        let wheel = OmniWheel::new(
            Point2::ORIGIN,
            WheelSpec::AngleRadius { angle: PI / 2.0, radius: 10.0 },
            None,
        )
        .unwrap();
        assert!((wheel.drive_vector().x - 2.0 * PI * 10.0).abs() < 1e-6);
        assert!(wheel.drive_vector().y.abs() < 1e-9);
    }

    #[test]
    fn test_zero_vector_rejected() {
        let result = OmniWheel::new(
            Point2::ORIGIN,
            WheelSpec::Vector(Vector2::new(0.0, 0.0)),
            None,
        );
        assert!(matches!(
            result,
            Err(KinematicsError::InvalidDriveVector("must have nonzero magnitude"))
        ));
        let result = OmniWheel::new(
            Point2::ORIGIN,
            WheelSpec::AngleRadius { angle: 1.0, radius: 0.0 },
            None,
        );
        assert!(matches!(result, Err(KinematicsError::InvalidDriveVector(_))));
    }

    #[test]
    fn test_speed_for_parallel_velocity() {
        // A velocity equal to the drive vector means one revolution per second.
        let drive = Vector2::new(30.0, 40.0);
        let wheel = OmniWheel::new(Point2::ORIGIN, WheelSpec::Vector(drive), None).unwrap();
        assert!((wheel.speed_for(drive) - 1.0).abs() < EPSILON);
        // Scaling the velocity scales the speed linearly.
        assert!((wheel.speed_for(drive * 2.5) - 2.5).abs() < EPSILON);
        assert!((wheel.speed_for(-drive) - (-1.0)).abs() < EPSILON);
    }

    #[test]
    fn test_speed_for_perpendicular_velocity() {
        // Rollers absorb any motion perpendicular to the drive axis.
        let wheel = OmniWheel::new(
            Point2::ORIGIN,
            WheelSpec::Vector(Vector2::new(0.0, 100.0)),
            None,
        )
        .unwrap();
        assert!(wheel.speed_for(Vector2::new(55.0, 0.0)).abs() < EPSILON);
    }

    #[test]
    fn test_coefficients_match_definition() {
        let position = Point2::new(2.0, 3.0);
        let drive = Vector2::new(10.0, 20.0);
        let wheel = OmniWheel::new(position, WheelSpec::Vector(drive), None).unwrap();
        let m2 = drive.magnitude_squared();
        let [co_x, co_y, co_theta] = wheel.coefficients();
        assert!((co_x - drive.x / m2).abs() < EPSILON);
        assert!((co_y - drive.y / m2).abs() < EPSILON);
        assert!((co_theta - (drive.x * position.y - drive.y * position.x) / m2).abs() < EPSILON);
    }
}
