//! Holonomic chassis model: inverse and forward kinematics.
//!
//! A chassis is an assembly of omni-wheels at various positions and angles
//! which can be driven independently. A holonomic system is one where the
//! number of directly controllable degrees of freedom equals the degrees of
//! freedom of the system, so for planar motion (two of translation, one of
//! rotation) at least three wheels with non-parallel drive vectors are
//! needed. The model itself does not enforce this: fewer wheels simply make
//! the forward problem unsolvable.

use alloc::vec::Vec;

use core::f64::consts::PI;

use libm::{cos, fabs};

use crate::error::KinematicsError;
use crate::geometry::{rotate_point, rotate_vector, Point2, Vector2};
use crate::pose::Motion;
use crate::wheel::{OmniWheel, WheelSpec};

/// Probe magnitude for [`Chassis::max_translation_speed`], in mm/s.
const TRANSLATION_PROBE: f64 = 10_000.0;
/// Probe magnitude for [`Chassis::max_rotation_speed`], in rad/s.
const ROTATION_PROBE: f64 = 2.0 * PI * 100.0;

/// Relative determinant threshold below which the coefficient matrix is
/// treated as singular.
const SINGULARITY_EPSILON: f64 = 1e-12;

/// Per-wheel drive speeds computed for a requested chassis motion.
///
/// Speeds are in revolutions per second, one per wheel in chassis order.
/// `scaling` reports whether the request was feasible: `1.0` means it was
/// delivered as asked; a smaller value means every speed was multiplied by
/// that factor so the most-limited wheel sits exactly at its limit. The
/// ratios between wheels are preserved either way, so the direction of
/// motion is unchanged, only slower.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelSpeeds {
    speeds: Vec<f64>,
    scaling: f64,
}

impl WheelSpeeds {
    /// Returns the per-wheel speeds in revolutions per second.
    pub fn speeds(&self) -> &[f64] {
        &self.speeds
    }

    /// Returns the applied scaling factor.
    ///
    /// `1.0` when the requested motion was fully achievable; less than one
    /// when the request had to be uniformly throttled.
    pub fn scaling(&self) -> f64 {
        self.scaling
    }
}

impl core::fmt::Display for WheelSpeeds {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "WheelSpeeds (rev/s: [")?;
        for (i, speed) in self.speeds.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.3}", speed)?;
        }
        write!(f, "], scaling: {:.3})", self.scaling)
    }
}

/// An assembly of independently driven omni-wheels.
///
/// The per-wheel kinematic coefficients are cached at construction and never
/// change, so a chassis is safely readable from any number of threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Chassis {
    wheels: Vec<OmniWheel>,
    coefficients: Vec<[f64; 3]>,
}

impl Chassis {
    /// Create a new chassis from an ordered set of wheels.
    pub fn new(wheels: Vec<OmniWheel>) -> Self {
        let coefficients = wheels.iter().map(OmniWheel::coefficients).collect();
        Chassis { wheels, coefficients }
    }

    /// Build a chassis with three identical wheels on the vertices of a
    /// regular triangle, each drive vector perpendicular to the radius at
    /// its vertex, spaced 120 degrees apart.
    ///
    /// # Arguments
    ///
    /// * `wheel_distance`: Distance in millimetres between the contact
    ///   points of each pair of wheels (the triangle edge length).
    /// * `wheel_radius`: Wheel radius in millimetres.
    /// * `max_wheel_speed`: Speed limit in revolutions per second applied to
    ///   every wheel, or `None` for no limit.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidDriveVector)` if `wheel_radius`
    /// is zero.
    pub fn regular_triangle(
        wheel_distance: f64,
        wheel_radius: f64,
        max_wheel_speed: Option<f64>,
    ) -> Result<Self, KinematicsError> {
        let vertex = Point2::new(0.0, cos(PI / 6.0) * wheel_distance / 2.0);
        let drive = Vector2::new(-2.0 * PI * wheel_radius, 0.0);
        let mut wheels = Vec::with_capacity(3);
        for step in 0..3 {
            let angle = -(2.0 * PI / 3.0) * step as f64;
            wheels.push(OmniWheel::new(
                rotate_point(vertex, angle, Point2::ORIGIN),
                WheelSpec::Vector(rotate_vector(drive, angle)),
                max_wheel_speed,
            )?);
        }
        Ok(Chassis::new(wheels))
    }

    /// Returns the wheels in chassis order.
    pub fn wheels(&self) -> &[OmniWheel] {
        &self.wheels
    }

    /// Calculate the speed to drive each wheel at to attain the given
    /// translation and rotation, rotating about the chassis centre.
    ///
    /// See [`Chassis::wheel_speeds_about`].
    pub fn wheel_speeds(&self, translation: Vector2, rotation: f64) -> WheelSpeeds {
        self.wheel_speeds_about(translation, rotation, Point2::ORIGIN)
    }

    /// Calculate the speed to drive each wheel at to attain the given
    /// translation and rotation about an arbitrary centre of rotation.
    ///
    /// Each wheel sees the rigid-body velocity field at its contact point:
    /// the perpendicular of the radius vector from the rotation centre,
    /// scaled by the angular rate, superposed with the translation. If any
    /// wheel would exceed its speed limit, all speeds are scaled back
    /// uniformly until the most-limited wheel sits exactly at its limit;
    /// the applied factor is reported in the result. A wheel asked for zero
    /// speed never binds, even with a limit of zero.
    ///
    /// # Arguments
    ///
    /// * `translation`: Desired translation in mm/s, robot frame.
    /// * `rotation`: Desired angular velocity in rad/s, positive clockwise
    ///   when viewed from above.
    /// * `origin`: Centre of rotation in millimetres, relative to the
    ///   chassis centre.
    pub fn wheel_speeds_about(
        &self,
        translation: Vector2,
        rotation: f64,
        origin: Point2,
    ) -> WheelSpeeds {
        let velocity_at = |point: Point2| (point - origin).perpendicular() * rotation + translation;
        let unscaled: Vec<f64> = self
            .wheels
            .iter()
            .map(|wheel| wheel.speed_for(velocity_at(wheel.position())))
            .collect();
        let mut scaling = 1.0_f64;
        for (wheel, &speed) in self.wheels.iter().zip(unscaled.iter()) {
            if let Some(limit) = wheel.max_speed() {
                if fabs(speed) > limit {
                    scaling = scaling.min(limit / fabs(speed));
                }
            }
        }
        let speeds = unscaled.into_iter().map(|speed| speed * scaling).collect();
        WheelSpeeds { speeds, scaling }
    }

    /// Calculate wheel speeds for a [`Motion`], rotating about the chassis
    /// centre.
    pub fn wheel_speeds_for_motion(&self, motion: Motion) -> WheelSpeeds {
        self.wheel_speeds(motion.translation, motion.rotation)
    }

    /// Invert the motion-to-speeds calculation: recover the actual chassis
    /// motion from measured per-wheel speeds.
    ///
    /// Solves the linear system `M * [tx, ty, omega] = speeds` where `M` is
    /// the cached coefficient matrix, one row per wheel. The system is only
    /// solvable for exactly three wheels with non-degenerate drive axes; a
    /// chassis that fails this is a configuration defect, reported as an
    /// error rather than approximated.
    ///
    /// # Arguments
    ///
    /// * `speeds`: One measured speed per wheel, in revolutions per second,
    ///   in chassis order.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::DimensionMismatch)` if `speeds` does
    /// not contain exactly one value per wheel, and
    /// `Err(KinematicsError::SingularMatrix)` if the chassis does not have
    /// exactly three wheels or its coefficient matrix is not invertible.
    pub fn motion(&self, speeds: &[f64]) -> Result<Motion, KinematicsError> {
        if speeds.len() != self.wheels.len() {
            return Err(KinematicsError::DimensionMismatch(
                "one speed per wheel is required",
            ));
        }
        let matrix: &[[f64; 3]; 3] = match self.coefficients.as_slice().try_into() {
            Ok(matrix) => matrix,
            Err(_) => {
                return Err(KinematicsError::SingularMatrix(
                    "exactly three wheels are required",
                ));
            }
        };
        let rhs = [speeds[0], speeds[1], speeds[2]];
        let [tx, ty, omega] = solve3(matrix, &rhs).ok_or(KinematicsError::SingularMatrix(
            "wheel drive axes are parallel or degenerate",
        ))?;
        Ok(Motion::new(Vector2::new(tx, ty), omega))
    }

    /// The maximum achievable translation speed in mm/s, assuming all
    /// directions are equivalent and no simultaneous rotation.
    ///
    /// Probes the chassis with an unrealistically fast pure translation and
    /// reads back the scaling, which is linear in the requested magnitude
    /// for a fixed direction.
    pub fn max_translation_speed(&self) -> f64 {
        let scaling = self
            .wheel_speeds(Vector2::new(0.0, TRANSLATION_PROBE), 0.0)
            .scaling();
        TRANSLATION_PROBE * scaling
    }

    /// The maximum achievable rotation speed about the chassis centre in
    /// rad/s, assuming no simultaneous translation.
    pub fn max_rotation_speed(&self) -> f64 {
        let scaling = self
            .wheel_speeds(Vector2::new(0.0, 0.0), ROTATION_PROBE)
            .scaling();
        ROTATION_PROBE * scaling
    }
}

impl core::fmt::Display for Chassis {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Chassis ({} wheels)", self.wheels.len())
    }
}

fn det3(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Solve `m * x = rhs` for a 3x3 system by Cramer's rule.
///
/// Returns `None` when the determinant is negligible relative to the matrix
/// scale (degenerate wheel configuration).
fn solve3(m: &[[f64; 3]; 3], rhs: &[f64; 3]) -> Option<[f64; 3]> {
    let det = det3(m);
    let mut scale = 0.0_f64;
    for row in m {
        for &entry in row {
            scale = scale.max(fabs(entry));
        }
    }
    // Comparing this way also rejects a NaN determinant.
    if !(fabs(det) > scale * scale * scale * SINGULARITY_EPSILON) {
        return None;
    }
    let mut solution = [0.0; 3];
    for (column, value) in solution.iter_mut().enumerate() {
        let mut replaced = *m;
        for row in 0..3 {
            replaced[row][column] = rhs[row];
        }
        *value = det3(&replaced) / det;
    }
    Some(solution)
}
