//! Motion and pose value types, and arc-based dead reckoning.

use core::f64::consts::PI;

use libm::atan2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{
    rotate_point, rotate_vector, smallest_signed_difference, wrap, Point2, Vector2,
};

/// The translation and rotation of the robot, always expressed in the
/// robot's own coordinate frame.
///
/// A translation of `(0, 1)` means the robot is heading forwards regardless
/// of its current orientation in the world. The rotation component is in
/// radians per second, positive clockwise when viewed from above with X
/// positive to the right and Y positive upwards.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Motion {
    /// Translation component in mm/s, robot frame.
    pub translation: Vector2,
    /// Rotation component in rad/s, positive clockwise.
    pub rotation: f64,
}

impl Motion {
    /// Construct a new motion.
    ///
    /// # Arguments
    ///
    /// * `translation`: Translation component in mm/s, robot frame.
    /// * `rotation`: Rotation component in rad/s, positive clockwise.
    pub const fn new(translation: Vector2, rotation: f64) -> Self {
        Motion { translation, rotation }
    }
}

impl core::fmt::Display for Motion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Motion (v: {} mm/s, ω: {:.3} rad/s)",
            self.translation, self.rotation
        )
    }
}

/// A world-frame position and orientation.
///
/// Orientation is in radians, normalized into `[0, 2*PI)` at construction,
/// with 0 along the positive Y axis and positive values clockwise: 0 is
/// North, PI/2 East, PI South and 3*PI/2 West. A pose is never mutated;
/// integration produces a new one.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    position: Point2,
    orientation: f64,
}

impl Pose {
    /// Construct a new pose.
    ///
    /// # Arguments
    ///
    /// * `position`: World-frame position of the robot centre, millimetres.
    /// * `orientation`: Orientation in radians, clockwise from the positive
    ///   Y axis; normalized into `[0, 2*PI)`.
    pub fn new(position: Point2, orientation: f64) -> Self {
        Pose {
            position,
            orientation: wrap(orientation, 2.0 * PI),
        }
    }

    /// Returns the world-frame position.
    pub fn position(&self) -> Point2 {
        self.position
    }

    /// Returns the orientation in radians, in `[0, 2*PI)`.
    pub fn orientation(&self) -> f64 {
        self.orientation
    }

    /// The robot-frame translation that would move the robot from this pose
    /// onto the target's position. The target's orientation is ignored.
    ///
    /// Pose positions are world-frame, so the world displacement is rotated
    /// into the robot frame before being returned.
    pub fn vector_to(&self, target: &Pose) -> Vector2 {
        // Orientation is clockwise positive while the rotation utility is
        // anti-clockwise positive, so the world-to-robot rotation is by
        // +orientation.
        rotate_vector(target.position - self.position, self.orientation)
    }

    /// Euclidean world-frame distance to the target pose's position.
    pub fn distance_to(&self, target: &Pose) -> f64 {
        (target.position - self.position).magnitude()
    }

    /// The shortest signed turn, in radians, that would point the robot at
    /// the target's position. Positive values are clockwise.
    pub fn bearing_to(&self, target: &Pose) -> f64 {
        let d = target.position - self.position;
        // Heading h faces along (sin h, cos h) in the world.
        let heading = atan2(d.x, d.y);
        smallest_signed_difference(self.orientation, heading, 2.0 * PI)
    }

    /// Apply a motion for a time interval and return the resulting pose.
    ///
    /// A body translating at a constant robot-frame velocity while rotating
    /// at a constant rate traces a circular arc around a fixed centre, so
    /// the new position is found by rotating the current position about that
    /// centre rather than by integrating the motion numerically. The centre,
    /// as a vector from the current position, is the perpendicular of the
    /// world-frame translation divided by the rotation rate (arc length is
    /// radius times angle). A zero rotation rate means a straight line and
    /// is handled separately to avoid the division.
    ///
    /// # Arguments
    ///
    /// * `motion`: The motion, assumed constant over the interval, in the
    ///   robot's coordinate frame.
    /// * `elapsed`: The time interval in seconds.
    ///
    /// # Returns
    ///
    /// The pose after applying `motion` for `elapsed` seconds.
    pub fn advance(&self, motion: Motion, elapsed: f64) -> Pose {
        // The robot-frame translation rotated into the world frame by the
        // current orientation (negated: orientation is clockwise positive,
        // the rotation utility anti-clockwise positive).
        let world = rotate_vector(motion.translation, -self.orientation);
        if motion.rotation == 0.0 {
            return Pose::new(self.position + world * elapsed, self.orientation);
        }
        let orientation = self.orientation + motion.rotation * elapsed;
        let centre = self.position + world.perpendicular() / motion.rotation;
        // rotate_point is anti-clockwise positive, the chassis rotation
        // clockwise positive, hence the negated angle.
        let position = rotate_point(self.position, -motion.rotation * elapsed, centre);
        Pose::new(position, orientation)
    }
}

impl core::fmt::Display for Pose {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Pose (at {}, θ: {:.3} rad)",
            self.position, self.orientation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_orientation_normalized_at_construction() {
        let pose = Pose::new(Point2::ORIGIN, 5.0 * PI);
        assert!((pose.orientation() - PI).abs() < EPSILON);
        let pose = Pose::new(Point2::ORIGIN, -PI / 2.0);
        assert!((pose.orientation() - 3.0 * PI / 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_advance_straight_ahead() {
        // Facing North, moving forward 100 mm/s for one second.
        let pose = Pose::new(Point2::ORIGIN, 0.0);
        let next = pose.advance(Motion::new(Vector2::new(0.0, 100.0), 0.0), 1.0);
        assert!((next.position().x - 0.0).abs() < EPSILON);
        assert!((next.position().y - 100.0).abs() < EPSILON);
        assert!((next.orientation() - 0.0).abs() < EPSILON);
    }

    #[test]
    fn test_advance_straight_scales_with_time() {
        let pose = Pose::new(Point2::ORIGIN, 0.0);
        let next = pose.advance(Motion::new(Vector2::new(0.0, 100.0), 0.0), 2.5);
        assert!((next.position().y - 250.0).abs() < EPSILON);
    }

    #[test]
    fn test_advance_straight_respects_orientation() {
        // Facing East, "forward" moves along world +X.
        let pose = Pose::new(Point2::ORIGIN, PI / 2.0);
        let next = pose.advance(Motion::new(Vector2::new(0.0, 100.0), 0.0), 1.0);
        assert!((next.position().x - 100.0).abs() < 1e-6);
        assert!(next.position().y.abs() < 1e-6);
        assert!((next.orientation() - PI / 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_advance_zero_motion_is_identity() {
        let pose = Pose::new(Point2::new(12.0, -7.0), 1.2);
        let next = pose.advance(Motion::new(Vector2::new(0.0, 0.0), 0.0), 42.0);
        assert_eq!(next, pose);
    }

    #[test]
    fn test_advance_quarter_arc() {
        // Forward at 50 * PI mm/s while turning a quarter turn per second
        // clockwise: arc radius is |v| / ω = 100 mm, so after one second the
        // robot has swept a quarter circle and sits at (100, 100) facing
        // East.
        let pose = Pose::new(Point2::ORIGIN, 0.0);
        let motion = Motion::new(Vector2::new(0.0, 50.0 * PI), PI / 2.0);
        let next = pose.advance(motion, 1.0);
        assert!((next.position().x - 100.0).abs() < 1e-6);
        assert!((next.position().y - 100.0).abs() < 1e-6);
        assert!((next.orientation() - PI / 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_advance_full_circle_returns_home() {
        // A full turn at constant forward speed is a closed circle.
        let pose = Pose::new(Point2::new(3.0, 4.0), 0.7);
        let motion = Motion::new(Vector2::new(40.0, 120.0), 2.0 * PI);
        let next = pose.advance(motion, 1.0);
        assert!((next.position().x - 3.0).abs() < 1e-6);
        assert!((next.position().y - 4.0).abs() < 1e-6);
        assert!((next.orientation() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_advance_arc_converges_to_straight_line() {
        // The arc branch must meet the straight-line branch as the rotation
        // rate approaches zero.
        let pose = Pose::new(Point2::new(5.0, -2.0), 1.1);
        let translation = Vector2::new(80.0, 35.0);
        let straight = pose.advance(Motion::new(translation, 0.0), 2.0);
        let curved = pose.advance(Motion::new(translation, 1e-9), 2.0);
        assert!((straight.position().x - curved.position().x).abs() < 1e-3);
        assert!((straight.position().y - curved.position().y).abs() < 1e-3);
        assert!((straight.orientation() - curved.orientation()).abs() < 1e-3);
    }

    #[test]
    fn test_advance_clockwise_rotation_curves_clockwise() {
        // Facing North and turning clockwise, the track must bend East.
        let pose = Pose::new(Point2::ORIGIN, 0.0);
        let next = pose.advance(Motion::new(Vector2::new(0.0, 100.0), 0.5), 0.1);
        assert!(next.position().x > 0.0);
        assert!(next.position().y > 0.0);
    }

    #[test]
    fn test_vector_to_accounts_for_orientation() {
        // Facing East, a target due East is dead ahead in the robot frame.
        let from = Pose::new(Point2::ORIGIN, PI / 2.0);
        let to = Pose::new(Point2::new(10.0, 0.0), 0.0);
        let v = from.vector_to(&to);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 10.0).abs() < 1e-6);
        // Facing North the same target is directly to the right.
        let from = Pose::new(Point2::ORIGIN, 0.0);
        let v = from.vector_to(&to);
        assert!((v.x - 10.0).abs() < 1e-6);
        assert!(v.y.abs() < 1e-6);
    }

    #[test]
    fn test_distance_to() {
        let from = Pose::new(Point2::ORIGIN, 0.3);
        let to = Pose::new(Point2::new(3.0, 4.0), 2.9);
        assert!((from.distance_to(&to) - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_bearing_to_turns_the_short_way() {
        let from = Pose::new(Point2::ORIGIN, 0.0);
        // North-East of a North-facing robot: a quarter of a right angle
        // clockwise.
        let to = Pose::new(Point2::new(5.0, 5.0), 0.0);
        assert!((from.bearing_to(&to) - PI / 4.0).abs() < EPSILON);
        // North-West: the same magnitude anti-clockwise.
        let to = Pose::new(Point2::new(-5.0, 5.0), 0.0);
        assert!((from.bearing_to(&to) - (-PI / 4.0)).abs() < EPSILON);
        // A robot facing just East of North with a target just West of
        // North turns through North, not the long way round.
        let from = Pose::new(Point2::ORIGIN, 0.1);
        let to = Pose::new(Point2::new(-1.0, 10.0), 0.0);
        let bearing = from.bearing_to(&to);
        assert!(bearing < 0.0);
        assert!(bearing.abs() < PI / 2.0);
    }
}
