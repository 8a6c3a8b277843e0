#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for holonomic omni-wheel chassis kinematics."]
#![doc = ""]
#![doc = "This crate converts a desired chassis motion into per-wheel drive speeds"]
#![doc = "(inverse kinematics), reconstructs the actual chassis motion from measured"]
#![doc = "wheel speeds (forward kinematics), and dead-reckons pose from motion"]
#![doc = "samples using an exact arc model rather than a linearized step."]

extern crate alloc;

pub mod chassis;
pub mod error;
pub mod geometry;
pub mod pose;
pub mod wheel;

pub use chassis::{Chassis, WheelSpeeds};
pub use error::KinematicsError;
pub use geometry::{
    rotate_point, rotate_vector, smallest_signed_difference, Point2, Vector2,
};
pub use pose::{Motion, Pose};
pub use wheel::{OmniWheel, WheelSpec};
