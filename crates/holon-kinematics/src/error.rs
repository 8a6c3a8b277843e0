//! This module defines the error types used by the `holon-kinematics` crate.

#![warn(missing_docs)]

/// Error type for kinematic operations.
///
/// This enum encapsulates all possible errors that can occur during
/// kinematic calculations, such as degenerate wheel definitions or
/// unsolvable chassis configurations.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Error for an unusable wheel drive vector.
    /// This variant is returned when a wheel is constructed with a drive
    /// vector of zero magnitude.
    InvalidDriveVector(&'static str),
    /// Error for a mis-sized wheel speed sequence.
    /// This variant is returned when forward kinematics receives a number of
    /// speeds different from the number of wheels on the chassis.
    DimensionMismatch(&'static str),
    /// Error for an unsolvable chassis configuration.
    /// This variant is returned when the chassis coefficient matrix is not
    /// square or not invertible.
    SingularMatrix(&'static str),
}

impl core::fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            KinematicsError::InvalidDriveVector(msg) => {
                write!(f, "Invalid drive vector: {}", msg)
            }
            KinematicsError::DimensionMismatch(msg) => {
                write!(f, "Wheel speed dimension mismatch: {}", msg)
            }
            KinematicsError::SingularMatrix(msg) => {
                write!(f, "Singular chassis configuration: {}", msg)
            }
        }
    }
}

impl core::error::Error for KinematicsError {}
