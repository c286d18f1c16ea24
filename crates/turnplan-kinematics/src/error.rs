//! Error types for the planning library.
//!
//! Every planner validates its inputs up front and fails before emitting a
//! single sample, so a caller either gets a complete profile or one of these.

use core::fmt;

/// Errors that can occur while planning or integrating a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// A planning parameter is out of range.
    ///
    /// Carries the parameter name and the constraint it violated.
    InvalidParameter(&'static str, &'static str),
    /// Error for invalid wheel radius.
    /// This variant is returned when a wheel radius is provided that is not positive.
    InvalidWheelRadius(&'static str),
    /// Error for invalid axle length.
    /// This variant is returned when an axle length is provided that is not positive.
    InvalidAxleLength(&'static str),
}

impl KinematicsError {
    /// Returns the name of the offending parameter.
    pub fn parameter(&self) -> &'static str {
        match self {
            KinematicsError::InvalidParameter(name, _) => name,
            KinematicsError::InvalidWheelRadius(_) => "wheel_radius",
            KinematicsError::InvalidAxleLength(_) => "axle_length",
        }
    }
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::InvalidParameter(name, msg) => {
                write!(f, "Invalid parameter `{}`: {}", name, msg)
            }
            KinematicsError::InvalidWheelRadius(msg) => write!(f, "Invalid wheel radius: {}", msg),
            KinematicsError::InvalidAxleLength(msg) => write!(f, "Invalid axle length: {}", msg),
        }
    }
}

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "std")]
impl std::error::Error for KinematicsError {}
