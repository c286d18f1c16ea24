#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for planning turn manoeuvres of a 2D differential-drive robot."]
#![doc = ""]
#![doc = "This crate provides angular-speed profiles (trapezoidal, S-curve and an"]
#![doc = "unconstrained ideal baseline) and a fixed-step integrator that turns a"]
#![doc = "profile plus a constant linear speed into an open-loop reference trajectory."]

extern crate alloc;

use alloc::vec::Vec;
use core::f64::consts::PI;
use core::fmt;
use libm::{cos, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub mod ideal;
pub mod integrator;
pub mod params;
pub mod profile;
pub mod s_curve;
pub mod trapezoidal;
pub mod turn;
pub mod units;

pub use error::KinematicsError;
pub use ideal::IdealProfile;
pub use integrator::{PoseIntegrator, Trajectory};
pub use params::{MotionProfileParameters, TurnDirection};
pub use profile::{AngularProfile, AngularSpeedSample, ProfileSegment, SegmentKind};
pub use s_curve::{PhaseEvent, PhaseKind, SCurvePlanner, SCurveProfile};
pub use trapezoidal::TrapezoidalProfile;
pub use turn::{PlannedTurn, ProfileDetails, ProfileKind, plan_turn};

/// Fixed integration interval shared by every planner and the integrator.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeStep {
    seconds: f64,
}

impl TimeStep {
    /// One millisecond, the step every profile is tuned against.
    pub const MILLISECOND: TimeStep = TimeStep { seconds: 0.001 };

    /// Construct a time step.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidParameter)` if `seconds` is not a
    /// finite, positive number.
    pub fn new(seconds: f64) -> Result<Self, KinematicsError> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(KinematicsError::InvalidParameter(
                "time_step",
                "must be finite and positive",
            ));
        }
        Ok(TimeStep { seconds })
    }

    /// Length of one step in seconds.
    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    /// Number of whole steps closest to `duration` seconds.
    ///
    /// Negative durations map to zero steps.
    pub fn to_steps(&self, duration: f64) -> u32 {
        let steps = libm::round(duration / self.seconds);
        if steps <= 0.0 { 0 } else { steps as u32 }
    }

    /// Duration in seconds of `steps` whole steps.
    pub fn duration(&self, steps: u32) -> f64 {
        steps as f64 * self.seconds
    }
}

impl Default for TimeStep {
    fn default() -> Self {
        TimeStep::MILLISECOND
    }
}

impl fmt::Display for TimeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} ms", self.seconds * 1000.0)
    }
}

/// A 2‑D pose `(x, y, θ)` in meters and radians.
///
/// θ is measured clockwise from the world +y axis, so the forward unit vector
/// is `(sin θ, cos θ)`. It is never wrapped during integration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// World‑frame x position (m).
    pub x: f64,
    /// World‑frame y position (m).
    pub y: f64,
    /// Heading (rad), accumulated without wraparound.
    pub theta: f64,
}

impl Pose {
    /// Construct a new pose.
    ///
    /// # Arguments
    ///
    /// * `x`: World-frame x position in meters.
    /// * `y`: World-frame y position in meters.
    /// * `theta`: Heading in radians.
    pub const fn new(x: f64, y: f64, theta: f64) -> Self {
        Pose { x, y, theta }
    }

    /// Unit vector pointing along the current heading.
    pub fn forward(&self) -> (f64, f64) {
        (sin(self.theta), cos(self.theta))
    }

    /// The pose reached by driving `distance` meters straight ahead.
    pub fn advanced(&self, distance: f64) -> Pose {
        let (fx, fy) = self.forward();
        Pose {
            x: self.x + distance * fx,
            y: self.y + distance * fy,
            theta: self.theta,
        }
    }

    /// Straight-line distance to another pose (m).
    pub fn distance_to(&self, other: &Pose) -> f64 {
        libm::hypot(other.x - self.x, other.y - self.y)
    }

    /// Normalize an angle to be within `[-PI, PI)`.
    ///
    /// Angles at `PI` will be normalized to `-PI`. Only used when comparing
    /// headings; integrated headings stay unwrapped.
    pub fn normalize_angle(angle: f64) -> f64 {
        let a = angle % (2.0 * PI);
        if a >= PI {
            a - 2.0 * PI
        } else if a < -PI {
            a + 2.0 * PI
        } else {
            a
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {:.4}, y: {:.4}, θ: {:.4} rad)", self.x, self.y, self.theta)
    }
}

/// Left and right wheel angular velocities.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelSpeeds {
    /// Left wheel angular velocity (rad/s).
    pub omega_l: f64,
    /// Right wheel angular velocity (rad/s).
    pub omega_r: f64,
}

impl WheelSpeeds {
    /// Construct wheel speeds.
    pub const fn new(omega_l: f64, omega_r: f64) -> Self {
        WheelSpeeds { omega_l, omega_r }
    }
}

impl fmt::Display for WheelSpeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(ωL: {:.2} rad/s, ωR: {:.2} rad/s)", self.omega_l, self.omega_r)
    }
}

/// Linear and angular chassis velocities.
///
/// A positive `omega` turns the heading clockwise (towards +x when facing +y).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChassisSpeeds {
    /// Linear speed of the chassis center (m/s).
    pub v: f64,
    /// Angular speed of the chassis (rad/s).
    pub omega: f64,
}

impl ChassisSpeeds {
    /// Construct chassis speeds.
    pub const fn new(v: f64, omega: f64) -> Self {
        ChassisSpeeds { v, omega }
    }
}

impl fmt::Display for ChassisSpeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(v: {:.2} m/s, ω: {:.2} rad/s)", self.v, self.omega)
    }
}

/// Differential‑drive kinematics helper.
///
/// Holds the wheel radius and axle length and converts between chassis and
/// wheel speeds, so a planned profile can be handed to the motor controllers
/// as per-wheel references.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialDrive {
    /// Wheel radius (m).
    wheel_radius: f64,
    /// Axle length (m).
    axle_length: f64,
}

impl DifferentialDrive {
    /// Construct a new differential‑drive kinematics helper.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidWheelRadius)` if `wheel_radius` is not positive.
    /// Returns `Err(KinematicsError::InvalidAxleLength)` if `axle_length` is not positive.
    pub const fn new(wheel_radius: f64, axle_length: f64) -> Result<Self, KinematicsError> {
        if wheel_radius <= 0.0 {
            return Err(KinematicsError::InvalidWheelRadius("must be positive"));
        }
        if axle_length <= 0.0 {
            return Err(KinematicsError::InvalidAxleLength("must be positive"));
        }
        Ok(DifferentialDrive {
            wheel_radius,
            axle_length,
        })
    }

    /// Returns the wheel radius.
    pub fn wheel_radius(&self) -> f64 {
        self.wheel_radius
    }

    /// Returns the axle length.
    pub fn axle_length(&self) -> f64 {
        self.axle_length
    }

    /// Chassis speeds produced by the given wheel speeds.
    pub fn forward_kinematics(&self, wheel_speeds: WheelSpeeds) -> ChassisSpeeds {
        let v_l = wheel_speeds.omega_l * self.wheel_radius;
        let v_r = wheel_speeds.omega_r * self.wheel_radius;

        let v = (v_r + v_l) / 2.0;
        // Clockwise-positive heading: the left wheel runs on the outside.
        let omega = (v_l - v_r) / self.axle_length;

        ChassisSpeeds::new(v, omega)
    }

    /// Wheel speeds required to achieve the given chassis speeds.
    pub fn inverse_kinematics(&self, chassis_speeds: ChassisSpeeds) -> WheelSpeeds {
        let half_axle = self.axle_length / 2.0;
        let v_l = chassis_speeds.v + chassis_speeds.omega * half_axle;
        let v_r = chassis_speeds.v - chassis_speeds.omega * half_axle;

        WheelSpeeds::new(v_l / self.wheel_radius, v_r / self.wheel_radius)
    }

    /// Per-step wheel speed references for a profile driven at `linear_speed`.
    ///
    /// The output is index-aligned with `samples`.
    pub fn wheel_speed_profile(
        &self,
        linear_speed: f64,
        samples: &[AngularSpeedSample],
    ) -> Vec<WheelSpeeds> {
        samples
            .iter()
            .map(|s| self.inverse_kinematics(ChassisSpeeds::new(linear_speed, s.angular_speed)))
            .collect()
    }
}

impl fmt::Display for DifferentialDrive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DifferentialDrive (r: {:.4} m, L: {:.4} m)",
            self.wheel_radius, self.axle_length
        )
    }
}
