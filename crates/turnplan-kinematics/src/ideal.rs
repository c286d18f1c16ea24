//! Unconstrained baseline profile.
//!
//! Assumes the robot can switch to the arc's angular speed instantly, so the
//! turn is one constant-speed segment lasting `turn_angle * radius / v`.

use alloc::vec::Vec;
use libm::ceil;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::params::{MotionProfileParameters, positive};
use crate::profile::{AngularProfile, AngularSpeedSample};
use crate::{KinematicsError, TimeStep};

/// Constant angular speed held for exactly the ideal duration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdealProfile {
    turn_angle: f64,
    duration: f64,
    angular_speed: f64,
    dt: TimeStep,
}

impl IdealProfile {
    /// Baseline for a turn of `turn_angle` radians on an arc of `turn_radius`
    /// meters at `linear_speed` m/s.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidParameter)` if any input is not
    /// finite and positive.
    pub fn new(
        turn_angle: f64,
        turn_radius: f64,
        linear_speed: f64,
        dt: TimeStep,
    ) -> Result<Self, KinematicsError> {
        positive("turn_angle", turn_angle)?;
        positive("turn_radius", turn_radius)?;
        positive("linear_speed", linear_speed)?;

        let duration = turn_angle * turn_radius / linear_speed;
        Ok(IdealProfile {
            turn_angle,
            duration,
            angular_speed: turn_angle / duration,
            dt,
        })
    }

    /// Baseline from a parameter record, which must carry a turn radius.
    pub fn from_parameters(
        params: &MotionProfileParameters,
        dt: TimeStep,
    ) -> Result<Self, KinematicsError> {
        params.validate()?;
        let radius = params.turn_radius.ok_or(KinematicsError::InvalidParameter(
            "turn_radius",
            "required for the ideal profile",
        ))?;
        Self::new(params.turn_angle, radius, params.linear_speed, dt)
    }

    /// Ideal turn duration `T_ideal` (s).
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Constant angular speed during the turn (rad/s).
    pub fn angular_speed(&self) -> f64 {
        self.angular_speed
    }

    /// Schedule over a fixed horizon.
    ///
    /// Steps that end before `T_ideal` carry the full angular speed. The step
    /// that reaches `T_ideal` carries only the angle still missing, so the
    /// integrated heading lands on the target; every later step is zero.
    pub fn samples_with_horizon(&self, horizon: u32) -> Vec<AngularSpeedSample> {
        let dt = self.dt.seconds();
        let full_steps = self.duration_steps().saturating_sub(1);
        let remainder = self.turn_angle / dt - full_steps as f64 * self.angular_speed;

        (0..horizon)
            .map(|k| {
                let speed = if k < full_steps {
                    self.angular_speed
                } else if k == full_steps {
                    remainder
                } else {
                    0.0
                };
                AngularSpeedSample::new(k, speed)
            })
            .collect()
    }
}

impl AngularProfile for IdealProfile {
    /// Whole steps needed to cover `T_ideal`, rounded up.
    fn duration_steps(&self) -> u32 {
        ceil(self.duration / self.dt.seconds()) as u32
    }

    fn samples(&self) -> Vec<AngularSpeedSample> {
        self.samples_with_horizon(self.duration_steps())
    }
}
