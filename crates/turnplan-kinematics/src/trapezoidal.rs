//! Trapezoidal angular-speed profile with triangular fallback.
//!
//! Segment lengths come from equating the area under the speed trapezoid to
//! the turn angle, then rounding each phase to whole steps. The per-step
//! speeds are produced by an accumulator that adds, holds and subtracts
//! `rate * dt`, clamped to `[0, max_angular_speed]`, rather than by
//! evaluating the closed-form law.

use alloc::vec::Vec;
use core::fmt;
use libm::sqrt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::params::{MotionProfileParameters, positive};
use crate::profile::{AngularProfile, AngularSpeedSample, ProfileSegment, SegmentKind};
use crate::{KinematicsError, TimeStep};

/// A planned trapezoidal (or triangular) profile.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapezoidalProfile {
    turn_angle: f64,
    max_angular_speed: f64,
    angular_acceleration: f64,
    angular_deceleration: f64,
    dt: TimeStep,
    accel_steps: u32,
    cruise_steps: u32,
    decel_steps: u32,
    triangular: bool,
}

impl TrapezoidalProfile {
    /// Plan a profile for a turn of `turn_angle` radians.
    ///
    /// # Arguments
    ///
    /// * `turn_angle`: Magnitude of the turn (rad).
    /// * `max_angular_speed`: Cruise speed ceiling (rad/s).
    /// * `angular_acceleration`: Acceleration limit (rad/s²).
    /// * `angular_deceleration`: Deceleration limit (rad/s²).
    /// * `dt`: Integration step the segments are rounded to.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidParameter)` if any argument is not
    /// finite and positive.
    pub fn plan(
        turn_angle: f64,
        max_angular_speed: f64,
        angular_acceleration: f64,
        angular_deceleration: f64,
        dt: TimeStep,
    ) -> Result<Self, KinematicsError> {
        positive("turn_angle", turn_angle)?;
        positive("max_angular_speed", max_angular_speed)?;
        positive("angular_acceleration", angular_acceleration)?;
        positive("angular_deceleration", angular_deceleration)?;

        let mut t1 = max_angular_speed / angular_acceleration;
        let mut t3 = max_angular_speed / angular_deceleration;
        let mut t2 = turn_angle / max_angular_speed - t1 / 2.0 - t3 / 2.0;

        let triangular = t2 < 0.0;
        if triangular {
            // No room to reach the ceiling: keep the accel/decel ratio and
            // solve the triangle area for the acceleration time.
            let ratio = angular_acceleration / angular_deceleration;
            t1 = sqrt(2.0 * turn_angle / ((1.0 + ratio) * angular_acceleration));
            t3 = t1 * ratio;
            t2 = 0.0;
        }
        debug_assert!(t1 >= 0.0 && t2 >= 0.0 && t3 >= 0.0);

        Ok(TrapezoidalProfile {
            turn_angle,
            max_angular_speed,
            angular_acceleration,
            angular_deceleration,
            dt,
            accel_steps: dt.to_steps(t1),
            cruise_steps: dt.to_steps(t2),
            decel_steps: dt.to_steps(t3),
            triangular,
        })
    }

    /// Plan from a full parameter record, validating it first.
    pub fn from_parameters(
        params: &MotionProfileParameters,
        dt: TimeStep,
    ) -> Result<Self, KinematicsError> {
        params.validate()?;
        Self::plan(
            params.turn_angle,
            params.max_angular_speed,
            params.angular_acceleration,
            params.angular_deceleration,
            dt,
        )
    }

    /// Steps spent accelerating.
    pub fn accel_steps(&self) -> u32 {
        self.accel_steps
    }

    /// Steps spent cruising. Zero for a triangular profile.
    pub fn cruise_steps(&self) -> u32 {
        self.cruise_steps
    }

    /// Steps spent decelerating.
    pub fn decel_steps(&self) -> u32 {
        self.decel_steps
    }

    /// Total profile length `T = t1 + t2 + t3` in steps.
    pub fn total_steps(&self) -> u32 {
        self.accel_steps + self.cruise_steps + self.decel_steps
    }

    /// `true` when the cruise phase collapsed to zero.
    pub fn is_triangular(&self) -> bool {
        self.triangular
    }

    /// Turn angle the profile was planned for (rad).
    pub fn turn_angle(&self) -> f64 {
        self.turn_angle
    }

    /// Integration step the profile was rounded to.
    pub fn time_step(&self) -> TimeStep {
        self.dt
    }

    /// The three phases with their closed-form speed laws.
    pub fn segments(&self) -> [ProfileSegment; 3] {
        let dt = self.dt.seconds();
        let peak = (self.angular_acceleration * self.accel_steps as f64 * dt)
            .min(self.max_angular_speed);
        [
            ProfileSegment {
                kind: SegmentKind::Accelerate,
                duration_steps: self.accel_steps,
                start_speed: 0.0,
                rate: self.angular_acceleration,
            },
            ProfileSegment {
                kind: SegmentKind::Cruise,
                duration_steps: self.cruise_steps,
                start_speed: peak,
                rate: 0.0,
            },
            ProfileSegment {
                kind: SegmentKind::Decelerate,
                duration_steps: self.decel_steps,
                start_speed: peak,
                rate: -self.angular_deceleration,
            },
        ]
    }

    /// Step the accumulator for `horizon` steps.
    ///
    /// Past `T` the accumulator keeps decelerating and is held at zero by the
    /// clamp, which lets the profile be compared against a longer baseline.
    pub fn samples_with_horizon(&self, horizon: u32) -> Vec<AngularSpeedSample> {
        let dt = self.dt.seconds();
        let cruise_end = self.accel_steps + self.cruise_steps;
        let mut speed = 0.0;

        (0..horizon)
            .map(|k| {
                let t = k + 1;
                if t <= self.accel_steps {
                    speed += self.angular_acceleration * dt;
                } else if t > cruise_end {
                    speed -= self.angular_deceleration * dt;
                }
                speed = f64::clamp(speed, 0.0, self.max_angular_speed);
                AngularSpeedSample::new(k, speed)
            })
            .collect()
    }
}

impl AngularProfile for TrapezoidalProfile {
    fn duration_steps(&self) -> u32 {
        self.total_steps()
    }

    fn samples(&self) -> Vec<AngularSpeedSample> {
        self.samples_with_horizon(self.total_steps())
    }
}

impl fmt::Display for TrapezoidalProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (t1: {}, t2: {}, t3: {}, T: {} steps)",
            if self.triangular { "Triangular" } else { "Trapezoidal" },
            self.accel_steps,
            self.cruise_steps,
            self.decel_steps,
            self.total_steps()
        )
    }
}
