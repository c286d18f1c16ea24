//! S-curve angular-speed profile.
//!
//! There is no closed-form timing here. The planner simulates the turn one
//! step at a time: the angle already turned selects a sinusoidal easing
//! factor near either end of the turn, and the loop runs until the turned
//! angle reaches the target.

use alloc::vec::Vec;
use core::f64::consts::FRAC_PI_2;
use core::fmt;
use libm::{pow, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::params::{MotionProfileParameters, positive, validate_sharpness, validate_transition};
use crate::profile::{AngularProfile, AngularSpeedSample};
use crate::{KinematicsError, TimeStep};

/// Angular speed floor (rad/s). Keeps the simulation moving where the easing
/// factor reaches zero, at the very start of the turn.
pub const MIN_ANGULAR_SPEED: f64 = 0.05;

/// Phase boundary crossed during the simulation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    /// Entry blend finished, full speed from here.
    EnterCruise,
    /// Exit blend started.
    EnterExitBlend,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseKind::EnterCruise => write!(f, "enter cruise"),
            PhaseKind::EnterExitBlend => write!(f, "enter exit blend"),
        }
    }
}

/// A phase boundary and where it was crossed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseEvent {
    /// Boundary crossed.
    pub kind: PhaseKind,
    /// Index of the step whose rotation crossed it.
    pub step: u32,
    /// Angle turned at the end of that step (rad).
    pub angle_turned: f64,
}

impl PhaseEvent {
    /// Distance driven up to and including the crossing step (m).
    pub fn distance(&self, linear_speed: f64, dt: TimeStep) -> f64 {
        linear_speed * dt.duration(self.step + 1)
    }
}

/// Settings shared by every S-curve turn of one kind.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SCurvePlanner {
    transition_angle: f64,
    max_angular_speed: f64,
    sharpness: f64,
    min_angular_speed: f64,
    dt: TimeStep,
}

impl SCurvePlanner {
    /// Construct a planner.
    ///
    /// # Arguments
    ///
    /// * `transition_angle`: Angle blended at each end of the turn (rad).
    /// * `max_angular_speed`: Speed held between the blends (rad/s).
    /// * `sharpness`: Exponent applied to the sine easing, at least 1.
    /// * `dt`: Simulation step.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidParameter)` for a non-positive
    /// transition angle, a speed not above [`MIN_ANGULAR_SPEED`], or a
    /// sharpness below 1.
    pub fn new(
        transition_angle: f64,
        max_angular_speed: f64,
        sharpness: f64,
        dt: TimeStep,
    ) -> Result<Self, KinematicsError> {
        positive("transition_angle", transition_angle)?;
        positive("max_angular_speed", max_angular_speed)?;
        above_floor(max_angular_speed, MIN_ANGULAR_SPEED)?;
        validate_sharpness(sharpness)?;
        Ok(SCurvePlanner {
            transition_angle,
            max_angular_speed,
            sharpness,
            min_angular_speed: MIN_ANGULAR_SPEED,
            dt,
        })
    }

    /// Build a planner from a parameter record.
    ///
    /// # Errors
    ///
    /// Fails if the record is invalid or carries no transition angle.
    pub fn from_parameters(
        params: &MotionProfileParameters,
        dt: TimeStep,
    ) -> Result<Self, KinematicsError> {
        params.validate()?;
        let transition = params.transition_angle.ok_or(KinematicsError::InvalidParameter(
            "transition_angle",
            "required for an S-curve profile",
        ))?;
        Self::new(
            transition,
            params.max_angular_speed,
            params.sharpness_or_default(),
            dt,
        )
    }

    /// Replace the angular speed floor.
    ///
    /// # Errors
    ///
    /// The floor must be positive, or the simulation could stall, and below
    /// the maximum angular speed, or every sample would exceed the ceiling.
    pub fn with_min_angular_speed(mut self, floor: f64) -> Result<Self, KinematicsError> {
        positive("min_angular_speed", floor)?;
        if floor >= self.max_angular_speed {
            return Err(KinematicsError::InvalidParameter(
                "min_angular_speed",
                "must be below the maximum angular speed",
            ));
        }
        self.min_angular_speed = floor;
        Ok(self)
    }

    /// Easing factor in `[0, 1]` for a turn of `turn_angle` after `angle_turned`.
    pub fn speed_factor(&self, turn_angle: f64, angle_turned: f64) -> f64 {
        if angle_turned < self.transition_angle {
            let phase = angle_turned / self.transition_angle;
            pow(sin(phase * FRAC_PI_2), self.sharpness)
        } else if angle_turned >= turn_angle - self.transition_angle {
            let phase = (turn_angle - angle_turned) / self.transition_angle;
            pow(sin(phase * FRAC_PI_2), self.sharpness)
        } else {
            1.0
        }
    }

    /// Simulate a turn of `turn_angle` radians.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidParameter)` if `turn_angle` is not
    /// positive or is less than twice the transition angle.
    pub fn plan(&self, turn_angle: f64) -> Result<SCurveProfile, KinematicsError> {
        positive("turn_angle", turn_angle)?;
        validate_transition(self.transition_angle, turn_angle)?;

        let dt = self.dt.seconds();
        let cruise_start = self.transition_angle;
        let exit_start = turn_angle - self.transition_angle;

        let mut samples = Vec::new();
        let mut events = Vec::new();
        let mut angle_turned = 0.0;
        let mut last_speed = 0.0;
        let mut peak_acceleration: f64 = 0.0;
        let mut step = 0u32;

        while angle_turned < turn_angle {
            let raw = self.max_angular_speed * self.speed_factor(turn_angle, angle_turned);
            peak_acceleration = peak_acceleration.max(libm::fabs(raw - last_speed) / dt);
            last_speed = raw;

            let speed = raw.max(self.min_angular_speed);
            let next = angle_turned + speed * dt;

            if angle_turned < cruise_start && next >= cruise_start {
                events.push(PhaseEvent {
                    kind: PhaseKind::EnterCruise,
                    step,
                    angle_turned: next,
                });
            }
            if angle_turned < exit_start && next >= exit_start {
                events.push(PhaseEvent {
                    kind: PhaseKind::EnterExitBlend,
                    step,
                    angle_turned: next,
                });
            }

            samples.push(AngularSpeedSample::new(step, speed));
            angle_turned = next;
            step += 1;
        }

        Ok(SCurveProfile {
            turn_angle,
            dt: self.dt,
            samples,
            events,
            angle_turned,
            peak_acceleration,
        })
    }
}

fn above_floor(max_angular_speed: f64, floor: f64) -> Result<(), KinematicsError> {
    if max_angular_speed <= floor {
        return Err(KinematicsError::InvalidParameter(
            "max_angular_speed",
            "must exceed the angular speed floor",
        ));
    }
    Ok(())
}

/// Result of an S-curve simulation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SCurveProfile {
    turn_angle: f64,
    dt: TimeStep,
    samples: Vec<AngularSpeedSample>,
    events: Vec<PhaseEvent>,
    angle_turned: f64,
    peak_acceleration: f64,
}

impl SCurveProfile {
    /// Plan straight from a parameter record.
    pub fn from_parameters(
        params: &MotionProfileParameters,
        dt: TimeStep,
    ) -> Result<Self, KinematicsError> {
        SCurvePlanner::from_parameters(params, dt)?.plan(params.turn_angle)
    }

    /// The simulated schedule, borrowed.
    pub fn as_samples(&self) -> &[AngularSpeedSample] {
        &self.samples
    }

    /// Phase boundaries in the order they were crossed.
    pub fn events(&self) -> &[PhaseEvent] {
        &self.events
    }

    /// First event of the given kind.
    pub fn event(&self, kind: PhaseKind) -> Option<&PhaseEvent> {
        self.events.iter().find(|e| e.kind == kind)
    }

    /// Angle turned when the simulation stopped (rad). Never below the target.
    pub fn final_angle(&self) -> f64 {
        self.angle_turned
    }

    /// How far the last step carried past the target (rad).
    ///
    /// Bounded by one step of rotation and left uncorrected.
    pub fn overshoot(&self) -> f64 {
        self.angle_turned - self.turn_angle
    }

    /// Largest step-to-step change of the unfloored speed (rad/s²).
    pub fn peak_acceleration(&self) -> f64 {
        self.peak_acceleration
    }

    /// Steps between entering cruise and entering the exit blend.
    pub fn cruise_steps(&self) -> Option<u32> {
        let start = self.event(PhaseKind::EnterCruise)?;
        let end = self.event(PhaseKind::EnterExitBlend)?;
        Some(end.step - start.step)
    }

    /// Length of the full-speed arc between the blends (m).
    pub fn cruise_arc_distance(&self, linear_speed: f64) -> Option<f64> {
        self.cruise_steps()
            .map(|steps| linear_speed * self.dt.duration(steps))
    }
}

impl AngularProfile for SCurveProfile {
    fn duration_steps(&self) -> u32 {
        self.samples.len() as u32
    }

    fn samples(&self) -> Vec<AngularSpeedSample> {
        self.samples.clone()
    }
}
