//! Caller-supplied description of a turn and the limits it must respect.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{KinematicsError, Pose};

/// Which way the robot turns.
///
/// Planners only ever work on the magnitude of the turn angle; the direction
/// sets the sign of the applied angular speed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnDirection {
    /// Clockwise: heading increases, the robot curves towards +x when facing +y.
    #[default]
    Right,
    /// Counter-clockwise: heading decreases.
    Left,
}

impl TurnDirection {
    /// `+1.0` for right turns, `-1.0` for left turns.
    pub fn sign(self) -> f64 {
        match self {
            TurnDirection::Right => 1.0,
            TurnDirection::Left => -1.0,
        }
    }

    /// Direction implied by the sign of a signed turn angle.
    pub fn from_angle(angle: f64) -> Self {
        if angle < 0.0 {
            TurnDirection::Left
        } else {
            TurnDirection::Right
        }
    }
}

impl fmt::Display for TurnDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnDirection::Right => write!(f, "right"),
            TurnDirection::Left => write!(f, "left"),
        }
    }
}

/// Everything needed to plan one turn.
///
/// Speeds are in m/s and rad/s, angles in radians, distances in meters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionProfileParameters {
    /// Constant forward speed held through the turn (m/s).
    pub linear_speed: f64,
    /// Magnitude of the heading change (rad).
    pub turn_angle: f64,
    /// Side the robot turns towards.
    pub direction: TurnDirection,
    /// Angular speed ceiling (rad/s).
    pub max_angular_speed: f64,
    /// Angular acceleration limit (rad/s²).
    pub angular_acceleration: f64,
    /// Angular deceleration limit (rad/s²).
    pub angular_deceleration: f64,
    /// Angle blended at each end of an S-curve turn (rad).
    pub transition_angle: Option<f64>,
    /// Exponent applied to the S-curve easing.
    pub sharpness: Option<f64>,
    /// Arc radius used by the ideal baseline (m).
    pub turn_radius: Option<f64>,
    /// Straight distance driven before the turn starts (m).
    pub entry_straight: Option<f64>,
    /// Straight distance driven after the turn ends (m).
    pub exit_straight: Option<f64>,
    /// Pose before the entry straight.
    pub initial_pose: Pose,
}

impl MotionProfileParameters {
    /// Construct parameters for a turn.
    ///
    /// A negative `turn_angle` is stored as its magnitude with
    /// [`TurnDirection::Left`].
    pub fn new(
        linear_speed: f64,
        turn_angle: f64,
        max_angular_speed: f64,
        angular_acceleration: f64,
        angular_deceleration: f64,
    ) -> Self {
        MotionProfileParameters {
            linear_speed,
            turn_angle: libm::fabs(turn_angle),
            direction: TurnDirection::from_angle(turn_angle),
            max_angular_speed,
            angular_acceleration,
            angular_deceleration,
            transition_angle: None,
            sharpness: None,
            turn_radius: None,
            entry_straight: None,
            exit_straight: None,
            initial_pose: Pose::default(),
        }
    }

    /// Set the turn direction.
    pub fn with_direction(mut self, direction: TurnDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Set the S-curve transition angle (rad).
    pub fn with_transition_angle(mut self, transition_angle: f64) -> Self {
        self.transition_angle = Some(transition_angle);
        self
    }

    /// Set the S-curve sharpness exponent.
    pub fn with_sharpness(mut self, sharpness: f64) -> Self {
        self.sharpness = Some(sharpness);
        self
    }

    /// Set the arc radius for the ideal baseline (m).
    pub fn with_turn_radius(mut self, turn_radius: f64) -> Self {
        self.turn_radius = Some(turn_radius);
        self
    }

    /// Drive `distance` meters straight before turning.
    pub fn with_entry_straight(mut self, distance: f64) -> Self {
        self.entry_straight = Some(distance);
        self
    }

    /// Drive `distance` meters straight after turning.
    pub fn with_exit_straight(mut self, distance: f64) -> Self {
        self.exit_straight = Some(distance);
        self
    }

    /// Set the pose the manoeuvre starts from.
    pub fn with_initial_pose(mut self, pose: Pose) -> Self {
        self.initial_pose = pose;
        self
    }

    /// Signed turn angle (rad).
    pub fn signed_turn_angle(&self) -> f64 {
        self.direction.sign() * self.turn_angle
    }

    /// Sharpness exponent, defaulting to a plain sine blend.
    pub fn sharpness_or_default(&self) -> f64 {
        self.sharpness.unwrap_or(1.0)
    }

    /// Pose at which the turn itself begins, after the entry straight.
    pub fn turn_start_pose(&self) -> Pose {
        match self.entry_straight {
            Some(d) => self.initial_pose.advanced(d),
            None => self.initial_pose,
        }
    }

    /// Check every field, returning the first violation.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidParameter)` naming the offending field.
    pub fn validate(&self) -> Result<(), KinematicsError> {
        positive("linear_speed", self.linear_speed)?;
        positive("turn_angle", self.turn_angle)?;
        positive("max_angular_speed", self.max_angular_speed)?;
        positive("angular_acceleration", self.angular_acceleration)?;
        positive("angular_deceleration", self.angular_deceleration)?;

        if let Some(transition) = self.transition_angle {
            validate_transition(transition, self.turn_angle)?;
        }
        if let Some(sharpness) = self.sharpness {
            validate_sharpness(sharpness)?;
        }
        if let Some(radius) = self.turn_radius {
            positive("turn_radius", radius)?;
        }
        if let Some(d) = self.entry_straight {
            non_negative("entry_straight", d)?;
        }
        if let Some(d) = self.exit_straight {
            non_negative("exit_straight", d)?;
        }
        Ok(())
    }
}

pub(crate) fn positive(name: &'static str, value: f64) -> Result<(), KinematicsError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(KinematicsError::InvalidParameter(
            name,
            "must be finite and positive",
        ));
    }
    Ok(())
}

pub(crate) fn non_negative(name: &'static str, value: f64) -> Result<(), KinematicsError> {
    if !value.is_finite() || value < 0.0 {
        return Err(KinematicsError::InvalidParameter(
            name,
            "must be finite and non-negative",
        ));
    }
    Ok(())
}

pub(crate) fn validate_transition(transition: f64, turn_angle: f64) -> Result<(), KinematicsError> {
    positive("transition_angle", transition)?;
    if transition > turn_angle / 2.0 {
        return Err(KinematicsError::InvalidParameter(
            "transition_angle",
            "must not exceed half the turn angle",
        ));
    }
    Ok(())
}

pub(crate) fn validate_sharpness(sharpness: f64) -> Result<(), KinematicsError> {
    if !sharpness.is_finite() || sharpness < 1.0 {
        return Err(KinematicsError::InvalidParameter(
            "sharpness",
            "must be finite and at least 1",
        ));
    }
    Ok(())
}
