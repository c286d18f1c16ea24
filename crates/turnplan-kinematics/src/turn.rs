//! One call from parameters to a signed schedule and its trajectory.

use alloc::vec::Vec;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ideal::IdealProfile;
use crate::integrator::{PoseIntegrator, Trajectory};
use crate::params::MotionProfileParameters;
use crate::profile::{AngularProfile, AngularSpeedSample, apply_direction};
use crate::s_curve::SCurveProfile;
use crate::trapezoidal::TrapezoidalProfile;
use crate::{KinematicsError, TimeStep};

/// Profile family used to shape the turn.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    /// Accelerate, cruise, decelerate; triangular when the turn is short.
    Trapezoidal,
    /// Sinusoidal blends at both ends of the turn.
    SCurve,
    /// Constant arc speed with no acceleration limit.
    Ideal,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::Trapezoidal => write!(f, "trapezoidal"),
            ProfileKind::SCurve => write!(f, "s-curve"),
            ProfileKind::Ideal => write!(f, "ideal"),
        }
    }
}

/// Planner output kept alongside the samples for reporting.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileDetails {
    /// Segment timing of a trapezoidal plan.
    Trapezoidal(TrapezoidalProfile),
    /// Simulation record of an S-curve plan.
    SCurve(SCurveProfile),
    /// Baseline timing.
    Ideal(IdealProfile),
}

/// A fully planned and integrated turn.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedTurn {
    /// Parameters the turn was planned from.
    pub params: MotionProfileParameters,
    /// Signed angular speed per step.
    pub samples: Vec<AngularSpeedSample>,
    /// Poses, starting after the entry straight and ending after the exit straight.
    pub trajectory: Trajectory,
    /// Planner specifics.
    pub details: ProfileDetails,
}

impl PlannedTurn {
    /// Which family produced this turn.
    pub fn kind(&self) -> ProfileKind {
        match self.details {
            ProfileDetails::Trapezoidal(_) => ProfileKind::Trapezoidal,
            ProfileDetails::SCurve(_) => ProfileKind::SCurve,
            ProfileDetails::Ideal(_) => ProfileKind::Ideal,
        }
    }
}

/// Plan a turn with the chosen profile family and integrate it.
///
/// `horizon` pads the trapezoidal and ideal schedules with resting steps so
/// both can be compared step for step. It never shortens a schedule: a
/// horizon below the profile's own length is ignored, so the turn always
/// completes. The S-curve always runs until it reaches the target.
///
/// # Errors
///
/// Returns `Err(KinematicsError::InvalidParameter)` before any sample is
/// produced if the parameters do not suit the chosen family.
pub fn plan_turn(
    params: &MotionProfileParameters,
    kind: ProfileKind,
    dt: TimeStep,
    horizon: Option<u32>,
) -> Result<PlannedTurn, KinematicsError> {
    params.validate()?;

    let (magnitudes, details) = match kind {
        ProfileKind::Trapezoidal => {
            let profile = TrapezoidalProfile::from_parameters(params, dt)?;
            let n = padded_length(profile.total_steps(), horizon);
            (profile.samples_with_horizon(n), ProfileDetails::Trapezoidal(profile))
        }
        ProfileKind::SCurve => {
            let profile = SCurveProfile::from_parameters(params, dt)?;
            (profile.samples(), ProfileDetails::SCurve(profile))
        }
        ProfileKind::Ideal => {
            let profile = IdealProfile::from_parameters(params, dt)?;
            let n = padded_length(profile.duration_steps(), horizon);
            (profile.samples_with_horizon(n), ProfileDetails::Ideal(profile))
        }
    };

    let samples = apply_direction(magnitudes, params.direction);
    let mut trajectory =
        PoseIntegrator::new(dt).integrate(params.turn_start_pose(), params.linear_speed, &samples);
    if let Some(d) = params.exit_straight {
        trajectory.extend_straight(d);
    }

    Ok(PlannedTurn {
        params: *params,
        samples,
        trajectory,
        details,
    })
}

/// Schedule length for a profile lasting `steps`, padded out to `horizon`.
fn padded_length(steps: u32, horizon: Option<u32>) -> u32 {
    horizon.map_or(steps, |h| h.max(steps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::TurnDirection;
    use crate::units::{deg_to_rad, mm_to_m};
    use crate::Pose;
    use crate::s_curve::MIN_ANGULAR_SPEED;

    fn search_turn() -> MotionProfileParameters {
        MotionProfileParameters::new(
            0.5,
            deg_to_rad(90.0),
            deg_to_rad(560.0),
            deg_to_rad(35000.0),
            deg_to_rad(35000.0),
        )
        .with_turn_radius(mm_to_m(55.0))
    }

    #[test]
    fn test_trapezoidal_turn() {
        let turn = plan_turn(&search_turn(), ProfileKind::Trapezoidal, TimeStep::default(), None)
            .unwrap();
        assert_eq!(turn.kind(), ProfileKind::Trapezoidal);
        assert_eq!(turn.samples.len(), 177);
        assert_eq!(turn.trajectory.len(), 178);
    }

    #[test]
    fn test_ideal_turn_lands_on_target() {
        let turn = plan_turn(&search_turn(), ProfileKind::Ideal, TimeStep::default(), Some(300))
            .unwrap();
        assert_eq!(turn.samples.len(), 300);
        let last = turn.trajectory.final_pose().unwrap();
        assert!((last.theta - deg_to_rad(90.0)).abs() < 1e-12);
    }

    #[test]
    fn test_s_curve_turn_with_straights() {
        let params = MotionProfileParameters::new(
            0.7,
            deg_to_rad(90.0),
            deg_to_rad(900.0),
            1.0,
            1.0,
        )
        .with_transition_angle(deg_to_rad(25.0))
        .with_initial_pose(Pose::new(0.09, 0.0, 0.0))
        .with_entry_straight(0.02)
        .with_exit_straight(0.03);

        let turn = plan_turn(&params, ProfileKind::SCurve, TimeStep::default(), Some(5)).unwrap();
        assert!(turn.samples.len() > 5);
        assert_eq!(turn.samples[0].angular_speed, MIN_ANGULAR_SPEED);
        // Entry straight shifts the start, exit straight adds one pose.
        assert_eq!(turn.trajectory.len(), turn.samples.len() + 2);
        let first = turn.trajectory.initial().unwrap();
        assert!((first.y - 0.02).abs() < 1e-12);
        let poses = turn.trajectory.poses();
        let before = poses[poses.len() - 2];
        let after = poses[poses.len() - 1];
        assert!((before.distance_to(&after) - 0.03).abs() < 1e-12);
        assert!(after.theta >= deg_to_rad(90.0));
    }

    #[test]
    fn test_left_turn_mirrors_right_turn() {
        let right = plan_turn(&search_turn(), ProfileKind::Trapezoidal, TimeStep::default(), None)
            .unwrap();
        let left_params = search_turn().with_direction(TurnDirection::Left);
        let left = plan_turn(&left_params, ProfileKind::Trapezoidal, TimeStep::default(), None)
            .unwrap();

        let r = right.trajectory.final_pose().unwrap();
        let l = left.trajectory.final_pose().unwrap();
        assert!((r.x + l.x).abs() < 1e-12);
        assert!((r.y - l.y).abs() < 1e-12);
        assert!((r.theta + l.theta).abs() < 1e-12);
        for w in left.trajectory.poses().windows(2) {
            assert!(w[1].theta <= w[0].theta);
        }
    }

    #[test]
    fn test_short_horizon_does_not_cut_turn() {
        let dt = TimeStep::default();
        let turn = plan_turn(&search_turn(), ProfileKind::Trapezoidal, dt, Some(100)).unwrap();
        assert_eq!(turn.samples.len(), 177);
        let last = turn.trajectory.final_pose().unwrap();
        assert!((last.theta - deg_to_rad(90.0)).abs() < deg_to_rad(560.0) * 0.001);

        let ideal = plan_turn(&search_turn(), ProfileKind::Ideal, dt, Some(100)).unwrap();
        assert_eq!(ideal.samples.len(), 173);
        let last = ideal.trajectory.final_pose().unwrap();
        assert!((last.theta - deg_to_rad(90.0)).abs() < 1e-12);
    }

    #[test]
    fn test_long_horizon_pads_with_rest() {
        let dt = TimeStep::default();
        let turn = plan_turn(&search_turn(), ProfileKind::Trapezoidal, dt, Some(250)).unwrap();
        assert_eq!(turn.samples.len(), 250);
        assert!(turn.samples[177..].iter().all(|s| s.angular_speed == 0.0));
        let poses = turn.trajectory.poses();
        assert_eq!(poses[178].theta, poses[250].theta);
    }

    #[test]
    fn test_missing_fields_fail_before_sampling() {
        let params = search_turn();
        assert!(matches!(
            plan_turn(&params, ProfileKind::SCurve, TimeStep::default(), None),
            Err(KinematicsError::InvalidParameter("transition_angle", _))
        ));

        let mut params = search_turn();
        params.turn_radius = None;
        assert!(matches!(
            plan_turn(&params, ProfileKind::Ideal, TimeStep::default(), None),
            Err(KinematicsError::InvalidParameter("turn_radius", _))
        ));
    }
}
