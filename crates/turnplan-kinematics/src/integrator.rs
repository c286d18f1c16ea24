//! Fixed-step pose integration.
//!
//! Each step first advances the heading by `ω·dt`, then moves the position
//! along the updated heading by `v·dt`. Using the new heading (semi-implicit
//! Euler) tracks curved paths more closely than using the old one.

use alloc::vec::Vec;
use core::fmt;
use libm::{cos, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::profile::AngularSpeedSample;
use crate::{ChassisSpeeds, Pose, TimeStep};

/// Integrates angular-speed schedules into trajectories.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseIntegrator {
    dt: TimeStep,
}

impl PoseIntegrator {
    /// Construct an integrator stepping at `dt`.
    pub const fn new(dt: TimeStep) -> Self {
        PoseIntegrator { dt }
    }

    /// The integration step.
    pub fn time_step(&self) -> TimeStep {
        self.dt
    }

    /// Advance `pose` by one step at constant chassis speeds.
    pub fn step(&self, pose: Pose, speeds: ChassisSpeeds) -> Pose {
        let dt = self.dt.seconds();
        let theta = pose.theta + speeds.omega * dt;
        let ds = speeds.v * dt;
        Pose {
            x: pose.x + ds * sin(theta),
            y: pose.y + ds * cos(theta),
            theta,
        }
    }

    /// Integrate `samples` from `initial` at constant `linear_speed`.
    ///
    /// The trajectory holds `samples.len() + 1` poses, starting with `initial`.
    /// Samples are trusted as given; no kinematic limit is checked here.
    pub fn integrate(
        &self,
        initial: Pose,
        linear_speed: f64,
        samples: &[AngularSpeedSample],
    ) -> Trajectory {
        let mut poses = Vec::with_capacity(samples.len() + 1);
        poses.push(initial);

        let mut pose = initial;
        for s in samples {
            pose = self.step(pose, ChassisSpeeds::new(linear_speed, s.angular_speed));
            poses.push(pose);
        }

        Trajectory { poses }
    }
}

/// Poses visited by the robot, one per step plus the starting pose.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    poses: Vec<Pose>,
}

impl Trajectory {
    /// All poses in order.
    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    /// Number of poses.
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// `true` if there are no poses. Never the case for an integrated trajectory.
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Starting pose.
    pub fn initial(&self) -> Option<&Pose> {
        self.poses.first()
    }

    /// Last pose reached.
    pub fn final_pose(&self) -> Option<&Pose> {
        self.poses.last()
    }

    /// Append the pose reached by driving `distance` meters straight on.
    ///
    /// Applied as one displacement, not integrated step by step.
    pub fn extend_straight(&mut self, distance: f64) {
        if let Some(last) = self.poses.last() {
            let next = last.advanced(distance);
            self.poses.push(next);
        }
    }

    /// Path length along the poses (m).
    pub fn distance_travelled(&self) -> f64 {
        self.poses
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }

    /// Consume the trajectory and return its poses.
    pub fn into_poses(self) -> Vec<Pose> {
        self.poses
    }
}

impl fmt::Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.poses.first(), self.poses.last()) {
            (Some(first), Some(last)) => {
                write!(f, "{} poses: {} -> {}", self.poses.len(), first, last)
            }
            _ => write!(f, "empty trajectory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::AngularProfile;
    use crate::s_curve::SCurvePlanner;
    use crate::trapezoidal::TrapezoidalProfile;
    use crate::units::deg_to_rad;
    use core::f64::consts::PI;
    const EPSILON: f64 = 1e-9;

    fn integrator() -> PoseIntegrator {
        PoseIntegrator::new(TimeStep::default())
    }

    #[test]
    fn test_straight_line_along_y() {
        let samples: Vec<_> = (0..100).map(|k| AngularSpeedSample::new(k, 0.0)).collect();
        let traj = integrator().integrate(Pose::default(), 0.5, &samples);
        assert_eq!(traj.len(), 101);
        let last = traj.final_pose().unwrap();
        assert!(last.x.abs() < EPSILON);
        assert!((last.y - 0.05).abs() < EPSILON);
        assert!((traj.distance_travelled() - 0.05).abs() < EPSILON);
    }

    #[test]
    fn test_step_uses_updated_heading() {
        // One step of a quarter turn: the displacement follows the new heading.
        let dt = TimeStep::new(1.0).unwrap();
        let pose = PoseIntegrator::new(dt).step(Pose::default(), ChassisSpeeds::new(1.0, PI / 2.0));
        assert!((pose.theta - PI / 2.0).abs() < EPSILON);
        assert!((pose.x - 1.0).abs() < EPSILON);
        assert!(pose.y.abs() < EPSILON);
    }

    #[test]
    fn test_pivot_turn_stays_in_place() {
        let samples: Vec<_> = (0..1000).map(|k| AngularSpeedSample::new(k, PI)).collect();
        let traj = integrator().integrate(Pose::new(0.1, 0.2, 0.0), 0.0, &samples);
        let last = traj.final_pose().unwrap();
        assert!((last.x - 0.1).abs() < EPSILON);
        assert!((last.y - 0.2).abs() < EPSILON);
        assert!((last.theta - PI).abs() < 1e-6);
    }

    #[test]
    fn test_heading_is_not_wrapped() {
        let samples: Vec<_> = (0..3000).map(|k| AngularSpeedSample::new(k, 2.0 * PI)).collect();
        let traj = integrator().integrate(Pose::default(), 0.0, &samples);
        assert!((traj.final_pose().unwrap().theta - 6.0 * PI).abs() < 1e-6);
    }

    #[test]
    fn test_right_turn_curves_towards_positive_x() {
        let profile = TrapezoidalProfile::plan(
            deg_to_rad(90.0),
            deg_to_rad(560.0),
            deg_to_rad(35000.0),
            deg_to_rad(35000.0),
            TimeStep::default(),
        )
        .unwrap();
        let samples = profile.samples();
        let traj = integrator().integrate(Pose::default(), 0.5, &samples);
        assert_eq!(traj.len(), samples.len() + 1);

        let last = traj.final_pose().unwrap();
        assert!(last.x > 0.0 && last.y > 0.0);
        assert!((last.theta - deg_to_rad(90.0)).abs() < deg_to_rad(560.0) * 0.001);

        for w in traj.poses().windows(2) {
            assert!(w[1].theta >= w[0].theta);
        }
    }

    #[test]
    fn test_s_curve_heading_monotonic_and_past_target() {
        let planner = SCurvePlanner::new(
            deg_to_rad(25.0),
            deg_to_rad(900.0),
            1.0,
            TimeStep::default(),
        )
        .unwrap();
        let profile = planner.plan(deg_to_rad(90.0)).unwrap();
        let traj = integrator().integrate(Pose::default(), 0.7, profile.as_samples());
        for w in traj.poses().windows(2) {
            assert!(w[1].theta >= w[0].theta);
        }
        assert!(traj.final_pose().unwrap().theta >= deg_to_rad(90.0));
    }

    #[test]
    fn test_integration_is_deterministic() {
        let samples: Vec<_> = (0..500)
            .map(|k| AngularSpeedSample::new(k, (k as f64 * 0.01).sin() * 8.0))
            .collect();
        let start = Pose::new(0.09, 0.0, 0.3);
        let a = integrator().integrate(start, 0.7, &samples);
        let b = integrator().integrate(start, 0.7, &samples);
        assert_eq!(a, b);
        for (p, q) in a.poses().iter().zip(b.poses()) {
            assert_eq!(p.x.to_bits(), q.x.to_bits());
            assert_eq!(p.y.to_bits(), q.y.to_bits());
            assert_eq!(p.theta.to_bits(), q.theta.to_bits());
        }
    }

    #[test]
    fn test_extend_straight_appends_one_pose() {
        let samples = [AngularSpeedSample::new(0, 0.0)];
        let mut traj = integrator().integrate(Pose::new(0.0, 0.0, PI / 2.0), 1.0, &samples);
        traj.extend_straight(0.09);
        assert_eq!(traj.len(), 3);
        let last = traj.final_pose().unwrap();
        assert!((last.x - 0.091).abs() < EPSILON);
        assert!(last.y.abs() < EPSILON);
    }
}
