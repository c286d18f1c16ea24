use std::fmt;

use tracing::info;
use turnplan_kinematics::profile::peak_acceleration;
use turnplan_kinematics::units::{m_to_mm, rad_to_deg};
use turnplan_kinematics::{
    AngularProfile, PhaseEvent, Pose, ProfileDetails, ProfileKind, TimeStep, TurnDirection,
};

use crate::maneuver::ManeuverOutcome;

/// How the planned turn is divided in time.
#[derive(Debug, Clone, PartialEq)]
pub enum Timing {
    /// Trapezoidal segment lengths in steps.
    Segments {
        accel: u32,
        cruise: u32,
        decel: u32,
        triangular: bool,
    },
    /// S-curve phase boundaries in the order they were crossed.
    Phases(Vec<PhaseEvent>),
    /// Whole steps needed by the unconstrained baseline.
    Baseline { steps: u32 },
}

/// A pose shown in millimetres and degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseMm(pub Pose);

impl fmt::Display for PoseMm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(x: {:.2} mm, y: {:.2} mm, θ: {:.3}°)",
            m_to_mm(self.0.x),
            m_to_mm(self.0.y),
            rad_to_deg(self.0.theta)
        )
    }
}

/// Summary of one planned manoeuvre. Angles in degrees, lengths in millimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct ManeuverReport {
    pub name: String,
    pub kind: ProfileKind,
    pub direction: TurnDirection,
    pub linear_speed: f64,
    pub timing: Timing,
    pub cruise_arc_mm: Option<f64>,
    pub final_pose: Pose,
    pub ideal_final_pose: Option<Pose>,
    pub position_error_mm: Option<f64>,
    pub heading_error_deg: Option<f64>,
    /// rad/s²
    pub peak_acceleration: f64,
    /// rad/s
    pub peak_angular_speed: f64,
    /// Largest wheel angular speed on either side (rad/s).
    pub peak_wheel_speed: f64,
    pub overshoot_deg: Option<f64>,
    /// Chassis speed mismatch reproduced by the wheel references.
    pub wheel_reference_error: f64,
    /// Seconds.
    pub total_time: f64,
}

impl ManeuverReport {
    pub fn new(outcome: &ManeuverOutcome, dt: TimeStep) -> Self {
        let planned = &outcome.planned;
        let v = planned.params.linear_speed;

        let (timing, cruise_arc_mm, overshoot_deg, peak) = match &planned.details {
            ProfileDetails::Trapezoidal(profile) => (
                Timing::Segments {
                    accel: profile.accel_steps(),
                    cruise: profile.cruise_steps(),
                    decel: profile.decel_steps(),
                    triangular: profile.is_triangular(),
                },
                Some(m_to_mm(v * dt.duration(profile.cruise_steps()))),
                None,
                peak_acceleration(&planned.samples, dt.seconds()),
            ),
            ProfileDetails::SCurve(profile) => (
                Timing::Phases(profile.events().to_vec()),
                profile.cruise_arc_distance(v).map(m_to_mm),
                Some(rad_to_deg(profile.overshoot())),
                profile.peak_acceleration(),
            ),
            ProfileDetails::Ideal(profile) => (
                Timing::Baseline {
                    steps: profile.duration_steps(),
                },
                None,
                None,
                peak_acceleration(&planned.samples, dt.seconds()),
            ),
        };

        let final_pose = planned
            .trajectory
            .final_pose()
            .copied()
            .unwrap_or(planned.params.initial_pose);
        let ideal_final_pose = outcome
            .ideal
            .as_ref()
            .and_then(|ideal| ideal.trajectory.final_pose().copied());

        let peak_angular_speed = planned
            .samples
            .iter()
            .map(|s| s.angular_speed.abs())
            .fold(0.0, f64::max);
        let peak_wheel_speed = outcome
            .wheel_speeds
            .iter()
            .map(|w| w.omega_l.abs().max(w.omega_r.abs()))
            .fold(0.0, f64::max);

        ManeuverReport {
            name: outcome.name.clone(),
            kind: planned.kind(),
            direction: planned.params.direction,
            linear_speed: v,
            timing,
            cruise_arc_mm,
            final_pose,
            ideal_final_pose,
            position_error_mm: ideal_final_pose.map(|p| m_to_mm(final_pose.distance_to(&p))),
            heading_error_deg: ideal_final_pose
                .map(|p| rad_to_deg(Pose::normalize_angle(final_pose.theta - p.theta))),
            peak_acceleration: peak,
            peak_angular_speed,
            peak_wheel_speed,
            overshoot_deg,
            wheel_reference_error: outcome.reference_error,
            total_time: dt.duration(planned.samples.len() as u32),
        }
    }

    /// Emit the report through `tracing`.
    pub fn log(&self, dt: TimeStep) {
        info!(
            name = %self.name,
            profile = %self.kind,
            direction = %self.direction,
            total_time_s = self.total_time,
            final_pose = %PoseMm(self.final_pose),
            "Turn planned"
        );

        match &self.timing {
            Timing::Segments {
                accel,
                cruise,
                decel,
                triangular,
            } => info!(
                name = %self.name,
                t1 = accel,
                t2 = cruise,
                t3 = decel,
                triangular,
                "Segment durations (steps)"
            ),
            Timing::Phases(events) => {
                for event in events {
                    info!(
                        name = %self.name,
                        phase = %event.kind,
                        step = event.step,
                        angle_deg = rad_to_deg(event.angle_turned),
                        distance_mm = m_to_mm(event.distance(self.linear_speed, dt)),
                        "Phase boundary"
                    );
                }
            }
            Timing::Baseline { steps } => {
                info!(name = %self.name, steps, "Baseline duration (steps)")
            }
        }

        if let Some(arc) = self.cruise_arc_mm {
            info!(name = %self.name, cruise_arc_mm = arc, "Full-speed arc");
        }
        if let Some(overshoot) = self.overshoot_deg {
            info!(name = %self.name, overshoot_deg = overshoot, "Heading overshoot");
        }
        if let (Some(ideal), Some(pos), Some(heading)) = (
            self.ideal_final_pose,
            self.position_error_mm,
            self.heading_error_deg,
        ) {
            info!(
                name = %self.name,
                ideal_final_pose = %PoseMm(ideal),
                position_error_mm = pos,
                heading_error_deg = heading,
                "Deviation from ideal baseline"
            );
        }
        info!(
            name = %self.name,
            peak_acceleration_deg_s2 = rad_to_deg(self.peak_acceleration),
            peak_angular_speed_deg_s = rad_to_deg(self.peak_angular_speed),
            peak_wheel_speed_rad_s = self.peak_wheel_speed,
            wheel_reference_error = self.wheel_reference_error,
            "Peaks"
        );
    }
}

impl fmt::Display for ManeuverReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{} {}]: {:.1} ms, final {}, peak accel {:.0} deg/s²",
            self.name,
            self.kind,
            self.direction,
            self.total_time * 1000.0,
            PoseMm(self.final_pose),
            rad_to_deg(self.peak_acceleration)
        )?;
        if let Some(err) = self.position_error_mm {
            write!(f, ", {:.2} mm from ideal", err)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turnplan_kinematics::units::{deg_to_rad, mm_to_m};
    use turnplan_kinematics::{
        DifferentialDrive, MotionProfileParameters, PhaseKind, plan_turn,
    };
    const EPSILON: f64 = 1e-6;

    fn outcome(params: MotionProfileParameters, kind: ProfileKind) -> ManeuverOutcome {
        let dt = TimeStep::default();
        let drive = DifferentialDrive::new(0.0127, 0.07).unwrap();
        let planned = plan_turn(&params, kind, dt, None).unwrap();
        let ideal = params
            .turn_radius
            .map(|_| plan_turn(&params, ProfileKind::Ideal, dt, None).unwrap());
        let wheel_speeds = drive.wheel_speed_profile(params.linear_speed, &planned.samples);
        ManeuverOutcome {
            name: "test".to_string(),
            planned,
            ideal,
            wheel_speeds,
            reference_error: 0.0,
        }
    }

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
    fn test_trapezoidal_report() {
        let report = ManeuverReport::new(
            &outcome(search_turn(), ProfileKind::Trapezoidal),
            TimeStep::default(),
        );
        assert_eq!(
            report.timing,
            Timing::Segments {
                accel: 16,
                cruise: 145,
                decel: 16,
                triangular: false
            }
        );
        assert!((report.total_time - 0.177).abs() < EPSILON);
        assert!((report.cruise_arc_mm.unwrap() - 72.5).abs() < EPSILON);
        assert!((report.peak_acceleration - deg_to_rad(35000.0)).abs() < EPSILON);
        assert!(report.peak_angular_speed <= deg_to_rad(560.0) + EPSILON);
        assert!(report.overshoot_deg.is_none());

        // Both turns end near 90°, a few millimetres apart.
        assert!(report.ideal_final_pose.is_some());
        assert!(report.heading_error_deg.unwrap().abs() < 1.0);
        assert!(report.position_error_mm.unwrap() < 10.0);
    }

    #[test]
    fn test_s_curve_report() {
        let params = MotionProfileParameters::new(
            0.7,
            deg_to_rad(90.0),
            deg_to_rad(900.0),
            deg_to_rad(35000.0),
            deg_to_rad(35000.0),
        )
        .with_transition_angle(deg_to_rad(25.0));
        let report = ManeuverReport::new(&outcome(params, ProfileKind::SCurve), TimeStep::default());

        match &report.timing {
            Timing::Phases(events) => {
                assert_eq!(events.len(), 2);
                assert_eq!(events[0].kind, PhaseKind::EnterCruise);
            }
            other => panic!("unexpected timing {:?}", other),
        }
        assert!(report.overshoot_deg.unwrap() >= 0.0);
        assert!(report.cruise_arc_mm.unwrap() > 0.0);
        assert!(report.ideal_final_pose.is_none());
        assert!(report.position_error_mm.is_none());
    }

    #[test]
    fn test_peak_wheel_speed_is_outer_wheel() {
        let report = ManeuverReport::new(
            &outcome(search_turn(), ProfileKind::Trapezoidal),
            TimeStep::default(),
        );
        // Outer wheel at cruise: (v + ω·L/2) / r.
        let expected = (0.5 + deg_to_rad(560.0) * 0.035) / 0.0127;
        assert!((report.peak_wheel_speed - expected).abs() < 1e-3);
    }

    #[test]
    fn test_display_mentions_name_and_kind() {
        let report = ManeuverReport::new(
            &outcome(search_turn(), ProfileKind::Trapezoidal),
            TimeStep::default(),
        );
        let line = report.to_string();
        assert!(line.starts_with("test [trapezoidal right]"));
        assert!(line.contains("mm from ideal"));
        assert!(line.contains("mm, y:"));
        assert!(line.contains("°)"));
    }

    #[test]
    fn test_pose_shown_in_mm_and_degrees() {
        let pose = Pose::new(0.05585, 0.0547, deg_to_rad(90.0));
        assert_eq!(
            PoseMm(pose).to_string(),
            "(x: 55.85 mm, y: 54.70 mm, θ: 90.000°)"
        );
    }
}
