use anyhow::Context;
use tracing::{debug, info, warn};
use turnplan_kinematics::{
    AngularSpeedSample, DifferentialDrive, MotionProfileParameters, PlannedTurn, ProfileKind,
    TimeStep, WheelSpeeds, plan_turn,
};

use crate::config::ManeuverConfig;

/// Everything planned for one configured manoeuvre.
#[derive(Debug, Clone)]
pub struct ManeuverOutcome {
    pub name: String,
    pub planned: PlannedTurn,
    /// Unconstrained baseline, when the manoeuvre names a turn radius.
    pub ideal: Option<PlannedTurn>,
    /// Wheel references index-aligned with `planned.samples`.
    pub wheel_speeds: Vec<WheelSpeeds>,
    /// Largest chassis speed mismatch when the wheel references are driven
    /// back through forward kinematics.
    pub reference_error: f64,
}

const REFERENCE_TOLERANCE: f64 = 1e-9;

/// Largest |Δv| or |Δω| between the commanded chassis speeds and those the
/// wheel references reproduce.
fn reference_error(
    drive: &DifferentialDrive,
    linear_speed: f64,
    samples: &[AngularSpeedSample],
    wheel_speeds: &[WheelSpeeds],
) -> f64 {
    samples
        .iter()
        .zip(wheel_speeds)
        .map(|(s, w)| {
            let chassis = drive.forward_kinematics(*w);
            (chassis.v - linear_speed)
                .abs()
                .max((chassis.omega - s.angular_speed).abs())
        })
        .fold(0.0, f64::max)
}

/// Plan one turn on the blocking pool.
async fn plan_on_worker(
    params: MotionProfileParameters,
    kind: ProfileKind,
    dt: TimeStep,
    horizon: Option<u32>,
) -> anyhow::Result<PlannedTurn> {
    tokio::task::spawn_blocking(move || plan_turn(&params, kind, dt, horizon))
        .await
        .context("planning task did not complete")?
        .with_context(|| format!("failed to plan {} turn", kind))
}

/// Plan the configured profile and, if possible, its ideal baseline side by side.
pub async fn run_maneuver(
    maneuver: &ManeuverConfig,
    drive: DifferentialDrive,
    dt: TimeStep,
    horizon: Option<u32>,
) -> anyhow::Result<ManeuverOutcome> {
    let params = maneuver
        .to_parameters()
        .with_context(|| format!("invalid parameters for maneuver '{}'", maneuver.name))?;
    debug!(name = %maneuver.name, ?params, "Planning maneuver");

    let wants_ideal = params.turn_radius.is_some() && maneuver.profile != ProfileKind::Ideal;
    let ideal = async {
        if wants_ideal {
            plan_on_worker(params, ProfileKind::Ideal, dt, horizon)
                .await
                .map(Some)
        } else {
            Ok(None)
        }
    };

    let (planned, ideal) =
        tokio::try_join!(plan_on_worker(params, maneuver.profile, dt, horizon), ideal)
            .with_context(|| format!("maneuver '{}' could not be planned", maneuver.name))?;

    let wheel_speeds = drive.wheel_speed_profile(params.linear_speed, &planned.samples);
    let reference_error =
        reference_error(&drive, params.linear_speed, &planned.samples, &wheel_speeds);
    if reference_error > REFERENCE_TOLERANCE {
        warn!(name = %maneuver.name, reference_error, "Wheel references drift from the plan");
    }
    info!(
        name = %maneuver.name,
        profile = %planned.kind(),
        steps = planned.samples.len(),
        baseline = ideal.is_some(),
        "Maneuver planned"
    );

    Ok(ManeuverOutcome {
        name: maneuver.name.clone(),
        planned,
        ideal,
        wheel_speeds,
        reference_error,
    })
}

/// Plan every manoeuvre in order, stopping at the first failure.
pub async fn run_all(
    maneuvers: &[ManeuverConfig],
    drive: DifferentialDrive,
    dt: TimeStep,
    horizon: Option<u32>,
) -> anyhow::Result<Vec<ManeuverOutcome>> {
    let mut outcomes = Vec::with_capacity(maneuvers.len());
    for maneuver in maneuvers {
        outcomes.push(run_maneuver(maneuver, drive, dt, horizon).await?);
    }
    Ok(outcomes)
}
