mod config;   // configuration file and environment overrides
mod maneuver; // planning each configured turn
mod report;   // per-turn summaries

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

use crate::report::ManeuverReport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Turn planner started.");

    let config = config::load_config().context("could not load configuration")?;
    let dt = config
        .simulation
        .time_step()
        .context("invalid simulation time step")?;
    let horizon = config
        .simulation
        .horizon_steps()
        .context("invalid comparison horizon")?;
    let drive = config.robot.drive().context("invalid robot geometry")?;
    info!(%dt, ?horizon, %drive, "Simulation set up");

    if config.maneuvers.is_empty() {
        warn!("No maneuvers configured, nothing to plan.");
        return Ok(());
    }

    let outcomes = maneuver::run_all(&config.maneuvers, drive, dt, horizon).await?;
    for outcome in &outcomes {
        let report = ManeuverReport::new(outcome, dt);
        report.log(dt);
        println!("{}", report);
    }

    info!(planned = outcomes.len(), "Turn planner finished.");
    Ok(())
}
