use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::{error, info};
use turnplan_kinematics::units::{deg_to_rad, mm_to_m};
use turnplan_kinematics::{
    DifferentialDrive, KinematicsError, MotionProfileParameters, Pose, ProfileKind, TimeStep,
    TurnDirection,
};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const CONFIG_PATH_VAR: &str = "TURNPLAN_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub robot: RobotConfig,
    #[serde(default)]
    pub maneuvers: Vec<ManeuverConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_time_step_ms")]
    pub time_step_ms: f64,
    /// Trapezoidal and ideal schedules are padded with resting steps up to
    /// this length. Longer profiles are never cut.
    pub comparison_horizon_ms: Option<u32>,
}

fn default_time_step_ms() -> f64 {
    1.0
}

impl SimulationConfig {
    pub fn time_step(&self) -> Result<TimeStep, KinematicsError> {
        TimeStep::new(self.time_step_ms / 1000.0)
    }

    /// Comparison horizon expressed in steps.
    pub fn horizon_steps(&self) -> Result<Option<u32>, KinematicsError> {
        let dt = self.time_step()?;
        Ok(self
            .comparison_horizon_ms
            .map(|ms| dt.to_steps(ms as f64 / 1000.0)))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RobotConfig {
    pub wheel_radius_mm: f64,
    pub axle_length_mm: f64,
}

impl RobotConfig {
    pub fn drive(&self) -> Result<DifferentialDrive, KinematicsError> {
        DifferentialDrive::new(mm_to_m(self.wheel_radius_mm), mm_to_m(self.axle_length_mm))
    }
}

/// One turn as written in the configuration file, in human units.
#[derive(Debug, Clone, Deserialize)]
pub struct ManeuverConfig {
    pub name: String,
    pub profile: ProfileKind,
    /// Unset means the sign of `turn_angle_deg` decides.
    pub direction: Option<TurnDirection>,
    pub linear_speed_m_s: f64,
    pub turn_angle_deg: f64,
    pub max_angular_speed_deg_s: f64,
    pub angular_acceleration_deg_s2: f64,
    /// Defaults to the acceleration.
    pub angular_deceleration_deg_s2: Option<f64>,
    pub transition_angle_deg: Option<f64>,
    pub sharpness: Option<f64>,
    pub turn_radius_mm: Option<f64>,
    pub mm_before_turn: Option<f64>,
    pub mm_after_turn: Option<f64>,
    #[serde(default)]
    pub initial_x_mm: f64,
    #[serde(default)]
    pub initial_y_mm: f64,
    #[serde(default)]
    pub initial_theta_deg: f64,
}

impl ManeuverConfig {
    /// Convert to SI units and validate.
    ///
    /// A negative angle already means a left turn, so it cannot be combined
    /// with an explicit direction.
    pub fn to_parameters(&self) -> Result<MotionProfileParameters, KinematicsError> {
        if self.direction.is_some() && self.turn_angle_deg < 0.0 {
            return Err(KinematicsError::InvalidParameter(
                "direction",
                "cannot be combined with a negative turn angle",
            ));
        }

        let accel = deg_to_rad(self.angular_acceleration_deg_s2);
        let decel = self
            .angular_deceleration_deg_s2
            .map(deg_to_rad)
            .unwrap_or(accel);

        let mut params = MotionProfileParameters::new(
            self.linear_speed_m_s,
            deg_to_rad(self.turn_angle_deg),
            deg_to_rad(self.max_angular_speed_deg_s),
            accel,
            decel,
        )
        .with_initial_pose(Pose::new(
            mm_to_m(self.initial_x_mm),
            mm_to_m(self.initial_y_mm),
            deg_to_rad(self.initial_theta_deg),
        ));

        if let Some(direction) = self.direction {
            params.direction = direction;
        }
        params.transition_angle = self.transition_angle_deg.map(deg_to_rad);
        params.sharpness = self.sharpness;
        params.turn_radius = self.turn_radius_mm.map(mm_to_m);
        params.entry_straight = self.mm_before_turn.map(mm_to_m);
        params.exit_straight = self.mm_after_turn.map(mm_to_m);

        params.validate()?;
        Ok(params)
    }
}

/// Load the configuration file named by `TURNPLAN_CONFIG`, or the default
/// one, with `TURNPLAN_*` environment overrides on top.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    info!("Attempting to load configuration from {}", path);

    let settings = Config::builder()
        .add_source(File::new(&path, FileFormat::Toml).required(true))
        .add_source(
            Environment::with_prefix("TURNPLAN")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .and_then(|c| c.try_deserialize::<AppConfig>());

    match settings {
        Ok(config) => {
            info!(
                maneuvers = config.maneuvers.len(),
                time_step_ms = config.simulation.time_step_ms,
                "Successfully loaded configuration"
            );
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

/// Parse a configuration held in memory.
#[cfg(test)]
pub(crate) fn parse_config(toml: &str) -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [simulation]
        time_step_ms = 1.0
        comparison_horizon_ms = 300

        [robot]
        wheel_radius_mm = 12.7
        axle_length_mm = 70.0

        [[maneuvers]]
        name = "smooth"
        profile = "s_curve"
        linear_speed_m_s = 0.7
        turn_angle_deg = 90.0
        transition_angle_deg = 25.0
        max_angular_speed_deg_s = 900.0
        angular_acceleration_deg_s2 = 35000.0
        initial_x_mm = 90.0
        mm_after_turn = 20.0

        [[maneuvers]]
        name = "left"
        profile = "trapezoidal"
        direction = "left"
        linear_speed_m_s = 0.5
        turn_angle_deg = 45.0
        max_angular_speed_deg_s = 1500.0
        angular_acceleration_deg_s2 = 35000.0
        angular_deceleration_deg_s2 = 20000.0
    "#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.maneuvers.len(), 2);
        assert_eq!(config.maneuvers[0].profile, ProfileKind::SCurve);
        assert_eq!(config.maneuvers[0].direction, None);
        assert_eq!(config.maneuvers[1].direction, Some(TurnDirection::Left));
        assert_eq!(config.simulation.horizon_steps().unwrap(), Some(300));
        assert_eq!(config.simulation.time_step().unwrap(), TimeStep::default());
    }

    #[test]
    fn test_to_parameters_converts_units() {
        let config = parse_config(SAMPLE).unwrap();
        let smooth = config.maneuvers[0].to_parameters().unwrap();
        assert!((smooth.turn_angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((smooth.initial_pose.x - 0.09).abs() < 1e-12);
        assert_eq!(smooth.exit_straight, Some(0.02));
        // Deceleration falls back to the acceleration.
        assert_eq!(smooth.angular_deceleration, smooth.angular_acceleration);

        assert_eq!(smooth.direction, TurnDirection::Right);

        let left = config.maneuvers[1].to_parameters().unwrap();
        assert_eq!(left.direction, TurnDirection::Left);
        assert!((left.angular_deceleration - deg_to_rad(20000.0)).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_maneuver_is_reported() {
        let mut maneuver = parse_config(SAMPLE).unwrap().maneuvers[0].clone();
        maneuver.transition_angle_deg = Some(50.0);
        assert!(matches!(
            maneuver.to_parameters(),
            Err(KinematicsError::InvalidParameter("transition_angle", _))
        ));
    }

    #[test]
    fn test_negative_angle_turns_left() {
        let mut maneuver = parse_config(SAMPLE).unwrap().maneuvers[0].clone();
        maneuver.turn_angle_deg = -90.0;
        let params = maneuver.to_parameters().unwrap();
        assert_eq!(params.direction, TurnDirection::Left);
        assert!((params.turn_angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_negative_angle_with_direction_is_rejected() {
        let mut maneuver = parse_config(SAMPLE).unwrap().maneuvers[1].clone();
        maneuver.turn_angle_deg = -45.0;
        assert!(matches!(
            maneuver.to_parameters(),
            Err(KinematicsError::InvalidParameter("direction", _))
        ));

        maneuver.direction = Some(TurnDirection::Right);
        assert!(maneuver.to_parameters().is_err());
    }

    #[test]
    fn test_robot_drive() {
        let config = parse_config(SAMPLE).unwrap();
        let drive = config.robot.drive().unwrap();
        assert!((drive.wheel_radius() - 0.0127).abs() < 1e-12);
        assert!((drive.axle_length() - 0.07).abs() < 1e-12);
    }

    #[test]
    fn test_missing_robot_section_fails() {
        let result = parse_config("[simulation]\ntime_step_ms = 1.0\n");
        assert!(result.is_err());
    }
}
