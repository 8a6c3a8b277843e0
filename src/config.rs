use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Regular-triangle chassis geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct ChassisConfig {
    /// Distance between wheel contact points, millimetres.
    pub wheel_distance_mm: f64,
    /// Wheel radius, millimetres.
    pub wheel_radius_mm: f64,
    /// Per-wheel speed limit in revolutions per second, omit for none.
    pub max_wheel_speed_rps: Option<f64>,
}

/// Drive and odometry loop parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveConfig {
    pub control_rate_hz: u64,
    pub odometry_rate_hz: u64,
    pub kp_linear: f64,
    pub kp_angular: f64,
    pub position_tolerance_mm: f64,
    /// Waypoints in world millimetres, visited in order.
    pub waypoints: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub chassis: ChassisConfig,
    pub drive: DriveConfig,
}

pub fn load() -> Result<AppConfig, ConfigError> {
    info!("Attempting to load configuration from {}", DEFAULT_CONFIG_PATH);

    let settings = Config::builder()
        .add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(true))
        .build()
        .and_then(|raw| raw.try_deserialize::<AppConfig>());

    match settings {
        Ok(config) => {
            info!("Successfully loaded configuration: {:?}", config);
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}
