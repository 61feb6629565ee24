use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::ConfigError;

const CONFIG_FILE_PATH: &str = "config.json";
const FALLBACK_CONFIG_FILE_PATH: &str = "_config.json";

/// Settings for the random passenger source.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoadConfig {
    pub initial_delay_ms: u64,
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        LoadConfig {
            initial_delay_ms: 2000,
            min_interval_ms: 3000,
            max_interval_ms: 9000,
        }
    }
}

/// Building layout and timing. Read once at startup and never changed.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BuildingConfig {
    pub total_floors: u16,
    pub elevators_count: usize,
    pub elevator_capacity: usize,
    pub floor_travel_time_ms: u64,
    pub door_open_time_ms: u64,
    pub idle_poll_ms: u64,
    pub shutdown_timeout_ms: u64,
    pub load: LoadConfig,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        BuildingConfig {
            total_floors: 15,
            elevators_count: 3,
            elevator_capacity: 8,
            floor_travel_time_ms: 1000,
            door_open_time_ms: 2000,
            idle_poll_ms: 100,
            shutdown_timeout_ms: 3000,
            load: LoadConfig::default(),
        }
    }
}

impl BuildingConfig {
    /// Reads `config.json` (or `_config.json`) from the working directory,
    /// then applies command line overrides.
    pub fn get() -> Result<Self, ConfigError> {
        let args: Vec<String> = env::args().collect();
        let overrides = parse_env_args(&args);
        let mut config = match &overrides.config_path {
            Some(path) => Self::from_file(Path::new(path))?,
            None => read_config_file()?,
        };
        if let Some(floors) = overrides.floors {
            config.total_floors = floors;
        }
        if let Some(elevators) = overrides.elevators {
            config.elevators_count = elevators;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_floors < 2 || self.total_floors > u16::from(u8::MAX) {
            return Err(ConfigError::Invalid(format!(
                "total_floors must be within 2..=255, got {}",
                self.total_floors
            )));
        }
        if self.elevator_capacity == 0 {
            return Err(ConfigError::Invalid(String::from("elevator_capacity must be at least 1")));
        }
        if self.load.min_interval_ms > self.load.max_interval_ms {
            return Err(ConfigError::Invalid(format!(
                "load.min_interval_ms ({}) exceeds load.max_interval_ms ({})",
                self.load.min_interval_ms, self.load.max_interval_ms
            )));
        }
        Ok(())
    }

    /// Floor count as stored on requests and elevators. Only meaningful on a
    /// validated config.
    pub fn floors(&self) -> u8 {
        u8::try_from(self.total_floors).unwrap_or(u8::MAX)
    }

    pub fn floor_travel_time(&self) -> Duration {
        Duration::from_millis(self.floor_travel_time_ms)
    }

    pub fn door_open_time(&self) -> Duration {
        Duration::from_millis(self.door_open_time_ms)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

fn read_config_file() -> Result<BuildingConfig, ConfigError> {
    for path in [CONFIG_FILE_PATH, FALLBACK_CONFIG_FILE_PATH] {
        let path = Path::new(path);
        if path.exists() {
            info!(path = %path.display(), "reading configuration");
            return BuildingConfig::from_file(path);
        }
    }
    info!("no configuration file provided, using default settings");
    Ok(BuildingConfig::default())
}

#[derive(Debug, Default, PartialEq)]
struct ArgOverrides {
    config_path: Option<String>,
    floors: Option<u16>,
    elevators: Option<usize>,
}

fn parse_env_args(args: &[String]) -> ArgOverrides {
    let mut overrides = ArgOverrides::default();

    for arg_pair in args.rchunks_exact(2) {
        let (flag, value) = (&arg_pair[0], &arg_pair[1]);
        match flag.as_str() {
            "--config" => overrides.config_path = Some(value.clone()),
            "--floors" => match value.parse::<u16>() {
                Ok(floors) => overrides.floors = Some(floors),
                Err(_) => warn!(value = %value, "floors is not a number, skipping"),
            },
            "--elevators" => match value.parse::<usize>() {
                Ok(elevators) => overrides.elevators = Some(elevators),
                Err(_) => warn!(value = %value, "elevators is not a number, skipping"),
            },
            _ => warn!(argument = %flag, "illegal argument, skipping"),
        }
    }
    overrides
}
