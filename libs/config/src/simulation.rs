//! Simulation Configuration Module
//!
//! Loads the simulation parameters from defaults, an optional file and
//! `FERRY_*` environment variables, then validates them into
//! [`SimulationParams`], the only form the simulation core accepts.

use crate::error::{ConfigError, Parameter};
use crate::limits;
use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Raw, unvalidated simulation configuration
///
/// Numeric parameters are signed so that negative input survives parsing
/// and is rejected by [`SimulationConfig::validate`] with a proper error.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SimulationConfig {
    /// N
    pub trucks: i64,
    /// O
    pub cars: i64,
    /// K, in car units
    pub capacity: i64,
    /// TA, microseconds
    pub max_arrival_delay_us: i64,
    /// TP, microseconds
    pub max_leg_delay_us: i64,

    /// Action log destination, `$VAR` expansion supported
    pub output: PathBuf,

    /// Seed for delays, origin ports and spawn order
    pub seed: Option<u64>,

    pub origin: OriginPolicy,
    pub spawn_order: SpawnOrder,

    /// Verify the written log once the run completes
    pub audit: bool,
}

/// How a vehicle picks the port it arrives at
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OriginPolicy {
    #[default]
    Random,
    Port0,
    Port1,
    /// Odd ids to port 0, even ids to port 1
    Alternate,
}

/// Order in which vehicle tasks are spawned
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpawnOrder {
    /// Cars and trucks interleaved at random
    #[default]
    Shuffled,
    TrucksFirst,
    CarsFirst,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trucks: 0,
            cars: 0,
            capacity: limits::capacity::MIN,
            max_arrival_delay_us: 0,
            max_leg_delay_us: 0,
            output: PathBuf::from(limits::DEFAULT_OUTPUT),
            seed: None,
            origin: OriginPolicy::default(),
            spawn_order: SpawnOrder::default(),
            audit: false,
        }
    }
}

/// Values given on the command line, applied on top of every other layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterOverrides {
    pub trucks: Option<i64>,
    pub cars: Option<i64>,
    pub capacity: Option<i64>,
    pub max_arrival_delay_us: Option<i64>,
    pub max_leg_delay_us: Option<i64>,
}

impl ParameterOverrides {
    /// Parse the five positional arguments `N O K TA TP`
    pub fn from_positional<S: AsRef<str>>(args: &[S]) -> std::result::Result<Self, ConfigError> {
        if args.len() != Parameter::ALL.len() {
            return Err(ConfigError::Invalid(format!(
                "expected {} parameters (N O K TA TP), got {}",
                Parameter::ALL.len(),
                args.len()
            )));
        }

        let mut values = [0i64; 5];
        for ((slot, parameter), raw) in values.iter_mut().zip(Parameter::ALL).zip(args) {
            *slot = parse_parameter(parameter, raw.as_ref())?;
        }

        Ok(Self {
            trucks: Some(values[0]),
            cars: Some(values[1]),
            capacity: Some(values[2]),
            max_arrival_delay_us: Some(values[3]),
            max_leg_delay_us: Some(values[4]),
        })
    }
}

fn parse_parameter(parameter: Parameter, raw: &str) -> std::result::Result<i64, ConfigError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ConfigError::NotANumber {
            parameter,
            value: raw.to_string(),
        })
}

/// Validated parameters handed to the simulation core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationParams {
    pub trucks: u32,
    pub cars: u32,
    pub capacity: u32,
    pub max_arrival_delay: Duration,
    pub max_leg_delay: Duration,
}

impl SimulationParams {
    /// Total number of vehicle actors
    pub fn vehicles(&self) -> u32 {
        self.trucks + self.cars
    }
}

impl SimulationConfig {
    /// Load configuration from an optional file with environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading simulation config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        // FERRY_CAPACITY=10, FERRY_OUTPUT=..., FERRY_SEED=...
        builder = builder.add_source(
            Environment::with_prefix(limits::ENV_PREFIX).try_parsing(true),
        );

        let config = builder
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Apply command line values on top of the loaded layers
    pub fn apply_overrides(&mut self, overrides: &ParameterOverrides) {
        if let Some(v) = overrides.trucks {
            self.trucks = v;
        }
        if let Some(v) = overrides.cars {
            self.cars = v;
        }
        if let Some(v) = overrides.capacity {
            self.capacity = v;
        }
        if let Some(v) = overrides.max_arrival_delay_us {
            self.max_arrival_delay_us = v;
        }
        if let Some(v) = overrides.max_leg_delay_us {
            self.max_leg_delay_us = v;
        }
    }

    /// Expand environment variables in the output path
    pub fn expand_env_vars(&mut self) -> Result<()> {
        let raw = self.output.to_string_lossy().into_owned();
        let expanded = shellexpand::env(&raw).context("Failed to expand output path")?;
        self.output = PathBuf::from(expanded.as_ref());
        Ok(())
    }

    /// Check every parameter against its bounds
    pub fn validate(&self) -> std::result::Result<SimulationParams, ConfigError> {
        let trucks = check(Parameter::Trucks, self.trucks)?;
        let cars = check(Parameter::Cars, self.cars)?;
        let capacity = check(Parameter::Capacity, self.capacity)?;
        let arrival = check(Parameter::ArrivalDelay, self.max_arrival_delay_us)?;
        let leg = check(Parameter::LegDelay, self.max_leg_delay_us)?;

        debug!(trucks, cars, capacity, arrival, leg, "Parameters validated");

        Ok(SimulationParams {
            trucks,
            cars,
            capacity,
            max_arrival_delay: Duration::from_micros(u64::from(arrival)),
            max_leg_delay: Duration::from_micros(u64::from(leg)),
        })
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

fn check(parameter: Parameter, value: i64) -> std::result::Result<u32, ConfigError> {
    let (min, max) = parameter.bounds();
    if (min..=max).contains(&value) {
        // max fits in u32 for every parameter
        u32::try_from(value).map_err(|_| ConfigError::OutOfRange {
            parameter,
            value,
            min,
            max,
        })
    } else {
        Err(ConfigError::OutOfRange {
            parameter,
            value,
            min,
            max,
        })
    }
}

/// Convenience function: load layers, apply command line values, expand paths
pub fn load_config(path: Option<&Path>, overrides: &ParameterOverrides) -> Result<SimulationConfig> {
    let mut config = SimulationConfig::load(path)?;
    config.apply_overrides(overrides);
    config.expand_env_vars()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let params = SimulationConfig::default().validate().unwrap();
        assert_eq!(params.trucks, 0);
        assert_eq!(params.cars, 0);
        assert_eq!(params.capacity, 3);
        assert_eq!(params.max_leg_delay, Duration::ZERO);
    }

    #[test]
    fn test_positional_parameters() {
        let overrides = ParameterOverrides::from_positional(&["2", "5", "10", "100", "50"]).unwrap();
        let mut config = SimulationConfig::default();
        config.apply_overrides(&overrides);

        let params = config.validate().unwrap();
        assert_eq!(params.trucks, 2);
        assert_eq!(params.cars, 5);
        assert_eq!(params.capacity, 10);
        assert_eq!(params.max_arrival_delay, Duration::from_micros(100));
        assert_eq!(params.max_leg_delay, Duration::from_micros(50));
        assert_eq!(params.vehicles(), 7);
    }

    #[test]
    fn test_wrong_argument_count() {
        let err = ParameterOverrides::from_positional(&["1", "2", "3"]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_non_numeric_parameter() {
        let err = ParameterOverrides::from_positional(&["1", "x", "3", "0", "0"]).unwrap_err();
        assert_eq!(err.parameter(), Some(Parameter::Cars));
        assert!(matches!(err, ConfigError::NotANumber { .. }));
    }

    #[test]
    fn test_capacity_below_three_rejected() {
        let config = SimulationConfig {
            capacity: 2,
            ..SimulationConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::OutOfRange {
                parameter: Parameter::Capacity,
                value: 2,
                min: 3,
                max: 100
            }
        );
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let config = SimulationConfig {
            trucks: 9_999,
            cars: 9_999,
            capacity: 100,
            max_arrival_delay_us: 10_000,
            max_leg_delay_us: 1_000,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_ok());

        for (parameter, config) in [
            (Parameter::Trucks, SimulationConfig { trucks: 10_000, ..SimulationConfig::default() }),
            (Parameter::Cars, SimulationConfig { cars: -1, ..SimulationConfig::default() }),
            (Parameter::Capacity, SimulationConfig { capacity: 101, ..SimulationConfig::default() }),
            (
                Parameter::ArrivalDelay,
                SimulationConfig { max_arrival_delay_us: 10_001, ..SimulationConfig::default() },
            ),
            (
                Parameter::LegDelay,
                SimulationConfig { max_leg_delay_us: 1_001, ..SimulationConfig::default() },
            ),
        ] {
            assert_eq!(config.validate().unwrap_err().parameter(), Some(parameter));
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("ferry.toml");

        let config_content = r#"
trucks = 4
cars = 7
capacity = 12
max_leg_delay_us = 20
output = "crossing.log"
seed = 42
origin = "alternate"
spawn_order = "trucks_first"
audit = true
"#;

        fs::write(&config_path, config_content).unwrap();

        let config = SimulationConfig::load(Some(&config_path)).unwrap();

        assert_eq!(config.trucks, 4);
        assert_eq!(config.cars, 7);
        assert_eq!(config.capacity, 12);
        assert_eq!(config.max_arrival_delay_us, 0);
        assert_eq!(config.max_leg_delay_us, 20);
        assert_eq!(config.output, PathBuf::from("crossing.log"));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.origin, OriginPolicy::Alternate);
        assert_eq!(config.spawn_order, SpawnOrder::TrucksFirst);
        assert!(config.audit);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(SimulationConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_command_line_wins_over_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("ferry.toml");
        fs::write(&config_path, "trucks = 4\ncapacity = 50\n").unwrap();

        let overrides = ParameterOverrides::from_positional(&["1", "1", "3", "0", "0"]).unwrap();
        let config = load_config(Some(&config_path), &overrides).unwrap();

        assert_eq!(config.trucks, 1);
        assert_eq!(config.capacity, 3);
    }

    #[test]
    fn test_toml_dump_parses_back() {
        let config = SimulationConfig {
            trucks: 3,
            seed: Some(7),
            origin: OriginPolicy::Port1,
            ..SimulationConfig::default()
        };
        let dumped = config.to_toml().unwrap();
        let parsed: SimulationConfig = toml::from_str(&dumped).unwrap();
        assert_eq!(parsed, config);
    }
}
