//! # Ferry Crossing Configuration
//!
//! Parameter model, limits and layered configuration loading for the
//! ferry crossing simulation.
//!
//! ## Layers
//!
//! - **Defaults**: every field of [`SimulationConfig`] has a default
//! - **File**: optional TOML (or JSON) file
//! - **Environment**: `FERRY_*` variables, e.g. `FERRY_CAPACITY=10`
//! - **Command line**: the five positional parameters override everything
//!
//! ## Usage
//!
//! ```rust
//! use ferry_config::SimulationConfig;
//!
//! let mut config = SimulationConfig::default();
//! config.trucks = 2;
//! config.cars = 5;
//!
//! let params = config.validate().unwrap();
//! assert_eq!(params.capacity, 3);
//! ```

pub mod error;
pub mod limits;
pub mod simulation;

// Re-export commonly used types
pub use error::{ConfigError, Parameter};
pub use simulation::{
    load_config, OriginPolicy, ParameterOverrides, SimulationConfig, SimulationParams, SpawnOrder,
};
