//! Parameter validation errors

use std::fmt;
use thiserror::Error;

/// One of the five simulation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    /// N
    Trucks,
    /// O
    Cars,
    /// K
    Capacity,
    /// TA
    ArrivalDelay,
    /// TP
    LegDelay,
}

impl Parameter {
    pub const ALL: [Parameter; 5] = [
        Parameter::Trucks,
        Parameter::Cars,
        Parameter::Capacity,
        Parameter::ArrivalDelay,
        Parameter::LegDelay,
    ];

    /// Short name used on the command line
    pub fn symbol(self) -> &'static str {
        match self {
            Parameter::Trucks => "N",
            Parameter::Cars => "O",
            Parameter::Capacity => "K",
            Parameter::ArrivalDelay => "TA",
            Parameter::LegDelay => "TP",
        }
    }

    /// Inclusive valid range
    pub fn bounds(self) -> (i64, i64) {
        use crate::limits::*;
        match self {
            Parameter::Trucks => (trucks::MIN, trucks::MAX),
            Parameter::Cars => (cars::MIN, cars::MAX),
            Parameter::Capacity => (capacity::MIN, capacity::MAX),
            Parameter::ArrivalDelay => (arrival_delay::MIN, arrival_delay::MAX),
            Parameter::LegDelay => (leg_delay::MIN, leg_delay::MAX),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{parameter} must be an integer, got {value:?}")]
    NotANumber { parameter: Parameter, value: String },

    #[error("{parameter}={value} is out of range ({min}..={max})")]
    OutOfRange {
        parameter: Parameter,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Parameter the error refers to, if any
    pub fn parameter(&self) -> Option<Parameter> {
        match self {
            ConfigError::NotANumber { parameter, .. } | ConfigError::OutOfRange { parameter, .. } => {
                Some(*parameter)
            }
            ConfigError::Invalid(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
