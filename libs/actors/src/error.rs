//! Error types for the crossing simulation
//!
//! Two classes only: setup failures (nothing has been spawned yet) and
//! fatal runtime failures. Neither is retried.

use crate::signal::SignalId;
use crate::types::{ActorId, VehicleKind};
use thiserror::Error;

/// A broken synchronization or accounting invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("Counter underflow: {counter}")]
    CounterUnderflow { counter: &'static str },

    #[error("Deck load {load} exceeds capacity {capacity}")]
    CapacityExceeded { load: u32, capacity: u32 },

    #[error("{kind} accounting broken: {accounted} counted, {total} expected")]
    Conservation {
        kind: VehicleKind,
        accounted: u32,
        total: u32,
    },

    #[error("Signal {0} is closed")]
    SignalClosed(SignalId),

    #[error("{count} unconsumed permits left on signal {signal}")]
    StrayPermits { signal: SignalId, count: usize },
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Failed to open action log {path}: {source}")]
    SinkSetup {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to append to action log: {0}")]
    LogWrite(#[source] std::io::Error),

    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("Actor {actor} failed: {source}")]
    ActorFailed {
        actor: ActorId,
        #[source]
        source: Box<SimulationError>,
    },

    #[error("Actor task aborted: {0}")]
    ActorAborted(String),

    #[error("Simulation ended with {delivered} of {total} {kind}s delivered")]
    Incomplete {
        kind: VehicleKind,
        delivered: u32,
        total: u32,
    },
}

impl SimulationError {
    /// True for errors raised before any actor ran
    pub fn is_setup(&self) -> bool {
        matches!(self, SimulationError::SinkSetup { .. })
    }

    /// Innermost error, unwrapping actor attribution
    pub fn root_cause(&self) -> &SimulationError {
        match self {
            SimulationError::ActorFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
