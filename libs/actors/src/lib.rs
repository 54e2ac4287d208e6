//! Ferry Crossing Actors
//!
//! One ferry and any number of trucks and cars, each running as its own
//! tokio task, sharing a single port/deck state and meeting at eight
//! counting signals. Every observable step is appended to a numbered
//! action log.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   boarding/port/kind   ┌──────────────────┐
//! │    Ferry     │──────── release ──────▶│  Vehicle tasks   │
//! │  dock/unload │   disembark/port/kind  │  wait → log      │
//! │  load/depart │──────── release ──────▶│                  │
//! └──────┬───────┘                        └────────┬─────────┘
//!        │        ┌──────────────────────┐         │
//!        └───────▶│ SharedState (mutex)  │◀────────┘
//!                 │ ActionLog  (mutex)   │
//!                 └──────────────────────┘
//! ```
//!
//! The ferry only ever releases signals and vehicles only ever wait on
//! them, so the ferry cannot deadlock on a vehicle.
//!
//! # Usage
//!
//! ```rust,no_run
//! use ferry_actors::{MemorySink, Simulation};
//! use ferry_config::SimulationConfig;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let params = SimulationConfig::default().validate()?;
//! let sink = MemorySink::new();
//! let report = Simulation::new(params).run(Box::new(sink.clone())).await?;
//! assert_eq!(report.events_logged as usize, sink.len());
//! # Ok(())
//! # }
//! ```

pub mod action_log;
pub mod actor;
pub mod audit;
pub mod delay;
pub mod error;
pub mod events;
pub mod ferry;
pub mod signal;
pub mod state;
pub mod system;
pub mod types;
pub mod vehicle;

pub use action_log::{ActionLog, EventSink, FileSink, MemorySink, FIRST_SEQUENCE};
pub use actor::{Actor, ActorOutcome, Crossing};
pub use audit::{parse_log, AuditError, AuditSummary, LogAudit};
pub use delay::{DelayProvider, NoDelay, RandomDelay};
pub use error::{InvariantViolation, Result, SimulationError};
pub use events::{Event, LogEvent};
pub use ferry::{DockingRecord, Ferry, FerryLog};
pub use signal::{Gate, RendezvousSignals, Signal, SignalId};
pub use state::{SharedState, SharedStateLock, StateSnapshot};
pub use system::{Simulation, SimulationOptions, SimulationReport, VehiclePlan};
pub use types::{ActorId, PerKind, Port, VehicleId, VehicleKind};
pub use vehicle::Vehicle;
