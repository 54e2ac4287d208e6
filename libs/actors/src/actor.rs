//! Actor trait and the world every actor shares

use crate::action_log::{ActionLog, EventSink};
use crate::delay::DelayProvider;
use crate::error::Result;
use crate::ferry::FerryLog;
use crate::signal::RendezvousSignals;
use crate::state::{SharedState, SharedStateLock};
use crate::types::{ActorId, VehicleId};
use async_trait::async_trait;
use ferry_config::SimulationParams;
use std::sync::Arc;
use std::time::Duration;

/// A task-per-actor participant in the simulation
#[async_trait]
pub trait Actor: Send + Sized + 'static {
    type Output: Into<ActorOutcome> + Send + 'static;

    fn id(&self) -> ActorId;

    /// Drive the actor to completion
    async fn run(self) -> Result<Self::Output>;
}

/// What a finished actor hands back to the orchestrator
#[derive(Debug)]
pub enum ActorOutcome {
    Ferry(FerryLog),
    Vehicle(VehicleId),
}

impl From<FerryLog> for ActorOutcome {
    fn from(log: FerryLog) -> Self {
        ActorOutcome::Ferry(log)
    }
}

impl From<VehicleId> for ActorOutcome {
    fn from(id: VehicleId) -> Self {
        ActorOutcome::Vehicle(id)
    }
}

/// Shared state, signals and log for one run
#[derive(Debug)]
pub struct Crossing {
    pub params: SimulationParams,
    pub state: SharedStateLock,
    pub signals: RendezvousSignals,
    pub log: ActionLog,
    delays: Arc<dyn DelayProvider>,
}

impl Crossing {
    pub fn new(
        params: SimulationParams,
        sink: Box<dyn EventSink>,
        delays: Arc<dyn DelayProvider>,
    ) -> Self {
        Self {
            params,
            state: SharedStateLock::new(SharedState::new(
                params.trucks,
                params.cars,
                params.capacity,
            )),
            signals: RendezvousSignals::new(),
            log: ActionLog::new(sink),
            delays,
        }
    }

    /// Suspend for a provider-chosen delay in `0..=max`
    ///
    /// A zero delay still yields so other actors get scheduled.
    pub async fn pause(&self, max: Duration) {
        let delay = self.delays.delay(max);
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }
    }
}
