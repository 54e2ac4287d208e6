//! Vehicle Actor
//!
//! `started → arrived → boarding → leaving in`, one task per car or truck.
//! A vehicle never touches another vehicle; it only moves itself into the
//! port queue and then waits for the ferry's permits.

use crate::actor::{Actor, Crossing};
use crate::error::Result;
use crate::events::Event;
use crate::types::{ActorId, Port, VehicleId};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug)]
pub struct Vehicle {
    id: VehicleId,
    origin: Port,
    crossing: Arc<Crossing>,
}

impl Vehicle {
    pub fn new(id: VehicleId, origin: Port, crossing: Arc<Crossing>) -> Self {
        Self {
            id,
            origin,
            crossing,
        }
    }

    pub fn origin(&self) -> Port {
        self.origin
    }

    pub fn destination(&self) -> Port {
        self.origin.opposite()
    }

    /// Join the queue at the origin port
    fn arrive(&self) -> Result<()> {
        let mut state = self.crossing.state.lock();
        self.crossing
            .log
            .record(Event::VehicleArrived(self.id, self.origin))?;
        state.arrive(self.id.kind, self.origin)?;
        Ok(())
    }
}

#[async_trait]
impl Actor for Vehicle {
    type Output = VehicleId;

    fn id(&self) -> ActorId {
        ActorId::Vehicle(self.id)
    }

    async fn run(self) -> Result<VehicleId> {
        let crossing = Arc::clone(&self.crossing);
        let kind = self.id.kind;

        crossing.log.record(Event::VehicleStarted(self.id))?;
        crossing.pause(crossing.params.max_arrival_delay).await;

        self.arrive()?;

        crossing.signals.boarding(self.origin, kind).wait().await?;
        crossing.log.record(Event::VehicleBoarding(self.id))?;

        let destination = self.destination();
        crossing.signals.disembark(destination, kind).wait().await?;
        crossing
            .log
            .record(Event::VehicleLeaving(self.id, destination))?;

        trace!(vehicle = %self.id, %destination, "Vehicle delivered");
        Ok(self.id)
    }
}
