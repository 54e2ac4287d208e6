//! Ferry Actor
//!
//! ```text
//! started ─▶ Traveling ─▶ Docked(unload) ─▶ Docked(load) ─┬─▶ Departing ─▶ Traveling ...
//!                                                          └─▶ (all delivered) ─▶ Finished
//! ```
//!
//! The ferry never waits on a rendezvous signal, it only releases them.
//! Unloading and loading poll the shared state one vehicle per critical
//! section and yield between iterations; both loops are bounded by the
//! number of vehicles present.

use crate::actor::{Actor, Crossing};
use crate::error::Result;
use crate::events::Event;
use crate::types::{ActorId, PerKind, Port, VehicleKind};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// What happened at one docking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DockingRecord {
    pub port: Port,
    /// Vehicles waiting at the port at the instant of docking
    pub waiting_at_docking: PerKind<u32>,
    pub unloaded: PerKind<u32>,
    pub loaded: PerKind<u32>,
}

impl DockingRecord {
    fn new(port: Port, waiting_at_docking: PerKind<u32>) -> Self {
        Self {
            port,
            waiting_at_docking,
            unloaded: PerKind::default(),
            loaded: PerKind::default(),
        }
    }

    /// Car units loaded at this docking
    pub fn loaded_units(&self) -> u32 {
        VehicleKind::BOTH
            .iter()
            .map(|&kind| self.loaded.get(kind) * kind.units())
            .sum()
    }
}

/// The ferry's account of the run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FerryLog {
    pub dockings: Vec<DockingRecord>,
    /// Completed port-to-port legs
    pub crossings: u32,
}

/// Outcome of one loading turn
enum Turn {
    Admitted(VehicleKind),
    Skipped,
    Done,
}

#[derive(Debug)]
pub struct Ferry {
    crossing: Arc<Crossing>,
}

impl Ferry {
    pub fn new(crossing: Arc<Crossing>) -> Self {
        Self { crossing }
    }

    /// Arrive at the current port and take the docking batch
    fn dock(&self) -> Result<DockingRecord> {
        let state = self.crossing.state.lock();
        let port = state.ferry_port();
        self.crossing.log.record(Event::FerryArrived(port))?;

        let waiting = PerKind {
            trucks: state.waiting(port, VehicleKind::Truck),
            cars: state.waiting(port, VehicleKind::Car),
        };
        Ok(DockingRecord::new(port, waiting))
    }

    /// Put every vehicle on the deck ashore, trucks first
    async fn unload(&self, docking: &mut DockingRecord) -> Result<()> {
        loop {
            let unloaded = {
                let mut state = self.crossing.state.lock();
                match state.unload_one()? {
                    Some(kind) => {
                        self.crossing.signals.disembark(docking.port, kind).release()?;
                        Some(kind)
                    }
                    None => None,
                }
            };

            match unloaded {
                Some(kind) => *docking.unloaded.get_mut(kind) += 1,
                None => return Ok(()),
            }
            tokio::task::yield_now().await;
        }
    }

    /// Admit waiting vehicles, alternating trucks and cars, until neither fits
    async fn load(&self, docking: &mut DockingRecord) -> Result<()> {
        let port = docking.port;
        let mut turn = VehicleKind::Truck;

        loop {
            let outcome = {
                let mut state = self.crossing.state.lock();
                if !state.can_load_any(port) {
                    Turn::Done
                } else if state.can_admit(turn, port) {
                    state.admit(turn, port)?;
                    self.crossing.signals.boarding(port, turn).release()?;
                    Turn::Admitted(turn)
                } else {
                    Turn::Skipped
                }
            };

            match outcome {
                Turn::Done => return Ok(()),
                Turn::Admitted(kind) => *docking.loaded.get_mut(kind) += 1,
                Turn::Skipped => {}
            }
            turn = turn.other();
            tokio::task::yield_now().await;
        }
    }

    fn all_delivered(&self) -> bool {
        self.crossing.state.lock().all_delivered()
    }

    fn depart(&self, port: Port) -> Result<()> {
        let mut state = self.crossing.state.lock();
        self.crossing.log.record(Event::FerryLeaving(port))?;
        state.depart();
        Ok(())
    }
}

#[async_trait]
impl Actor for Ferry {
    type Output = FerryLog;

    fn id(&self) -> ActorId {
        ActorId::Ferry
    }

    async fn run(self) -> Result<FerryLog> {
        let leg = self.crossing.params.max_leg_delay;
        let mut log = FerryLog::default();

        self.crossing.log.record(Event::FerryStarted)?;

        loop {
            self.crossing.pause(leg).await;

            let mut docking = self.dock()?;
            self.unload(&mut docking).await?;
            self.load(&mut docking).await?;

            debug!(
                port = %docking.port,
                waiting_trucks = docking.waiting_at_docking.trucks,
                waiting_cars = docking.waiting_at_docking.cars,
                unloaded_trucks = docking.unloaded.trucks,
                unloaded_cars = docking.unloaded.cars,
                loaded_trucks = docking.loaded.trucks,
                loaded_cars = docking.loaded.cars,
                "Docking complete"
            );
            log.dockings.push(docking);

            if self.all_delivered() {
                break;
            }

            self.depart(docking.port)?;
            log.crossings += 1;
        }

        // return trip
        self.crossing.pause(leg).await;
        self.crossing.log.record(Event::FerryFinished)?;

        info!(
            dockings = log.dockings.len(),
            crossings = log.crossings,
            "Ferry finished"
        );
        Ok(log)
    }
}
