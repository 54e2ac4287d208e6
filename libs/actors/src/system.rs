//! Simulation Orchestrator
//!
//! Spawns the ferry and every vehicle as independent tasks, joins all of
//! them, and tears the shared world down only after the last one is done.
//!
//! # Failure handling
//!
//! Any actor error is fatal. The orchestrator then closes every signal
//! (so blocked vehicles fail fast instead of waiting forever), aborts the
//! remaining tasks and reports the first failure.

use crate::action_log::EventSink;
use crate::actor::{Actor, ActorOutcome, Crossing};
use crate::delay::{DelayProvider, RandomDelay};
use crate::error::{Result, SimulationError};
use crate::ferry::{DockingRecord, Ferry, FerryLog};
use crate::state::StateSnapshot;
use crate::types::{ActorId, Port, VehicleId, VehicleKind};
use crate::vehicle::Vehicle;
use ferry_config::{OriginPolicy, SimulationParams, SpawnOrder};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Knobs beyond the five validated parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationOptions {
    pub seed: Option<u64>,
    pub origin: OriginPolicy,
    pub spawn_order: SpawnOrder,
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub final_state: StateSnapshot,
    pub events_logged: u64,
    pub dockings: Vec<DockingRecord>,
    pub crossings: u32,
    pub vehicles_finished: u32,
    pub elapsed: Duration,
}

/// A vehicle the orchestrator will spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehiclePlan {
    pub id: VehicleId,
    pub origin: Port,
}

/// One simulation run
#[derive(Debug)]
pub struct Simulation {
    params: SimulationParams,
    options: SimulationOptions,
    delays: Option<Arc<dyn DelayProvider>>,
}

type ActorResult = (ActorId, Result<ActorOutcome>);

impl Simulation {
    pub fn new(params: SimulationParams) -> Self {
        Self {
            params,
            options: SimulationOptions::default(),
            delays: None,
        }
    }

    pub fn with_options(mut self, options: SimulationOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the default random delays
    pub fn with_delay_provider(mut self, delays: Arc<dyn DelayProvider>) -> Self {
        self.delays = Some(delays);
        self
    }

    /// Spawn order and origin port of every vehicle
    pub fn plan(&self) -> Vec<VehiclePlan> {
        let mut rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let trucks = (1..=self.params.trucks).map(VehicleId::truck);
        let cars = (1..=self.params.cars).map(VehicleId::car);

        let ids: Vec<VehicleId> = match self.options.spawn_order {
            SpawnOrder::TrucksFirst => trucks.chain(cars).collect(),
            SpawnOrder::CarsFirst => cars.chain(trucks).collect(),
            SpawnOrder::Shuffled => {
                // keep numbering in spawn order within each class
                let mut kinds: Vec<VehicleKind> = trucks
                    .map(|id| id.kind)
                    .chain(cars.map(|id| id.kind))
                    .collect();
                kinds.shuffle(&mut rng);

                let mut next = (0u32, 0u32);
                kinds
                    .into_iter()
                    .map(|kind| match kind {
                        VehicleKind::Truck => {
                            next.0 += 1;
                            VehicleId::truck(next.0)
                        }
                        VehicleKind::Car => {
                            next.1 += 1;
                            VehicleId::car(next.1)
                        }
                    })
                    .collect()
            }
        };

        ids.into_iter()
            .map(|id| {
                let origin = match self.options.origin {
                    OriginPolicy::Random => {
                        if rng.gen_bool(0.5) {
                            Port::One
                        } else {
                            Port::Zero
                        }
                    }
                    OriginPolicy::Port0 => Port::Zero,
                    OriginPolicy::Port1 => Port::One,
                    OriginPolicy::Alternate => {
                        if id.number % 2 == 1 {
                            Port::Zero
                        } else {
                            Port::One
                        }
                    }
                };
                VehiclePlan { id, origin }
            })
            .collect()
    }

    /// Run to completion, writing the action log to `sink`
    pub async fn run(self, sink: Box<dyn EventSink>) -> Result<SimulationReport> {
        let started = Instant::now();
        let plan = self.plan();
        let delays = self.delays.clone().unwrap_or_else(|| {
            // derived seed so delays don't mirror the plan's draws
            Arc::new(RandomDelay::new(self.options.seed.map(|s| s.wrapping_add(1))))
        });
        let crossing = Arc::new(Crossing::new(self.params, sink, delays));

        info!(
            trucks = self.params.trucks,
            cars = self.params.cars,
            capacity = self.params.capacity,
            max_arrival_delay_us = self.params.max_arrival_delay.as_micros() as u64,
            max_leg_delay_us = self.params.max_leg_delay.as_micros() as u64,
            "Starting ferry crossing simulation"
        );

        let mut tasks: JoinSet<ActorResult> = JoinSet::new();
        spawn_actor(&mut tasks, Ferry::new(Arc::clone(&crossing)));
        for vehicle in &plan {
            spawn_actor(
                &mut tasks,
                Vehicle::new(vehicle.id, vehicle.origin, Arc::clone(&crossing)),
            );
        }
        debug!(actors = tasks.len(), "All actors spawned");

        let mut ferry_log: Option<FerryLog> = None;
        let mut vehicles_finished = 0u32;

        while let Some(joined) = tasks.join_next().await {
            let failure = match joined {
                Ok((_, Ok(ActorOutcome::Ferry(log)))) => {
                    ferry_log = Some(log);
                    None
                }
                Ok((_, Ok(ActorOutcome::Vehicle(_)))) => {
                    vehicles_finished += 1;
                    None
                }
                Ok((actor, Err(e))) => Some(SimulationError::ActorFailed {
                    actor,
                    source: Box::new(e),
                }),
                Err(e) => Some(SimulationError::ActorAborted(e.to_string())),
            };

            if let Some(failure) = failure {
                error!(error = %failure, "Actor failed, aborting simulation");
                abort(&crossing, &mut tasks).await;
                return Err(failure);
            }
        }

        // every actor is joined; nothing can touch the shared world anymore
        crossing.log.flush()?;
        crossing.signals.ensure_drained()?;
        let final_state = {
            let state = crossing.state.lock();
            state.check_invariants()?;
            state.snapshot()
        };

        for kind in VehicleKind::BOTH {
            let delivered = *final_state.transported.get(kind);
            let total = *final_state.totals.get(kind);
            if delivered != total {
                return Err(SimulationError::Incomplete {
                    kind,
                    delivered,
                    total,
                });
            }
        }

        let ferry_log = ferry_log.unwrap_or_default();
        let report = SimulationReport {
            final_state,
            events_logged: crossing.log.recorded(),
            dockings: ferry_log.dockings,
            crossings: ferry_log.crossings,
            vehicles_finished,
            elapsed: started.elapsed(),
        };

        info!(
            events = report.events_logged,
            crossings = report.crossings,
            dockings = report.dockings.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Simulation complete"
        );
        Ok(report)
    }
}

fn spawn_actor<A: Actor>(tasks: &mut JoinSet<ActorResult>, actor: A) {
    let id = actor.id();
    tasks.spawn(async move {
        let result = actor.run().await.map(Into::into);
        (id, result)
    });
}

/// Fail every blocked waiter, then cancel whatever is still running
async fn abort(crossing: &Crossing, tasks: &mut JoinSet<ActorResult>) {
    crossing.signals.close_all();
    tasks.abort_all();

    let mut cancelled = 0usize;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Err(e) if e.is_cancelled() => cancelled += 1,
            Ok((actor, Err(e))) => debug!(%actor, error = %e, "Actor stopped after abort"),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Actor task failed during abort"),
        }
    }

    if let Err(e) = crossing.log.flush() {
        warn!(error = %e, "Failed to flush action log during abort");
    }
    warn!(cancelled, "Simulation aborted");
}
