//! Shared State
//!
//! The one mutable record all actors share, guarded by a single mutex.
//! Every mutation moves exactly one vehicle between two locations and is
//! checked: underflow, a capacity breach or broken accounting comes back
//! as an [`InvariantViolation`] instead of a silently corrupted counter.
//!
//! Vehicle locations, per class:
//!
//! ```text
//! en route ──arrive──▶ waiting[port] ──admit──▶ on deck ──unload──▶ transported
//! ```

use crate::error::InvariantViolation;
use crate::types::{PerKind, Port, VehicleKind};
use parking_lot::Mutex;

/// Counters describing where every vehicle is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedState {
    capacity: u32,
    totals: PerKind<u32>,
    en_route: PerKind<u32>,
    waiting: [PerKind<u32>; 2],
    on_deck: PerKind<u32>,
    transported: PerKind<u32>,
    ferry_port: Port,
}

/// Copy of the counters taken under the lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSnapshot {
    pub capacity: u32,
    pub totals: PerKind<u32>,
    pub en_route: PerKind<u32>,
    pub waiting: [PerKind<u32>; 2],
    pub on_deck: PerKind<u32>,
    pub transported: PerKind<u32>,
    pub ferry_port: Port,
}

impl StateSnapshot {
    pub fn deck_load(&self) -> u32 {
        self.on_deck.cars * VehicleKind::Car.units()
            + self.on_deck.trucks * VehicleKind::Truck.units()
    }

    pub fn all_delivered(&self) -> bool {
        self.transported == self.totals && self.on_deck == PerKind::default()
    }
}

fn decrement(counter: &mut u32, name: &'static str) -> Result<(), InvariantViolation> {
    *counter = counter
        .checked_sub(1)
        .ok_or(InvariantViolation::CounterUnderflow { counter: name })?;
    Ok(())
}

impl SharedState {
    pub fn new(trucks: u32, cars: u32, capacity: u32) -> Self {
        let totals = PerKind { trucks, cars };
        Self {
            capacity,
            totals,
            en_route: totals,
            waiting: [PerKind::default(); 2],
            on_deck: PerKind::default(),
            transported: PerKind::default(),
            ferry_port: Port::Zero,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn ferry_port(&self) -> Port {
        self.ferry_port
    }

    pub fn waiting(&self, port: Port, kind: VehicleKind) -> u32 {
        *self.waiting[port.index()].get(kind)
    }

    pub fn on_deck(&self, kind: VehicleKind) -> u32 {
        *self.on_deck.get(kind)
    }

    pub fn transported(&self, kind: VehicleKind) -> u32 {
        *self.transported.get(kind)
    }

    pub fn total(&self, kind: VehicleKind) -> u32 {
        *self.totals.get(kind)
    }

    /// Car units currently occupied on the deck
    pub fn deck_load(&self) -> u32 {
        VehicleKind::BOTH
            .iter()
            .map(|&kind| self.on_deck(kind) * kind.units())
            .sum()
    }

    pub fn deck_is_empty(&self) -> bool {
        self.on_deck == PerKind::default()
    }

    /// Every vehicle has crossed and the deck is empty
    pub fn all_delivered(&self) -> bool {
        self.transported == self.totals && self.deck_is_empty()
    }

    /// A vehicle reaches its origin port and joins the queue
    pub fn arrive(&mut self, kind: VehicleKind, port: Port) -> Result<(), InvariantViolation> {
        decrement(self.en_route.get_mut(kind), "en_route")?;
        *self.waiting[port.index()].get_mut(kind) += 1;
        self.check_invariants()
    }

    /// Whether one more vehicle of `kind` waiting at `port` could board now
    pub fn can_admit(&self, kind: VehicleKind, port: Port) -> bool {
        self.waiting(port, kind) > 0 && self.deck_load() + kind.units() <= self.capacity
    }

    /// Whether any waiting class at `port` fits on the deck
    pub fn can_load_any(&self, port: Port) -> bool {
        VehicleKind::BOTH
            .iter()
            .any(|&kind| self.can_admit(kind, port))
    }

    /// Move one waiting vehicle onto the deck
    pub fn admit(&mut self, kind: VehicleKind, port: Port) -> Result<(), InvariantViolation> {
        decrement(self.waiting[port.index()].get_mut(kind), "waiting")?;
        *self.on_deck.get_mut(kind) += 1;
        self.check_invariants()
    }

    /// Move one vehicle off the deck, trucks first
    pub fn unload_one(&mut self) -> Result<Option<VehicleKind>, InvariantViolation> {
        let Some(kind) = VehicleKind::BOTH
            .into_iter()
            .find(|&kind| self.on_deck(kind) > 0)
        else {
            return Ok(None);
        };

        decrement(self.on_deck.get_mut(kind), "on_deck")?;
        *self.transported.get_mut(kind) += 1;
        self.check_invariants()?;
        Ok(Some(kind))
    }

    /// The ferry heads for the other port; returns the new port
    pub fn depart(&mut self) -> Port {
        self.ferry_port = self.ferry_port.opposite();
        self.ferry_port
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let load = self.deck_load();
        if load > self.capacity {
            return Err(InvariantViolation::CapacityExceeded {
                load,
                capacity: self.capacity,
            });
        }

        for kind in VehicleKind::BOTH {
            let accounted = self.en_route.get(kind)
                + self.waiting[0].get(kind)
                + self.waiting[1].get(kind)
                + self.on_deck.get(kind)
                + self.transported.get(kind);
            let total = self.total(kind);
            if accounted != total {
                return Err(InvariantViolation::Conservation {
                    kind,
                    accounted,
                    total,
                });
            }
        }

        Ok(())
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            capacity: self.capacity,
            totals: self.totals,
            en_route: self.en_route,
            waiting: self.waiting,
            on_deck: self.on_deck,
            transported: self.transported,
            ferry_port: self.ferry_port,
        }
    }
}

/// The lock-guarded shared record
#[derive(Debug)]
pub struct SharedStateLock {
    state: Mutex<SharedState>,
}

impl SharedStateLock {
    pub fn new(state: SharedState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Enter the critical section
    ///
    /// Guards must be dropped before any `.await`.
    pub fn lock(&self) -> parking_lot::MutexGuard<'_, SharedState> {
        self.state.lock()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.lock().snapshot()
    }
}
