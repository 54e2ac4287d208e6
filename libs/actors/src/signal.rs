//! Rendezvous Signals
//!
//! Counting signals the ferry releases and vehicles wait on. One permit
//! lets exactly one waiting vehicle proceed. Boarding and disembarking use
//! separate signal families so that a permit issued for boarding at a port
//! can never release a vehicle waiting to get off at that same port.

use crate::error::InvariantViolation;
use crate::types::{Port, VehicleKind};
use std::fmt;
use tokio::sync::Semaphore;

/// What a permit authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Leave the port queue and drive onto the deck
    Boarding,
    /// Drive off the deck at the destination
    Disembark,
}

impl Gate {
    fn index(self) -> usize {
        match self {
            Gate::Boarding => 0,
            Gate::Disembark => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalId {
    pub gate: Gate,
    pub port: Port,
    pub kind: VehicleKind,
}

impl SignalId {
    const COUNT: usize = 8;

    fn index(self) -> usize {
        self.gate.index() * 4 + self.port.index() * 2 + self.kind.index()
    }

    fn from_index(index: usize) -> Self {
        let gate = if index / 4 == 0 { Gate::Boarding } else { Gate::Disembark };
        let port = Port::BOTH[(index / 2) % 2];
        let kind = VehicleKind::BOTH[index % 2];
        Self { gate, port, kind }
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gate = match self.gate {
            Gate::Boarding => "boarding",
            Gate::Disembark => "disembark",
        };
        write!(f, "{}/port{}/{}", gate, self.port, self.kind)
    }
}

/// A single counting signal
#[derive(Debug)]
pub struct Signal {
    id: SignalId,
    permits: Semaphore,
}

impl Signal {
    pub fn new(id: SignalId) -> Self {
        Self {
            id,
            permits: Semaphore::new(0),
        }
    }

    pub fn id(&self) -> SignalId {
        self.id
    }

    /// Add one permit, waking one waiter if there is one
    pub fn release(&self) -> Result<(), InvariantViolation> {
        if self.permits.is_closed() {
            return Err(InvariantViolation::SignalClosed(self.id));
        }
        self.permits.add_permits(1);
        Ok(())
    }

    /// Block until a permit is available, then consume it
    pub async fn wait(&self) -> Result<(), InvariantViolation> {
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| InvariantViolation::SignalClosed(self.id))?;
        permit.forget();
        Ok(())
    }

    /// Permits issued but not yet consumed
    pub fn pending(&self) -> usize {
        self.permits.available_permits()
    }

    /// Fail every current and future waiter
    pub fn close(&self) {
        self.permits.close();
    }
}

/// All eight signals: {boarding, disembark} x {port 0, port 1} x {truck, car}
#[derive(Debug)]
pub struct RendezvousSignals {
    signals: [Signal; SignalId::COUNT],
}

impl RendezvousSignals {
    pub fn new() -> Self {
        Self {
            signals: std::array::from_fn(|i| Signal::new(SignalId::from_index(i))),
        }
    }

    pub fn get(&self, gate: Gate, port: Port, kind: VehicleKind) -> &Signal {
        &self.signals[SignalId { gate, port, kind }.index()]
    }

    pub fn boarding(&self, port: Port, kind: VehicleKind) -> &Signal {
        self.get(Gate::Boarding, port, kind)
    }

    pub fn disembark(&self, port: Port, kind: VehicleKind) -> &Signal {
        self.get(Gate::Disembark, port, kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter()
    }

    /// Every permit must have been consumed once all actors are joined
    pub fn ensure_drained(&self) -> Result<(), InvariantViolation> {
        match self.signals.iter().find(|s| s.pending() > 0) {
            Some(signal) => Err(InvariantViolation::StrayPermits {
                signal: signal.id(),
                count: signal.pending(),
            }),
            None => Ok(()),
        }
    }

    pub fn close_all(&self) {
        for signal in &self.signals {
            signal.close();
        }
    }
}

impl Default for RendezvousSignals {
    fn default() -> Self {
        Self::new()
    }
}
