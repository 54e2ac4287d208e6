//! Actor identities, ports and vehicle classes

use ferry_config::limits::units;
use std::fmt;
use std::str::FromStr;

/// One of the two ports the ferry shuttles between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Port {
    Zero,
    One,
}

impl Port {
    pub const BOTH: [Port; 2] = [Port::Zero, Port::One];

    pub fn index(self) -> usize {
        match self {
            Port::Zero => 0,
            Port::One => 1,
        }
    }

    /// The port on the other side of the crossing
    pub fn opposite(self) -> Port {
        match self {
            Port::Zero => Port::One,
            Port::One => Port::Zero,
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

impl FromStr for Port {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(Port::Zero),
            "1" => Ok(Port::One),
            other => Err(format!("unknown port {other:?}")),
        }
    }
}

/// Vehicle class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VehicleKind {
    Truck,
    Car,
}

impl VehicleKind {
    pub const BOTH: [VehicleKind; 2] = [VehicleKind::Truck, VehicleKind::Car];

    pub fn index(self) -> usize {
        match self {
            VehicleKind::Truck => 0,
            VehicleKind::Car => 1,
        }
    }

    /// Deck space in car units
    pub fn units(self) -> u32 {
        match self {
            VehicleKind::Truck => units::TRUCK,
            VehicleKind::Car => units::CAR,
        }
    }

    pub fn other(self) -> VehicleKind {
        match self {
            VehicleKind::Truck => VehicleKind::Car,
            VehicleKind::Car => VehicleKind::Truck,
        }
    }

    /// Log prefix: `N` for trucks, `O` for cars
    pub fn symbol(self) -> &'static str {
        match self {
            VehicleKind::Truck => "N",
            VehicleKind::Car => "O",
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleKind::Truck => f.write_str("truck"),
            VehicleKind::Car => f.write_str("car"),
        }
    }
}

/// A vehicle: its class plus a 1-based number within that class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId {
    pub kind: VehicleKind,
    pub number: u32,
}

impl VehicleId {
    pub fn truck(number: u32) -> Self {
        Self {
            kind: VehicleKind::Truck,
            number,
        }
    }

    pub fn car(number: u32) -> Self {
        Self {
            kind: VehicleKind::Car,
            number,
        }
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.symbol(), self.number)
    }
}

/// Identity of an actor as it appears in the action log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActorId {
    Ferry,
    Vehicle(VehicleId),
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorId::Ferry => f.write_str("P"),
            ActorId::Vehicle(id) => id.fmt(f),
        }
    }
}

impl From<VehicleId> for ActorId {
    fn from(id: VehicleId) -> Self {
        ActorId::Vehicle(id)
    }
}

impl FromStr for ActorId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "P" {
            return Ok(ActorId::Ferry);
        }

        let (symbol, number) = s
            .split_once(' ')
            .ok_or_else(|| format!("unknown actor {s:?}"))?;
        let kind = match symbol {
            "N" => VehicleKind::Truck,
            "O" => VehicleKind::Car,
            _ => return Err(format!("unknown actor {s:?}")),
        };
        let number = number
            .parse::<u32>()
            .map_err(|_| format!("bad vehicle number in {s:?}"))?;

        Ok(ActorId::Vehicle(VehicleId { kind, number }))
    }
}

/// A value per vehicle class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerKind<T> {
    pub trucks: T,
    pub cars: T,
}

impl<T> PerKind<T> {
    pub fn get(&self, kind: VehicleKind) -> &T {
        match kind {
            VehicleKind::Truck => &self.trucks,
            VehicleKind::Car => &self.cars,
        }
    }

    pub fn get_mut(&mut self, kind: VehicleKind) -> &mut T {
        match kind {
            VehicleKind::Truck => &mut self.trucks,
            VehicleKind::Car => &mut self.cars,
        }
    }
}
