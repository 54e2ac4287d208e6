//! Action log events
//!
//! Every line of the action log is a [`LogEvent`]: a sequence number and
//! an [`Event`], rendered as `"<sequence>: <actor>: <what happened>"`.

use crate::types::{ActorId, Port, VehicleId};
use std::fmt;
use std::str::FromStr;

/// Something an actor did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    FerryStarted,
    FerryArrived(Port),
    FerryLeaving(Port),
    FerryFinished,
    VehicleStarted(VehicleId),
    VehicleArrived(VehicleId, Port),
    VehicleBoarding(VehicleId),
    /// Drives off at the destination port
    VehicleLeaving(VehicleId, Port),
}

impl Event {
    pub fn actor(&self) -> ActorId {
        match self {
            Event::FerryStarted
            | Event::FerryArrived(_)
            | Event::FerryLeaving(_)
            | Event::FerryFinished => ActorId::Ferry,
            Event::VehicleStarted(id)
            | Event::VehicleArrived(id, _)
            | Event::VehicleBoarding(id)
            | Event::VehicleLeaving(id, _) => ActorId::Vehicle(*id),
        }
    }

    /// Position of the event within its vehicle's lifecycle
    pub fn vehicle_stage(&self) -> Option<u8> {
        match self {
            Event::VehicleStarted(_) => Some(0),
            Event::VehicleArrived(..) => Some(1),
            Event::VehicleBoarding(_) => Some(2),
            Event::VehicleLeaving(..) => Some(3),
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let actor = self.actor();
        match self {
            Event::FerryStarted | Event::VehicleStarted(_) => write!(f, "{actor}: started"),
            Event::FerryArrived(port) | Event::VehicleArrived(_, port) => {
                write!(f, "{actor}: arrived to {port}")
            }
            Event::FerryLeaving(port) => write!(f, "{actor}: leaving {port}"),
            Event::FerryFinished => write!(f, "{actor}: finish"),
            Event::VehicleBoarding(_) => write!(f, "{actor}: boarding"),
            Event::VehicleLeaving(_, port) => write!(f, "{actor}: leaving in {port}"),
        }
    }
}

impl FromStr for Event {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (actor, action) = s
            .split_once(": ")
            .ok_or_else(|| format!("missing actor in {s:?}"))?;
        let actor: ActorId = actor.parse()?;

        let port_after = |prefix: &str| -> Option<Result<Port, String>> {
            action.strip_prefix(prefix).map(str::parse)
        };

        let event = match actor {
            ActorId::Ferry => match action {
                "started" => Event::FerryStarted,
                "finish" => Event::FerryFinished,
                _ => {
                    if let Some(port) = port_after("arrived to ") {
                        Event::FerryArrived(port?)
                    } else if let Some(port) = port_after("leaving ") {
                        Event::FerryLeaving(port?)
                    } else {
                        return Err(format!("unknown ferry action {action:?}"));
                    }
                }
            },
            ActorId::Vehicle(id) => match action {
                "started" => Event::VehicleStarted(id),
                "boarding" => Event::VehicleBoarding(id),
                _ => {
                    if let Some(port) = port_after("arrived to ") {
                        Event::VehicleArrived(id, port?)
                    } else if let Some(port) = port_after("leaving in ") {
                        Event::VehicleLeaving(id, port?)
                    } else {
                        return Err(format!("unknown vehicle action {action:?}"));
                    }
                }
            },
        };

        Ok(event)
    }
}

/// One numbered line of the action log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogEvent {
    pub sequence: u64,
    pub event: Event,
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sequence, self.event)
    }
}

impl FromStr for LogEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (sequence, event) = s
            .split_once(": ")
            .ok_or_else(|| format!("missing sequence number in {s:?}"))?;
        let sequence = sequence
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("bad sequence number in {s:?}"))?;

        Ok(LogEvent {
            sequence,
            event: event.trim_end().parse()?,
        })
    }
}
