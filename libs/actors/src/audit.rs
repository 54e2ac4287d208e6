//! Action log audit
//!
//! Replays a finished action log and checks what any correct run must
//! show regardless of scheduling: contiguous numbering, a ferry that
//! alternates ports starting at port 0, and every vehicle going through
//! `started → arrived → boarding → leaving in` exactly once, leaving on
//! the side opposite to where it arrived.

use crate::events::{Event, LogEvent};
use crate::types::{ActorId, Port, VehicleId, VehicleKind};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    #[error("Line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Expected sequence number {expected}, found {found}")]
    SequenceGap { expected: u64, found: u64 },

    #[error("Ferry event out of order at {sequence}: {event}")]
    FerryOutOfOrder { sequence: u64, event: Event },

    #[error("Ferry never finished")]
    FerryIncomplete,

    #[error("Unknown vehicle {vehicle} at {sequence}")]
    UnknownVehicle { sequence: u64, vehicle: VehicleId },

    #[error("Vehicle event out of order at {sequence}: {event}")]
    VehicleOutOfOrder { sequence: u64, event: Event },

    #[error("Vehicle left on the wrong side at {sequence}: {event}")]
    WrongPort { sequence: u64, event: Event },

    #[error("Port not yet visited by the ferry at {sequence}: {event}")]
    PortNotServed { sequence: u64, event: Event },

    #[error("Vehicle {vehicle} logged {events} of 4 events")]
    VehicleIncomplete { vehicle: VehicleId, events: u8 },
}

/// Counts gathered from a clean log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditSummary {
    pub events: u64,
    pub dockings: u32,
    pub crossings: u32,
    pub vehicles: u32,
}

/// Parse a whole action log, skipping blank lines
pub fn parse_log(text: &str) -> Result<Vec<LogEvent>, AuditError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            line.parse::<LogEvent>().map_err(|reason| AuditError::Malformed {
                line: index + 1,
                reason,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FerryPhase {
    NotStarted,
    Underway(Port),
    Docked(Port),
    Finished,
}

#[derive(Debug, Clone, Copy, Default)]
struct VehicleTrace {
    stages: u8,
    origin: Option<Port>,
}

/// Audits logs of a run with the given vehicle counts
#[derive(Debug, Clone, Copy)]
pub struct LogAudit {
    trucks: u32,
    cars: u32,
}

impl LogAudit {
    pub fn new(trucks: u32, cars: u32) -> Self {
        Self { trucks, cars }
    }

    fn known(&self, vehicle: VehicleId) -> bool {
        let total = match vehicle.kind {
            VehicleKind::Truck => self.trucks,
            VehicleKind::Car => self.cars,
        };
        (1..=total).contains(&vehicle.number)
    }

    pub fn audit(&self, events: &[LogEvent]) -> Result<AuditSummary, AuditError> {
        let mut summary = AuditSummary::default();
        let mut ferry = FerryPhase::NotStarted;
        let mut served = [false; 2];
        let mut vehicles: HashMap<VehicleId, VehicleTrace> = HashMap::new();

        for (expected, line) in (1u64..).zip(events) {
            if line.sequence != expected {
                return Err(AuditError::SequenceGap {
                    expected,
                    found: line.sequence,
                });
            }
            let sequence = line.sequence;
            let event = line.event;

            match event.actor() {
                ActorId::Ferry => {
                    ferry = match (ferry, event) {
                        (FerryPhase::NotStarted, Event::FerryStarted) => {
                            FerryPhase::Underway(Port::Zero)
                        }
                        (FerryPhase::Underway(next), Event::FerryArrived(port)) if port == next => {
                            served[port.index()] = true;
                            summary.dockings += 1;
                            FerryPhase::Docked(port)
                        }
                        (FerryPhase::Docked(at), Event::FerryLeaving(port)) if port == at => {
                            summary.crossings += 1;
                            FerryPhase::Underway(port.opposite())
                        }
                        (FerryPhase::Docked(_), Event::FerryFinished) => FerryPhase::Finished,
                        _ => return Err(AuditError::FerryOutOfOrder { sequence, event }),
                    };
                }
                ActorId::Vehicle(vehicle) => {
                    if !self.known(vehicle) {
                        return Err(AuditError::UnknownVehicle { sequence, vehicle });
                    }
                    let trace = vehicles.entry(vehicle).or_default();
                    if event.vehicle_stage() != Some(trace.stages) {
                        return Err(AuditError::VehicleOutOfOrder { sequence, event });
                    }

                    match event {
                        Event::VehicleArrived(_, port) => trace.origin = Some(port),
                        Event::VehicleBoarding(_) => {
                            let origin = trace.origin.unwrap_or(Port::Zero);
                            if !served[origin.index()] {
                                return Err(AuditError::PortNotServed { sequence, event });
                            }
                        }
                        Event::VehicleLeaving(_, port) => {
                            if trace.origin.map(Port::opposite) != Some(port) {
                                return Err(AuditError::WrongPort { sequence, event });
                            }
                            if !served[port.index()] {
                                return Err(AuditError::PortNotServed { sequence, event });
                            }
                        }
                        _ => {}
                    }
                    trace.stages += 1;
                }
            }
            summary.events = sequence;
        }

        if ferry != FerryPhase::Finished {
            return Err(AuditError::FerryIncomplete);
        }

        let everyone = (1..=self.trucks)
            .map(VehicleId::truck)
            .chain((1..=self.cars).map(VehicleId::car));
        for vehicle in everyone {
            let events = vehicles.get(&vehicle).map_or(0, |trace| trace.stages);
            if events != 4 {
                return Err(AuditError::VehicleIncomplete { vehicle, events });
            }
        }
        summary.vehicles = self.trucks + self.cars;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_TRUCK: &str = "\
1: P: started
2: N 1: started
3: N 1: arrived to 0
4: P: arrived to 0
5: N 1: boarding
6: P: leaving 0
7: P: arrived to 1
8: N 1: leaving in 1
9: P: finish
";

    #[test]
    fn test_clean_log_passes() {
        let events = parse_log(ONE_TRUCK).unwrap();
        let summary = LogAudit::new(1, 0).audit(&events).unwrap();
        assert_eq!(
            summary,
            AuditSummary {
                events: 9,
                dockings: 2,
                crossings: 1,
                vehicles: 1,
            }
        );
    }

    #[test]
    fn test_empty_run() {
        let events = parse_log("1: P: started\n2: P: arrived to 0\n3: P: finish\n").unwrap();
        let summary = LogAudit::new(0, 0).audit(&events).unwrap();
        assert_eq!(summary.dockings, 1);
        assert_eq!(summary.crossings, 0);
    }

    #[test]
    fn test_sequence_gap() {
        let log = ONE_TRUCK.replace("9: P: finish", "10: P: finish");
        let events = parse_log(&log).unwrap();
        assert_eq!(
            LogAudit::new(1, 0).audit(&events),
            Err(AuditError::SequenceGap {
                expected: 9,
                found: 10
            })
        );
    }

    #[test]
    fn test_ferry_must_start_at_port_zero() {
        let events = parse_log("1: P: started\n2: P: arrived to 1\n3: P: finish\n").unwrap();
        assert!(matches!(
            LogAudit::new(0, 0).audit(&events),
            Err(AuditError::FerryOutOfOrder { sequence: 2, .. })
        ));
    }

    #[test]
    fn test_wrong_side() {
        let log = ONE_TRUCK.replace("8: N 1: leaving in 1", "8: N 1: leaving in 0");
        let events = parse_log(&log).unwrap();
        assert!(matches!(
            LogAudit::new(1, 0).audit(&events),
            Err(AuditError::WrongPort { sequence: 8, .. })
        ));
    }

    #[test]
    fn test_missing_and_unknown_vehicles() {
        let events = parse_log(ONE_TRUCK).unwrap();
        assert_eq!(
            LogAudit::new(1, 1).audit(&events),
            Err(AuditError::VehicleIncomplete {
                vehicle: VehicleId::car(1),
                events: 0
            })
        );
        assert!(matches!(
            LogAudit::new(0, 0).audit(&events),
            Err(AuditError::UnknownVehicle { sequence: 2, .. })
        ));
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let err = parse_log("1: P: started\n\n2: P: sailing\n").unwrap_err();
        assert!(matches!(err, AuditError::Malformed { line: 3, .. }));
    }
}
