//! End-to-end Simulation Tests
//!
//! Runs the full ferry and vehicle task set against in-memory and file
//! sinks:
//! - Small hand-checked scenarios with exact logs
//! - Capacity behavior when trucks fill the deck
//! - Termination and log consistency across many parameter sets
//! - Failure propagation when the log cannot be written

use ferry_actors::{
    parse_log, DelayProvider, Event, EventSink, FileSink, LogAudit, LogEvent, MemorySink, NoDelay,
    PerKind, Port, RandomDelay, Simulation, SimulationError, SimulationOptions, SimulationReport,
    VehicleId,
};
use ferry_config::{OriginPolicy, SimulationParams, SpawnOrder};
use proptest::prelude::*;
use std::collections::HashSet;
use std::io;
use std::sync::Arc;
use std::time::Duration;

const RUN_TIMEOUT: Duration = Duration::from_secs(60);

/// Always waits the full maximum
#[derive(Debug)]
struct MaxDelay;

impl DelayProvider for MaxDelay {
    fn delay(&self, max: Duration) -> Duration {
        max
    }
}

/// Fails every append after the first `remaining`
#[derive(Debug)]
struct FailingSink {
    remaining: usize,
}

impl EventSink for FailingSink {
    fn append(&mut self, _event: &LogEvent) -> io::Result<()> {
        if self.remaining == 0 {
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }
        self.remaining -= 1;
        Ok(())
    }
}

fn params(trucks: u32, cars: u32, capacity: u32) -> SimulationParams {
    SimulationParams {
        trucks,
        cars,
        capacity,
        max_arrival_delay: Duration::ZERO,
        max_leg_delay: Duration::ZERO,
    }
}

async fn run_to_memory(
    simulation: Simulation,
) -> (Result<SimulationReport, SimulationError>, MemorySink) {
    let sink = MemorySink::new();
    let result = tokio::time::timeout(RUN_TIMEOUT, simulation.run(Box::new(sink.clone())))
        .await
        .expect("simulation did not terminate");
    (result, sink)
}

fn ferry_events(events: &[LogEvent]) -> Vec<Event> {
    events
        .iter()
        .map(|line| line.event)
        .filter(|event| event.vehicle_stage().is_none())
        .collect()
}

fn assert_consistent(params: &SimulationParams, report: &SimulationReport, events: &[LogEvent]) {
    let summary = LogAudit::new(params.trucks, params.cars)
        .audit(events)
        .unwrap_or_else(|e| panic!("audit failed: {e}"));

    assert_eq!(summary.events, report.events_logged);
    assert_eq!(summary.dockings as usize, report.dockings.len());
    assert_eq!(summary.crossings, report.crossings);
    assert_eq!(report.vehicles_finished, params.vehicles());
    assert!(report.final_state.all_delivered());
    assert_eq!(
        report.final_state.transported,
        PerKind {
            trucks: params.trucks,
            cars: params.cars
        }
    );

    for docking in &report.dockings {
        assert!(
            docking.loaded_units() <= params.capacity,
            "docking over capacity: {docking:?}"
        );
    }
}

#[tokio::test]
async fn test_single_car_crossing() {
    let params = SimulationParams {
        max_leg_delay: Duration::from_millis(20),
        ..params(0, 1, 3)
    };
    let simulation = Simulation::new(params)
        .with_options(SimulationOptions {
            origin: OriginPolicy::Port0,
            ..SimulationOptions::default()
        })
        .with_delay_provider(Arc::new(MaxDelay));

    let (result, sink) = run_to_memory(simulation).await;
    let report = result.unwrap();
    let events = sink.events();
    assert_consistent(&params, &report, &events);

    let car = VehicleId::car(1);
    let logged: HashSet<Event> = events.iter().map(|line| line.event).collect();
    let expected: HashSet<Event> = [
        Event::FerryStarted,
        Event::FerryArrived(Port::Zero),
        Event::VehicleStarted(car),
        Event::VehicleArrived(car, Port::Zero),
        Event::VehicleBoarding(car),
        Event::FerryLeaving(Port::Zero),
        Event::FerryArrived(Port::One),
        Event::VehicleLeaving(car, Port::One),
        Event::FerryFinished,
    ]
    .into_iter()
    .collect();
    assert_eq!(events.len(), 9);
    assert_eq!(logged, expected);

    assert_eq!(
        ferry_events(&events),
        vec![
            Event::FerryStarted,
            Event::FerryArrived(Port::Zero),
            Event::FerryLeaving(Port::Zero),
            Event::FerryArrived(Port::One),
            Event::FerryFinished,
        ]
    );
    assert_eq!(report.crossings, 1);
}

#[tokio::test]
async fn test_no_vehicles() {
    let params = params(0, 0, 3);
    let (result, sink) = run_to_memory(Simulation::new(params)).await;
    let report = result.unwrap();

    assert_eq!(
        sink.lines(),
        vec!["1: P: started", "2: P: arrived to 0", "3: P: finish"]
    );
    assert_eq!(report.events_logged, 3);
    assert_eq!(report.crossings, 0);
    assert_eq!(report.dockings.len(), 1);
    assert_eq!(report.dockings[0].loaded, PerKind::default());
}

#[tokio::test]
async fn test_truck_fills_minimum_deck() {
    let params = SimulationParams {
        max_leg_delay: Duration::from_millis(20),
        ..params(2, 1, 3)
    };
    let simulation = Simulation::new(params)
        .with_options(SimulationOptions {
            origin: OriginPolicy::Port0,
            spawn_order: SpawnOrder::TrucksFirst,
            seed: Some(3),
        })
        .with_delay_provider(Arc::new(MaxDelay));

    let (result, sink) = run_to_memory(simulation).await;
    let report = result.unwrap();
    assert_consistent(&params, &report, &sink.events());

    let first = report.dockings[0];
    assert_eq!(first.port, Port::Zero);
    assert_eq!(first.waiting_at_docking, PerKind { trucks: 2, cars: 1 });
    assert_eq!(first.loaded, PerKind { trucks: 1, cars: 0 });

    for docking in &report.dockings {
        assert!(docking.loaded.trucks <= 1);
        if docking.loaded.trucks == 1 {
            assert_eq!(docking.loaded.cars, 0);
        }
    }
}

#[tokio::test]
async fn test_loading_alternates_classes() {
    let params = SimulationParams {
        max_leg_delay: Duration::from_millis(20),
        ..params(2, 4, 8)
    };
    let simulation = Simulation::new(params)
        .with_options(SimulationOptions {
            origin: OriginPolicy::Port0,
            ..SimulationOptions::default()
        })
        .with_delay_provider(Arc::new(MaxDelay));

    let (result, sink) = run_to_memory(simulation).await;
    let report = result.unwrap();
    assert_consistent(&params, &report, &sink.events());

    // truck, car, truck, car fills 8 units; the remaining cars can't fit
    assert_eq!(report.dockings[0].loaded, PerKind { trucks: 2, cars: 2 });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_vehicles_terminate() {
    for (trucks, cars, capacity) in [(5, 0, 3), (0, 25, 3), (10, 10, 4), (40, 60, 17), (3, 1, 100)] {
        let params = params(trucks, cars, capacity);
        let simulation = Simulation::new(params)
            .with_options(SimulationOptions {
                seed: Some(u64::from(trucks * 1_000 + cars)),
                ..SimulationOptions::default()
            })
            .with_delay_provider(Arc::new(NoDelay));

        let (result, sink) = run_to_memory(simulation).await;
        let report = result.unwrap();
        assert_consistent(&params, &report, &sink.events());
        assert_eq!(
            report.events_logged,
            2 + 4 * u64::from(trucks + cars) + 2 * u64::from(report.crossings) + 1
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_random_delays_terminate() {
    let params = SimulationParams {
        max_arrival_delay: Duration::from_millis(2),
        max_leg_delay: Duration::from_micros(300),
        ..params(8, 12, 5)
    };
    let simulation = Simulation::new(params)
        .with_delay_provider(Arc::new(RandomDelay::new(Some(2024))));

    let (result, sink) = run_to_memory(simulation).await;
    let report = result.unwrap();
    assert_consistent(&params, &report, &sink.events());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_file_sink_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("proj2.out");
    std::fs::write(&path, "stale contents\n").unwrap();

    let params = params(3, 7, 6);
    let sink = FileSink::create(&path).unwrap();
    let report = Simulation::new(params)
        .with_options(SimulationOptions {
            seed: Some(5),
            origin: OriginPolicy::Alternate,
            spawn_order: SpawnOrder::CarsFirst,
        })
        .with_delay_provider(Arc::new(NoDelay))
        .run(Box::new(sink))
        .await
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(!text.contains("stale"));
    assert!(text.starts_with("1: P: started\n"));
    assert!(text.ends_with(": P: finish\n"));

    let events = parse_log(&text).unwrap();
    assert_eq!(events.len() as u64, report.events_logged);
    assert_consistent(&params, &report, &events);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_log_failure_aborts_run() {
    let params = params(4, 4, 3);
    let simulation = Simulation::new(params).with_delay_provider(Arc::new(NoDelay));

    let result = tokio::time::timeout(
        RUN_TIMEOUT,
        simulation.run(Box::new(FailingSink { remaining: 5 })),
    )
    .await
    .expect("failed simulation did not stop");

    let err = result.unwrap_err();
    assert!(matches!(err, SimulationError::ActorFailed { .. }), "{err}");
    assert!(matches!(err.root_cause(), SimulationError::LogWrite(_)));
    assert!(!err.is_setup());
}

#[test]
fn test_missing_log_directory_is_setup_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FileSink::create(dir.path().join("missing").join("proj2.out")).unwrap_err();
    assert!(err.is_setup());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_every_run_delivers_everyone(
        trucks in 0u32..8,
        cars in 0u32..12,
        capacity in 3u32..12,
        seed in any::<u64>(),
        origin in prop_oneof![
            Just(OriginPolicy::Random),
            Just(OriginPolicy::Port0),
            Just(OriginPolicy::Port1),
            Just(OriginPolicy::Alternate),
        ],
    ) {
        let params = params(trucks, cars, capacity);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();

        let (result, sink) = runtime.block_on(run_to_memory(
            Simulation::new(params)
                .with_options(SimulationOptions {
                    seed: Some(seed),
                    origin,
                    spawn_order: SpawnOrder::Shuffled,
                })
                .with_delay_provider(Arc::new(NoDelay)),
        ));

        let report = result.unwrap();
        assert_consistent(&params, &report, &sink.events());
    }
}
