//! Terminal workflow scenarios
//!
//! Each test builds a terminal through the orchestrator, usually with the
//! arrival source switched off (`max_arrivals: Some(0)`) and vessels injected
//! by hand, then checks the event log.

use std::collections::HashMap;
use terminal_simulator_core_rs::{
    AdmissionPolicy, ContainerCount, Event, EventLog, InterArrival, Orchestrator, SimTime,
    TerminalConfig,
};

/// Terminal with no generated arrivals
fn quiet_terminal(berths: usize, trucks: usize) -> TerminalConfig {
    TerminalConfig {
        horizon: 1000.0,
        berth_count: berths,
        crane_count: berths,
        truck_capacity: trucks,
        crane_cycle_delay: 3.0,
        transport_delay: 6.0,
        max_arrivals: Some(0),
        ..Default::default()
    }
}

fn t(value: f64) -> SimTime {
    SimTime::new(value).unwrap()
}

/// `[ContainerMoved, ContainerTransported]` interval of every container, keyed
/// by crane, in order of the move
fn handling_intervals(log: &EventLog) -> Vec<(usize, String, f64, f64)> {
    let mut open: HashMap<(String, u32), (usize, f64)> = HashMap::new();
    let mut intervals = Vec::new();

    for event in log.events() {
        match event {
            Event::ContainerMoved {
                time,
                vessel,
                crane,
                container,
            } => {
                open.insert((vessel.clone(), *container), (*crane, time.as_f64()));
            }
            Event::ContainerTransported {
                time,
                vessel,
                container,
                ..
            } => {
                let (crane, start) = open
                    .remove(&(vessel.clone(), *container))
                    .expect("transport without a move");
                intervals.push((crane, vessel.clone(), start, time.as_f64()));
            }
            _ => {}
        }
    }

    assert!(open.is_empty(), "containers still on a truck: {open:?}");
    intervals.sort_by(|a, b| a.2.total_cmp(&b.2));
    intervals
}

fn assert_disjoint(intervals: &[(f64, f64)]) {
    let mut sorted = intervals.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
    for pair in sorted.windows(2) {
        assert!(
            pair[0].1 <= pair[1].0,
            "intervals overlap: {:?} and {:?}",
            pair[0],
            pair[1]
        );
    }
}

// ============================================================================
// Scenario A: no contention
// ============================================================================

#[test]
fn test_lone_vessel_departs_at_18() {
    let mut orchestrator = Orchestrator::new(quiet_terminal(1, 3)).unwrap();
    orchestrator.spawn_vessel(2, 0).unwrap();

    let outcome = orchestrator.run().unwrap();
    let log = &outcome.event_log;

    let departures = log.events_of_type("VesselDeparted");
    assert_eq!(departures.len(), 1);
    assert_eq!(departures[0].time(), t(18.0));

    let moves: Vec<SimTime> = log
        .events_of_type("ContainerMoved")
        .iter()
        .map(|e| e.time())
        .collect();
    assert_eq!(moves, vec![t(3.0), t(12.0)]);

    let berth = &outcome.report.pools[0];
    assert_eq!(berth.name, "berth_0");
    assert_eq!(berth.held, 0);
    assert_eq!(berth.stats.delayed_grants, 0);
}

#[test]
fn test_lone_vessel_event_sequence() {
    let mut orchestrator = Orchestrator::new(quiet_terminal(1, 3)).unwrap();
    orchestrator.spawn_vessel(1, 0).unwrap();

    let outcome = orchestrator.run().unwrap();
    assert_eq!(
        outcome.event_log.render(),
        vec![
            "0: Vessel V1 arrives at the terminal with 1 containers, assigned berth_0".to_string(),
            "0: Vessel V1 berths at berth_0".to_string(),
            "3: Quay crane 0 moves container 1 from vessel V1".to_string(),
            "9: Truck transports container 1 of vessel V1 from quay crane 0 to yard block"
                .to_string(),
            "9: Vessel V1 leaves berth_0 after discharging 1 containers".to_string(),
        ]
    );
}

// ============================================================================
// Scenario B: admission policy
// ============================================================================

#[test]
fn test_arrival_dropped_when_every_berth_busy() {
    let config = TerminalConfig {
        inter_arrival: InterArrival::Fixed { interval: 1.0 },
        max_arrivals: Some(3),
        admission: AdmissionPolicy::Drop,
        ..quiet_terminal(2, 3)
    };
    let outcome = Orchestrator::new(config).unwrap().run().unwrap();
    let log = &outcome.event_log;

    let dropped = log.events_of_type("ArrivalDropped");
    assert_eq!(dropped.len(), 1);
    assert_eq!(
        dropped[0],
        &Event::ArrivalDropped {
            time: t(3.0),
            arrival: 3
        }
    );

    // only the admitted vessels ever berth, and nobody queued for a berth
    let berthed: Vec<&str> = log
        .events_of_type("VesselBerthed")
        .iter()
        .filter_map(|e| e.vessel())
        .collect();
    assert_eq!(berthed, vec!["V1", "V2"]);
    assert!(log.events_for_vessel("V3").is_empty());
    for pool in outcome.report.pools.iter().filter(|p| p.name.starts_with("berth")) {
        assert_eq!(pool.stats.peak_waiting, 0);
    }
}

#[test]
fn test_berth_freed_by_departure_admits_next_arrival() {
    let config = TerminalConfig {
        inter_arrival: InterArrival::Fixed { interval: 10.0 },
        containers: ContainerCount::Fixed { count: 1 },
        max_arrivals: Some(2),
        ..quiet_terminal(1, 3)
    };
    let outcome = Orchestrator::new(config).unwrap().run().unwrap();

    // V1 arrives at 10 and leaves at 19, before the arrival at 20
    assert_eq!(outcome.arrivals_dropped(), 0);
    assert_eq!(outcome.vessels_departed(), 2);
}

#[test]
fn test_queue_policy_waits_for_berth() {
    let config = TerminalConfig {
        inter_arrival: InterArrival::Fixed { interval: 1.0 },
        containers: ContainerCount::Fixed { count: 1 },
        max_arrivals: Some(2),
        admission: AdmissionPolicy::Queue,
        ..quiet_terminal(1, 3)
    };
    let outcome = Orchestrator::new(config).unwrap().run().unwrap();
    let log = &outcome.event_log;

    assert_eq!(outcome.arrivals_dropped(), 0);

    let berthings: Vec<(Option<&str>, SimTime)> = log
        .events_of_type("VesselBerthed")
        .iter()
        .map(|e| (e.vessel(), e.time()))
        .collect();
    assert_eq!(berthings, vec![(Some("V1"), t(1.0)), (Some("V2"), t(10.0))]);

    let departures: Vec<SimTime> = log
        .events_of_type("VesselDeparted")
        .iter()
        .map(|e| e.time())
        .collect();
    assert_eq!(departures, vec![t(10.0), t(19.0)]);
    assert_eq!(outcome.report.pools[0].stats.delayed_grants, 1);
}

#[test]
fn test_queue_policy_prefers_least_loaded_berth() {
    let config = TerminalConfig {
        inter_arrival: InterArrival::Fixed { interval: 1.0 },
        containers: ContainerCount::Fixed { count: 50 },
        max_arrivals: Some(4),
        admission: AdmissionPolicy::Queue,
        ..quiet_terminal(2, 3)
    };
    let outcome = Orchestrator::new(config).unwrap().run().unwrap();

    let berths: Vec<usize> = outcome
        .event_log
        .events_of_type("VesselArrived")
        .iter()
        .map(|e| match e {
            Event::VesselArrived { berth, .. } => *berth,
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    assert_eq!(berths, vec![0, 1, 0, 1]);
}

// ============================================================================
// Scenario C: truck contention
// ============================================================================

#[test]
fn test_single_truck_is_never_shared() {
    let mut orchestrator = Orchestrator::new(quiet_terminal(2, 1)).unwrap();
    orchestrator.spawn_vessel(3, 0).unwrap();
    orchestrator.spawn_vessel(3, 1).unwrap();

    let outcome = orchestrator.run().unwrap();
    let intervals = handling_intervals(&outcome.event_log);
    assert_eq!(intervals.len(), 6);

    // a container is on the truck from its move until its delivery
    let truck_busy: Vec<(f64, f64)> = intervals.iter().map(|i| (i.2, i.3)).collect();
    assert_disjoint(&truck_busy);

    let trucks = outcome
        .report
        .pools
        .iter()
        .find(|p| p.name == "trucks")
        .unwrap();
    assert_eq!(trucks.stats.peak_held, 1);
    assert!(trucks.stats.delayed_grants > 0);
    assert_eq!(outcome.vessels_departed(), 2);
}

#[test]
fn test_second_vessel_waits_for_truck_release() {
    let mut orchestrator = Orchestrator::new(quiet_terminal(2, 1)).unwrap();
    orchestrator.spawn_vessel(1, 0).unwrap();
    orchestrator.spawn_vessel(1, 1).unwrap();

    let outcome = orchestrator.run().unwrap();
    let log = &outcome.event_log;

    // both cranes are ready at 3; V2's lift waits for V1's truck to return
    let v1 = log.events_for_vessel("V1");
    let v2 = log.events_for_vessel("V2");
    let v1_delivered = v1
        .iter()
        .find(|e| e.event_type() == "ContainerTransported")
        .unwrap()
        .time();
    let v2_moved = v2
        .iter()
        .find(|e| e.event_type() == "ContainerMoved")
        .unwrap()
        .time();

    assert_eq!(v1_delivered, t(9.0));
    assert_eq!(v2_moved, t(9.0));
}

// ============================================================================
// Scenario D: crane exclusivity
// ============================================================================

#[test]
fn test_shared_crane_serves_one_vessel_at_a_time() {
    let config = TerminalConfig {
        crane_count: 1,
        crane_assignment: vec![0, 0],
        crane_cycle_delay: 0.5,
        ..quiet_terminal(2, 3)
    };
    let mut orchestrator = Orchestrator::new(config).unwrap();
    orchestrator.spawn_vessel(5, 0).unwrap();
    orchestrator.spawn_vessel(5, 1).unwrap();

    let outcome = orchestrator.run().unwrap();
    let intervals = handling_intervals(&outcome.event_log);
    assert_eq!(intervals.len(), 10);
    assert!(intervals.iter().all(|i| i.0 == 0));

    let crane_busy: Vec<(f64, f64)> = intervals.iter().map(|i| (i.2, i.3)).collect();
    assert_disjoint(&crane_busy);

    let crane = outcome
        .report
        .pools
        .iter()
        .find(|p| p.name == "crane_0")
        .unwrap();
    assert_eq!(crane.stats.peak_held, 1);
    assert!(crane.stats.peak_waiting >= 1);
}

#[test]
fn test_dedicated_crane_moves_never_overlap() {
    let config = TerminalConfig {
        crane_cycle_delay: 0.1,
        transport_delay: 1.0,
        ..quiet_terminal(1, 3)
    };
    let mut orchestrator = Orchestrator::new(config).unwrap();
    orchestrator.spawn_vessel(20, 0).unwrap();

    let outcome = orchestrator.run().unwrap();
    let intervals = handling_intervals(&outcome.event_log);
    assert_eq!(intervals.len(), 20);

    let crane_busy: Vec<(f64, f64)> = intervals.iter().map(|i| (i.2, i.3)).collect();
    assert_disjoint(&crane_busy);
}

// ============================================================================
// Conservation
// ============================================================================

#[test]
fn test_departed_vessels_discharged_their_full_load() {
    let config = TerminalConfig {
        horizon: 1440.0,
        containers: ContainerCount::Uniform { min: 5, max: 20 },
        ..Default::default()
    };
    let outcome = Orchestrator::new(config).unwrap().run().unwrap();
    let log = &outcome.event_log;

    let mut loads: HashMap<String, u32> = HashMap::new();
    for event in log.events_of_type("VesselArrived") {
        if let Event::VesselArrived {
            vessel, containers, ..
        } = event
        {
            loads.insert(vessel.clone(), *containers);
        }
    }

    let departures = log.events_of_type("VesselDeparted");
    assert!(!departures.is_empty());
    for event in departures {
        let Event::VesselDeparted {
            vessel, containers, ..
        } = event
        else {
            unreachable!()
        };
        assert_eq!(loads[vessel], *containers);

        let delivered = log
            .events_for_vessel(vessel)
            .iter()
            .filter(|e| e.event_type() == "ContainerTransported")
            .count();
        assert_eq!(delivered as u32, *containers);
    }
}

#[test]
fn test_no_vessel_moves_more_than_it_carries() {
    let outcome = Orchestrator::new(TerminalConfig::default())
        .unwrap()
        .run()
        .unwrap();
    let log = &outcome.event_log;

    for event in log.events_of_type("VesselArrived") {
        let Event::VesselArrived {
            vessel, containers, ..
        } = event
        else {
            unreachable!()
        };
        let moved = log
            .events_for_vessel(vessel)
            .iter()
            .filter(|e| e.event_type() == "ContainerMoved")
            .count();
        assert!(moved as u32 <= *containers);
    }
}

#[test]
fn test_event_times_never_decrease() {
    let outcome = Orchestrator::new(TerminalConfig::default())
        .unwrap()
        .run()
        .unwrap();

    let times: Vec<SimTime> = outcome.event_log.events().iter().map(|e| e.time()).collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
    assert!(times.iter().all(|&time| time < t(1440.0)));
}
