//! Terminal event log
//!
//! Every state transition of the terminal workflow is recorded as an
//! [`Event`], in dispatch order. The log is the observable output of a run:
//! two runs with the same configuration and seed produce identical logs,
//! which [`EventLog::digest`] reduces to a single fingerprint.
//!
//! # Event Types
//!
//! - **VesselArrived**: arrival admitted and bound to a berth
//! - **ArrivalDropped**: arrival turned away (no free berth)
//! - **VesselBerthed**: berth acquired, discharge begins
//! - **ContainerMoved**: crane and truck acquired, container lifted
//! - **ContainerTransported**: truck delivered the container to the yard
//! - **VesselDeparted**: all containers off, berth released
//!
//! # Example
//!
//! ```rust
//! use terminal_simulator_core_rs::models::{Event, EventLog};
//! use terminal_simulator_core_rs::SimTime;
//!
//! let mut log = EventLog::new();
//! log.log(Event::VesselBerthed {
//!     time: SimTime::ZERO,
//!     vessel: "V1".to_string(),
//!     berth: 0,
//! });
//!
//! assert_eq!(log.render(), vec!["0: Vessel V1 berths at berth_0".to_string()]);
//! ```

use crate::core::time::SimTime;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// A timestamped terminal state transition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Arrival admitted; a discharge process was started for it
    VesselArrived {
        time: SimTime,
        vessel: String,
        berth: usize,
        containers: u32,
    },

    /// Arrival turned away because no berth was free
    ArrivalDropped {
        time: SimTime,
        /// 1-based count of arrival instants, admitted or not
        arrival: u64,
    },

    /// Vessel holds its berth
    VesselBerthed {
        time: SimTime,
        vessel: String,
        berth: usize,
    },

    /// Crane lifted a container onto a truck
    ContainerMoved {
        time: SimTime,
        vessel: String,
        crane: usize,
        /// 1-based index of the container within the vessel's load
        container: u32,
    },

    /// Truck delivered a container to the yard
    ContainerTransported {
        time: SimTime,
        vessel: String,
        crane: usize,
        container: u32,
    },

    /// Vessel released its berth and left
    VesselDeparted {
        time: SimTime,
        vessel: String,
        berth: usize,
        containers: u32,
    },
}

impl Event {
    /// Simulated time of the transition
    pub fn time(&self) -> SimTime {
        match self {
            Event::VesselArrived { time, .. } => *time,
            Event::ArrivalDropped { time, .. } => *time,
            Event::VesselBerthed { time, .. } => *time,
            Event::ContainerMoved { time, .. } => *time,
            Event::ContainerTransported { time, .. } => *time,
            Event::VesselDeparted { time, .. } => *time,
        }
    }

    /// Short name of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::VesselArrived { .. } => "VesselArrived",
            Event::ArrivalDropped { .. } => "ArrivalDropped",
            Event::VesselBerthed { .. } => "VesselBerthed",
            Event::ContainerMoved { .. } => "ContainerMoved",
            Event::ContainerTransported { .. } => "ContainerTransported",
            Event::VesselDeparted { .. } => "VesselDeparted",
        }
    }

    /// Vessel name, if the event concerns one
    pub fn vessel(&self) -> Option<&str> {
        match self {
            Event::VesselArrived { vessel, .. } => Some(vessel),
            Event::VesselBerthed { vessel, .. } => Some(vessel),
            Event::ContainerMoved { vessel, .. } => Some(vessel),
            Event::ContainerTransported { vessel, .. } => Some(vessel),
            Event::VesselDeparted { vessel, .. } => Some(vessel),
            Event::ArrivalDropped { .. } => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::VesselArrived {
                time,
                vessel,
                berth,
                containers,
            } => write!(
                f,
                "{time}: Vessel {vessel} arrives at the terminal with {containers} containers, \
                 assigned berth_{berth}"
            ),
            Event::ArrivalDropped { time, arrival } => {
                write!(f, "{time}: Arrival #{arrival} turned away, no free berth")
            }
            Event::VesselBerthed {
                time,
                vessel,
                berth,
            } => write!(f, "{time}: Vessel {vessel} berths at berth_{berth}"),
            Event::ContainerMoved {
                time,
                vessel,
                crane,
                container,
            } => write!(
                f,
                "{time}: Quay crane {crane} moves container {container} from vessel {vessel}"
            ),
            Event::ContainerTransported {
                time,
                vessel,
                crane,
                container,
            } => write!(
                f,
                "{time}: Truck transports container {container} of vessel {vessel} \
                 from quay crane {crane} to yard block"
            ),
            Event::VesselDeparted {
                time,
                vessel,
                berth,
                containers,
            } => write!(
                f,
                "{time}: Vessel {vessel} leaves berth_{berth} \
                 after discharging {containers} containers"
            ),
        }
    }
}

/// Ordered log of terminal events
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an event
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All events in log order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events of one type, e.g. `"VesselBerthed"`
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Events concerning one vessel
    pub fn events_for_vessel(&self, vessel: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.vessel() == Some(vessel))
            .collect()
    }

    /// Events with `from <= time < to`
    pub fn events_between(&self, from: SimTime, to: SimTime) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.time() >= from && e.time() < to)
            .collect()
    }

    /// One human-readable line per event
    pub fn render(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }

    /// SHA-256 of the rendered log, hex encoded
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for line in self.render() {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }
        format!("{:x}", hasher.finalize())
    }
}
