//! Terminal model
//!
//! The terminal is the world state shared by every process of a run: the
//! resource layout (which pool is which berth, crane or truck pool), the fixed
//! discharge timings, the RNG and the event log. The pools themselves live in
//! the scheduler; the terminal only remembers their ids.
//!
//! # Layout
//!
//! ```text
//! berth_0 ──(crane_assignment[0])──► crane_k ─┐
//! berth_1 ──(crane_assignment[1])──► crane_m ─┼──► trucks (shared)
//! ...                                          ┘
//! ```

pub mod discharge;

pub use discharge::DischargeProcess;

use crate::models::{Event, EventLog};
use crate::resources::PoolId;
use crate::rng::RngManager;
use crate::scheduler::{EngineError, Scheduler};
use tracing::info;

/// Pool ids for every terminal resource
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalLayout {
    berths: Vec<PoolId>,
    cranes: Vec<PoolId>,
    crane_of_berth: Vec<usize>,
    trucks: PoolId,
}

impl TerminalLayout {
    /// Create the terminal's pools in `scheduler`
    ///
    /// Berths and cranes get one unit each; the truck pool gets
    /// `truck_capacity`. An empty `crane_assignment` pairs berth `i` with
    /// crane `i`.
    ///
    /// # Errors
    /// Zero capacities, or a crane assignment that does not cover every berth
    /// or names a crane that does not exist.
    pub fn install<W>(
        scheduler: &mut Scheduler<W>,
        berth_count: usize,
        crane_count: usize,
        crane_assignment: &[usize],
        truck_capacity: usize,
    ) -> Result<Self, EngineError> {
        let berths = (0..berth_count)
            .map(|i| scheduler.add_pool(format!("berth_{i}"), 1))
            .collect::<Result<Vec<_>, _>>()?;
        let cranes = (0..crane_count)
            .map(|i| scheduler.add_pool(format!("crane_{i}"), 1))
            .collect::<Result<Vec<_>, _>>()?;
        let trucks = scheduler.add_pool("trucks", truck_capacity)?;

        let crane_of_berth: Vec<usize> = if crane_assignment.is_empty() {
            (0..berth_count).collect()
        } else {
            crane_assignment.to_vec()
        };

        if crane_of_berth.len() != berth_count {
            return Err(EngineError::InvalidLayout(format!(
                "{} crane assignments for {} berths",
                crane_of_berth.len(),
                berth_count
            )));
        }
        if let Some((berth, crane)) = crane_of_berth
            .iter()
            .enumerate()
            .find(|(_, &crane)| crane >= cranes.len())
        {
            return Err(EngineError::InvalidLayout(format!(
                "berth_{berth} is paired with missing crane_{crane}"
            )));
        }

        Ok(Self {
            berths,
            cranes,
            crane_of_berth,
            trucks,
        })
    }

    pub fn berth_count(&self) -> usize {
        self.berths.len()
    }

    pub fn berth(&self, berth: usize) -> Option<PoolId> {
        self.berths.get(berth).copied()
    }

    pub fn berths(&self) -> &[PoolId] {
        &self.berths
    }

    /// Crane index and pool dedicated to `berth`
    pub fn crane_for_berth(&self, berth: usize) -> Option<(usize, PoolId)> {
        let crane = *self.crane_of_berth.get(berth)?;
        Some((crane, *self.cranes.get(crane)?))
    }

    pub fn trucks(&self) -> PoolId {
        self.trucks
    }
}

/// Fixed per-container delays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DischargeTiming {
    /// Pause before each crane move
    pub crane_cycle: f64,
    /// Truck trip from quay to yard
    pub transport: f64,
}

/// World state for a terminal simulation
#[derive(Debug)]
pub struct Terminal {
    layout: TerminalLayout,
    timing: DischargeTiming,
    rng: RngManager,
    events: EventLog,
    vessels_created: u32,
}

impl Terminal {
    pub fn new(layout: TerminalLayout, timing: DischargeTiming, rng: RngManager) -> Self {
        Self {
            layout,
            timing,
            rng,
            events: EventLog::new(),
            vessels_created: 0,
        }
    }

    pub fn layout(&self) -> &TerminalLayout {
        &self.layout
    }

    pub fn timing(&self) -> DischargeTiming {
        self.timing
    }

    pub fn rng_mut(&mut self) -> &mut RngManager {
        &mut self.rng
    }

    pub fn event_log(&self) -> &EventLog {
        &self.events
    }

    /// Hand the event log over at the end of a run
    pub fn into_event_log(self) -> EventLog {
        self.events
    }

    /// Allocate the next vessel name (`V1`, `V2`, ...)
    pub fn next_vessel_name(&mut self) -> String {
        self.vessels_created += 1;
        format!("V{}", self.vessels_created)
    }

    /// Append to the event log and trace it
    pub fn record(&mut self, event: Event) {
        info!(target: "terminal::events", "{event}");
        self.events.log(event);
    }
}
