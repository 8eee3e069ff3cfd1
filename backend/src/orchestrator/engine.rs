//! Orchestrator - assembles and runs one terminal simulation
//!
//! Turns a [`TerminalConfig`] into a scheduler with the terminal's pools, a
//! [`Terminal`] world and an [`ArrivalSource`], then runs it to the horizon.
//!
//! # Critical Invariants
//!
//! 1. **Validate first**: an invalid config is rejected before any pool or
//!    process exists
//! 2. **Determinism**: the only randomness is the terminal's RNG, seeded from
//!    `rng_seed`; equal configs give identical event logs
//! 3. **Single run**: [`Orchestrator::run`] consumes the orchestrator
//!
//! # Example
//!
//! ```rust
//! use terminal_simulator_core_rs::{Orchestrator, TerminalConfig};
//!
//! let config = TerminalConfig {
//!     horizon: 120.0,
//!     ..TerminalConfig::default()
//! };
//! let outcome = Orchestrator::new(config).unwrap().run().unwrap();
//! assert!(outcome.event_log.len() > 0);
//! assert_eq!(outcome.config_hash.len(), 64);
//! ```

use crate::arrivals::ArrivalSource;
use crate::core::time::SimTime;
use crate::models::{Event, EventLog, Vessel};
use crate::orchestrator::config::TerminalConfig;
use crate::rng::RngManager;
use crate::scheduler::{EngineError, ProcessId, RunReport, Scheduler};
use crate::terminal::{DischargeProcess, DischargeTiming, Terminal, TerminalLayout};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

// ============================================================================
// Errors
// ============================================================================

/// Errors surfaced to callers of the orchestrator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Configuration validation error
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Outcome
// ============================================================================

/// Everything a finished run produced
#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutcome {
    pub report: RunReport,
    pub event_log: EventLog,
    /// SHA-256 of the config that produced this run
    pub config_hash: String,
}

impl SimulationOutcome {
    /// Vessels that finished discharging before the horizon
    pub fn vessels_departed(&self) -> usize {
        self.event_log.events_of_type("VesselDeparted").len()
    }

    /// Arrivals turned away for lack of a free berth
    pub fn arrivals_dropped(&self) -> usize {
        self.event_log.events_of_type("ArrivalDropped").len()
    }

    /// Containers delivered to the yard
    pub fn containers_transported(&self) -> usize {
        self.event_log.events_of_type("ContainerTransported").len()
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Owns the scheduler and terminal for one run
///
/// The arrival source is spawned at construction. Extra vessels can be
/// injected with [`Orchestrator::spawn_vessel`] before the run starts.
pub struct Orchestrator {
    config: TerminalConfig,
    config_hash: String,
    scheduler: Scheduler<Terminal>,
    terminal: Terminal,
    arrivals: ProcessId,
}

impl Orchestrator {
    /// Build a run from `config`
    ///
    /// # Errors
    /// `SimulationError::InvalidConfig` if the config fails validation
    pub fn new(config: TerminalConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let config_hash = config.config_hash()?;

        let mut scheduler = Scheduler::new();
        let layout = TerminalLayout::install(
            &mut scheduler,
            config.berth_count,
            config.crane_count,
            &config.crane_assignment,
            config.truck_capacity,
        )?;

        let timing = DischargeTiming {
            crane_cycle: config.crane_cycle_delay,
            transport: config.transport_delay,
        };
        let terminal = Terminal::new(layout, timing, RngManager::new(config.rng_seed));

        let source = ArrivalSource::new(config.inter_arrival, config.containers, config.admission)
            .with_limit(config.max_arrivals);
        let arrivals = scheduler.spawn("arrivals", Box::new(source));

        info!(
            config_hash = %config_hash,
            berths = config.berth_count,
            cranes = config.crane_count,
            trucks = config.truck_capacity,
            seed = config.rng_seed,
            "terminal assembled"
        );

        Ok(Self {
            config,
            config_hash,
            scheduler,
            terminal,
            arrivals,
        })
    }

    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    pub fn scheduler(&self) -> &Scheduler<Terminal> {
        &self.scheduler
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    /// Process id of the arrival source
    pub fn arrival_process(&self) -> ProcessId {
        self.arrivals
    }

    /// Put a vessel at `berth` without going through the arrival source
    ///
    /// The vessel arrives at the current instant and queues for its berth
    /// like any other; admission policy does not apply.
    ///
    /// # Errors
    /// `EngineError::InvalidLayout` (wrapped) for a berth outside the layout;
    /// `InvalidConfig` for an empty vessel
    pub fn spawn_vessel(
        &mut self,
        containers: u32,
        berth: usize,
    ) -> Result<ProcessId, SimulationError> {
        if containers == 0 {
            return Err(SimulationError::InvalidConfig(
                "vessels must carry at least one container".to_string(),
            ));
        }

        let name = self.terminal.next_vessel_name();
        let vessel = Vessel::new(name.clone(), containers, berth);
        let process = DischargeProcess::new(vessel, self.terminal.layout())?;

        self.terminal.record(Event::VesselArrived {
            time: self.scheduler.now(),
            vessel: name.clone(),
            berth,
            containers,
        });
        Ok(self.scheduler.spawn(format!("discharge {name}"), Box::new(process)))
    }

    /// Run to the configured horizon
    pub fn run(mut self) -> Result<SimulationOutcome, SimulationError> {
        let report = self
            .scheduler
            .run_until(&mut self.terminal, self.config.horizon)?;

        let event_log = self.terminal.into_event_log();
        info!(
            events = event_log.len(),
            digest = %event_log.digest(),
            "simulation complete"
        );

        Ok(SimulationOutcome {
            report,
            event_log,
            config_hash: self.config_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrivals::InterArrival;

    fn quiet_config() -> TerminalConfig {
        TerminalConfig {
            max_arrivals: Some(0),
            horizon: 500.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_invalid_config_rejected_before_run() {
        let config = TerminalConfig {
            truck_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            Orchestrator::new(config),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_arrival_limit_means_empty_log() {
        let outcome = Orchestrator::new(quiet_config()).unwrap().run().unwrap();
        assert!(outcome.event_log.is_empty());
        assert_eq!(outcome.report.live_processes, 0);
    }

    #[test]
    fn test_injected_vessel_departs() {
        let mut orchestrator = Orchestrator::new(quiet_config()).unwrap();
        orchestrator.spawn_vessel(1, 0).unwrap();

        let outcome = orchestrator.run().unwrap();
        assert_eq!(outcome.vessels_departed(), 1);
        assert_eq!(outcome.containers_transported(), 1);
    }

    #[test]
    fn test_injected_vessel_on_missing_berth() {
        let mut orchestrator = Orchestrator::new(quiet_config()).unwrap();
        let err = orchestrator.spawn_vessel(1, 5).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Engine(EngineError::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_fixed_arrivals_drop_when_berths_full() {
        let config = TerminalConfig {
            berth_count: 1,
            crane_count: 1,
            inter_arrival: InterArrival::Fixed { interval: 1.0 },
            max_arrivals: Some(3),
            horizon: 100.0,
            ..Default::default()
        };
        let outcome = Orchestrator::new(config).unwrap().run().unwrap();

        // arrivals at 1, 2, 3; only the first finds the berth free
        assert_eq!(outcome.arrivals_dropped(), 2);
    }
}
