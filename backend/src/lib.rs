//! Terminal Simulator Core - Rust Engine
//!
//! Discrete-event simulation of a container terminal with deterministic
//! execution.
//!
//! # Architecture
//!
//! - **core**: Simulated time and the event queue
//! - **rng**: Deterministic random number generation
//! - **resources**: Counted resource pools with FIFO wait lists
//! - **scheduler**: Cooperative process scheduler
//! - **models**: Domain types (Vessel, Event, EventLog)
//! - **terminal**: Terminal layout and the vessel discharge workflow
//! - **arrivals**: Vessel arrival source
//! - **orchestrator**: Configuration and the top-level run
//!
//! # Critical Invariants
//!
//! 1. Simulated time never decreases
//! 2. A pool never has more units held than its capacity
//! 3. Waiters on a pool are served strictly in arrival order
//! 4. All randomness is deterministic (seeded RNG)

// Module declarations
pub mod arrivals;
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod resources;
pub mod rng;
pub mod scheduler;
pub mod terminal;

// Re-exports for convenience
pub use arrivals::{AdmissionPolicy, ArrivalSource, ContainerCount, InterArrival};
pub use crate::core::{ClockError, EventHandle, EventQueue, SimTime};
pub use models::{
    event::{Event, EventLog},
    vessel::{Vessel, VesselError},
};
pub use orchestrator::{Orchestrator, SimulationError, SimulationOutcome, TerminalConfig};
pub use resources::{AcquireOutcome, PoolId, PoolStats, ResourceError, ResourcePool};
pub use rng::RngManager;
pub use scheduler::{
    EngineError, Process, ProcessContext, ProcessId, ProcessState, RunReport, Scheduler, Step,
};
pub use terminal::{DischargeProcess, DischargeTiming, Terminal, TerminalLayout};
