//! Orchestrator - configuration and the top-level run entry point
//!
//! - **config**: `TerminalConfig`, validation and config hashing
//! - **engine**: `Orchestrator`, `SimulationOutcome`, `SimulationError`

pub mod config;
pub mod engine;

pub use config::TerminalConfig;
pub use engine::{Orchestrator, SimulationError, SimulationOutcome};
