//! Cooperative process scheduler
//!
//! - **process**: `Process` trait, `Step`, `ProcessContext`, lifecycle states
//! - **engine**: `Scheduler` dispatch loop and `RunReport`

pub mod engine;
pub mod process;

pub use engine::{PoolSnapshot, RunReport, Scheduler, StarvedProcess};
pub use process::{Process, ProcessContext, ProcessId, ProcessState, Step};

use crate::core::queue::ClockError;
use crate::resources::{PoolId, ResourceError};
use thiserror::Error;

/// Fatal engine errors; any of these aborts the run
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Clock(#[from] ClockError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("Unknown pool: {0}")]
    UnknownPool(PoolId),

    #[error("No runnable process with id {0}")]
    UnknownProcess(ProcessId),

    #[error("Invalid terminal layout: {0}")]
    InvalidLayout(String),

    #[error("Invalid horizon {0}: must be finite and > 0")]
    InvalidHorizon(f64),

    #[error("{process} failed: {reason}")]
    ProcessFault { process: ProcessId, reason: String },
}
