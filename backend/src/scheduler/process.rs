//! Process vocabulary
//!
//! A process is an explicit state machine. The scheduler calls
//! [`Process::resume`]; the process does its instantaneous work through the
//! [`ProcessContext`] and hands back a [`Step`] naming its next suspension
//! point. The scheduler records the wake condition (a queued timeout or a
//! pool wait-list slot) and resumes the process once it is met.

use crate::core::time::SimTime;
use crate::resources::{PoolId, ResourcePool};
use crate::scheduler::engine::Kernel;
use crate::scheduler::EngineError;
use serde::Serialize;
use std::fmt;

/// Dense process index, assigned in spawn order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProcessId(pub usize);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "process#{}", self.0)
    }
}

/// Lifecycle of a process
///
/// `Created → Running ⇄ Suspended* → Terminated`. A terminated process is
/// never resumed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessState {
    Created,
    Running,
    SuspendedOnTimeout,
    SuspendedOnResource(PoolId),
    Terminated,
}

/// What a process wants next
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Sleep for the given number of time units
    Timeout(f64),
    /// Take one unit of a pool; resumed once the unit is held
    Acquire(PoolId),
    /// Workflow complete
    Finish,
}

/// A cooperatively scheduled unit of simulated activity
///
/// `W` is the world state shared by all processes of a simulation.
pub trait Process<W> {
    /// Run until the next suspension point
    fn resume(&mut self, ctx: &mut ProcessContext<'_, W>) -> Result<Step, EngineError>;
}

/// Everything a process may touch while it is running
pub struct ProcessContext<'a, W> {
    pub(crate) pid: ProcessId,
    pub(crate) kernel: &'a mut Kernel,
    pub(crate) spawned: &'a mut Vec<Box<dyn Process<W>>>,
    pub(crate) world: &'a mut W,
}

impl<'a, W> ProcessContext<'a, W> {
    /// Id of the running process
    pub fn id(&self) -> ProcessId {
        self.pid
    }

    /// Current simulated time
    pub fn now(&self) -> SimTime {
        self.kernel.now()
    }

    pub fn world(&self) -> &W {
        &*self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut *self.world
    }

    /// Read-only view of a pool
    pub fn pool(&self, pool: PoolId) -> Result<&ResourcePool, EngineError> {
        self.kernel.pool(pool)
    }

    /// Give back one unit of `pool` held by the running process
    ///
    /// Never suspends. If a waiter takes over the unit, its resumption is
    /// queued at the current instant.
    pub fn release(&mut self, pool: PoolId) -> Result<(), EngineError> {
        self.kernel.release(self.pid, pool)
    }

    /// Start a new process at the current instant
    ///
    /// The new process first runs after every wake-up already due now.
    pub fn spawn(&mut self, name: impl Into<String>, process: Box<dyn Process<W>>) -> ProcessId {
        let pid = self.kernel.register(name.into());
        self.spawned.push(process);
        pid
    }

    /// Build a workflow fault for the running process
    pub fn fault(&self, reason: impl Into<String>) -> EngineError {
        EngineError::ProcessFault {
            process: self.pid,
            reason: reason.into(),
        }
    }
}
