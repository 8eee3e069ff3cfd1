//! Scheduler Engine
//!
//! Single-threaded, cooperative, non-preemptive runtime driving every process
//! of a simulation against one [`EventQueue`].
//!
//! # Dispatch loop
//!
//! ```text
//! while the next wake-up is due before the horizon:
//!   1. pop it (this is the only place the clock moves)
//!   2. resume its process until the process returns a Step
//!   3. Timeout(d)  → queue a wake-up at now + d
//!      Acquire(p)  → free unit: resume again inline at the same instant
//!                    exhausted: park on p's FIFO wait list
//!      Finish      → terminate, releasing anything still held
//! ```
//!
//! Exactly one process is running at any moment; interleaving is purely a
//! matter of simulated time.

use crate::core::queue::EventQueue;
use crate::core::time::SimTime;
use crate::resources::{AcquireOutcome, PoolId, PoolStats, ResourcePool};
use crate::scheduler::process::{Process, ProcessContext, ProcessId, ProcessState, Step};
use crate::scheduler::EngineError;
use serde::Serialize;
use tracing::{debug, info, warn};

// ============================================================================
// Kernel
// ============================================================================

/// Bookkeeping for one spawned process
#[derive(Debug, Clone)]
struct ProcessSlot {
    name: String,
    state: ProcessState,
}

/// Clock, pools and process table
///
/// Split from [`Scheduler`] so a running process can borrow it mutably
/// while the scheduler still owns the process itself.
#[derive(Debug, Default)]
pub(crate) struct Kernel {
    queue: EventQueue<ProcessId>,
    pools: Vec<ResourcePool>,
    slots: Vec<ProcessSlot>,
}

impl Kernel {
    pub(crate) fn now(&self) -> SimTime {
        self.queue.now()
    }

    pub(crate) fn pool(&self, pool: PoolId) -> Result<&ResourcePool, EngineError> {
        self.pools.get(pool.0).ok_or(EngineError::UnknownPool(pool))
    }

    fn pool_mut(&mut self, pool: PoolId) -> Result<&mut ResourcePool, EngineError> {
        self.pools.get_mut(pool.0).ok_or(EngineError::UnknownPool(pool))
    }

    /// Allocate a process id and queue its first resumption at `now()`
    pub(crate) fn register(&mut self, name: String) -> ProcessId {
        let pid = ProcessId(self.slots.len());
        debug!(%pid, name = %name, now = %self.now(), "process created");
        self.slots.push(ProcessSlot {
            name,
            state: ProcessState::Created,
        });
        self.queue.schedule_now(pid);
        pid
    }

    pub(crate) fn release(&mut self, pid: ProcessId, pool: PoolId) -> Result<(), EngineError> {
        let handed_to = self.pool_mut(pool)?.release(pid)?;
        if let Some(waiter) = handed_to {
            debug!(pool = %pool, from = %pid, to = %waiter, "unit handed to waiter");
            self.queue.schedule_now(waiter);
        }
        Ok(())
    }

    fn set_state(&mut self, pid: ProcessId, state: ProcessState) {
        if let Some(slot) = self.slots.get_mut(pid.0) {
            slot.state = state;
        }
    }

    fn name(&self, pid: ProcessId) -> &str {
        self.slots.get(pid.0).map(|s| s.name.as_str()).unwrap_or("?")
    }
}

// ============================================================================
// Run Report
// ============================================================================

/// A process still parked on a wait list when the run ended
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarvedProcess {
    pub process: ProcessId,
    pub name: String,
    pub pool: String,
    /// Position in the wait list (0 = next in line)
    pub position: usize,
}

/// End-of-run view of one pool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolSnapshot {
    pub name: String,
    pub capacity: usize,
    pub held: usize,
    pub waiting: usize,
    pub stats: PoolStats,
}

/// Summary returned by [`Scheduler::run`] and [`Scheduler::run_until`]
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Horizon if one was given, otherwise the time of the last dispatch
    pub end_time: SimTime,
    /// Wake-ups popped from the queue
    pub events_dispatched: u64,
    /// Wake-ups still pending (due at or after the horizon)
    pub pending_events: usize,
    /// Processes that had not terminated
    pub live_processes: usize,
    /// Processes abandoned while waiting on a pool
    pub starved: Vec<StarvedProcess>,
    pub pools: Vec<PoolSnapshot>,
}

// ============================================================================
// Scheduler
// ============================================================================

/// Discrete-event scheduler over world state `W`
///
/// # Example
///
/// ```rust
/// use terminal_simulator_core_rs::scheduler::{
///     EngineError, Process, ProcessContext, Scheduler, Step,
/// };
///
/// struct Ticker { ticks: u32 }
///
/// impl Process<Vec<f64>> for Ticker {
///     fn resume(&mut self, ctx: &mut ProcessContext<'_, Vec<f64>>) -> Result<Step, EngineError> {
///         let now = ctx.now().as_f64();
///         ctx.world_mut().push(now);
///         if self.ticks == 0 {
///             return Ok(Step::Finish);
///         }
///         self.ticks -= 1;
///         Ok(Step::Timeout(2.0))
///     }
/// }
///
/// let mut scheduler = Scheduler::new();
/// scheduler.spawn("ticker", Box::new(Ticker { ticks: 3 }));
///
/// let mut seen = Vec::new();
/// scheduler.run(&mut seen).unwrap();
/// assert_eq!(seen, vec![0.0, 2.0, 4.0, 6.0]);
/// ```
pub struct Scheduler<W> {
    kernel: Kernel,
    processes: Vec<Option<Box<dyn Process<W>>>>,
    dispatched: u64,
}

impl<W> Default for Scheduler<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> Scheduler<W> {
    pub fn new() -> Self {
        Self {
            kernel: Kernel::default(),
            processes: Vec::new(),
            dispatched: 0,
        }
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Create a pool with `capacity` units
    ///
    /// # Errors
    /// `ResourceError::ZeroCapacity` (wrapped) for a zero capacity
    pub fn add_pool(
        &mut self,
        name: impl Into<String>,
        capacity: usize,
    ) -> Result<PoolId, EngineError> {
        let id = PoolId(self.kernel.pools.len());
        let pool = ResourcePool::new(id, name, capacity)?;
        self.kernel.pools.push(pool);
        Ok(id)
    }

    /// Start a process at the current instant
    pub fn spawn(&mut self, name: impl Into<String>, process: Box<dyn Process<W>>) -> ProcessId {
        let pid = self.kernel.register(name.into());
        self.processes.push(Some(process));
        pid
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current simulated time
    pub fn now(&self) -> SimTime {
        self.kernel.now()
    }

    pub fn pool(&self, pool: PoolId) -> Option<&ResourcePool> {
        self.kernel.pools.get(pool.0)
    }

    pub fn pools(&self) -> &[ResourcePool] {
        &self.kernel.pools
    }

    pub fn state(&self, pid: ProcessId) -> Option<ProcessState> {
        self.kernel.slots.get(pid.0).map(|s| s.state)
    }

    pub fn process_count(&self) -> usize {
        self.kernel.slots.len()
    }

    /// Wake-ups not yet dispatched
    pub fn pending_events(&self) -> usize {
        self.kernel.queue.len()
    }

    // ========================================================================
    // Run Loop
    // ========================================================================

    /// Dispatch until the queue is empty
    pub fn run(&mut self, world: &mut W) -> Result<RunReport, EngineError> {
        self.run_loop(world, None)
    }

    /// Dispatch every wake-up due strictly before `horizon`
    ///
    /// # Errors
    /// `EngineError::InvalidHorizon` for a non-positive or non-finite horizon;
    /// any error raised by a process aborts the run.
    pub fn run_until(&mut self, world: &mut W, horizon: f64) -> Result<RunReport, EngineError> {
        let horizon = SimTime::new(horizon)
            .filter(|h| *h > SimTime::ZERO)
            .ok_or(EngineError::InvalidHorizon(horizon))?;
        self.run_loop(world, Some(horizon))
    }

    /// Dispatch the single earliest wake-up, returning its time
    pub fn step(&mut self, world: &mut W) -> Result<Option<SimTime>, EngineError> {
        let Some(wakeup) = self.kernel.queue.pop_next() else {
            return Ok(None);
        };
        self.dispatched += 1;
        self.dispatch(wakeup.continuation, world)?;
        Ok(Some(wakeup.due))
    }

    fn run_loop(
        &mut self,
        world: &mut W,
        horizon: Option<SimTime>,
    ) -> Result<RunReport, EngineError> {
        info!(
            now = %self.now(),
            horizon = ?horizon.map(SimTime::as_f64),
            processes = self.process_count(),
            "run started"
        );

        while let Some(due) = self.kernel.queue.peek_due() {
            if horizon.is_some_and(|h| due >= h) {
                break;
            }
            self.step(world)?;
        }

        let report = self.report(horizon.unwrap_or_else(|| self.now()));
        info!(
            end_time = %report.end_time,
            dispatched = report.events_dispatched,
            live = report.live_processes,
            starved = report.starved.len(),
            "run finished"
        );
        Ok(report)
    }

    fn dispatch(&mut self, pid: ProcessId, world: &mut W) -> Result<(), EngineError> {
        let mut process = self
            .processes
            .get_mut(pid.0)
            .and_then(Option::take)
            .ok_or(EngineError::UnknownProcess(pid))?;

        debug!(%pid, name = self.kernel.name(pid), now = %self.now(), "resume");

        let mut spawned = Vec::new();
        let outcome = self.drive(pid, process.as_mut(), world, &mut spawned);
        self.processes.extend(spawned.into_iter().map(Some));

        if outcome? {
            self.processes[pid.0] = Some(process);
        } else {
            self.terminate(pid)?;
        }
        Ok(())
    }

    /// Resume `process` until it suspends (`true`) or finishes (`false`)
    fn drive(
        &mut self,
        pid: ProcessId,
        process: &mut dyn Process<W>,
        world: &mut W,
        spawned: &mut Vec<Box<dyn Process<W>>>,
    ) -> Result<bool, EngineError> {
        loop {
            self.kernel.set_state(pid, ProcessState::Running);

            let step = {
                let mut ctx = ProcessContext {
                    pid,
                    kernel: &mut self.kernel,
                    spawned: &mut *spawned,
                    world: &mut *world,
                };
                process.resume(&mut ctx)?
            };

            match step {
                Step::Timeout(delay) => {
                    let handle = self.kernel.queue.schedule_after(delay, pid)?;
                    self.kernel.set_state(pid, ProcessState::SuspendedOnTimeout);
                    debug!(%pid, until = %handle.due, "suspended on timeout");
                    return Ok(true);
                }
                Step::Acquire(pool) => match self.kernel.pool_mut(pool)?.acquire(pid) {
                    AcquireOutcome::Granted => continue,
                    AcquireOutcome::Queued { position } => {
                        self.kernel
                            .set_state(pid, ProcessState::SuspendedOnResource(pool));
                        debug!(%pid, %pool, position, "suspended on resource");
                        return Ok(true);
                    }
                },
                Step::Finish => return Ok(false),
            }
        }
    }

    /// Mark `pid` terminated and return any units it still holds
    fn terminate(&mut self, pid: ProcessId) -> Result<(), EngineError> {
        self.kernel.set_state(pid, ProcessState::Terminated);

        for idx in 0..self.kernel.pools.len() {
            let pool = PoolId(idx);
            while self.kernel.pools[idx].held_by(pid) > 0 {
                warn!(
                    %pid,
                    name = self.kernel.name(pid),
                    pool = self.kernel.pools[idx].name(),
                    "process finished while holding a unit; releasing it"
                );
                self.kernel.release(pid, pool)?;
            }
        }

        debug!(%pid, now = %self.now(), "terminated");
        Ok(())
    }

    fn report(&self, end_time: SimTime) -> RunReport {
        let mut starved = Vec::new();
        for pool in &self.kernel.pools {
            for (position, pid) in pool.waiters().enumerate() {
                warn!(
                    %pid,
                    name = self.kernel.name(pid),
                    pool = pool.name(),
                    position,
                    "process still waiting at end of run"
                );
                starved.push(StarvedProcess {
                    process: pid,
                    name: self.kernel.name(pid).to_string(),
                    pool: pool.name().to_string(),
                    position,
                });
            }
        }

        let pools = self
            .kernel
            .pools
            .iter()
            .map(|p| PoolSnapshot {
                name: p.name().to_string(),
                capacity: p.capacity(),
                held: p.held(),
                waiting: p.waiting(),
                stats: p.stats().clone(),
            })
            .collect();

        RunReport {
            end_time,
            events_dispatched: self.dispatched,
            pending_events: self.kernel.queue.len(),
            live_processes: self
                .kernel
                .slots
                .iter()
                .filter(|s| s.state != ProcessState::Terminated)
                .count(),
            starved,
            pools,
        }
    }
}
