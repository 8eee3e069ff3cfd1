//! FIFO-fair resource pool
//!
//! # Critical Invariants
//!
//! 1. **Capacity**: `held() <= capacity()` at all times
//! 2. **FIFO**: waiters are granted strictly in request order; nobody
//!    overtakes an earlier waiter while the pool is exhausted
//! 3. **Balanced release**: only a current holder may release a unit;
//!    anything else is an `UnbalancedRelease` error, never a silent no-op
//! 4. **Hand-over**: a released unit goes straight to the head waiter, so a
//!    pool with waiters is always full

use crate::scheduler::ProcessId;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

/// Index of a pool inside the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PoolId(pub usize);

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool#{}", self.0)
    }
}

/// Resource pool errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceError {
    #[error("Pool '{name}' must have a positive capacity")]
    ZeroCapacity { name: String },

    #[error("Unbalanced release on pool '{pool}': {process} holds no unit")]
    UnbalancedRelease { pool: String, process: ProcessId },
}

/// Result of an acquisition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// A unit was free and is now held by the requester
    Granted,
    /// The pool is exhausted; the requester is waiting at `position` (0 = head)
    Queued { position: usize },
}

/// Lifetime counters for a pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Units granted, immediately or after waiting
    pub grants: u64,
    /// Grants that had to wait in the queue first
    pub delayed_grants: u64,
    /// Highest number of units held at once
    pub peak_held: usize,
    /// Longest wait list observed
    pub peak_waiting: usize,
}

/// Capacity-bounded mutual exclusion with a FIFO wait list
///
/// # Example
/// ```
/// use terminal_simulator_core_rs::resources::{AcquireOutcome, PoolId, ResourcePool};
/// use terminal_simulator_core_rs::scheduler::ProcessId;
///
/// let mut crane = ResourcePool::new(PoolId(0), "crane_0", 1).unwrap();
/// assert_eq!(crane.acquire(ProcessId(1)), AcquireOutcome::Granted);
/// assert_eq!(crane.acquire(ProcessId(2)), AcquireOutcome::Queued { position: 0 });
///
/// // Releasing hands the unit straight to the waiter
/// assert_eq!(crane.release(ProcessId(1)).unwrap(), Some(ProcessId(2)));
/// assert_eq!(crane.held(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ResourcePool {
    id: PoolId,
    name: String,
    capacity: usize,
    holders: Vec<ProcessId>,
    waiters: VecDeque<ProcessId>,
    stats: PoolStats,
}

impl ResourcePool {
    /// Create an empty pool
    ///
    /// # Errors
    /// `ResourceError::ZeroCapacity` if `capacity` is 0
    pub fn new(
        id: PoolId,
        name: impl Into<String>,
        capacity: usize,
    ) -> Result<Self, ResourceError> {
        let name = name.into();
        if capacity == 0 {
            return Err(ResourceError::ZeroCapacity { name });
        }

        Ok(Self {
            id,
            name,
            capacity,
            holders: Vec::with_capacity(capacity),
            waiters: VecDeque::new(),
            stats: PoolStats::default(),
        })
    }

    pub fn id(&self) -> PoolId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Units currently held
    pub fn held(&self) -> usize {
        self.holders.len()
    }

    /// Units free right now
    pub fn available(&self) -> usize {
        self.capacity - self.holders.len()
    }

    /// Length of the wait list
    pub fn waiting(&self) -> usize {
        self.waiters.len()
    }

    /// Waiters in grant order
    pub fn waiters(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.waiters.iter().copied()
    }

    /// Units held by `process`
    pub fn held_by(&self, process: ProcessId) -> usize {
        self.holders.iter().filter(|&&p| p == process).count()
    }

    pub fn is_waiting(&self, process: ProcessId) -> bool {
        self.waiters.contains(&process)
    }

    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Request one unit for `process`
    ///
    /// Grants immediately if a unit is free, otherwise appends the requester
    /// to the wait list.
    pub fn acquire(&mut self, process: ProcessId) -> AcquireOutcome {
        if self.holders.len() < self.capacity {
            self.grant(process);
            return AcquireOutcome::Granted;
        }

        self.waiters.push_back(process);
        self.stats.peak_waiting = self.stats.peak_waiting.max(self.waiters.len());
        AcquireOutcome::Queued {
            position: self.waiters.len() - 1,
        }
    }

    /// Return one unit held by `process`
    ///
    /// If anyone is waiting, the unit passes to the head waiter, which is
    /// returned so the caller can schedule its resumption.
    ///
    /// # Errors
    /// `ResourceError::UnbalancedRelease` if `process` holds no unit here
    pub fn release(&mut self, process: ProcessId) -> Result<Option<ProcessId>, ResourceError> {
        let slot = self
            .holders
            .iter()
            .position(|&p| p == process)
            .ok_or_else(|| ResourceError::UnbalancedRelease {
                pool: self.name.clone(),
                process,
            })?;
        self.holders.swap_remove(slot);

        let next = self.waiters.pop_front();
        if let Some(waiter) = next {
            self.grant(waiter);
            self.stats.delayed_grants += 1;
        }
        Ok(next)
    }

    fn grant(&mut self, process: ProcessId) {
        self.holders.push(process);
        self.stats.grants += 1;
        self.stats.peak_held = self.stats.peak_held.max(self.holders.len());
        debug_assert!(self.holders.len() <= self.capacity);
    }
}
