//! Clock and time-ordered event queue
//!
//! `EventQueue` owns the authoritative simulated time and the set of pending
//! wake-ups. It is the only component allowed to move the clock, and it only
//! does so from [`EventQueue::pop_next`].
//!
//! # Ordering
//!
//! Wake-ups are ordered by due time, then by sequence number. Sequence numbers
//! are handed out in insertion order, so wake-ups due at the same instant are
//! dispatched first-scheduled, first-served.

use crate::core::time::SimTime;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use thiserror::Error;

/// Errors raised while scheduling against the clock
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClockError {
    #[error("Invalid delay {0}: delays must be finite and >= 0")]
    InvalidDelay(f64),
}

/// Identifies a scheduled wake-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventHandle {
    /// Instant the wake-up fires
    pub due: SimTime,
    /// Insertion order tie-breaker
    pub seq: u64,
}

/// A scheduled resumption carrying its continuation
#[derive(Debug, Clone)]
pub struct Wakeup<C> {
    pub due: SimTime,
    pub seq: u64,
    pub continuation: C,
}

impl<C> Wakeup<C> {
    pub fn handle(&self) -> EventHandle {
        EventHandle {
            due: self.due,
            seq: self.seq,
        }
    }
}

// Heap ordering ignores the continuation; (due, seq) is unique per queue.
impl<C> PartialEq for Wakeup<C> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<C> Eq for Wakeup<C> {}

impl<C> PartialOrd for Wakeup<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C> Ord for Wakeup<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Simulated clock plus pending wake-ups
///
/// # Example
/// ```
/// use terminal_simulator_core_rs::core::EventQueue;
///
/// let mut queue = EventQueue::new();
/// queue.schedule_after(6.0, "transport").unwrap();
/// queue.schedule_after(3.0, "crane").unwrap();
///
/// let first = queue.pop_next().unwrap();
/// assert_eq!(first.continuation, "crane");
/// assert_eq!(queue.now().as_f64(), 3.0);
/// ```
#[derive(Debug)]
pub struct EventQueue<C> {
    now: SimTime,
    next_seq: u64,
    heap: BinaryHeap<Reverse<Wakeup<C>>>,
}

impl<C> Default for EventQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> EventQueue<C> {
    /// Create an empty queue with the clock at zero
    pub fn new() -> Self {
        Self {
            now: SimTime::ZERO,
            next_seq: 0,
            heap: BinaryHeap::new(),
        }
    }

    /// Current simulated time
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Schedule `continuation` to fire `delay` units from now
    ///
    /// A zero delay still goes through the queue: the continuation runs after
    /// everything already due at `now()`.
    ///
    /// # Errors
    /// `ClockError::InvalidDelay` if `delay` is negative or not finite.
    pub fn schedule_after(
        &mut self,
        delay: f64,
        continuation: C,
    ) -> Result<EventHandle, ClockError> {
        let due = self
            .now
            .after(delay)
            .ok_or(ClockError::InvalidDelay(delay))?;

        let seq = self.next_seq;
        self.next_seq += 1;

        let wakeup = Wakeup {
            due,
            seq,
            continuation,
        };
        let handle = wakeup.handle();
        self.heap.push(Reverse(wakeup));
        Ok(handle)
    }

    /// Schedule `continuation` at the current instant
    pub fn schedule_now(&mut self, continuation: C) -> EventHandle {
        let seq = self.next_seq;
        self.next_seq += 1;

        let wakeup = Wakeup {
            due: self.now,
            seq,
            continuation,
        };
        let handle = wakeup.handle();
        self.heap.push(Reverse(wakeup));
        handle
    }

    /// Due time of the earliest pending wake-up
    pub fn peek_due(&self) -> Option<SimTime> {
        self.heap.peek().map(|Reverse(w)| w.due)
    }

    /// Remove the earliest wake-up and advance the clock to its due time
    pub fn pop_next(&mut self) -> Option<Wakeup<C>> {
        let Reverse(wakeup) = self.heap.pop()?;
        debug_assert!(wakeup.due >= self.now, "clock would move backwards");
        self.now = wakeup.due;
        Some(wakeup)
    }

    /// Number of pending wake-ups
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
