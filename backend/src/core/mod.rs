//! Simulated clock and event queue

pub mod queue;
pub mod time;

pub use queue::{ClockError, EventHandle, EventQueue, Wakeup};
pub use time::SimTime;
