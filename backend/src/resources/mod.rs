//! Capacity-bounded resources shared between processes
//!
//! Berths, quay cranes and the truck pool are all instances of the same
//! primitive: a [`ResourcePool`] with a fixed number of units and a FIFO wait
//! list. Pools are owned by the scheduler and touched only through
//! acquire/release.

pub mod pool;

pub use pool::{AcquireOutcome, PoolId, PoolStats, ResourceError, ResourcePool};
