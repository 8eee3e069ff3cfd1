//! Domain models for the terminal simulation

pub mod event;
pub mod vessel;

// Re-exports
pub use event::{Event, EventLog};
pub use vessel::{Vessel, VesselError};
