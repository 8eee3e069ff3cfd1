//! Deterministic random number generation
//!
//! Uses xorshift64* for fast, reproducible draws.
//! Every random quantity in a run (inter-arrival gaps, container counts) is
//! drawn from the single `RngManager` owned by the terminal, so a seed fully
//! determines the event log.

mod xorshift;

pub use xorshift::RngManager;
