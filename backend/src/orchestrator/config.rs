//! Simulation configuration
//!
//! Every option of a run in one serde-friendly struct. `Default` reproduces
//! the reference terminal: one day (1440 minutes), two berths each with its
//! own crane, three trucks, an arrival every 5 minutes on average, and 150
//! containers per vessel.

use crate::arrivals::{AdmissionPolicy, ContainerCount, InterArrival};
use crate::orchestrator::SimulationError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Complete terminal configuration
///
/// # Example
/// ```
/// use terminal_simulator_core_rs::TerminalConfig;
///
/// let config = TerminalConfig {
///     truck_capacity: 1,
///     ..TerminalConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Run length in time units; events due at or after it never fire
    pub horizon: f64,

    pub berth_count: usize,

    pub crane_count: usize,

    /// Crane index for each berth; empty pairs berth `i` with crane `i`
    pub crane_assignment: Vec<usize>,

    pub truck_capacity: usize,

    /// Gap between vessel arrivals
    pub inter_arrival: InterArrival,

    /// Pause before each crane move
    pub crane_cycle_delay: f64,

    /// Truck trip from quay to yard
    pub transport_delay: f64,

    /// Load of each new vessel
    pub containers: ContainerCount,

    /// Seed for every random draw in the run
    pub rng_seed: u64,

    /// Fate of arrivals that find no free berth
    pub admission: AdmissionPolicy,

    /// Stop generating arrivals after this many (None = unbounded)
    pub max_arrivals: Option<u64>,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            horizon: 1440.0,
            berth_count: 2,
            crane_count: 2,
            crane_assignment: Vec::new(),
            truck_capacity: 3,
            inter_arrival: InterArrival::default(),
            crane_cycle_delay: 3.0,
            transport_delay: 6.0,
            containers: ContainerCount::default(),
            rng_seed: 42,
            admission: AdmissionPolicy::Drop,
            max_arrivals: None,
        }
    }
}

impl TerminalConfig {
    /// Reject anything that would make the run meaningless
    ///
    /// Checked before any pool or process exists, so a bad config never
    /// produces a partial run.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let invalid = |msg: String| Err(SimulationError::InvalidConfig(msg));

        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return invalid(format!("horizon must be finite and > 0, got {}", self.horizon));
        }
        if self.berth_count == 0 {
            return invalid("berth_count must be > 0".to_string());
        }
        if self.crane_count == 0 {
            return invalid("crane_count must be > 0".to_string());
        }
        if self.truck_capacity == 0 {
            return invalid("truck_capacity must be > 0".to_string());
        }

        if !self.crane_assignment.is_empty() {
            if self.crane_assignment.len() != self.berth_count {
                return invalid(format!(
                    "crane_assignment has {} entries for {} berths",
                    self.crane_assignment.len(),
                    self.berth_count
                ));
            }
            if let Some(&crane) = self.crane_assignment.iter().find(|&&c| c >= self.crane_count) {
                return invalid(format!(
                    "crane_assignment refers to crane {} but only {} cranes exist",
                    crane, self.crane_count
                ));
            }
        } else if self.crane_count < self.berth_count {
            return invalid(format!(
                "{} berths need {} cranes for one-to-one pairing, got {}",
                self.berth_count, self.berth_count, self.crane_count
            ));
        }

        for (name, delay) in [
            ("crane_cycle_delay", self.crane_cycle_delay),
            ("transport_delay", self.transport_delay),
        ] {
            if !(delay.is_finite() && delay > 0.0) {
                return invalid(format!("{name} must be finite and > 0, got {delay}"));
            }
        }

        self.inter_arrival
            .validate()
            .map_err(SimulationError::InvalidConfig)?;
        self.containers
            .validate()
            .map_err(SimulationError::InvalidConfig)?;

        Ok(())
    }

    /// SHA-256 of the config's JSON form, hex encoded
    ///
    /// Field order is fixed by the struct, so equal configs hash equal.
    pub fn config_hash(&self) -> Result<String, SimulationError> {
        let json = serde_json::to_string(self).map_err(|e| {
            SimulationError::SerializationError(format!("Config serialization failed: {}", e))
        })?;

        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}
