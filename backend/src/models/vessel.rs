//! Vessel model
//!
//! A vessel is created by the arrival source, bound to one berth for life, and
//! then owned by its discharge process. Only that process touches the
//! container count, which falls one at a time from the initial load to zero.

use thiserror::Error;

/// Vessel errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VesselError {
    #[error("Vessel {name} has no containers left to discharge")]
    AlreadyEmpty { name: String },
}

/// A vessel waiting for or undergoing discharge
///
/// # Example
/// ```
/// use terminal_simulator_core_rs::Vessel;
///
/// let mut vessel = Vessel::new("V1", 2, 0);
/// assert_eq!(vessel.discharge_one().unwrap(), 1);
/// assert_eq!(vessel.discharge_one().unwrap(), 0);
/// assert!(vessel.discharge_one().is_err());
/// assert_eq!(vessel.discharged(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vessel {
    name: String,
    initial_containers: u32,
    remaining: u32,
    berth: usize,
}

impl Vessel {
    /// Create a vessel bound to `berth`
    pub fn new(name: impl Into<String>, containers: u32, berth: usize) -> Self {
        Self {
            name: name.into(),
            initial_containers: containers,
            remaining: containers,
            berth,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Berth index, fixed at creation
    pub fn berth(&self) -> usize {
        self.berth
    }

    /// Containers on board when the vessel arrived
    pub fn initial_containers(&self) -> u32 {
        self.initial_containers
    }

    /// Containers still on board
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Containers taken off so far
    pub fn discharged(&self) -> u32 {
        self.initial_containers - self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// Take one container off, returning how many are left
    ///
    /// # Errors
    /// `VesselError::AlreadyEmpty` if nothing is left on board
    pub fn discharge_one(&mut self) -> Result<u32, VesselError> {
        self.remaining = self
            .remaining
            .checked_sub(1)
            .ok_or_else(|| VesselError::AlreadyEmpty {
                name: self.name.clone(),
            })?;
        Ok(self.remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_vessel_is_full() {
        let vessel = Vessel::new("V7", 150, 1);
        assert_eq!(vessel.name(), "V7");
        assert_eq!(vessel.berth(), 1);
        assert_eq!(vessel.remaining(), 150);
        assert_eq!(vessel.discharged(), 0);
        assert!(!vessel.is_empty());
    }

    #[test]
    fn test_empty_vessel_stays_at_zero() {
        let mut vessel = Vessel::new("V0", 0, 0);
        assert!(vessel.is_empty());
        assert_eq!(
            vessel.discharge_one(),
            Err(VesselError::AlreadyEmpty {
                name: "V0".to_string()
            })
        );
        assert_eq!(vessel.remaining(), 0);
    }
}
