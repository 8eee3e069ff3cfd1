//! Simulated time
//!
//! The simulation runs on a continuous clock measured in abstract time units
//! (minutes in the reference deployment). `SimTime` is the value type used for
//! every timestamp; the clock that owns "now" lives in [`crate::core::queue`].

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A point on the simulated timeline
///
/// Always finite and non-negative. Ordering is total, so `SimTime` can key a
/// binary heap directly.
///
/// # Example
/// ```
/// use terminal_simulator_core_rs::SimTime;
///
/// let t = SimTime::ZERO.after(3.0).unwrap();
/// assert_eq!(t.as_f64(), 3.0);
/// assert!(t > SimTime::ZERO);
/// ```
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime(f64);

impl SimTime {
    /// Start of every simulation
    pub const ZERO: SimTime = SimTime(0.0);

    /// Create a timestamp, rejecting negative or non-finite values
    ///
    /// # Example
    /// ```
    /// use terminal_simulator_core_rs::SimTime;
    ///
    /// assert!(SimTime::new(18.0).is_some());
    /// assert!(SimTime::new(-1.0).is_none());
    /// assert!(SimTime::new(f64::NAN).is_none());
    /// ```
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && value >= 0.0 {
            // Normalise -0.0 so equal instants compare equal under total_cmp
            Some(SimTime(value + 0.0))
        } else {
            None
        }
    }

    /// Raw value in time units
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// The instant `delay` units after this one
    ///
    /// Returns `None` if `delay` is negative or the sum is not finite.
    pub fn after(self, delay: f64) -> Option<Self> {
        if delay.is_nan() || delay < 0.0 {
            return None;
        }
        SimTime::new(self.0 + delay)
    }

    /// Elapsed units from `earlier` to `self` (zero if `earlier` is later)
    pub fn since(self, earlier: SimTime) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

// total_cmp equality is bit equality, so hashing the bits agrees with `Eq`.
impl Hash for SimTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.0}", self.0)
        } else {
            write!(f, "{:.3}", self.0)
        }
    }
}
