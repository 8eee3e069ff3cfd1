//! xorshift64* random number generator
//!
//! Small, fast and deterministic. Same seed, same sequence, which is what
//! makes two runs of the terminal with the same configuration produce
//! byte-identical event logs.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use terminal_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let gap = rng.exponential(5.0);
/// let containers = rng.range_inclusive(100, 200);
/// assert!(gap >= 0.0);
/// assert!((100..=200).contains(&containers));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is mapped to 1 (xorshift has an all-zero fixed point).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Uniform integer in `[min, max]`
    ///
    /// # Panics
    /// Panics if `min > max`
    pub fn range_inclusive(&mut self, min: u32, max: u32) -> u32 {
        assert!(min <= max, "min must not exceed max");

        let span = u64::from(max - min) + 1;
        min + (self.next() % span) as u32
    }

    /// Uniform f64 in `[0.0, 1.0)`
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Exponentially distributed sample with the given mean
    ///
    /// Inverse-CDF sampling on `1 - u` so the logarithm never sees zero.
    ///
    /// # Example
    /// ```
    /// use terminal_simulator_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(7);
    /// let samples: Vec<f64> = (0..10_000).map(|_| rng.exponential(5.0)).collect();
    /// let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    /// assert!((mean - 5.0).abs() < 0.5);
    /// ```
    pub fn exponential(&mut self, mean: f64) -> f64 {
        let u = self.next_f64();
        -mean * (1.0 - u).ln()
    }

    /// Get current RNG state
    pub fn get_state(&self) -> u64 {
        self.state
    }
}
