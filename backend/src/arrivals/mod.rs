//! Vessel arrival source
//!
//! The arrival source is a process that sleeps for a random inter-arrival gap,
//! handles one arrival, and repeats for as long as the run lasts. All draws
//! come from the terminal's seeded RNG, so arrivals are deterministic.
//!
//! # Key Principles
//!
//! 1. **Determinism**: same seed + same config → same arrival instants
//! 2. **Pluggable gaps**: exponential (reference behavior) or fixed
//! 3. **Admission**: an arrival that finds no free berth is dropped by
//!    default; with [`AdmissionPolicy::Queue`] it waits for the least loaded
//!    berth instead
//!
//! # Example
//!
//! ```
//! use terminal_simulator_core_rs::arrivals::{ContainerCount, InterArrival};
//! use terminal_simulator_core_rs::RngManager;
//!
//! let mut rng = RngManager::new(42);
//! let gap = InterArrival::Exponential { mean: 5.0 }.sample(&mut rng);
//! let load = ContainerCount::Uniform { min: 100, max: 200 }.sample(&mut rng);
//! assert!(gap >= 0.0);
//! assert!((100..=200).contains(&load));
//! ```

use crate::models::{Event, Vessel};
use crate::rng::RngManager;
use crate::scheduler::{EngineError, Process, ProcessContext, Step};
use crate::terminal::{DischargeProcess, Terminal};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Distribution of the gap between consecutive arrivals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InterArrival {
    /// Poisson arrivals with the given mean gap
    Exponential { mean: f64 },

    /// Deterministic arrivals every `interval` units
    Fixed { interval: f64 },
}

impl Default for InterArrival {
    fn default() -> Self {
        InterArrival::Exponential { mean: 5.0 }
    }
}

impl InterArrival {
    /// Draw the next gap
    pub fn sample(&self, rng: &mut RngManager) -> f64 {
        match self {
            InterArrival::Exponential { mean } => rng.exponential(*mean),
            InterArrival::Fixed { interval } => *interval,
        }
    }

    /// Check parameters, describing the first problem found
    pub fn validate(&self) -> Result<(), String> {
        match self {
            InterArrival::Exponential { mean } if !(mean.is_finite() && *mean > 0.0) => {
                Err(format!("inter-arrival mean must be finite and > 0, got {mean}"))
            }
            InterArrival::Fixed { interval } if !(interval.is_finite() && *interval > 0.0) => Err(
                format!("inter-arrival interval must be finite and > 0, got {interval}"),
            ),
            _ => Ok(()),
        }
    }
}

/// Containers on board a newly arrived vessel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContainerCount {
    Fixed { count: u32 },

    /// Uniform between `min` and `max` inclusive
    Uniform { min: u32, max: u32 },
}

impl Default for ContainerCount {
    fn default() -> Self {
        ContainerCount::Fixed { count: 150 }
    }
}

impl ContainerCount {
    /// Draw a load; `Fixed` consumes no randomness
    pub fn sample(&self, rng: &mut RngManager) -> u32 {
        match self {
            ContainerCount::Fixed { count } => *count,
            ContainerCount::Uniform { min, max } => rng.range_inclusive(*min, *max),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            ContainerCount::Fixed { count: 0 } => {
                Err("vessels must carry at least one container".to_string())
            }
            ContainerCount::Uniform { min, max } if *min == 0 || min > max => Err(format!(
                "container range must satisfy 1 <= min <= max, got {min}..={max}"
            )),
            _ => Ok(()),
        }
    }
}

/// What happens to an arrival that finds every berth occupied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionPolicy {
    /// Turn the vessel away
    #[default]
    Drop,

    /// Bind the vessel to the berth with the fewest holders + waiters and
    /// let it wait there in FIFO order
    Queue,
}

/// Process producing vessel arrivals
#[derive(Debug)]
pub struct ArrivalSource {
    inter_arrival: InterArrival,
    containers: ContainerCount,
    admission: AdmissionPolicy,
    /// Stop after this many arrival instants (None = unbounded)
    limit: Option<u64>,
    arrivals: u64,
    started: bool,
}

impl ArrivalSource {
    pub fn new(
        inter_arrival: InterArrival,
        containers: ContainerCount,
        admission: AdmissionPolicy,
    ) -> Self {
        Self {
            inter_arrival,
            containers,
            admission,
            limit: None,
            arrivals: 0,
            started: false,
        }
    }

    /// Finish after `limit` arrival instants
    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    /// Berth for the current arrival, if it is admitted
    fn choose_berth(
        &self,
        ctx: &ProcessContext<'_, Terminal>,
    ) -> Result<Option<usize>, EngineError> {
        let berths = ctx.world().layout().berths();

        let mut least_loaded: Option<(usize, usize)> = None;
        for (index, &berth) in berths.iter().enumerate() {
            let pool = ctx.pool(berth)?;
            if pool.held() == 0 {
                return Ok(Some(index));
            }

            let load = pool.held() + pool.waiting();
            if least_loaded.is_none_or(|(_, best)| load < best) {
                least_loaded = Some((index, load));
            }
        }

        Ok(match self.admission {
            AdmissionPolicy::Drop => None,
            AdmissionPolicy::Queue => least_loaded.map(|(index, _)| index),
        })
    }

    fn handle_arrival(
        &mut self,
        ctx: &mut ProcessContext<'_, Terminal>,
    ) -> Result<(), EngineError> {
        self.arrivals += 1;
        let now = ctx.now();

        let Some(berth) = self.choose_berth(ctx)? else {
            debug!(arrival = self.arrivals, %now, "no free berth, arrival dropped");
            ctx.world_mut().record(Event::ArrivalDropped {
                time: now,
                arrival: self.arrivals,
            });
            return Ok(());
        };

        let terminal = ctx.world_mut();
        let name = terminal.next_vessel_name();
        let containers = self.containers.sample(terminal.rng_mut());
        let vessel = Vessel::new(name.clone(), containers, berth);
        let process = DischargeProcess::new(vessel, terminal.layout())?;

        terminal.record(Event::VesselArrived {
            time: now,
            vessel: name.clone(),
            berth,
            containers,
        });
        ctx.spawn(format!("discharge {name}"), Box::new(process));
        Ok(())
    }
}

impl Process<Terminal> for ArrivalSource {
    fn resume(&mut self, ctx: &mut ProcessContext<'_, Terminal>) -> Result<Step, EngineError> {
        if self.started {
            self.handle_arrival(ctx)?;
        }
        self.started = true;

        if self.limit.is_some_and(|limit| self.arrivals >= limit) {
            return Ok(Step::Finish);
        }

        let gap = self.inter_arrival.sample(ctx.world_mut().rng_mut());
        Ok(Step::Timeout(gap))
    }
}
