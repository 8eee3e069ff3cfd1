//! Vessel discharge workflow
//!
//! One process per vessel:
//!
//! ```text
//! AwaitingBerth → Berthed → Unloading(k) → Departed
//!
//! per container:
//!   wait crane_cycle
//!   acquire crane (dedicated to the berth)
//!   acquire truck (shared pool)
//!   wait transport
//!   k -= 1
//!   release truck, release crane
//! ```
//!
//! Each truck is rented for one container only and is back in the pool
//! before the next crane acquisition.

use crate::models::{Event, Vessel};
use crate::resources::PoolId;
use crate::scheduler::{EngineError, Process, ProcessContext, Step};
use crate::terminal::{Terminal, TerminalLayout};

/// Suspension point the process is parked at
///
/// `AwaitingBerth` is the workflow's AwaitingBerth state; the crane/truck
/// phases together make up Berthed and Unloading(k).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Not started yet
    Arrived,
    AwaitingBerth,
    /// Crane-cycle pause before the next move
    CraneCycle,
    AwaitingCrane,
    AwaitingTruck,
    /// Truck on its way to the yard
    Transporting,
    Departed,
}

/// Discharge process for one vessel
#[derive(Debug)]
pub struct DischargeProcess {
    vessel: Vessel,
    berth: PoolId,
    crane_index: usize,
    crane: PoolId,
    trucks: PoolId,
    phase: Phase,
}

impl DischargeProcess {
    /// Bind `vessel` to its berth's resources
    ///
    /// # Errors
    /// `EngineError::InvalidLayout` if the vessel's berth is not in `layout`
    pub fn new(vessel: Vessel, layout: &TerminalLayout) -> Result<Self, EngineError> {
        let berth = layout.berth(vessel.berth()).ok_or_else(|| {
            EngineError::InvalidLayout(format!(
                "vessel {} assigned to missing berth_{}",
                vessel.name(),
                vessel.berth()
            ))
        })?;
        let (crane_index, crane) = layout.crane_for_berth(vessel.berth()).ok_or_else(|| {
            EngineError::InvalidLayout(format!("berth_{} has no crane", vessel.berth()))
        })?;

        Ok(Self {
            vessel,
            berth,
            crane_index,
            crane,
            trucks: layout.trucks(),
            phase: Phase::Arrived,
        })
    }

    /// Start the next container cycle, or leave if the hold is empty
    fn next_cycle(&mut self, ctx: &mut ProcessContext<'_, Terminal>) -> Result<Step, EngineError> {
        if !self.vessel.is_empty() {
            self.phase = Phase::CraneCycle;
            return Ok(Step::Timeout(ctx.world().timing().crane_cycle));
        }

        ctx.release(self.berth)?;
        self.phase = Phase::Departed;

        let event = Event::VesselDeparted {
            time: ctx.now(),
            vessel: self.vessel.name().to_string(),
            berth: self.vessel.berth(),
            containers: self.vessel.discharged(),
        };
        ctx.world_mut().record(event);
        Ok(Step::Finish)
    }
}

impl Process<Terminal> for DischargeProcess {
    fn resume(&mut self, ctx: &mut ProcessContext<'_, Terminal>) -> Result<Step, EngineError> {
        match self.phase {
            Phase::Arrived => {
                self.phase = Phase::AwaitingBerth;
                Ok(Step::Acquire(self.berth))
            }

            Phase::AwaitingBerth => {
                let event = Event::VesselBerthed {
                    time: ctx.now(),
                    vessel: self.vessel.name().to_string(),
                    berth: self.vessel.berth(),
                };
                ctx.world_mut().record(event);
                self.next_cycle(ctx)
            }

            Phase::CraneCycle => {
                self.phase = Phase::AwaitingCrane;
                Ok(Step::Acquire(self.crane))
            }

            Phase::AwaitingCrane => {
                self.phase = Phase::AwaitingTruck;
                Ok(Step::Acquire(self.trucks))
            }

            Phase::AwaitingTruck => {
                let event = Event::ContainerMoved {
                    time: ctx.now(),
                    vessel: self.vessel.name().to_string(),
                    crane: self.crane_index,
                    container: self.vessel.discharged() + 1,
                };
                ctx.world_mut().record(event);

                self.phase = Phase::Transporting;
                Ok(Step::Timeout(ctx.world().timing().transport))
            }

            Phase::Transporting => {
                self.vessel
                    .discharge_one()
                    .map_err(|e| ctx.fault(e.to_string()))?;

                let event = Event::ContainerTransported {
                    time: ctx.now(),
                    vessel: self.vessel.name().to_string(),
                    crane: self.crane_index,
                    container: self.vessel.discharged(),
                };
                ctx.world_mut().record(event);

                ctx.release(self.trucks)?;
                ctx.release(self.crane)?;
                self.next_cycle(ctx)
            }

            Phase::Departed => Err(ctx.fault(format!(
                "vessel {} resumed after departure",
                self.vessel.name()
            ))),
        }
    }
}
