//! Retention sweep subsystem: the sweeper itself and its daily scheduler.

mod scheduler;
mod sweeper;

pub use scheduler::start_sweep_worker;
pub use sweeper::{
    SweepOutcome, SweepReport, SweepStatus, SweepTableError, SweepTrigger, Sweeper,
};
