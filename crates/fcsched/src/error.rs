//! Error types.
//!
//! Only construction and API misuse produce errors. Real-time violations at
//! run time (overruns, clamped periods) are counted in
//! [`SchedulerStats`](crate::stats::SchedulerStats) instead.

use thiserror::Error;

use crate::task::TaskId;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("task registry full: cannot register more than {0} tasks")]
    RegistryFull(usize),
    #[error("{0} is already registered")]
    DuplicateTask(TaskId),
    #[error("{0} not found")]
    UnknownTask(TaskId),
    #[error("no realtime task registered")]
    NoGuaranteedTask,
    #[error("{first} and {second} both claim realtime priority")]
    MultipleGuaranteedTasks { first: TaskId, second: TaskId },
}

/// Errors a trace sink may report. The scheduler drops them.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceError {
    #[error("payload too large: {0} bytes")]
    PayloadTooLarge(usize),
    #[error("trace sink unavailable")]
    Unavailable,
}

#[cfg(feature = "defmt")]
impl defmt::Format for SchedulerError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::RegistryFull(max) => defmt::write!(fmt, "RegistryFull({})", max),
            Self::DuplicateTask(id) => defmt::write!(fmt, "DuplicateTask({})", id),
            Self::UnknownTask(id) => defmt::write!(fmt, "UnknownTask({})", id),
            Self::NoGuaranteedTask => defmt::write!(fmt, "NoGuaranteedTask"),
            Self::MultipleGuaranteedTasks { first, second } => {
                defmt::write!(fmt, "MultipleGuaranteedTasks({}, {})", first, second)
            }
        }
    }
}
