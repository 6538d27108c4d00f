use fcsched::SchedulerError;
use thiserror::Error;

use crate::ids::FlightTask;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error("{task}: rate of 0 Hz configured")]
    ZeroRate { task: FlightTask },
    #[error("{task}: period of 0us configured")]
    ZeroPeriod { task: FlightTask },
}
