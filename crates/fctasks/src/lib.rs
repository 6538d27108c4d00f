//! # fctasks
//!
//! The flight controller's task table on top of [`fcsched`]: task identifiers,
//! the static table of names, periods and priorities, build capabilities, the
//! start-up enablement rules and adapters for tasks that reschedule
//! themselves.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod bodies;
pub mod capabilities;
pub mod error;
pub mod features;
pub mod ids;
pub mod init;
pub mod table;

pub use bodies::{
    BaroDriver, BaroTask, ControlLoop, GyroPidTask, RxFrameSignal, RxReceiver, RxRefreshRate, RxTask,
    RxUpdateCheck,
};
pub use capabilities::BuildCapabilities;
pub use error::InitError;
pub use features::{
    BatteryConfig, CurrentMeterSource, FeatureSnapshot, Features, Sensors, SerialRxProvider,
    VoltageMeterSource,
};
pub use ids::{FlightTask, TASK_COUNT};
pub use init::{plan, tasks_init, TaskPlan, TaskSetting};
pub use table::{definition, register_tasks, TaskBindings, TaskDefinition, DEFINITIONS};

use fcsched::{Clock, Scheduler, SchedulerBuilder, SchedulerConfig, TraceHook};

/// Builds a scheduler holding the flight task table and runs enablement.
pub fn build_flight_scheduler<C: Clock>(
    config: SchedulerConfig,
    capabilities: &BuildCapabilities,
    snapshot: &FeatureSnapshot,
    bindings: TaskBindings,
    trace: Option<TraceHook>,
    clock: C,
) -> Result<Scheduler<C>, InitError> {
    let mut builder = register_tasks(SchedulerBuilder::new(config), capabilities, bindings)?;
    if let Some(hook) = trace {
        builder = builder.with_trace_hook(hook);
    }
    let mut scheduler = builder.build(clock)?;
    tasks_init(&mut scheduler, snapshot, capabilities)?;
    Ok(scheduler)
}

#[cfg(test)]
mod tests;
