//! Static task table and registry construction.

use alloc::boxed::Box;

use fcsched::{task_period_hz, CheckFn, SchedulerBuilder, TaskBody, TaskContext, TaskPriority, TaskSpec};
use log::debug;

use crate::capabilities::BuildCapabilities;
use crate::error::InitError;
use crate::ids::{FlightTask, TASK_COUNT};

/// Default loop time of the gyro/PID task before the gyro rate is known.
pub const GYROPID_DESIRED_PERIOD_US: u32 = 125;

/// One row of the task table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDefinition {
    pub task: FlightTask,
    pub name: &'static str,
    pub sub_name: Option<&'static str>,
    pub desired_period_us: u32,
    pub priority: TaskPriority,
    /// Scheduled on events reported by a check predicate, with the period as
    /// fallback.
    pub event_driven: bool,
}

const fn define(
    task: FlightTask,
    name: &'static str,
    sub_name: Option<&'static str>,
    desired_period_us: u32,
    priority: TaskPriority,
) -> TaskDefinition {
    TaskDefinition {
        task,
        name,
        sub_name,
        desired_period_us,
        priority,
        event_driven: false,
    }
}

pub const DEFINITIONS: [TaskDefinition; TASK_COUNT] = [
    define(FlightTask::System, "SYSTEM", Some("LOAD"), task_period_hz(10), TaskPriority::MediumHigh),
    define(FlightTask::Main, "SYSTEM", Some("UPDATE"), task_period_hz(1000), TaskPriority::MediumHigh),
    define(FlightTask::Serial, "SERIAL", None, task_period_hz(100), TaskPriority::Low),
    define(FlightTask::BatteryAlerts, "BATTERY_ALERTS", None, task_period_hz(5), TaskPriority::Medium),
    define(FlightTask::BatteryVoltage, "BATTERY_VOLTAGE", None, task_period_hz(50), TaskPriority::Medium),
    define(FlightTask::BatteryCurrent, "BATTERY_CURRENT", None, task_period_hz(50), TaskPriority::Medium),
    define(FlightTask::StackCheck, "STACKCHECK", None, task_period_hz(10), TaskPriority::Idle),
    define(FlightTask::GyroPid, "PID", Some("GYRO"), GYROPID_DESIRED_PERIOD_US, TaskPriority::Realtime),
    define(FlightTask::Accel, "ACC", None, task_period_hz(1000), TaskPriority::Medium),
    define(FlightTask::Attitude, "ATTITUDE", None, task_period_hz(100), TaskPriority::Medium),
    TaskDefinition {
        event_driven: true,
        ..define(FlightTask::Rx, "RX", None, task_period_hz(33), TaskPriority::High)
    },
    define(FlightTask::Dispatch, "DISPATCH", None, task_period_hz(1000), TaskPriority::High),
    define(FlightTask::Beeper, "BEEPER", None, task_period_hz(100), TaskPriority::Low),
    define(FlightTask::Gps, "GPS", None, task_period_hz(100), TaskPriority::Medium),
    define(FlightTask::Compass, "COMPASS", None, task_period_hz(10), TaskPriority::Low),
    define(FlightTask::Baro, "BARO", None, task_period_hz(20), TaskPriority::Low),
    define(FlightTask::Altitude, "ALTITUDE", None, task_period_hz(40), TaskPriority::Low),
    define(FlightTask::Osd, "OSD", None, task_period_hz(60), TaskPriority::Low),
    define(FlightTask::Telemetry, "TELEMETRY", None, task_period_hz(250), TaskPriority::Low),
    define(FlightTask::LedStrip, "LEDSTRIP", None, task_period_hz(100), TaskPriority::Low),
    define(FlightTask::BstMasterProcess, "BST_MASTER_PROCESS", None, task_period_hz(50), TaskPriority::Idle),
    define(FlightTask::EscSensor, "ESC_SENSOR", None, task_period_hz(100), TaskPriority::Low),
    define(FlightTask::Cms, "CMS", None, task_period_hz(60), TaskPriority::Low),
    define(FlightTask::AdcInternal, "ADCINTERNAL", None, task_period_hz(1), TaskPriority::Idle),
    define(FlightTask::PinioBox, "PINIOBOX", None, task_period_hz(20), TaskPriority::Idle),
    define(FlightTask::Rangefinder, "RANGEFINDER", None, task_period_hz(10), TaskPriority::Idle),
];

pub fn definition(task: FlightTask) -> &'static TaskDefinition {
    &DEFINITIONS[task as usize]
}

/// Task bodies and check predicates supplied by the firmware (or a simulator).
///
/// Unbound tasks get an empty body, so the table can be scheduled before every
/// subsystem exists.
pub struct TaskBindings {
    bodies: [Option<Box<dyn TaskBody>>; TASK_COUNT],
    checks: [Option<Box<dyn CheckFn>>; TASK_COUNT],
}

impl TaskBindings {
    pub fn new() -> Self {
        Self {
            bodies: core::array::from_fn(|_| None),
            checks: core::array::from_fn(|_| None),
        }
    }

    pub fn body<B>(mut self, task: FlightTask, body: B) -> Self
    where
        B: TaskBody + 'static,
    {
        self.bodies[task as usize] = Some(Box::new(body));
        self
    }

    /// Ignored for tasks whose definition is not event driven.
    pub fn check<K>(mut self, task: FlightTask, check: K) -> Self
    where
        K: CheckFn + 'static,
    {
        self.checks[task as usize] = Some(Box::new(check));
        self
    }

    pub fn is_bound(&self, task: FlightTask) -> bool {
        self.bodies[task as usize].is_some()
    }
}

impl Default for TaskBindings {
    fn default() -> Self {
        Self::new()
    }
}

fn idle_body(_ctx: &mut TaskContext) {}

/// Registers every task the build carries, in table order.
///
/// Only SYSTEM starts enabled; [`crate::tasks_init`] decides the rest.
pub fn register_tasks(
    mut builder: SchedulerBuilder,
    capabilities: &BuildCapabilities,
    mut bindings: TaskBindings,
) -> Result<SchedulerBuilder, InitError> {
    for def in DEFINITIONS.iter().filter(|def| capabilities.includes(def.task)) {
        let slot = def.task as usize;
        let body = bindings.bodies[slot]
            .take()
            .unwrap_or_else(|| Box::new(idle_body));

        let mut spec = TaskSpec::boxed(def.task.id(), def.name, def.priority, def.desired_period_us, body)
            .enabled(def.task == FlightTask::System);
        if let Some(sub_name) = def.sub_name {
            spec = spec.sub_name(sub_name);
        }
        if let Some(check) = bindings.checks[slot].take() {
            if def.event_driven {
                spec = spec.boxed_check(check);
            } else {
                debug!("{}: check predicate ignored, task is period based", def.task);
            }
        }

        builder = builder.register(spec)?;
    }
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitions_are_indexed_by_task() {
        for (index, def) in DEFINITIONS.iter().enumerate() {
            assert_eq!(def.task as usize, index);
        }
    }

    #[test]
    fn only_gyropid_is_realtime() {
        let realtime: Vec<_> = DEFINITIONS
            .iter()
            .filter(|def| def.priority.is_realtime())
            .map(|def| def.task)
            .collect();
        assert_eq!(realtime, [FlightTask::GyroPid]);
    }

    #[test]
    fn rx_falls_back_to_33hz() {
        let rx = definition(FlightTask::Rx);
        assert!(rx.event_driven);
        assert_eq!(rx.desired_period_us, 30_303);
        assert_eq!(definition(FlightTask::Telemetry).desired_period_us, 4_000);
    }
}
