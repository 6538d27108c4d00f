//! Start-up task enablement.
//!
//! [`plan`] turns a configuration snapshot into per-task decisions;
//! [`tasks_init`] applies them to a scheduler. Tasks the plan does not mention
//! keep the state they were registered with.

use fcsched::{task_period_hz, Clock, Scheduler};
use heapless::Vec;
use log::{debug, info};

use crate::capabilities::BuildCapabilities;
use crate::error::InitError;
use crate::features::FeatureSnapshot;
use crate::ids::{FlightTask, TASK_COUNT};

/// Telemetry rate for receivers that poll the telemetry back-channel fast.
pub const FAST_TELEMETRY_HZ: u32 = 500;

/// Decision for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSetting {
    pub task: FlightTask,
    pub enabled: bool,
    /// Replaces the table period when set.
    pub period_us: Option<u32>,
}

/// Ordered list of enablement decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPlan {
    settings: Vec<TaskSetting, TASK_COUNT>,
}

impl TaskPlan {
    fn set(&mut self, task: FlightTask, enabled: bool) {
        self.upsert(task, |setting| setting.enabled = enabled);
    }

    fn reschedule(&mut self, task: FlightTask, period_us: u32) {
        self.upsert(task, |setting| setting.period_us = Some(period_us));
    }

    fn upsert(&mut self, task: FlightTask, update: impl FnOnce(&mut TaskSetting)) {
        if let Some(setting) = self.settings.iter_mut().find(|setting| setting.task == task) {
            update(setting);
            return;
        }
        let mut setting = TaskSetting {
            task,
            enabled: false,
            period_us: None,
        };
        update(&mut setting);
        // One entry per task at most, so the capacity always suffices.
        let _ = self.settings.push(setting);
    }

    pub fn setting(&self, task: FlightTask) -> Option<&TaskSetting> {
        self.settings.iter().find(|setting| setting.task == task)
    }

    pub fn is_enabled(&self, task: FlightTask) -> bool {
        self.setting(task).is_some_and(|setting| setting.enabled)
    }

    pub fn period_us(&self, task: FlightTask) -> Option<u32> {
        self.setting(task).and_then(|setting| setting.period_us)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskSetting> {
        self.settings.iter()
    }

    pub fn enabled_count(&self) -> usize {
        self.settings.iter().filter(|setting| setting.enabled).count()
    }
}

/// Decides which tasks run and at what rate for the given configuration.
pub fn plan(snapshot: &FeatureSnapshot, capabilities: &BuildCapabilities) -> Result<TaskPlan, InitError> {
    let mut plan = TaskPlan::default();
    let features = &snapshot.features;
    let sensors = &snapshot.sensors;

    plan.set(FlightTask::System, true);
    plan.set(FlightTask::Main, true);

    if snapshot.serial_update_rate_hz == 0 {
        return Err(InitError::ZeroRate {
            task: FlightTask::Serial,
        });
    }
    plan.set(FlightTask::Serial, true);
    plan.reschedule(FlightTask::Serial, task_period_hz(snapshot.serial_update_rate_hz));

    let battery = &snapshot.battery;
    let use_voltage = battery.uses_voltage();
    let use_current = battery.uses_current();
    let use_alerts = battery.use_vbat_alerts || battery.use_consumption_alerts || features.osd;
    plan.set(FlightTask::BatteryVoltage, use_voltage);
    plan.set(FlightTask::BatteryCurrent, use_current);
    plan.set(FlightTask::BatteryAlerts, (use_voltage || use_current) && use_alerts);

    if capabilities.stack_check {
        plan.set(FlightTask::StackCheck, true);
    }

    if sensors.gyro {
        if snapshot.gyro_target_looptime_us == 0 {
            return Err(InitError::ZeroPeriod {
                task: FlightTask::GyroPid,
            });
        }
        plan.reschedule(FlightTask::GyroPid, snapshot.gyro_target_looptime_us);
        plan.set(FlightTask::GyroPid, true);
    }

    if capabilities.acc && sensors.acc {
        if snapshot.acc_sampling_interval_us == 0 {
            return Err(InitError::ZeroPeriod {
                task: FlightTask::Accel,
            });
        }
        plan.set(FlightTask::Accel, true);
        plan.reschedule(FlightTask::Accel, snapshot.acc_sampling_interval_us);
        plan.set(FlightTask::Attitude, true);
    }

    if capabilities.rangefinder && sensors.rangefinder {
        plan.set(FlightTask::Rangefinder, features.rangefinder);
    }

    plan.set(FlightTask::Rx, true);
    plan.set(FlightTask::Dispatch, snapshot.dispatch_enabled);

    if capabilities.beeper {
        plan.set(FlightTask::Beeper, true);
    }
    if capabilities.gps {
        plan.set(FlightTask::Gps, features.gps);
    }
    if capabilities.mag {
        plan.set(FlightTask::Compass, sensors.mag);
    }
    if capabilities.baro {
        plan.set(FlightTask::Baro, sensors.baro);
    }
    if capabilities.includes(FlightTask::Altitude) {
        plan.set(FlightTask::Altitude, sensors.baro || features.gps);
    }

    if capabilities.telemetry && features.telemetry {
        plan.set(FlightTask::Telemetry, true);
        if snapshot
            .serial_rx_provider
            .is_some_and(|provider| provider.wants_fast_telemetry())
        {
            plan.reschedule(FlightTask::Telemetry, task_period_hz(FAST_TELEMETRY_HZ));
        }
    }

    if capabilities.led_strip {
        plan.set(FlightTask::LedStrip, features.led_strip);
    }
    if capabilities.osd {
        plan.set(FlightTask::Osd, features.osd && snapshot.osd_initialized);
    }
    if capabilities.bst {
        plan.set(FlightTask::BstMasterProcess, true);
    }
    if capabilities.esc_sensor {
        plan.set(FlightTask::EscSensor, features.esc_sensor);
    }
    if capabilities.adc_internal {
        plan.set(FlightTask::AdcInternal, true);
    }
    if capabilities.piniobox {
        plan.set(FlightTask::PinioBox, true);
    }
    if capabilities.cms {
        plan.set(FlightTask::Cms, capabilities.msp_displayport || features.osd);
    }

    Ok(plan)
}

/// Applies [`plan`] to a scheduler built from the same capabilities.
pub fn tasks_init<C: Clock>(
    scheduler: &mut Scheduler<C>,
    snapshot: &FeatureSnapshot,
    capabilities: &BuildCapabilities,
) -> Result<TaskPlan, InitError> {
    let plan = plan(snapshot, capabilities)?;

    for setting in plan.iter() {
        let id = setting.task.id();
        if let Some(period) = setting.period_us {
            scheduler.reschedule(id, period)?;
        }
        scheduler.set_task_enabled(id, setting.enabled)?;
        debug!(
            "{}: {} at {}us",
            setting.task,
            if setting.enabled { "enabled" } else { "disabled" },
            scheduler.desired_period_us(id).unwrap_or_default()
        );
    }

    info!(
        "tasks init: {} of {} registered tasks enabled",
        plan.enabled_count(),
        scheduler.registry().len()
    );
    Ok(plan)
}
