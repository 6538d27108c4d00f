//! Identifiers of the flight-controller tasks.

use core::fmt;

use fcsched::TaskId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Every task the flight controller knows about, in task-table order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FlightTask {
    System = 0,
    Main,
    Serial,
    BatteryAlerts,
    BatteryVoltage,
    BatteryCurrent,
    StackCheck,
    GyroPid,
    Accel,
    Attitude,
    Rx,
    Dispatch,
    Beeper,
    Gps,
    Compass,
    Baro,
    Altitude,
    Osd,
    Telemetry,
    LedStrip,
    BstMasterProcess,
    EscSensor,
    Cms,
    AdcInternal,
    PinioBox,
    Rangefinder,
}

pub const TASK_COUNT: usize = 26;

impl FlightTask {
    pub const ALL: [FlightTask; TASK_COUNT] = [
        Self::System,
        Self::Main,
        Self::Serial,
        Self::BatteryAlerts,
        Self::BatteryVoltage,
        Self::BatteryCurrent,
        Self::StackCheck,
        Self::GyroPid,
        Self::Accel,
        Self::Attitude,
        Self::Rx,
        Self::Dispatch,
        Self::Beeper,
        Self::Gps,
        Self::Compass,
        Self::Baro,
        Self::Altitude,
        Self::Osd,
        Self::Telemetry,
        Self::LedStrip,
        Self::BstMasterProcess,
        Self::EscSensor,
        Self::Cms,
        Self::AdcInternal,
        Self::PinioBox,
        Self::Rangefinder,
    ];

    pub const fn id(self) -> TaskId {
        TaskId(self as u8)
    }

    pub fn from_id(id: TaskId) -> Option<Self> {
        Self::ALL.get(id.0 as usize).copied()
    }

    /// Upper-case label used in logs and the task listing.
    pub const fn label(self) -> &'static str {
        match self {
            Self::System => "SYSTEM",
            Self::Main => "MAIN",
            Self::Serial => "SERIAL",
            Self::BatteryAlerts => "BATTERY_ALERTS",
            Self::BatteryVoltage => "BATTERY_VOLTAGE",
            Self::BatteryCurrent => "BATTERY_CURRENT",
            Self::StackCheck => "STACK_CHECK",
            Self::GyroPid => "GYROPID",
            Self::Accel => "ACCEL",
            Self::Attitude => "ATTITUDE",
            Self::Rx => "RX",
            Self::Dispatch => "DISPATCH",
            Self::Beeper => "BEEPER",
            Self::Gps => "GPS",
            Self::Compass => "COMPASS",
            Self::Baro => "BARO",
            Self::Altitude => "ALTITUDE",
            Self::Osd => "OSD",
            Self::Telemetry => "TELEMETRY",
            Self::LedStrip => "LEDSTRIP",
            Self::BstMasterProcess => "BST_MASTER_PROCESS",
            Self::EscSensor => "ESC_SENSOR",
            Self::Cms => "CMS",
            Self::AdcInternal => "ADC_INTERNAL",
            Self::PinioBox => "PINIOBOX",
            Self::Rangefinder => "RANGEFINDER",
        }
    }
}

impl From<FlightTask> for TaskId {
    fn from(task: FlightTask) -> Self {
        task.id()
    }
}

impl fmt::Display for FlightTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_table_order() {
        for (index, task) in FlightTask::ALL.iter().enumerate() {
            assert_eq!(task.id(), TaskId(index as u8));
            assert_eq!(FlightTask::from_id(task.id()), Some(*task));
        }
        assert_eq!(FlightTask::from_id(TaskId(TASK_COUNT as u8)), None);
    }
}
