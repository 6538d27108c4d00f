//! Which optional tasks a build carries.
//!
//! Firmware images are cut down for small targets; a task that is not part of
//! the build never enters the registry and enablement skips it silently.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ids::FlightTask;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildCapabilities {
    pub stack_check: bool,
    pub acc: bool,
    pub beeper: bool,
    pub gps: bool,
    pub mag: bool,
    pub baro: bool,
    pub osd: bool,
    pub telemetry: bool,
    pub led_strip: bool,
    pub bst: bool,
    pub esc_sensor: bool,
    pub cms: bool,
    /// CMS menus are served over an MSP display port, so CMS runs without OSD.
    pub msp_displayport: bool,
    pub adc_internal: bool,
    pub piniobox: bool,
    pub rangefinder: bool,
}

impl Default for BuildCapabilities {
    /// A typical full-featured flight controller build.
    fn default() -> Self {
        Self {
            stack_check: false,
            bst: false,
            ..Self::full()
        }
    }
}

impl BuildCapabilities {
    pub const fn full() -> Self {
        Self {
            stack_check: true,
            acc: true,
            beeper: true,
            gps: true,
            mag: true,
            baro: true,
            osd: true,
            telemetry: true,
            led_strip: true,
            bst: true,
            esc_sensor: true,
            cms: true,
            msp_displayport: true,
            adc_internal: true,
            piniobox: true,
            rangefinder: true,
        }
    }

    /// Core tasks only.
    pub const fn minimal() -> Self {
        Self {
            stack_check: false,
            acc: false,
            beeper: false,
            gps: false,
            mag: false,
            baro: false,
            osd: false,
            telemetry: false,
            led_strip: false,
            bst: false,
            esc_sensor: false,
            cms: false,
            msp_displayport: false,
            adc_internal: false,
            piniobox: false,
            rangefinder: false,
        }
    }

    pub fn includes(&self, task: FlightTask) -> bool {
        match task {
            FlightTask::System
            | FlightTask::Main
            | FlightTask::Serial
            | FlightTask::BatteryAlerts
            | FlightTask::BatteryVoltage
            | FlightTask::BatteryCurrent
            | FlightTask::GyroPid
            | FlightTask::Rx
            | FlightTask::Dispatch => true,
            FlightTask::StackCheck => self.stack_check,
            FlightTask::Accel | FlightTask::Attitude => self.acc,
            FlightTask::Beeper => self.beeper,
            FlightTask::Gps => self.gps,
            FlightTask::Compass => self.mag,
            FlightTask::Baro => self.baro,
            FlightTask::Altitude => self.baro || self.gps,
            FlightTask::Osd => self.osd,
            FlightTask::Telemetry => self.telemetry,
            FlightTask::LedStrip => self.led_strip,
            FlightTask::BstMasterProcess => self.bst,
            FlightTask::EscSensor => self.esc_sensor,
            FlightTask::Cms => self.cms,
            FlightTask::AdcInternal => self.adc_internal,
            FlightTask::PinioBox => self.piniobox,
            FlightTask::Rangefinder => self.rangefinder,
        }
    }

    pub fn tasks(&self) -> impl Iterator<Item = FlightTask> + '_ {
        FlightTask::ALL
            .into_iter()
            .filter(move |task| self.includes(*task))
    }
}
