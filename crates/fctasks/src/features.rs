//! Runtime configuration snapshot consumed by task enablement.
//!
//! These mirror the handful of settings the flight controller consults once at
//! start-up: detected sensors, enabled features, battery metering, the serial
//! RX protocol and a few rates.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sensors detected at boot.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sensors {
    pub gyro: bool,
    pub acc: bool,
    pub baro: bool,
    pub mag: bool,
    pub rangefinder: bool,
}

/// User-selectable features.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Features {
    pub gps: bool,
    pub telemetry: bool,
    pub led_strip: bool,
    pub osd: bool,
    pub esc_sensor: bool,
    pub rangefinder: bool,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VoltageMeterSource {
    #[default]
    None,
    Adc,
    Esc,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CurrentMeterSource {
    #[default]
    None,
    Adc,
    Virtual,
    Esc,
    Msp,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatteryConfig {
    pub voltage_meter_source: VoltageMeterSource,
    pub current_meter_source: CurrentMeterSource,
    pub use_vbat_alerts: bool,
    pub use_consumption_alerts: bool,
}

impl BatteryConfig {
    pub fn uses_voltage(&self) -> bool {
        self.voltage_meter_source != VoltageMeterSource::None
    }

    pub fn uses_current(&self) -> bool {
        self.current_meter_source != CurrentMeterSource::None
    }
}

/// Serial receiver protocols.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialRxProvider {
    Spektrum1024,
    Spektrum2048,
    Sbus,
    Sumd,
    Sumh,
    XbusModeB,
    XbusModeBRj01,
    Ibus,
    Jetiexbus,
    Crsf,
    Srxl,
    Fport,
}

impl SerialRxProvider {
    /// Protocols whose telemetry back-channel is polled at 500 Hz.
    pub fn wants_fast_telemetry(self) -> bool {
        matches!(self, Self::Jetiexbus | Self::Crsf)
    }
}

/// Everything task enablement needs to know about the running configuration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSnapshot {
    pub sensors: Sensors,
    pub features: Features,
    pub battery: BatteryConfig,
    /// `None` when the receiver is not a serial one (PPM, SPI, MSP).
    pub serial_rx_provider: Option<SerialRxProvider>,
    pub serial_update_rate_hz: u32,
    pub gyro_target_looptime_us: u32,
    pub acc_sampling_interval_us: u32,
    pub dispatch_enabled: bool,
    pub osd_initialized: bool,
}

impl Default for FeatureSnapshot {
    fn default() -> Self {
        Self {
            sensors: Sensors {
                gyro: true,
                ..Sensors::default()
            },
            features: Features::default(),
            battery: BatteryConfig::default(),
            serial_rx_provider: None,
            serial_update_rate_hz: 100,
            gyro_target_looptime_us: 125,
            acc_sampling_interval_us: 1_000,
            dispatch_enabled: false,
            osd_initialized: false,
        }
    }
}
