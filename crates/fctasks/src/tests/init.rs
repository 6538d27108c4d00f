use crate::capabilities::BuildCapabilities;
use crate::error::InitError;
use crate::features::{CurrentMeterSource, FeatureSnapshot, SerialRxProvider, VoltageMeterSource};
use crate::ids::FlightTask;
use crate::init::plan;

fn snapshot() -> FeatureSnapshot {
    FeatureSnapshot::default()
}

#[test]
fn core_tasks_are_always_enabled() {
    let plan = plan(&snapshot(), &BuildCapabilities::minimal()).unwrap();

    for task in [FlightTask::System, FlightTask::Main, FlightTask::Serial, FlightTask::Rx, FlightTask::GyroPid] {
        assert!(plan.is_enabled(task), "{task} should be enabled");
    }
    assert_eq!(plan.period_us(FlightTask::Serial), Some(10_000));
    assert_eq!(plan.period_us(FlightTask::GyroPid), Some(125));
    assert!(!plan.is_enabled(FlightTask::Dispatch));
}

#[test]
fn telemetry_runs_at_500hz_for_low_latency_receivers() {
    let mut config = snapshot();
    config.features.telemetry = true;

    for provider in [SerialRxProvider::Jetiexbus, SerialRxProvider::Crsf] {
        config.serial_rx_provider = Some(provider);
        let plan = plan(&config, &BuildCapabilities::default()).unwrap();
        assert!(plan.is_enabled(FlightTask::Telemetry));
        assert_eq!(plan.period_us(FlightTask::Telemetry), Some(2_000), "{provider:?}");
    }

    for provider in [Some(SerialRxProvider::Sbus), Some(SerialRxProvider::Ibus), None] {
        config.serial_rx_provider = provider;
        let plan = plan(&config, &BuildCapabilities::default()).unwrap();
        assert!(plan.is_enabled(FlightTask::Telemetry));
        assert_eq!(plan.period_us(FlightTask::Telemetry), None, "{provider:?}");
    }
}

#[test]
fn telemetry_stays_untouched_without_the_feature() {
    let mut config = snapshot();
    config.serial_rx_provider = Some(SerialRxProvider::Crsf);

    let plan = plan(&config, &BuildCapabilities::default()).unwrap();
    assert!(plan.setting(FlightTask::Telemetry).is_none());
}

#[test]
fn battery_alerts_need_metering_and_an_alert_source() {
    let cases = [
        (false, false, false),
        (true, false, false),
        (false, true, false),
        (true, true, true),
    ];

    for (metering, alerts, expected) in cases {
        let mut config = snapshot();
        if metering {
            config.battery.voltage_meter_source = VoltageMeterSource::Adc;
        }
        config.battery.use_vbat_alerts = alerts;

        let plan = plan(&config, &BuildCapabilities::default()).unwrap();
        assert_eq!(
            plan.is_enabled(FlightTask::BatteryAlerts),
            expected,
            "metering={metering} alerts={alerts}"
        );
        assert_eq!(plan.is_enabled(FlightTask::BatteryVoltage), metering);
    }
}

#[test]
fn any_meter_and_any_alert_flavour_enable_battery_alerts() {
    let mut config = snapshot();
    config.battery.current_meter_source = CurrentMeterSource::Virtual;

    config.battery.use_consumption_alerts = true;
    assert!(plan(&config, &BuildCapabilities::default()).unwrap().is_enabled(FlightTask::BatteryAlerts));

    config.battery.use_consumption_alerts = false;
    config.features.osd = true;
    let plan = plan(&config, &BuildCapabilities::default()).unwrap();
    assert!(plan.is_enabled(FlightTask::BatteryAlerts));
    assert!(plan.is_enabled(FlightTask::BatteryCurrent));
    assert!(!plan.is_enabled(FlightTask::BatteryVoltage));
}

#[test]
fn sensor_tasks_follow_detection() {
    let mut config = snapshot();
    config.sensors.acc = true;
    config.sensors.baro = true;
    config.acc_sampling_interval_us = 500;

    let plan = plan(&config, &BuildCapabilities::default()).unwrap();
    assert!(plan.is_enabled(FlightTask::Accel));
    assert!(plan.is_enabled(FlightTask::Attitude));
    assert_eq!(plan.period_us(FlightTask::Accel), Some(500));
    assert!(plan.is_enabled(FlightTask::Baro));
    assert!(plan.is_enabled(FlightTask::Altitude));
    assert!(!plan.is_enabled(FlightTask::Compass));
    assert!(!plan.is_enabled(FlightTask::Gps));
}

#[test]
fn missing_gyro_leaves_the_pid_loop_alone() {
    let mut config = snapshot();
    config.sensors.gyro = false;

    let plan = plan(&config, &BuildCapabilities::default()).unwrap();
    assert!(plan.setting(FlightTask::GyroPid).is_none());
}

#[test]
fn rangefinder_needs_sensor_then_feature() {
    let mut config = snapshot();
    config.features.rangefinder = true;
    assert!(plan(&config, &BuildCapabilities::default())
        .unwrap()
        .setting(FlightTask::Rangefinder)
        .is_none());

    config.sensors.rangefinder = true;
    config.features.rangefinder = false;
    let plan = plan(&config, &BuildCapabilities::default()).unwrap();
    assert_eq!(plan.setting(FlightTask::Rangefinder).map(|setting| setting.enabled), Some(false));
}

#[test]
fn osd_waits_for_initialisation_and_cms_follows_display_port() {
    let mut config = snapshot();
    config.features.osd = true;

    let plan_uninit = plan(&config, &BuildCapabilities::default()).unwrap();
    assert!(!plan_uninit.is_enabled(FlightTask::Osd));
    assert!(plan_uninit.is_enabled(FlightTask::Cms));

    config.osd_initialized = true;
    assert!(plan(&config, &BuildCapabilities::default()).unwrap().is_enabled(FlightTask::Osd));

    let no_displayport = BuildCapabilities {
        msp_displayport: false,
        ..BuildCapabilities::default()
    };
    config.features.osd = false;
    assert!(!plan(&config, &no_displayport).unwrap().is_enabled(FlightTask::Cms));
}

#[test]
fn tasks_outside_the_build_are_not_planned() {
    let capabilities = BuildCapabilities {
        baro: false,
        gps: false,
        ..BuildCapabilities::default()
    };
    let mut config = snapshot();
    config.sensors.baro = true;
    config.features.gps = true;

    let plan = plan(&config, &capabilities).unwrap();
    assert!(plan.setting(FlightTask::Baro).is_none());
    assert!(plan.setting(FlightTask::Gps).is_none());
    assert!(plan.setting(FlightTask::Altitude).is_none());
    assert!(plan.setting(FlightTask::StackCheck).is_none());
}

#[test]
fn zero_rates_are_rejected() {
    let mut config = snapshot();
    config.serial_update_rate_hz = 0;
    assert_eq!(
        plan(&config, &BuildCapabilities::default()),
        Err(InitError::ZeroRate {
            task: FlightTask::Serial
        })
    );

    let mut config = snapshot();
    config.gyro_target_looptime_us = 0;
    assert_eq!(
        plan(&config, &BuildCapabilities::default()),
        Err(InitError::ZeroPeriod {
            task: FlightTask::GyroPid
        })
    );

    let mut config = snapshot();
    config.sensors.acc = true;
    config.acc_sampling_interval_us = 0;
    assert_eq!(
        plan(&config, &BuildCapabilities::default()),
        Err(InitError::ZeroPeriod {
            task: FlightTask::Accel
        })
    );

    // Without an accelerometer the interval is never used.
    config.sensors.acc = false;
    assert!(plan(&config, &BuildCapabilities::default()).is_ok());
}
