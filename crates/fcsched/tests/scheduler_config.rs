//! Tests for SchedulerConfig builder and the public scheduler surface.

use fcsched::aging::DEFAULT_CLASS_WEIGHT;
use fcsched::{
    ManualClock, SchedulerBuilder, SchedulerConfig, TaskContext, TaskId, TaskPriority, TaskSpec,
};

#[test]
fn scheduler_config_builder() {
    let config = SchedulerConfig::builder()
        .name("Bench")
        .class_weight(100)
        .backlog_periods_per_class(3)
        .max_backlog_periods(0)
        .enforce_budget(false)
        .build();

    assert_eq!(config.name, "Bench");
    assert_eq!(config.aging.class_weight, 100);
    assert_eq!(config.aging.backlog_periods_per_class, 3);
    assert_eq!(config.max_backlog_periods, 0);
    assert!(!config.enforce_budget);
    assert!(config.idle_callback.is_none());
}

#[test]
fn scheduler_config_default() {
    let config = SchedulerConfig::default();

    assert_eq!(config.name, "FC");
    assert_eq!(config.aging.class_weight, DEFAULT_CLASS_WEIGHT);
    assert_eq!(config.aging.backlog_periods_per_class, 1);
    assert_eq!(config.max_backlog_periods, 8);
    assert!(config.enforce_budget);
}

#[test]
fn scheduler_with_custom_config() {
    let config = SchedulerConfig::builder().name("Quad").build();
    let scheduler = SchedulerBuilder::new(config)
        .register(TaskSpec::new(
            TaskId(0),
            "PID",
            TaskPriority::Realtime,
            500,
            |_ctx: &mut TaskContext| {},
        ))
        .unwrap()
        .build(ManualClock::new(0))
        .unwrap();

    assert_eq!(scheduler.config().name, "Quad");
    assert_eq!(scheduler.guaranteed_task(), TaskId(0));
    assert_eq!(scheduler.registry().len(), 1);
}

#[test]
fn scheduler_idle_callback() {
    fn idle_callback() {}

    let config = SchedulerConfig::builder()
        .idle_callback(idle_callback)
        .build();

    assert!(config.idle_callback.is_some());
}

#[test]
fn task_snapshots_follow_registration_order() {
    let clock = ManualClock::new(0);
    let mut scheduler = SchedulerBuilder::default()
        .register(TaskSpec::new(
            TaskId(0),
            "GYRO",
            TaskPriority::Realtime,
            125,
            |_ctx: &mut TaskContext| {},
        ))
        .unwrap()
        .register(
            TaskSpec::new(
                TaskId(5),
                "TELEMETRY",
                TaskPriority::Low,
                4_000,
                |_ctx: &mut TaskContext| {},
            )
            .sub_name("CRSF"),
        )
        .unwrap()
        .build(clock.clone())
        .unwrap();

    scheduler.run_pass();

    let names: Vec<&str> = scheduler.tasks().map(|info| info.name).collect();
    assert_eq!(names, ["GYRO", "TELEMETRY"]);

    let telemetry = scheduler.task_info(TaskId(5)).unwrap();
    assert_eq!(telemetry.sub_name, Some("CRSF"));
    assert_eq!(telemetry.rate_hz(), 250);
    assert_eq!(telemetry.execution_count, 1);
    assert!(telemetry.check.is_none());

    scheduler.reset_task_max_execution_time(TaskId(5)).unwrap();
    assert!(scheduler.reset_task_max_execution_time(TaskId(6)).is_err());
}
