use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::priority::TaskPriority;
use crate::readiness::{evaluate, overdue_us, Readiness};
use crate::task::{TaskContext, TaskDescriptor, TaskId, TaskSpec};
use crate::time::{ManualClock, TimeDelta, TimeUs};

fn periodic(period: u32) -> TaskDescriptor {
    let spec = TaskSpec::new(TaskId(1), "ACC", TaskPriority::Medium, period, |_ctx: &mut TaskContext| {});
    TaskDescriptor::from_spec(spec, period)
}

fn event_driven<K>(period: u32, check: K) -> TaskDescriptor
where
    K: FnMut(TimeUs, TimeDelta) -> bool + 'static,
{
    let spec = TaskSpec::new(TaskId(2), "RX", TaskPriority::High, period, |_ctx: &mut TaskContext| {})
        .check(check);
    TaskDescriptor::from_spec(spec, period)
}

#[test]
fn armed_task_is_due_immediately_and_ages() {
    let clock = ManualClock::new(1_000);
    let mut task = periodic(500);
    task.arm(1_000);

    assert_eq!(evaluate(&mut task, 1_000, &clock), Readiness::Due { overdue_us: 0 });
    assert_eq!(evaluate(&mut task, 1_250, &clock), Readiness::Due { overdue_us: 250 });
}

#[test]
fn task_is_idle_before_its_period_elapses() {
    let clock = ManualClock::new(0);
    let mut task = periodic(500);
    task.arm(0);
    task.last_desired_at = 1_000;

    assert_eq!(overdue_us(&task, 1_200), -300);
    assert_eq!(evaluate(&mut task, 1_200, &clock), Readiness::Idle);
    assert!(!Readiness::Idle.is_ready());
}

#[test]
fn disabled_task_is_never_ready() {
    let clock = ManualClock::new(0);
    let mut task = periodic(500);
    task.arm(0);
    task.enabled = false;

    assert_eq!(evaluate(&mut task, 10_000, &clock), Readiness::Idle);
}

#[test]
fn due_point_survives_counter_wrap() {
    let start = u32::MAX - 100;
    let clock = ManualClock::new(start);
    let mut task = periodic(500);
    task.arm(start);

    let later = start.wrapping_add(300);
    assert!(later < start);
    assert_eq!(evaluate(&mut task, later, &clock), Readiness::Due { overdue_us: 300 });
}

#[test]
fn fired_check_is_latched_without_calling_again() {
    let clock = ManualClock::new(0);
    let calls = Arc::new(AtomicU32::new(0));
    let mut task = event_driven(100_000, {
        let calls = calls.clone();
        move |_now: TimeUs, _elapsed: TimeDelta| calls.fetch_add(1, Ordering::Relaxed) == 1
    });
    task.arm(0);
    task.last_desired_at = 0;

    assert_eq!(evaluate(&mut task, 100, &clock), Readiness::Idle);
    assert_eq!(evaluate(&mut task, 200, &clock), Readiness::Signaled { waited_us: 0 });
    assert_eq!(evaluate(&mut task, 260, &clock), Readiness::Signaled { waited_us: 60 });
    assert_eq!(calls.load(Ordering::Relaxed), 2);
    assert_eq!(task.check_timing.count, 2);
    assert_eq!(Readiness::Signaled { waited_us: 60 }.backlog_us(), Some(60));
}

#[test]
fn period_timer_backs_up_a_silent_check() {
    let clock = ManualClock::new(0);
    let mut task = event_driven(1_000, |_now, _elapsed| false);
    task.arm(0);

    assert_eq!(evaluate(&mut task, 0, &clock), Readiness::Due { overdue_us: 0 });
    task.last_desired_at = 0;
    assert_eq!(evaluate(&mut task, 500, &clock), Readiness::Idle);
    assert_eq!(evaluate(&mut task, 1_200, &clock), Readiness::Due { overdue_us: 200 });
}

#[test]
fn check_sees_the_pass_time_not_the_clock() {
    // The clock has moved on past the time the pass was sampled at.
    let clock = ManualClock::new(9_000);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut task = event_driven(100_000, {
        let seen = seen.clone();
        move |now: TimeUs, elapsed: TimeDelta| {
            seen.lock().unwrap().push((now, elapsed));
            false
        }
    });
    task.arm(0);

    evaluate(&mut task, 1_000, &clock);
    evaluate(&mut task, 1_250, &clock);
    assert_eq!(*seen.lock().unwrap(), vec![(1_000, 1_000), (1_250, 250)]);
}
