use crate::aging::{select, AgingPolicy, Candidate, DEFAULT_CLASS_WEIGHT};
use crate::priority::TaskPriority;

#[test]
fn base_priority_keeps_class_order() {
    let policy = AgingPolicy::default();
    let classes = [
        TaskPriority::Idle,
        TaskPriority::Low,
        TaskPriority::Medium,
        TaskPriority::MediumHigh,
        TaskPriority::High,
    ];

    for pair in classes.windows(2) {
        assert!(policy.base_priority(pair[0]) < policy.base_priority(pair[1]));
    }
    assert_eq!(policy.base_priority(TaskPriority::Idle), DEFAULT_CLASS_WEIGHT);
}

#[test]
fn age_adds_one_class_per_missed_period() {
    let policy = AgingPolicy::default();
    assert_eq!(policy.age_factor(0, 1_000), 0);
    assert_eq!(policy.age_factor(1_000, 1_000), DEFAULT_CLASS_WEIGHT);
    assert_eq!(policy.age_factor(2_500, 1_000), DEFAULT_CLASS_WEIGHT * 5 / 2);

    let slower = AgingPolicy {
        backlog_periods_per_class: 4,
        ..AgingPolicy::default()
    };
    assert_eq!(slower.age_factor(4_000, 1_000), DEFAULT_CLASS_WEIGHT);
}

#[test]
fn overdue_low_priority_task_outranks_fresh_high_priority_task() {
    let policy = AgingPolicy::default();
    let fresh_high = policy.dynamic_priority(TaskPriority::High, 0, 1_000);
    let stale_low = policy.dynamic_priority(TaskPriority::Low, 5_000, 1_000);
    assert!(stale_low > fresh_high);
}

#[test]
fn dynamic_priority_saturates_instead_of_wrapping() {
    let policy = AgingPolicy {
        class_weight: u32::MAX,
        backlog_periods_per_class: 1,
    };
    assert_eq!(policy.dynamic_priority(TaskPriority::High, u32::MAX, 1), u32::MAX);
}

#[test]
fn select_prefers_score_then_lowest_index() {
    let candidates = [
        Candidate { index: 4, dynamic_priority: 900 },
        Candidate { index: 2, dynamic_priority: 1_200 },
        Candidate { index: 1, dynamic_priority: 1_200 },
        Candidate { index: 3, dynamic_priority: 1_100 },
    ];
    assert_eq!(select(candidates).map(|winner| winner.index), Some(1));
    assert_eq!(select(core::iter::empty()), None);
}
