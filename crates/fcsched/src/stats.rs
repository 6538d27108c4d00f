//! Execution statistics.
//!
//! The tracker is a passive observer: it is fed after every task or predicate
//! invocation and never influences control flow, apart from the average
//! execution time the dispatcher uses as a cost estimate.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::priority::TaskPriority;
use crate::task::{TaskDescriptor, TaskId};

/// Window length of the moving-sum average.
pub const MOVING_SUM_COUNT: u32 = 32;

/// Running timing figures for a task body or check predicate.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingStats {
    pub max_us: u32,
    pub moving_sum_us: u32,
    pub total_us: u64,
    pub count: u64,
}

impl TimingStats {
    /// Folds one measured duration into the figures.
    pub fn record(&mut self, elapsed_us: u32) {
        // movingSum -= movingSum / N; movingSum += sample
        self.moving_sum_us = self
            .moving_sum_us
            .saturating_sub(self.moving_sum_us / MOVING_SUM_COUNT)
            .saturating_add(elapsed_us);
        self.total_us = self.total_us.saturating_add(elapsed_us as u64);
        self.max_us = self.max_us.max(elapsed_us);
        self.count = self.count.saturating_add(1);
    }

    pub fn average_us(&self) -> u32 {
        self.moving_sum_us / MOVING_SUM_COUNT
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Scheduler-wide counters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub passes: u64,
    pub guaranteed_runs: u64,
    pub dynamic_runs: u64,
    pub idle_passes: u64,
    /// Passes where the guaranteed task started after its nominal deadline.
    pub guaranteed_overruns: u64,
    /// Period requests below the minimum that were raised to it.
    pub clamped_reschedules: u32,
    /// Times a task's period anchor was pulled forward after falling too far behind.
    pub backlog_resyncs: u32,
    pub total_waiting_tasks: u64,
    pub total_waiting_samples: u64,
}

impl SchedulerStats {
    /// Average number of ready dynamic tasks per pass, in percent.
    ///
    /// 100 means one task was waiting per pass on average; values above 100
    /// mean the dynamic slot is oversubscribed.
    pub fn average_system_load_percent(&self) -> u32 {
        if self.total_waiting_samples == 0 {
            return 0;
        }
        let load = self.total_waiting_tasks * 100 / self.total_waiting_samples;
        load.min(u32::MAX as u64) as u32
    }

    pub(crate) fn record_waiting(&mut self, waiting: u32) {
        self.total_waiting_tasks = self.total_waiting_tasks.saturating_add(waiting as u64);
        self.total_waiting_samples = self.total_waiting_samples.saturating_add(1);
    }
}

/// Read-only snapshot of one task, for CLI and telemetry layers.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskInfo {
    pub id: TaskId,
    pub name: &'static str,
    pub sub_name: Option<&'static str>,
    pub enabled: bool,
    pub static_priority: TaskPriority,
    pub desired_period_us: u32,
    pub dynamic_priority: u32,
    pub max_execution_us: u32,
    pub average_execution_us: u32,
    pub total_execution_us: u64,
    pub execution_count: u64,
    pub latest_delta_us: u32,
    pub check: Option<TimingStats>,
}

impl TaskInfo {
    pub(crate) fn from_descriptor(task: &TaskDescriptor) -> Self {
        Self {
            id: task.id,
            name: task.name,
            sub_name: task.sub_name,
            enabled: task.enabled,
            static_priority: task.static_priority,
            desired_period_us: task.desired_period_us,
            dynamic_priority: task.dynamic_priority,
            max_execution_us: task.execution.max_us,
            average_execution_us: task.execution.average_us(),
            total_execution_us: task.execution.total_us,
            execution_count: task.execution.count,
            latest_delta_us: task.latest_delta_us,
            check: task.check.as_ref().map(|_| task.check_timing),
        }
    }

    /// Desired rate in Hz, derived from the period.
    pub fn rate_hz(&self) -> u32 {
        if self.desired_period_us == 0 {
            0
        } else {
            1_000_000 / self.desired_period_us
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moving_average_converges() {
        let mut stats = TimingStats::default();
        for _ in 0..500 {
            stats.record(100);
        }
        // Converges from below; integer truncation keeps it within a step.
        assert!(stats.average_us() >= 98 && stats.average_us() <= 100);
        assert_eq!(stats.max_us, 100);
        assert_eq!(stats.count, 500);
        assert_eq!(stats.total_us, 50_000);
    }

    #[test]
    fn max_tracks_peak() {
        let mut stats = TimingStats::default();
        stats.record(10);
        stats.record(250);
        stats.record(30);
        assert_eq!(stats.max_us, 250);
        stats.reset();
        assert_eq!(stats, TimingStats::default());
    }

    #[test]
    fn system_load_is_waiting_tasks_per_pass() {
        let mut stats = SchedulerStats::default();
        assert_eq!(stats.average_system_load_percent(), 0);
        stats.record_waiting(2);
        stats.record_waiting(0);
        stats.record_waiting(1);
        stats.record_waiting(1);
        assert_eq!(stats.average_system_load_percent(), 100);
    }
}
