//! Readiness evaluation for dynamic tasks.

use crate::task::TaskDescriptor;
use crate::time::{cmp_time_us, Clock, TimeDelta, TimeUs};

/// Outcome of evaluating one task in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Disabled, or not yet due and not signalled.
    Idle,
    /// Period timer expired `overdue_us` ago.
    Due { overdue_us: u32 },
    /// Check predicate fired and the task has been waiting `waited_us` since.
    Signaled { waited_us: u32 },
}

impl Readiness {
    pub fn is_ready(self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// How long the task has been ready without running.
    pub fn backlog_us(self) -> Option<u32> {
        match self {
            Self::Idle => None,
            Self::Due { overdue_us } => Some(overdue_us),
            Self::Signaled { waited_us } => Some(waited_us),
        }
    }
}

/// Signed distance from the task's next due point to `now`.
///
/// Negative while the task is still early. Nothing but execution moves the
/// due point, so for an idle-but-enabled task this grows with time.
pub fn overdue_us(task: &TaskDescriptor, now: TimeUs) -> TimeDelta {
    let next_due = task.last_desired_at.wrapping_add(task.current_interval());
    cmp_time_us(now, next_due)
}

/// Decides whether `task` may compete for this pass.
///
/// Event-driven tasks have their predicate invoked at most once per pass; a
/// positive answer is latched until the task runs. The period timer keeps
/// working underneath as a fallback for events that never arrive.
pub(crate) fn evaluate<C>(task: &mut TaskDescriptor, now: TimeUs, clock: &C) -> Readiness
where
    C: Clock + ?Sized,
{
    if !task.enabled {
        return Readiness::Idle;
    }

    if let Some(signaled_at) = task.signaled_at {
        return Readiness::Signaled {
            waited_us: cmp_time_us(now, signaled_at).max(0) as u32,
        };
    }

    if let Some(check) = task.check.as_mut() {
        let elapsed = cmp_time_us(now, task.last_checked_at);
        let started = clock.micros();
        let fired = check.check(now, elapsed);
        task.check_timing
            .record(cmp_time_us(clock.micros(), started).max(0) as u32);
        task.last_checked_at = now;

        if fired {
            task.signaled_at = Some(now);
            return Readiness::Signaled { waited_us: 0 };
        }
    }

    let overdue = overdue_us(task, now);
    if overdue >= 0 {
        Readiness::Due {
            overdue_us: overdue as u32,
        }
    } else {
        Readiness::Idle
    }
}
