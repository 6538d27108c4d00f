//! Priority aging.
//!
//! A ready task scores `base(static) + age(backlog)`. The base puts one
//! `class_weight` between adjacent priority steps; the age term adds the same
//! weight for every `backlog_periods_per_class` periods the task has been
//! waiting. A low-priority task therefore overtakes a higher class once it is
//! late by roughly one period per class of difference, which is what keeps a
//! 1 Hz housekeeping task from starving behind a stream of fast tasks.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::priority::TaskPriority;

pub const DEFAULT_CLASS_WEIGHT: u32 = 256;

/// Tunables of the aging law.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgingPolicy {
    /// Score distance between adjacent priority steps.
    pub class_weight: u32,
    /// Periods of backlog worth one priority step.
    pub backlog_periods_per_class: u32,
}

impl Default for AgingPolicy {
    fn default() -> Self {
        Self {
            class_weight: DEFAULT_CLASS_WEIGHT,
            backlog_periods_per_class: 1,
        }
    }
}

impl AgingPolicy {
    /// Score of a task that became ready just now.
    ///
    /// Offset by one step so that `Idle` tasks still score above zero.
    pub fn base_priority(&self, priority: TaskPriority) -> u32 {
        (priority.raw() as u32 + 1).saturating_mul(self.class_weight)
    }

    /// Linear in `backlog_us`, one `class_weight` per
    /// `backlog_periods_per_class * period_us`.
    pub fn age_factor(&self, backlog_us: u32, period_us: u32) -> u32 {
        let span = period_us.max(1) as u64 * self.backlog_periods_per_class.max(1) as u64;
        let age = backlog_us as u64 * self.class_weight as u64 / span;
        age.min(u32::MAX as u64) as u32
    }

    pub fn dynamic_priority(&self, priority: TaskPriority, backlog_us: u32, period_us: u32) -> u32 {
        self.base_priority(priority)
            .saturating_add(self.age_factor(backlog_us, period_us))
    }
}

/// A ready task competing for the dynamic slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Registry index, used as the tie-break.
    pub index: usize,
    pub dynamic_priority: u32,
}

/// Picks the highest dynamic priority; equal scores go to the lowest index.
pub fn select<I>(candidates: I) -> Option<Candidate>
where
    I: IntoIterator<Item = Candidate>,
{
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(current)
            if current.dynamic_priority > candidate.dynamic_priority
                || (current.dynamic_priority == candidate.dynamic_priority
                    && current.index < candidate.index) =>
        {
            Some(current)
        }
        _ => Some(candidate),
    })
}
