//! Task descriptors and the capability traits task bodies implement.
//!
//! A task is registered from a [`TaskSpec`] and lives for the lifetime of the
//! scheduler as a [`TaskDescriptor`]. The scheduler only ever talks to the work
//! through [`TaskBody`] and, for event-driven tasks, [`CheckFn`].

use alloc::boxed::Box;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::priority::TaskPriority;
use crate::stats::TimingStats;
use crate::time::{TimeDelta, TimeUs};

/// Stable identifier for a task.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u8);

impl TaskId {
    pub const fn new(id: u8) -> Self {
        Self(id)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TaskId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "task#{}", self.0);
    }
}

/// Executable body of a task.
///
/// Bodies must return after a bounded amount of work. The context is the only
/// channel back into the scheduler.
pub trait TaskBody {
    fn run(&mut self, ctx: &mut TaskContext);
}

impl<F> TaskBody for F
where
    F: FnMut(&mut TaskContext),
{
    fn run(&mut self, ctx: &mut TaskContext) {
        self(ctx)
    }
}

/// Readiness predicate for event-driven tasks.
///
/// Receives the pass time and the time elapsed since the previous check,
/// both on the same time base.
pub trait CheckFn {
    fn check(&mut self, now: TimeUs, elapsed_since_check: TimeDelta) -> bool;
}

impl<F> CheckFn for F
where
    F: FnMut(TimeUs, TimeDelta) -> bool,
{
    fn check(&mut self, now: TimeUs, elapsed_since_check: TimeDelta) -> bool {
        self(now, elapsed_since_check)
    }
}

/// Per-execution context handed to a task body.
///
/// Requests recorded here are applied by the dispatcher right after the body
/// returns, and only ever to the task that made them.
#[derive(Debug)]
pub struct TaskContext {
    id: TaskId,
    now: TimeUs,
    desired_period_us: u32,
    requests: TaskRequests,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TaskRequests {
    pub reschedule: Option<u32>,
    pub next_period_override: Option<u32>,
    pub disable: bool,
}

impl TaskContext {
    pub fn new(id: TaskId, now: TimeUs, desired_period_us: u32) -> Self {
        Self {
            id,
            now,
            desired_period_us,
            requests: TaskRequests::default(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Time at which the body was started.
    pub fn now(&self) -> TimeUs {
        self.now
    }

    pub fn desired_period_us(&self) -> u32 {
        self.desired_period_us
    }

    /// Changes this task's desired period from its next readiness evaluation on.
    pub fn reschedule(&mut self, period_us: u32) {
        self.requests.reschedule = Some(period_us);
    }

    /// Uses `period_us` as the interval to the next run only; the desired
    /// period applies again afterwards.
    pub fn override_next_period(&mut self, period_us: u32) {
        self.requests.next_period_override = Some(period_us);
    }

    /// Takes this task out of scheduling until something re-enables it.
    pub fn disable_self(&mut self) {
        self.requests.disable = true;
    }

    pub(crate) fn into_requests(self) -> TaskRequests {
        self.requests
    }
}

/// Registration record for a task, analogous to one row of a static task table.
pub struct TaskSpec {
    pub(crate) id: TaskId,
    pub(crate) name: &'static str,
    pub(crate) sub_name: Option<&'static str>,
    pub(crate) priority: TaskPriority,
    pub(crate) desired_period_us: u32,
    pub(crate) check: Option<Box<dyn CheckFn>>,
    pub(crate) body: Box<dyn TaskBody>,
    pub(crate) enabled: bool,
}

impl TaskSpec {
    pub fn new<B>(
        id: TaskId,
        name: &'static str,
        priority: TaskPriority,
        desired_period_us: u32,
        body: B,
    ) -> Self
    where
        B: TaskBody + 'static,
    {
        Self::boxed(id, name, priority, desired_period_us, Box::new(body))
    }

    /// Like [`TaskSpec::new`] for a body that is already boxed, as when the
    /// body comes out of a binding table.
    pub fn boxed(
        id: TaskId,
        name: &'static str,
        priority: TaskPriority,
        desired_period_us: u32,
        body: Box<dyn TaskBody>,
    ) -> Self {
        Self {
            id,
            name,
            sub_name: None,
            priority,
            desired_period_us,
            check: None,
            body,
            enabled: true,
        }
    }

    pub fn sub_name(mut self, sub_name: &'static str) -> Self {
        self.sub_name = Some(sub_name);
        self
    }

    /// Makes the task event-driven; the period becomes a fallback timer.
    pub fn check<K>(mut self, check: K) -> Self
    where
        K: CheckFn + 'static,
    {
        self.check = Some(Box::new(check));
        self
    }

    pub fn boxed_check(mut self, check: Box<dyn CheckFn>) -> Self {
        self.check = Some(check);
        self
    }

    /// Initial enable state. Tasks are enabled unless told otherwise.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }
}

impl fmt::Debug for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSpec")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("desired_period_us", &self.desired_period_us)
            .field("event_driven", &self.check.is_some())
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Static and dynamic state of one registered task.
pub struct TaskDescriptor {
    pub(crate) id: TaskId,
    pub(crate) name: &'static str,
    pub(crate) sub_name: Option<&'static str>,
    pub(crate) static_priority: TaskPriority,
    pub(crate) desired_period_us: u32,
    pub(crate) check: Option<Box<dyn CheckFn>>,
    pub(crate) body: Box<dyn TaskBody>,
    pub(crate) enabled: bool,

    pub(crate) dynamic_priority: u32,
    pub(crate) last_executed_at: TimeUs,
    pub(crate) last_desired_at: TimeUs,
    pub(crate) last_checked_at: TimeUs,
    pub(crate) signaled_at: Option<TimeUs>,
    pub(crate) next_period_override: Option<u32>,
    pub(crate) executed_once: bool,
    pub(crate) latest_delta_us: u32,

    pub(crate) execution: TimingStats,
    pub(crate) check_timing: TimingStats,
}

impl TaskDescriptor {
    pub(crate) fn from_spec(spec: TaskSpec, desired_period_us: u32) -> Self {
        Self {
            id: spec.id,
            name: spec.name,
            sub_name: spec.sub_name,
            static_priority: spec.priority,
            desired_period_us,
            check: spec.check,
            body: spec.body,
            enabled: spec.enabled,
            dynamic_priority: 0,
            last_executed_at: 0,
            last_desired_at: 0,
            last_checked_at: 0,
            signaled_at: None,
            next_period_override: None,
            executed_once: false,
            latest_delta_us: 0,
            execution: TimingStats::default(),
            check_timing: TimingStats::default(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn sub_name(&self) -> Option<&'static str> {
        self.sub_name
    }

    pub fn static_priority(&self) -> TaskPriority {
        self.static_priority
    }

    pub fn desired_period_us(&self) -> u32 {
        self.desired_period_us
    }

    /// Dynamic priority computed in the latest pass; zero when not ready.
    pub fn dynamic_priority(&self) -> u32 {
        self.dynamic_priority
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_event_driven(&self) -> bool {
        self.check.is_some()
    }

    pub fn last_executed_at(&self) -> TimeUs {
        self.last_executed_at
    }

    pub fn last_desired_at(&self) -> TimeUs {
        self.last_desired_at
    }

    /// Interval to the next due point: a pending one-shot override, or the
    /// desired period.
    pub(crate) fn current_interval(&self) -> u32 {
        self.next_period_override.unwrap_or(self.desired_period_us)
    }

    /// Positions the period timer so the task is due at `now`.
    pub(crate) fn arm(&mut self, now: TimeUs) {
        self.next_period_override = None;
        self.signaled_at = None;
        self.dynamic_priority = 0;
        self.last_desired_at = now.wrapping_sub(self.desired_period_us);
        self.last_checked_at = now;
    }
}

impl fmt::Debug for TaskDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("static_priority", &self.static_priority)
            .field("desired_period_us", &self.desired_period_us)
            .field("dynamic_priority", &self.dynamic_priority)
            .field("enabled", &self.enabled)
            .field("last_desired_at", &self.last_desired_at)
            .finish()
    }
}
