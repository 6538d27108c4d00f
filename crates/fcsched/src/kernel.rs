//! Cooperative scheduler: guaranteed and dynamic dispatch.
//!
//! Every call to [`Scheduler::run_pass`] runs the realtime task once and then
//! at most one dynamic task, the ready task with the highest aged priority.
//! Nothing is preempted; the caller paces passes from the gyro interrupt or
//! whatever hardware source drives the control loop.

use heapless::Vec;
use log::{debug, info, trace, warn};

use crate::aging::{self, AgingPolicy, Candidate};
use crate::error::SchedulerError;
use crate::readiness::{self, Readiness};
use crate::registry::{TaskRegistry, MAX_TASKS};
use crate::stats::{SchedulerStats, TaskInfo};
use crate::task::{TaskContext, TaskDescriptor, TaskId, TaskRequests, TaskSpec};
use crate::time::{clamped_period, cmp_time_us, Clock, TimeDelta, TimeUs};
use crate::trace::{TraceHook, Tracer};

/// Configuration for the scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub name: &'static str,
    pub aging: AgingPolicy,
    /// A task still this many periods behind after running has its period
    /// anchor moved to the present. Zero disables the resync.
    pub max_backlog_periods: u32,
    /// Skip dynamic candidates whose average cost exceeds the time left
    /// before the next guaranteed deadline, unless a full period late.
    pub enforce_budget: bool,
    pub idle_callback: Option<fn()>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            name: "FC",
            aging: AgingPolicy::default(),
            max_backlog_periods: 8,
            enforce_budget: true,
            idle_callback: None,
        }
    }
}

impl SchedulerConfig {
    /// Creates a new scheduler configuration builder.
    pub fn builder() -> SchedulerConfigBuilder {
        SchedulerConfigBuilder::default()
    }
}

/// Builder for ergonomic scheduler configuration construction.
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfigBuilder {
    config: SchedulerConfig,
}

impl SchedulerConfigBuilder {
    pub fn name(mut self, name: &'static str) -> Self {
        self.config.name = name;
        self
    }

    pub fn class_weight(mut self, weight: u32) -> Self {
        self.config.aging.class_weight = weight;
        self
    }

    pub fn backlog_periods_per_class(mut self, periods: u32) -> Self {
        self.config.aging.backlog_periods_per_class = periods;
        self
    }

    pub fn max_backlog_periods(mut self, periods: u32) -> Self {
        self.config.max_backlog_periods = periods;
        self
    }

    pub fn enforce_budget(mut self, enforce: bool) -> Self {
        self.config.enforce_budget = enforce;
        self
    }

    /// Sets the callback invoked on passes where no dynamic task ran.
    pub fn idle_callback(mut self, callback: fn()) -> Self {
        self.config.idle_callback = Some(callback);
        self
    }

    pub fn build(self) -> SchedulerConfig {
        self.config
    }
}

/// Collects the task table before the scheduler is created.
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    registry: TaskRegistry,
    guaranteed: Option<usize>,
    trace: Option<TraceHook>,
}

impl SchedulerBuilder {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            registry: TaskRegistry::new(),
            guaranteed: None,
            trace: None,
        }
    }

    pub fn register(mut self, spec: TaskSpec) -> Result<Self, SchedulerError> {
        if spec.priority.is_realtime() {
            if let Some(first) = self.guaranteed.and_then(|index| self.registry.at(index)) {
                return Err(SchedulerError::MultipleGuaranteedTasks {
                    first: first.id,
                    second: spec.id,
                });
            }
        }

        let period = match clamped_period(spec.desired_period_us) {
            Some(period) => {
                warn!(
                    "{}: {} registered with period {}us, using {}us",
                    self.config.name, spec.name, spec.desired_period_us, period
                );
                period
            }
            None => spec.desired_period_us,
        };

        let realtime = spec.priority.is_realtime();
        let index = self
            .registry
            .insert(TaskDescriptor::from_spec(spec, period))?;
        if realtime {
            self.guaranteed = Some(index);
        }
        Ok(self)
    }

    pub fn with_trace_hook(mut self, hook: TraceHook) -> Self {
        self.trace = Some(hook);
        self
    }

    pub fn build<C: Clock>(self, clock: C) -> Result<Scheduler<C>, SchedulerError> {
        let guaranteed = self.guaranteed.ok_or(SchedulerError::NoGuaranteedTask)?;
        Ok(Scheduler {
            config: self.config,
            clock,
            registry: self.registry,
            tracer: Tracer::new(self.trace),
            stats: SchedulerStats::default(),
            guaranteed,
            guaranteed_deadline: 0,
            started: false,
        })
    }
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

/// What happened in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    pub started_at: TimeUs,
    pub guaranteed_ran: bool,
    pub overrun: bool,
    pub dynamic: Option<TaskId>,
    /// Dynamic tasks that were ready in this pass, the winner included.
    pub waiting: u32,
}

pub struct Scheduler<C: Clock> {
    config: SchedulerConfig,
    clock: C,
    registry: TaskRegistry,
    tracer: Tracer,
    stats: SchedulerStats,
    guaranteed: usize,
    guaranteed_deadline: TimeUs,
    started: bool,
}

impl<C: Clock> Scheduler<C> {
    /// Arms every enabled task as due now and anchors the guaranteed
    /// deadline. Called implicitly by the first pass.
    pub fn start(&mut self) {
        let now = self.clock.micros();
        let mut enabled = 0;
        for task in self.registry.iter_mut().filter(|task| task.enabled) {
            task.arm(now);
            enabled += 1;
        }
        self.guaranteed_deadline = now;
        self.started = true;
        info!(
            "{}: scheduler started at {}us with {} tasks ({} enabled)",
            self.config.name,
            now,
            self.registry.len(),
            enabled
        );
    }

    /// Runs one scheduling pass.
    pub fn run_pass(&mut self) -> PassReport {
        if !self.started {
            self.start();
        }
        self.stats.passes = self.stats.passes.saturating_add(1);

        let started_at = self.clock.micros();
        let guaranteed_ran = self
            .registry
            .at(self.guaranteed)
            .is_some_and(|task| task.enabled);
        let overrun = guaranteed_ran && self.dispatch_guaranteed(started_at);
        let (dynamic, waiting) = self.dispatch_dynamic(guaranteed_ran);

        PassReport {
            started_at,
            guaranteed_ran,
            overrun,
            dynamic,
            waiting,
        }
    }

    pub fn set_task_enabled(&mut self, id: TaskId, enabled: bool) -> Result<(), SchedulerError> {
        let index = self.registry.index_of(id)?;
        if enabled {
            self.enable_at(index);
        } else {
            self.disable_at(index);
        }
        Ok(())
    }

    pub fn is_task_enabled(&self, id: TaskId) -> bool {
        self.registry.get(id).is_some_and(|task| task.enabled)
    }

    /// Sets a task's desired period.
    ///
    /// Requests outside [`MIN_PERIOD_US`]..=[`MAX_PERIOD_US`] are clamped to
    /// `MIN_PERIOD_US` and counted in [`SchedulerStats::clamped_reschedules`].
    ///
    /// [`MIN_PERIOD_US`]: crate::time::MIN_PERIOD_US
    /// [`MAX_PERIOD_US`]: crate::time::MAX_PERIOD_US
    pub fn reschedule(&mut self, id: TaskId, period_us: u32) -> Result<(), SchedulerError> {
        let index = self.registry.index_of(id)?;
        self.set_period(index, period_us);
        Ok(())
    }

    pub fn desired_period_us(&self, id: TaskId) -> Option<u32> {
        self.registry.get(id).map(|task| task.desired_period_us)
    }

    /// How late the task is right now; negative while it is not yet due.
    /// `None` for unknown or disabled tasks.
    pub fn overdue_us(&self, id: TaskId) -> Option<TimeDelta> {
        let index = self.registry.position(id)?;
        let task = self.registry.at(index)?;
        if !task.enabled {
            return None;
        }
        let now = self.clock.micros();
        if index == self.guaranteed {
            Some(cmp_time_us(now, self.guaranteed_deadline))
        } else if let Some(signaled_at) = task.signaled_at {
            Some(cmp_time_us(now, signaled_at))
        } else {
            Some(readiness::overdue_us(task, now))
        }
    }

    pub fn task_info(&self, id: TaskId) -> Option<TaskInfo> {
        self.registry.get(id).map(TaskInfo::from_descriptor)
    }

    /// Snapshots of all tasks in registry order.
    pub fn tasks(&self) -> impl Iterator<Item = TaskInfo> + '_ {
        self.registry.iter().map(TaskInfo::from_descriptor)
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn average_system_load_percent(&self) -> u32 {
        self.stats.average_system_load_percent()
    }

    /// Clears per-task timing figures and the load counters.
    pub fn reset_task_statistics(&mut self) {
        for task in self.registry.iter_mut() {
            task.execution.reset();
            task.check_timing.reset();
            task.latest_delta_us = 0;
        }
        self.stats.total_waiting_tasks = 0;
        self.stats.total_waiting_samples = 0;
    }

    pub fn reset_task_max_execution_time(&mut self, id: TaskId) -> Result<(), SchedulerError> {
        let index = self.registry.index_of(id)?;
        self.registry.slot_mut(index).execution.max_us = 0;
        Ok(())
    }

    pub fn guaranteed_task(&self) -> TaskId {
        self.registry.slot_id(self.guaranteed)
    }

    /// Nominal start time of the next guaranteed run.
    pub fn next_guaranteed_deadline(&self) -> TimeUs {
        self.guaranteed_deadline
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn trace_hook(&self) -> Option<TraceHook> {
        self.tracer.hook()
    }
}

impl<C: Clock> Scheduler<C> {
    /// Runs the realtime task and advances its nominal deadline.
    /// Returns whether this start counted as an overrun.
    fn dispatch_guaranteed(&mut self, start: TimeUs) -> bool {
        let index = self.guaranteed;
        let deadline = self.guaranteed_deadline;
        let late = cmp_time_us(start, deadline);
        let overrun = late > 0;
        if overrun {
            self.stats.guaranteed_overruns = self.stats.guaranteed_overruns.saturating_add(1);
            let id = self.registry.slot_id(index);
            debug!(
                "{}: guaranteed {} started {}us late ({} overruns)",
                self.config.name, id, late, self.stats.guaranteed_overruns
            );
            self.tracer
                .overrun(id.0, late as u32, self.stats.guaranteed_overruns);
        }

        let requests = self.execute(index);
        self.stats.guaranteed_runs = self.stats.guaranteed_runs.saturating_add(1);
        self.apply_requests(index, requests);

        let task = self.registry.slot_mut(index);
        let interval = task.next_period_override.take().unwrap_or(task.desired_period_us);
        task.last_desired_at = deadline;

        let mut next = deadline.wrapping_add(interval);
        if cmp_time_us(next, start) <= 0 {
            // Missed at least one whole loop: restart the cadence from here.
            next = start.wrapping_add(interval);
            self.stats.backlog_resyncs = self.stats.backlog_resyncs.saturating_add(1);
            debug!(
                "{}: guaranteed deadline resynchronised to {}us",
                self.config.name, next
            );
        }
        self.guaranteed_deadline = next;
        overrun
    }

    /// Scores every ready dynamic task and runs the winner, if any.
    fn dispatch_dynamic(&mut self, guaranteed_ran: bool) -> (Option<TaskId>, u32) {
        let now = self.clock.micros();
        let budget = guaranteed_ran.then(|| cmp_time_us(self.guaranteed_deadline, now));
        let policy = self.config.aging;
        let enforce_budget = self.config.enforce_budget;

        let mut waiting = 0u32;
        let mut candidates: Vec<Candidate, MAX_TASKS> = Vec::new();

        for index in 0..self.registry.len() {
            if index == self.guaranteed {
                continue;
            }
            let task = self.registry.slot_mut(index);
            task.dynamic_priority = 0;

            let state: Readiness = readiness::evaluate(task, now, &self.clock);
            let Some(backlog) = state.backlog_us() else {
                continue;
            };
            waiting += 1;

            let score = policy.dynamic_priority(task.static_priority, backlog, task.desired_period_us);
            task.dynamic_priority = score;

            if enforce_budget {
                if let Some(budget) = budget {
                    let estimate = task.execution.average_us();
                    if !fits_budget(estimate, budget, backlog, task.desired_period_us) {
                        trace!(
                            "{}: {} deferred, needs {}us with {}us left",
                            self.config.name,
                            task.name,
                            estimate,
                            budget
                        );
                        continue;
                    }
                }
            }

            // Capacity equals the registry's, so this cannot overflow.
            let _ = candidates.push(Candidate {
                index,
                dynamic_priority: score,
            });
        }

        self.stats.record_waiting(waiting);

        let Some(winner) = aging::select(candidates) else {
            self.stats.idle_passes = self.stats.idle_passes.saturating_add(1);
            self.tracer.idle(waiting);
            if let Some(idle) = self.config.idle_callback {
                idle();
            }
            return (None, waiting);
        };

        let id = self.registry.slot_id(winner.index);
        trace!(
            "{}: selected {} (dynamic priority {}, {} waiting)",
            self.config.name,
            id,
            winner.dynamic_priority,
            waiting
        );

        let signaled = self.registry.slot_mut(winner.index).signaled_at.is_some();
        let requests = self.execute(winner.index);
        self.consume_due_slot(winner.index, now, signaled);
        self.apply_requests(winner.index, requests);
        self.stats.dynamic_runs = self.stats.dynamic_runs.saturating_add(1);

        (Some(id), waiting)
    }

    /// Invokes a task body and records its timing.
    fn execute(&mut self, index: usize) -> TaskRequests {
        let task = self.registry.slot_mut(index);
        let started = self.clock.micros();

        if task.executed_once {
            task.latest_delta_us = cmp_time_us(started, task.last_executed_at).max(0) as u32;
        }
        task.executed_once = true;
        task.last_executed_at = started;
        task.dynamic_priority = 0;

        let mut ctx = TaskContext::new(task.id, started, task.desired_period_us);
        self.tracer.task_begin(task.id.0, started);
        task.body.run(&mut ctx);
        let elapsed = cmp_time_us(self.clock.micros(), started).max(0) as u32;

        task.execution.record(elapsed);
        self.tracer.task_end(task.id.0, elapsed);
        ctx.into_requests()
    }

    /// Moves the period anchor past the slot the task just used.
    fn consume_due_slot(&mut self, index: usize, now: TimeUs, signaled: bool) {
        let max_backlog = self.config.max_backlog_periods;
        let task = self.registry.slot_mut(index);
        let interval = task.current_interval();
        task.next_period_override = None;

        if signaled {
            // Event-driven run: the fallback timer restarts from the event.
            task.signaled_at = None;
            task.last_desired_at = now;
            return;
        }

        task.last_desired_at = task.last_desired_at.wrapping_add(interval);

        let behind = cmp_time_us(now, task.last_desired_at);
        if max_backlog > 0 && behind > 0 && behind as u64 > interval as u64 * max_backlog as u64 {
            task.last_desired_at = now;
            self.stats.backlog_resyncs = self.stats.backlog_resyncs.saturating_add(1);
            debug!(
                "{}: {} was {}us behind, period anchor resynchronised",
                self.config.name, task.name, behind
            );
        }
    }

    fn apply_requests(&mut self, index: usize, requests: TaskRequests) {
        if let Some(period) = requests.reschedule {
            self.set_period(index, period);
        }
        if let Some(period) = requests.next_period_override {
            let period = self.clamp_period(index, period);
            let task = self.registry.slot_mut(index);
            task.next_period_override = Some(period);
            self.tracer.reschedule(task.id.0, period, true);
        }
        if requests.disable {
            self.disable_at(index);
        }
    }

    fn set_period(&mut self, index: usize, period_us: u32) {
        let period = self.clamp_period(index, period_us);
        let task = self.registry.slot_mut(index);
        if task.desired_period_us != period {
            debug!(
                "{}: {} period {}us -> {}us",
                self.config.name, task.name, task.desired_period_us, period
            );
        }
        task.desired_period_us = period;
        self.tracer.reschedule(task.id.0, period, false);
    }

    fn clamp_period(&mut self, index: usize, period_us: u32) -> u32 {
        let Some(clamped) = clamped_period(period_us) else {
            return period_us;
        };
        self.stats.clamped_reschedules = self.stats.clamped_reschedules.saturating_add(1);
        warn!(
            "{}: {} requested period {}us ({}us as a delta), clamped to {}us",
            self.config.name,
            self.registry.slot_id(index),
            period_us,
            period_us as TimeDelta,
            clamped
        );
        clamped
    }

    fn enable_at(&mut self, index: usize) {
        let now = self.clock.micros();
        let task = self.registry.slot_mut(index);
        if task.enabled {
            return;
        }
        task.enabled = true;
        task.arm(now);
        if index == self.guaranteed {
            self.guaranteed_deadline = now;
        }
        info!("{}: enabled {} ({})", self.config.name, task.name, task.id);
        self.tracer.enabled(task.id.0, true);
    }

    fn disable_at(&mut self, index: usize) {
        let task = self.registry.slot_mut(index);
        if !task.enabled {
            return;
        }
        task.enabled = false;
        task.dynamic_priority = 0;
        task.signaled_at = None;
        task.next_period_override = None;
        info!("{}: disabled {} ({})", self.config.name, task.name, task.id);
        self.tracer.enabled(task.id.0, false);
    }
}

/// Whether a candidate may run in the time left before the next guaranteed
/// deadline. Tasks a full period late run regardless.
pub(crate) fn fits_budget(estimate_us: u32, budget_us: TimeDelta, backlog_us: u32, period_us: u32) -> bool {
    if backlog_us >= period_us {
        return true;
    }
    budget_us >= 0 && estimate_us <= budget_us as u32
}
