//! # fcsched
//!
//! Cooperative real-time task scheduler for flight-control firmware.
//!
//! One realtime task (the gyro/PID loop) runs on every pass. After it, at most
//! one background task runs: the ready task whose static priority plus
//! overdue-time aging scores highest. Tasks never block and run to
//! completion; the only way back into the scheduler from a task body is its
//! own [`TaskContext`].
//!
//! ## Module Overview
//! - [`task`]      – Task descriptors and the body / predicate traits.
//! - [`registry`]  – Fixed-capacity task table.
//! - [`readiness`] – Period and event readiness.
//! - [`aging`]     – Dynamic priority and winner selection.
//! - [`kernel`]    – Guaranteed and dynamic dispatch.
//! - [`stats`]     – Execution statistics and read-only task snapshots.
//! - [`time`]      – Wrap-safe microsecond time and clock sources.
//! - [`trace`]     – Binary trace hook.
//!
//! ```
//! use fcsched::{ManualClock, SchedulerBuilder, TaskContext, TaskId, TaskPriority, TaskSpec};
//!
//! let clock = ManualClock::new(0);
//! let mut scheduler = SchedulerBuilder::default()
//!     .register(TaskSpec::new(
//!         TaskId(0),
//!         "PID",
//!         TaskPriority::Realtime,
//!         1_000,
//!         |_ctx: &mut TaskContext| {},
//!     ))?
//!     .register(TaskSpec::new(
//!         TaskId(1),
//!         "GPS",
//!         TaskPriority::Medium,
//!         10_000,
//!         |_ctx: &mut TaskContext| {},
//!     ))?
//!     .build(clock.clone())?;
//!
//! let report = scheduler.run_pass();
//! assert!(report.guaranteed_ran);
//! assert_eq!(report.dynamic, Some(TaskId(1)));
//! # Ok::<(), fcsched::SchedulerError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod aging;
pub mod error;
pub mod kernel;
pub mod priority;
pub mod readiness;
pub mod registry;
pub mod stats;
pub mod task;
pub mod time;
pub mod trace;

pub use aging::{AgingPolicy, Candidate};
pub use error::{SchedulerError, TraceError};
pub use kernel::{PassReport, Scheduler, SchedulerBuilder, SchedulerConfig, SchedulerConfigBuilder};
pub use priority::TaskPriority;
pub use readiness::Readiness;
pub use registry::{TaskRegistry, MAX_TASKS};
pub use stats::{SchedulerStats, TaskInfo, TimingStats};
pub use task::{CheckFn, TaskBody, TaskContext, TaskDescriptor, TaskId, TaskSpec};
pub use time::{
    cmp_time_us, task_period_hz, task_period_ms, task_period_us, Clock, ManualClock, TimeDelta,
    TimeUs, MAX_PERIOD_US, MIN_PERIOD_US,
};
#[cfg(feature = "std")]
pub use time::HostClock;
pub use trace::TraceHook;

#[cfg(test)]
mod tests;
