mod aging;
mod readiness;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::task::{TaskContext, TaskId, TaskSpec};
use crate::priority::TaskPriority;
use crate::time::TimeUs;

pub(crate) const GYRO: TaskId = TaskId(0);

/// Counts executions of a task body.
#[derive(Clone, Default)]
pub(crate) struct RunCounter {
    runs: Arc<AtomicU32>,
}

impl RunCounter {
    pub fn get(&self) -> u32 {
        self.runs.load(Ordering::Relaxed)
    }

    pub fn spec(&self, id: TaskId, name: &'static str, priority: TaskPriority, period: u32) -> TaskSpec {
        let runs = self.runs.clone();
        TaskSpec::new(id, name, priority, period, move |_ctx: &mut TaskContext| {
            runs.fetch_add(1, Ordering::Relaxed);
        })
    }
}

/// Records the start time of every execution of a task body.
#[derive(Clone, Default)]
pub(crate) struct RunLog {
    starts: Arc<Mutex<Vec<TimeUs>>>,
}

impl RunLog {
    pub fn starts(&self) -> Vec<TimeUs> {
        self.starts.lock().unwrap().clone()
    }

    pub fn spec(&self, id: TaskId, name: &'static str, priority: TaskPriority, period: u32) -> TaskSpec {
        let starts = self.starts.clone();
        TaskSpec::new(id, name, priority, period, move |ctx: &mut TaskContext| {
            starts.lock().unwrap().push(ctx.now());
        })
    }
}

pub(crate) fn gyro(period: u32) -> TaskSpec {
    TaskSpec::new(GYRO, "GYRO", TaskPriority::Realtime, period, |_ctx: &mut TaskContext| {})
}
