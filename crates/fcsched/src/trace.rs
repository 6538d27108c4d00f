//! Binary trace records emitted by the scheduler.
//!
//! A [`TraceHook`] receives `(record_type, payload, with_timestamp)`. Payloads
//! are little-endian and built in a small stack buffer so tracing never
//! allocates on the dispatch path.

use alloc::sync::Arc;

pub use crate::error::TraceError;

pub type TraceResult = Result<(), TraceError>;

pub type TraceHook = Arc<dyn Fn(u8, &[u8], bool) -> TraceResult + Send + Sync>;

/// Record type identifiers.
pub mod records {
    /// `[task_id, start_us:u32]`
    pub const TASK_BEGIN: u8 = 70;
    /// `[task_id, elapsed_us:u32]`
    pub const TASK_END: u8 = 71;
    /// `[task_id, late_us:u32, overruns:u32]`
    pub const OVERRUN: u8 = 72;
    /// `[task_id, period_us:u32, one_shot:u8]`
    pub const RESCHEDULE: u8 = 73;
    /// `[task_id]`
    pub const ENABLE: u8 = 74;
    /// `[task_id]`
    pub const DISABLE: u8 = 75;
    /// `[waiting:u8]`
    pub const IDLE: u8 = 76;
}

const MAX_PAYLOAD: usize = 16;

#[derive(Clone, Default)]
pub(crate) struct Tracer {
    hook: Option<TraceHook>,
}

impl Tracer {
    pub fn new(hook: Option<TraceHook>) -> Self {
        Self { hook }
    }

    pub fn hook(&self) -> Option<TraceHook> {
        self.hook.clone()
    }

    fn emit<F>(&self, record: u8, timestamp: bool, builder: F)
    where
        F: FnOnce(&mut [u8]) -> usize,
    {
        if let Some(hook) = &self.hook {
            let mut buf = [0u8; MAX_PAYLOAD];
            let len = builder(&mut buf);
            let _ = hook(record, &buf[..len], timestamp);
        }
    }

    pub fn task_begin(&self, task: u8, start: u32) {
        self.emit(records::TASK_BEGIN, true, |buf| {
            buf[0] = task;
            buf[1..5].copy_from_slice(&start.to_le_bytes());
            5
        });
    }

    pub fn task_end(&self, task: u8, elapsed: u32) {
        self.emit(records::TASK_END, true, |buf| {
            buf[0] = task;
            buf[1..5].copy_from_slice(&elapsed.to_le_bytes());
            5
        });
    }

    pub fn overrun(&self, task: u8, late: u32, overruns: u64) {
        let overruns = overruns.min(u32::MAX as u64) as u32;
        self.emit(records::OVERRUN, true, |buf| {
            buf[0] = task;
            buf[1..5].copy_from_slice(&late.to_le_bytes());
            buf[5..9].copy_from_slice(&overruns.to_le_bytes());
            9
        });
    }

    pub fn reschedule(&self, task: u8, period: u32, one_shot: bool) {
        self.emit(records::RESCHEDULE, false, |buf| {
            buf[0] = task;
            buf[1..5].copy_from_slice(&period.to_le_bytes());
            buf[5] = one_shot as u8;
            6
        });
    }

    pub fn enabled(&self, task: u8, enabled: bool) {
        let record = if enabled {
            records::ENABLE
        } else {
            records::DISABLE
        };
        self.emit(record, false, |buf| {
            buf[0] = task;
            1
        });
    }

    pub fn idle(&self, waiting: u32) {
        self.emit(records::IDLE, true, |buf| {
            buf[0] = waiting.min(u8::MAX as u32) as u8;
            1
        });
    }
}
