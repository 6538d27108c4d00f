//! In-memory sink for scheduler trace records.

use std::fmt;
use std::sync::{Arc, Mutex};

use fcsched::trace::{records, TraceResult};
use fcsched::{TaskId, TraceError, TraceHook};
use fctasks::FlightTask;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapturedRecord {
    pub record: u8,
    pub payload: Vec<u8>,
    pub timestamped: bool,
}

impl CapturedRecord {
    pub fn name(&self) -> &'static str {
        match self.record {
            records::TASK_BEGIN => "TASK_BEGIN",
            records::TASK_END => "TASK_END",
            records::OVERRUN => "OVERRUN",
            records::RESCHEDULE => "RESCHEDULE",
            records::ENABLE => "ENABLE",
            records::DISABLE => "DISABLE",
            records::IDLE => "IDLE",
            _ => "UNKNOWN",
        }
    }

    fn word(&self, offset: usize) -> Option<u32> {
        let bytes = self.payload.get(offset..offset + 4)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn task(&self) -> String {
        match self.payload.first() {
            Some(&id) => FlightTask::from_id(TaskId(id))
                .map(|task| task.label().to_string())
                .unwrap_or_else(|| format!("task#{id}")),
            None => "-".to_string(),
        }
    }
}

impl fmt::Display for CapturedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:12} ", self.name())?;
        match self.record {
            records::TASK_BEGIN => write!(f, "{} at {}us", self.task(), self.word(1).unwrap_or(0)),
            records::TASK_END => write!(f, "{} took {}us", self.task(), self.word(1).unwrap_or(0)),
            records::OVERRUN => write!(
                f,
                "{} late by {}us (#{})",
                self.task(),
                self.word(1).unwrap_or(0),
                self.word(5).unwrap_or(0)
            ),
            records::RESCHEDULE => write!(
                f,
                "{} -> {}us{}",
                self.task(),
                self.word(1).unwrap_or(0),
                if self.payload.get(5) == Some(&1) { " (next only)" } else { "" }
            ),
            records::ENABLE | records::DISABLE => write!(f, "{}", self.task()),
            records::IDLE => write!(f, "{} waiting", self.payload.first().copied().unwrap_or(0)),
            _ => write!(f, "{:02x?}", self.payload),
        }
    }
}

/// Collects every record passed to its hook.
#[derive(Clone, Default)]
pub struct TraceCapture {
    records: Arc<Mutex<Vec<CapturedRecord>>>,
}

impl TraceCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hook(&self) -> TraceHook {
        let records = self.records.clone();
        Arc::new(move |record: u8, payload: &[u8], timestamped: bool| -> TraceResult {
            let mut records = records.lock().map_err(|_| TraceError::Unavailable)?;
            records.push(CapturedRecord {
                record,
                payload: payload.to_vec(),
                timestamped,
            });
            Ok(())
        })
    }

    pub fn records(&self) -> Vec<CapturedRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}
