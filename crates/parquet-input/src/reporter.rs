//! Progress reporting sink handed in by the execution framework

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Counter group used by the readers in this crate
pub const COUNTER_GROUP: &str = "parquet-input";
/// Rows produced by row-wise readers
pub const ROWS_COUNTER: &str = "rows";
/// Batches produced by vectorized readers
pub const BATCHES_COUNTER: &str = "batches";

/// The task's handle back into the execution framework.
///
/// Carries heartbeats, status and counters, plus the task's interruption
/// state, which readers poll while blocked in construction.
pub trait Reporter: Send + Sync {
    /// Heartbeat: the task is alive and making progress
    fn progress(&self);

    fn set_status(&self, status: &str);

    fn incr_counter(&self, group: &str, name: &str, amount: u64);

    /// Whether the framework asked this task to stop
    fn is_interrupted(&self) -> bool {
        false
    }
}

/// Reporter that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl NullReporter {
    pub fn shared() -> Arc<dyn Reporter> {
        Arc::new(NullReporter)
    }
}

impl Reporter for NullReporter {
    fn progress(&self) {}

    fn set_status(&self, _status: &str) {}

    fn incr_counter(&self, _group: &str, _name: &str, _amount: u64) {}
}

/// Reporter that keeps what it is told, and can be interrupted
#[derive(Debug, Default)]
pub struct TaskReporter {
    heartbeats: AtomicU64,
    status: Mutex<String>,
    counters: Mutex<HashMap<(String, String), u64>>,
    interrupted: AtomicBool,
}

impl TaskReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal the task to stop
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    pub fn heartbeats(&self) -> u64 {
        self.heartbeats.load(Ordering::Relaxed)
    }

    pub fn status(&self) -> String {
        self.status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn counter(&self, group: &str, name: &str) -> u64 {
        self.counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&(group.to_string(), name.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

impl Reporter for TaskReporter {
    fn progress(&self) {
        self.heartbeats.fetch_add(1, Ordering::Relaxed);
    }

    fn set_status(&self, status: &str) {
        let mut current = self
            .status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        current.clear();
        current.push_str(status);
    }

    fn incr_counter(&self, group: &str, name: &str, amount: u64) {
        let mut counters = self
            .counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *counters
            .entry((group.to_string(), name.to_string()))
            .or_insert(0) += amount;
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}
