use crate::assignment::RunResult;
use crate::error::ModForgeError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between the caller and a run.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Where the candidate generator is inside one character's search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchProgress {
    pub set_partition_index: usize,
    pub set_partition_count: usize,
    /// 0 is the weighted pass; 1..n are the passes chasing each active goal.
    pub target_stat_index: usize,
    pub target_stat_count: usize,
    /// Coarse progress through all passes of this character, 0..=100.
    pub permutation_percent: u8,
}

/// Immutable progress report. Within a run these are non-decreasing in
/// `(character_index, target_stat_index, permutation_percent)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub character_index: usize,
    pub character_count: usize,
    pub character_id: String,
    pub search: SearchProgress,
}

/// Receives progress from a run. Exactly one of `on_finished` or
/// `on_failed` is called, last.
pub trait ProgressSink {
    fn on_progress(&mut self, snapshot: &ProgressSnapshot);

    fn on_finished(&mut self, _result: &RunResult) {}

    fn on_failed(&mut self, _error: &ModForgeError) {}
}

impl<F: FnMut(&ProgressSnapshot)> ProgressSink for F {
    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        self(snapshot)
    }
}
