pub mod candidate;
pub mod partitions;
pub mod pool;
pub mod progress;
pub mod runner;
pub mod solver;

pub use self::candidate::{Candidate, CandidateGenerator, SearchOptions};
pub use self::partitions::{SetPartition, SlotLabels};
pub use self::pool::{ModPool, SlotIndices};
pub use self::progress::{CancellationToken, ProgressSink, ProgressSnapshot, SearchProgress};
pub use self::runner::{OptimizationController, RunRequest, RunState};
pub use self::solver::AssignmentSolver;

use crate::assignment::RunResult;
use crate::error::MfResult;

/// Runs `request` to completion on the current thread without progress output.
pub fn optimize(request: RunRequest, cancel: &CancellationToken) -> MfResult<RunResult> {
    let mut controller = OptimizationController::new(request);
    controller.run(cancel, &mut |_: &ProgressSnapshot| {})
}
