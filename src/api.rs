use crate::assignment::RunResult;
use crate::error::{MfResult, ModForgeError};
use crate::optimizer::{
    CancellationToken, OptimizationController, ProgressSink, ProgressSnapshot, RunRequest,
};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{error, info};

/// Messages from a background run. `Finished` or `Failed` is always the last one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    Progress(ProgressSnapshot),
    Finished(RunResult),
    Failed { message: String },
}

impl RunEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunEvent::Progress(_))
    }
}

struct ChannelSink {
    tx: Sender<RunEvent>,
}

impl ProgressSink for ChannelSink {
    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        // A dropped receiver just means nobody is watching.
        let _ = self.tx.send(RunEvent::Progress(snapshot.clone()));
    }

    fn on_finished(&mut self, result: &RunResult) {
        let _ = self.tx.send(RunEvent::Finished(result.clone()));
    }

    fn on_failed(&mut self, error: &ModForgeError) {
        let _ = self.tx.send(RunEvent::Failed {
            message: error.to_string(),
        });
    }
}

/// Handle to a run executing on a worker thread.
pub struct OptimizationHandle {
    pub events: Receiver<RunEvent>,
    cancel: CancellationToken,
    join: JoinHandle<MfResult<RunResult>>,
}

impl OptimizationHandle {
    /// Asks the run to stop at its next checkpoint.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the worker and returns its result.
    pub fn wait(self) -> MfResult<RunResult> {
        self.join
            .join()
            .map_err(|_| ModForgeError::Validation("optimizer thread panicked".to_string()))?
    }
}

/// Service: run `request` off the calling thread, reporting through a channel.
pub fn spawn_optimization(request: RunRequest) -> MfResult<OptimizationHandle> {
    let (tx, rx) = mpsc::channel();
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let join = thread::Builder::new()
        .name("modforge-run".to_string())
        .spawn(move || {
            let mut sink = ChannelSink { tx };
            let mut controller = OptimizationController::new(request);
            let outcome = controller.run(&token, &mut sink);
            match &outcome {
                Ok(result) => info!("API: run finished ({:?})", result.status),
                Err(e) => error!("API: run failed: {}", e),
            }
            outcome
        })?;

    Ok(OptimizationHandle {
        events: rx,
        cancel,
        join,
    })
}
