use super::progress::{CancellationToken, ProgressSink, ProgressSnapshot, SearchProgress};
use super::solver::AssignmentSolver;
use crate::assignment::{CharacterOutcome, CharacterResult, RunResult, RunStatus};
use crate::character::Character;
use crate::config::Config;
use crate::error::{MfResult, ModForgeError};
use crate::mods::{CharacterId, Mod};
use std::time::Instant;
use tracing::{info, warn};
use typed_builder::TypedBuilder;

/// Everything a run needs. The controller owns it for the duration of the run.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RunRequest {
    pub characters: Vec<Character>,
    pub mods: Vec<Mod>,
    /// Processing order; earlier characters get first pick of the pool.
    pub order: Vec<CharacterId>,
    #[builder(default)]
    pub config: Config,
    /// Incremental mode: characters before this index are reused from `previous`.
    #[builder(default, setter(strip_option))]
    pub resume_from: Option<usize>,
    #[builder(default)]
    pub previous: Vec<CharacterResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
    /// Stopped on an error; the sink got `on_failed` and `run` returned `Err`.
    Failed,
}

/// Drives one full run: reservations, the per-character loop, progress and
/// cancellation.
pub struct OptimizationController {
    request: RunRequest,
    state: RunState,
}

/// Forwards search progress to the sink, dropping repeats of the same percentage.
struct Throttle<'s> {
    sink: &'s mut dyn ProgressSink,
    character_index: usize,
    character_count: usize,
    character_id: String,
    last: Option<SearchProgress>,
}

impl Throttle<'_> {
    fn emit(&mut self, search: SearchProgress) {
        let fresh = match &self.last {
            None => true,
            Some(prev) => {
                prev.permutation_percent != search.permutation_percent
                    || prev.target_stat_index != search.target_stat_index
            }
        };
        if fresh {
            self.last = Some(search);
            self.sink.on_progress(&ProgressSnapshot {
                character_index: self.character_index,
                character_count: self.character_count,
                character_id: self.character_id.clone(),
                search,
            });
        }
    }

    /// One snapshot per finished character, whatever the search reported.
    fn finish(self) {
        let search = SearchProgress {
            permutation_percent: 100,
            ..self.last.unwrap_or_default()
        };
        self.sink.on_progress(&ProgressSnapshot {
            character_index: self.character_index,
            character_count: self.character_count,
            character_id: self.character_id,
            search,
        });
    }
}

impl OptimizationController {
    pub fn new(request: RunRequest) -> Self {
        Self {
            request,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn resume_index(&self) -> MfResult<usize> {
        let req = &self.request;
        let Some(k) = req.resume_from else {
            return Ok(0);
        };
        if k > req.order.len() {
            return Err(ModForgeError::Validation(format!(
                "resume index {} beyond order of {} characters",
                k,
                req.order.len()
            )));
        }
        if req.previous.len() < k {
            return Err(ModForgeError::Validation(format!(
                "resume index {} but only {} previous results",
                k,
                req.previous.len()
            )));
        }
        for (i, (id, prev)) in req.order.iter().zip(&req.previous).take(k).enumerate() {
            if *id != prev.character_id {
                return Err(ModForgeError::Validation(format!(
                    "previous result {} is for '{}', order has '{}'",
                    i, prev.character_id, id
                )));
            }
        }
        Ok(k)
    }

    /// Runs to completion or cancellation.
    ///
    /// The sink sees progress snapshots in order, then exactly one terminal
    /// call: `on_finished` with the (possibly partial) result, or `on_failed`
    /// when an error stops the run. Setup problems (unknown characters, a bad
    /// resume) fail before any progress is emitted.
    pub fn run(
        &mut self,
        cancel: &CancellationToken,
        sink: &mut dyn ProgressSink,
    ) -> MfResult<RunResult> {
        if self.state != RunState::Idle {
            return Err(ModForgeError::Validation(
                "controller has already run".to_string(),
            ));
        }

        match self.execute(cancel, sink) {
            Ok(result) => {
                sink.on_finished(&result);
                Ok(result)
            }
            Err(e) => {
                self.state = RunState::Failed;
                warn!("Run failed: {}", e);
                sink.on_failed(&e);
                Err(e)
            }
        }
    }

    fn execute(
        &mut self,
        cancel: &CancellationToken,
        sink: &mut dyn ProgressSink,
    ) -> MfResult<RunResult> {
        let resume = self.resume_index()?;
        let req = &self.request;
        let mut solver = AssignmentSolver::new(&req.characters, &req.mods, &req.config)?;
        solver.prepare(&req.order)?;

        let mut results = Vec::with_capacity(req.order.len());
        for prev in req.previous.iter().take(resume) {
            results.push(solver.reuse(prev)?);
        }
        if resume > 0 {
            info!("Reused {} previous results", resume);
        }

        self.state = RunState::Running;
        let start = Instant::now();
        let count = req.order.len();
        let mut status = RunStatus::Completed;

        info!(
            "Optimizing {} characters over {} mods",
            count - resume,
            solver.pool().len()
        );

        for (index, id) in req.order.iter().enumerate().skip(resume) {
            if cancel.is_cancelled() {
                status = RunStatus::Cancelled;
                break;
            }

            let mut throttle = Throttle {
                sink: &mut *sink,
                character_index: index,
                character_count: count,
                character_id: id.clone(),
                last: None,
            };

            let result = solver.solve_character(id, cancel, &mut |p| throttle.emit(p))?;
            info!(
                "[{}/{}] {} -> {:?} (score {:.2})",
                index + 1,
                count,
                id,
                result.outcome,
                result.score
            );
            let interrupted = result.outcome == CharacterOutcome::Partial;
            results.push(result);
            throttle.finish();

            if cancel.is_cancelled() {
                if interrupted {
                    warn!("Cancelled while optimizing {}; committed best so far", id);
                }
                status = RunStatus::Cancelled;
                break;
            }
        }

        self.state = match status {
            RunStatus::Completed => RunState::Completed,
            RunStatus::Cancelled => RunState::Cancelled,
        };
        info!(
            "Run {:?} after {:.2?} with {} results",
            status,
            start.elapsed(),
            results.len()
        );

        Ok(RunResult { status, results })
    }
}
