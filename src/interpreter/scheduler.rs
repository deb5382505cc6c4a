//! Round-based scheduler
//!
//! Each round:
//!
//! 1. collects garbage on every shared heap, rooted in all active states
//! 2. logs every active state
//! 3. steps every state active at round start once, in parallel on a bounded
//!    worker pool, and waits for all of them
//! 4. appends states created by `fork` (they first run next round)
//! 5. logs the post-round list and records it in the history
//! 6. retires completed and errored states
//!
//! A failing step only retires the state that raised it.

use crate::interpreter::constants::DEFAULT_WORKER_THREADS;
use crate::interpreter::engine::ProgramState;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::gc;
use crate::repository::Repository;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Scheduler settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Size of the worker pool stepping states within a round
    pub worker_threads: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            worker_threads: DEFAULT_WORKER_THREADS,
        }
    }
}

pub struct Scheduler<R: Repository> {
    repo: R,
    config: SchedulerConfig,
    pool: Option<ThreadPool>,
    round: usize,
    retired: Vec<ProgramState>,
}

impl<R: Repository> Scheduler<R> {
    pub fn new(repo: R, config: SchedulerConfig) -> Self {
        Scheduler {
            repo,
            config,
            pool: None,
            round: 0,
            retired: Vec::new(),
        }
    }

    pub fn add_program_state(&mut self, state: ProgramState) {
        self.repo.add_program_state(state);
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn into_repository(self) -> R {
        self.repo
    }

    /// Number of rounds run so far
    pub fn rounds(&self) -> usize {
        self.round
    }

    /// States retired so far, in retirement order
    pub fn retired(&self) -> &[ProgramState] {
        &self.retired
    }

    fn pool(&mut self) -> Result<&ThreadPool, RuntimeError> {
        if self.pool.is_none() {
            let pool = ThreadPoolBuilder::new()
                .num_threads(self.config.worker_threads.max(1))
                .thread_name(|index| format!("forklang-worker-{}", index))
                .build()
                .map_err(|e| RuntimeError::SchedulingError {
                    message: format!("failed to start worker pool: {}", e),
                })?;
            self.pool = Some(pool);
        }
        self.pool
            .as_ref()
            .ok_or_else(|| RuntimeError::SchedulingError {
                message: "worker pool unavailable".to_string(),
            })
    }

    fn log_all(&mut self, states: &[ProgramState]) {
        for state in states {
            if let Err(e) = self.repo.log_snapshot(state) {
                tracing::warn!(thread = state.id(), "failed to log program state: {}", e);
            }
        }
    }

    /// Run one round. Returns whether any state is still active afterwards.
    pub fn step_round(&mut self) -> Result<bool, RuntimeError> {
        // Start the pool before touching the active list so a failure loses no state.
        self.pool()?;

        let (mut states, finished): (Vec<_>, Vec<_>) = self
            .repo
            .take_active_states()
            .into_iter()
            .partition(ProgramState::is_active);
        self.retired.extend(finished);
        if states.is_empty() {
            return Ok(false);
        }

        self.round += 1;
        let round = self.round;
        tracing::debug!(round, threads = states.len(), "starting round");

        gc::collect_garbage(&states);
        self.log_all(&states);

        // Only the states present now are stepped; forks join afterwards.
        let results: Vec<Result<Option<ProgramState>, RuntimeError>> = self
            .pool()?
            .install(|| states.par_iter_mut().map(ProgramState::one_step).collect());

        let mut forked = Vec::new();
        for (state, result) in states.iter_mut().zip(results) {
            match result {
                Ok(Some(child)) => {
                    tracing::debug!(parent = state.id(), child = child.id(), "forked");
                    forked.push(child);
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(thread = state.id(), "thread stopped: {}", error);
                    state.mark_errored(error);
                }
            }
        }
        states.extend(forked);

        self.log_all(&states);
        self.repo.record_round(round, &states);

        let (active, finished): (Vec<_>, Vec<_>) =
            states.into_iter().partition(ProgramState::is_active);
        self.retired.extend(finished);
        let remaining = !active.is_empty();
        self.repo.set_active_states(active);
        Ok(remaining)
    }

    /// Run rounds until no active state remains.
    ///
    /// Returns every retired state (completed or errored) in retirement order.
    /// The worker pool is shut down before returning.
    pub fn run_to_completion(&mut self) -> Result<Vec<ProgramState>, RuntimeError> {
        tracing::info!(
            threads = self.repo.active_states().len(),
            workers = self.config.worker_threads,
            "running program"
        );
        let outcome = loop {
            match self.step_round() {
                Ok(true) => continue,
                Ok(false) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        self.pool = None;
        outcome?;
        tracing::info!(rounds = self.round, "program finished");
        Ok(std::mem::take(&mut self.retired))
    }
}
