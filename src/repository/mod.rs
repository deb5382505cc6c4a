//! Active program states and the execution log
//!
//! The scheduler talks to storage only through [`Repository`]. The provided
//! [`LogRepository`] keeps the active list in memory, optionally appends a
//! textual record per state to a log file, and keeps a bounded round history
//! for the viewer.
//!
//! Logging is best-effort: a failed write is returned to the caller, which
//! reports it and carries on.

use crate::interpreter::constants::{DEFAULT_SNAPSHOT_MEMORY_LIMIT, LOG_TIMESTAMP_FORMAT};
use crate::interpreter::engine::ProgramState;
use crate::interpreter::errors::RuntimeError;
use crate::snapshot::{RoundSnapshot, SnapshotManager, ThreadSnapshot};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Storage seen by the scheduler
pub trait Repository {
    /// Register a state to be scheduled
    fn add_program_state(&mut self, state: ProgramState);

    /// Current active list, in scheduling order
    fn active_states(&self) -> &[ProgramState];

    /// Move the active list out for a round
    fn take_active_states(&mut self) -> Vec<ProgramState>;

    /// Replace the active list
    fn set_active_states(&mut self, states: Vec<ProgramState>);

    /// Append a record describing `state` to the log
    fn log_snapshot(&mut self, state: &ProgramState) -> Result<(), RuntimeError>;

    /// Remember how every state stood at the end of `round`
    fn record_round(&mut self, round: usize, states: &[ProgramState]);
}

#[derive(Debug)]
pub struct LogRepository {
    states: Vec<ProgramState>,
    log_path: Option<PathBuf>,
    history: SnapshotManager,
}

impl LogRepository {
    /// Repository without a log file
    pub fn new() -> Self {
        LogRepository {
            states: Vec::new(),
            log_path: None,
            history: SnapshotManager::new(DEFAULT_SNAPSHOT_MEMORY_LIMIT),
        }
    }

    /// Repository appending records to `path`
    pub fn with_log_file(path: impl Into<PathBuf>) -> Self {
        LogRepository {
            log_path: Some(path.into()),
            ..Self::new()
        }
    }

    pub fn with_snapshot_limit(mut self, max_memory: usize) -> Self {
        self.history = SnapshotManager::new(max_memory);
        self
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    pub fn history(&self) -> &SnapshotManager {
        &self.history
    }

    pub fn into_history(self) -> Vec<RoundSnapshot> {
        self.history.into_snapshots()
    }
}

impl Default for LogRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for LogRepository {
    fn add_program_state(&mut self, state: ProgramState) {
        self.states.push(state);
    }

    fn active_states(&self) -> &[ProgramState] {
        &self.states
    }

    fn take_active_states(&mut self) -> Vec<ProgramState> {
        std::mem::take(&mut self.states)
    }

    fn set_active_states(&mut self, states: Vec<ProgramState>) {
        self.states = states;
    }

    fn log_snapshot(&mut self, state: &ProgramState) -> Result<(), RuntimeError> {
        let Some(path) = &self.log_path else {
            return Ok(());
        };
        let file_error = |e: std::io::Error| RuntimeError::FileError {
            file: path.display().to_string(),
            message: e.to_string(),
        };

        let timestamp = chrono::Local::now().format(LOG_TIMESTAMP_FORMAT).to_string();
        let record = ThreadSnapshot::capture(state).render(&timestamp);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(file_error)?;
        file.write_all(record.as_bytes()).map_err(file_error)
    }

    fn record_round(&mut self, round: usize, states: &[ProgramState]) {
        if let Err(message) = self.history.push(RoundSnapshot::capture(round, states)) {
            tracing::warn!(round, "{}", message);
        }
    }
}
