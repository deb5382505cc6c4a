//! # Introduction
//!
//! forklang executes programs of a small imperative language given as
//! statement trees. Programs can `fork` new threads that share the heap with
//! their parent; all threads advance in lock-step rounds on a bounded worker
//! pool, and a conservative collector reclaims unreachable heap cells before
//! every round.
//!
//! ## Execution pipeline
//!
//! ```text
//! Statement tree → ProgramState → Scheduler rounds (GC, parallel steps, merge) → Log / History → TUI
//! ```
//!
//! 1. [`ast`]: immutable statement and expression trees.
//! 2. [`memory`]: values, execution stack, symbol table, shared heap, file table.
//! 3. [`interpreter`]: expression evaluation, statement execution, program
//!    states, the garbage collector and the round scheduler.
//! 4. [`repository`]: active-state storage and the textual execution log.
//! 5. [`snapshot`]: frozen per-round copies of every thread.
//! 6. [`ui`]: ratatui-based round-history viewer; not part of the stable library API.
//! 7. [`demos`]: the built-in example programs.

pub mod ast;
pub mod demos;
pub mod interpreter;
pub mod memory;
pub mod repository;
pub mod snapshot;
pub mod ui;

use ast::Stmt;
use interpreter::engine::ProgramState;
use interpreter::errors::RuntimeError;
use interpreter::scheduler::{Scheduler, SchedulerConfig};
use repository::LogRepository;

/// Run `program` to completion without a log file.
///
/// Returns every program state (the initial one and all forks) once it has
/// completed or errored, in the order they retired.
pub fn run(program: Stmt) -> Result<Vec<ProgramState>, RuntimeError> {
    let mut scheduler = Scheduler::new(LogRepository::new(), SchedulerConfig::default());
    scheduler.add_program_state(ProgramState::new(program));
    scheduler.run_to_completion()
}
