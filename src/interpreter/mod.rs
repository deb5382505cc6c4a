//! Interpreter execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: [`ProgramState`], one independently scheduled thread
//! - [`expressions`]: pure expression evaluation
//! - [`statements`]: the per-statement state transitions
//! - [`gc`]: the conservative, once-per-round garbage collector
//! - [`scheduler`]: round-based stepping of all active states on a worker pool
//! - [`errors`]: Runtime error types
//!
//! # Execution Model
//!
//! A program state pops one statement per step. The scheduler advances every
//! active state by exactly one step per round and joins on all of them before
//! the next round starts, so a state forked in round K first runs in K + 1.
//!
//! [`ProgramState`]: engine::ProgramState

pub mod constants;
pub mod engine;
pub mod errors;
pub mod expressions;
pub mod gc;
pub mod scheduler;
pub mod statements;
