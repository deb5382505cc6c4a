//! Memory model for the interpreter
//!
//! This module provides the containers a program state is made of:
//! - [`value`]: Runtime value and type representation (Int, Bool, String, Reference)
//! - [`stack`]: Execution stack of pending statements
//! - [`symbols`]: Symbol table mapping variable names to values
//! - [`heap`]: Heap of addressable cells, shared by identity across forks
//! - [`files`]: Table of open read handles
//!
//! # Ownership
//!
//! Only the heap is ever shared between program states. Every other
//! container is owned by exactly one state and needs no synchronization.

pub mod files;
pub mod heap;
pub mod stack;
pub mod symbols;
pub mod value;
