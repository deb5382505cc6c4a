//! Execution stack implementation
//!
//! A LIFO of statements still to run; the top is executed next. The stack
//! owns its entries: nodes are shared immutably through [`StmtRef`], so two
//! program states forked from the same source never alias a mutable stack.

use crate::ast::{Stmt, StmtRef};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ExecutionStack {
    statements: Vec<StmtRef>,
}

impl ExecutionStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stack seeded with a single statement
    pub fn with_root(root: StmtRef) -> Self {
        ExecutionStack {
            statements: vec![root],
        }
    }

    pub fn push(&mut self, stmt: StmtRef) {
        self.statements.push(stmt);
    }

    /// Push a statement built in place
    pub fn push_new(&mut self, stmt: Stmt) {
        self.statements.push(Arc::new(stmt));
    }

    pub fn pop(&mut self) -> Option<StmtRef> {
        self.statements.pop()
    }

    /// Next statement to run, if any
    pub fn top(&self) -> Option<&StmtRef> {
        self.statements.last()
    }

    /// Number of pending statements
    pub fn depth(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Entries from top to bottom
    pub fn iter(&self) -> impl Iterator<Item = &StmtRef> {
        self.statements.iter().rev()
    }
}

impl fmt::Display for ExecutionStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in self.iter() {
            writeln!(f, "{}", stmt)?;
        }
        Ok(())
    }
}
