// Program state: one independently scheduled thread of execution

use crate::ast::{Stmt, StmtRef};
use crate::interpreter::errors::RuntimeError;
use crate::memory::{
    files::FileTable, heap::Heap, stack::ExecutionStack, symbols::SymbolTable, value::Value,
};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static NEXT_STATE_ID: AtomicUsize = AtomicUsize::new(1);

fn next_state_id() -> usize {
    NEXT_STATE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Lifecycle of a program state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Statements remain and no step has failed
    Running,
    /// The execution stack drained normally
    Completed,
    /// A step failed; the state is excluded from further rounds
    Errored(RuntimeError),
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Running => write!(f, "running"),
            ExecutionStatus::Completed => write!(f, "completed"),
            ExecutionStatus::Errored(e) => write!(f, "errored: {}", e),
        }
    }
}

/// Per-thread aggregate stepped by the scheduler
#[derive(Debug)]
pub struct ProgramState {
    /// Unique id, assigned at creation
    id: usize,

    /// Pending statements, top runs next
    pub(crate) stack: ExecutionStack,

    /// Variable bindings owned by this state
    pub(crate) symbols: SymbolTable,

    /// Handle to the heap shared with parent and children
    pub(crate) heap: Heap,

    /// Values printed so far
    pub(crate) output: Vec<Value>,

    /// Open read handles
    pub(crate) files: FileTable,

    /// Program this state was created from, kept for diagnostics
    original_program: StmtRef,

    status: ExecutionStatus,
}

impl ProgramState {
    /// Create the initial state for `program` with a fresh heap
    pub fn new(program: Stmt) -> Self {
        Self::with_heap(Arc::new(program), Heap::new())
    }

    /// Create a state running `program` on an existing heap
    pub fn with_heap(program: StmtRef, heap: Heap) -> Self {
        ProgramState {
            id: next_state_id(),
            stack: ExecutionStack::with_root(Arc::clone(&program)),
            symbols: SymbolTable::new(),
            heap,
            output: Vec::new(),
            files: FileTable::new(),
            original_program: program,
            status: ExecutionStatus::Running,
        }
    }

    /// Child state for a `fork(body)`: copied symbol table, same heap,
    /// empty output and file table.
    pub(crate) fn forked(&self, body: StmtRef) -> Self {
        let mut child = Self::with_heap(body, self.heap.clone());
        child.symbols = self.symbols.clone();
        child
    }

    /// Pop the top statement and execute it.
    ///
    /// Returns the state created by a `fork`, if the statement was one.
    /// Stepping a state that is not active is a scheduling error and leaves
    /// the state untouched.
    pub fn one_step(&mut self) -> Result<Option<ProgramState>, RuntimeError> {
        if !self.is_active() {
            return Err(RuntimeError::SchedulingError {
                message: format!("thread {} has no statement to execute", self.id),
            });
        }
        let stmt = self
            .stack
            .pop()
            .ok_or_else(|| RuntimeError::SchedulingError {
                message: format!("execution stack of thread {} is empty", self.id),
            })?;

        tracing::debug!(thread = self.id, statement = %stmt, "executing");
        let forked = self.execute(&stmt)?;

        if self.stack.is_empty() {
            self.status = ExecutionStatus::Completed;
        }
        Ok(forked)
    }

    /// Exclude this state from scheduling because a step failed
    pub fn mark_errored(&mut self, error: RuntimeError) {
        self.status = ExecutionStatus::Errored(error);
    }

    /// The execution stack is empty
    pub fn is_completed(&self) -> bool {
        self.stack.is_empty()
    }

    /// Still eligible for scheduling
    pub fn is_active(&self) -> bool {
        self.status == ExecutionStatus::Running && !self.is_completed()
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn status(&self) -> &ExecutionStatus {
        &self.status
    }

    pub fn stack(&self) -> &ExecutionStack {
        &self.stack
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn output(&self) -> &[Value] {
        &self.output
    }

    pub fn files(&self) -> &FileTable {
        &self.files
    }

    pub fn original_program(&self) -> &StmtRef {
        &self.original_program
    }
}
