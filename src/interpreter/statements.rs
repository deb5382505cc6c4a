//! Statement execution implementation
//!
//! One state transition per statement kind. The statement has already been
//! popped by [`ProgramState::one_step`] when [`ProgramState::execute`] runs;
//! statements that need follow-up work push it back onto the stack.
//!
//! # Control Flow
//!
//! - `(s1; s2)` pushes `s2` then `s1`, so `s1` runs first
//! - `if` pushes the chosen branch
//! - `while` pushes `(body; while ...)` when the guard holds, re-arming itself
//! - `fork` leaves this state alone and returns a new one sharing the heap

use crate::ast::{Expr, Stmt, StmtRef};
use crate::interpreter::engine::ProgramState;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::{Address, Type, Value};
use std::sync::Arc;

impl ProgramState {
    /// Execute a popped statement against this state
    pub(crate) fn execute(&mut self, stmt: &StmtRef) -> Result<Option<ProgramState>, RuntimeError> {
        match stmt.as_ref() {
            Stmt::Nop => {}

            Stmt::VarDecl { name, var_type } => {
                self.symbols.declare(name, var_type.default_value())?;
            }

            Stmt::Assign { name, expr } => {
                let value = self.evaluate(expr)?;
                self.symbols.assign(name, value)?;
            }

            Stmt::Compound(first, second) => {
                self.stack.push(Arc::clone(second));
                self.stack.push(Arc::clone(first));
            }

            Stmt::If {
                guard,
                then_branch,
                else_branch,
            } => {
                let branch = if self.evaluate_guard(guard, "if")? {
                    then_branch
                } else {
                    else_branch
                };
                self.stack.push(Arc::clone(branch));
            }

            Stmt::While { guard, body } => {
                if self.evaluate_guard(guard, "while")? {
                    self.stack
                        .push_new(Stmt::Compound(Arc::clone(body), Arc::clone(stmt)));
                }
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                self.output.push(value);
            }

            Stmt::Fork(body) => {
                return Ok(Some(self.forked(Arc::clone(body))));
            }

            Stmt::New { name, expr } => self.execute_new(name, expr)?,

            Stmt::HeapWrite { name, expr } => self.execute_heap_write(name, expr)?,

            Stmt::OpenRead(file) => {
                let file_name = self.evaluate_file_name(file)?;
                self.files.open(&file_name)?;
            }

            Stmt::ReadFile { file, name } => self.execute_read_file(file, name)?,

            Stmt::CloseRead(file) => {
                let file_name = self.evaluate_file_name(file)?;
                self.files.close(&file_name)?;
            }
        }
        Ok(None)
    }

    fn evaluate(&self, expr: &Expr) -> Result<Value, RuntimeError> {
        expr.evaluate(&self.symbols, &self.heap)
    }

    fn evaluate_guard(&self, guard: &Expr, construct: &str) -> Result<bool, RuntimeError> {
        let value = self.evaluate(guard)?;
        value.as_bool().ok_or_else(|| {
            RuntimeError::statement(format!(
                "{} condition ({}) is not a bool",
                construct, guard
            ))
        })
    }

    fn evaluate_file_name(&self, file: &Expr) -> Result<String, RuntimeError> {
        match self.evaluate(file)? {
            Value::String(name) => Ok(name),
            _ => Err(RuntimeError::statement(format!(
                "the given expression ({}) is not a string",
                file
            ))),
        }
    }

    /// Location type of the reference variable `name`
    fn reference_target(&self, name: &str) -> Result<(Address, Type), RuntimeError> {
        match self.symbols.lookup(name)? {
            Value::Reference { address, location } => Ok((*address, location.clone())),
            other => Err(RuntimeError::statement(format!(
                "variable '{}' is not a reference (found {})",
                name,
                other.type_of()
            ))),
        }
    }

    fn execute_new(&mut self, name: &str, expr: &Expr) -> Result<(), RuntimeError> {
        let (_, location) = self.reference_target(name)?;
        let value = self.evaluate(expr)?;
        if value.type_of() != location {
            return Err(RuntimeError::statement(format!(
                "new({}, ...) expects a value of type {}, got {}",
                name,
                location,
                value.type_of()
            )));
        }
        let address = self.heap.allocate(value);
        self.symbols
            .assign(name, Value::Reference { address, location })
    }

    fn execute_heap_write(&mut self, name: &str, expr: &Expr) -> Result<(), RuntimeError> {
        let (address, location) = self.reference_target(name)?;
        if !self.heap.contains(address) {
            return Err(RuntimeError::InvalidAddress { address });
        }
        let value = self.evaluate(expr)?;
        if value.type_of() != location {
            return Err(RuntimeError::statement(format!(
                "wH({}, ...) expects a value of type {}, got {}",
                name,
                location,
                value.type_of()
            )));
        }
        self.heap.put(address, value)
    }

    fn execute_read_file(&mut self, file: &Expr, name: &str) -> Result<(), RuntimeError> {
        if self.symbols.lookup(name)?.type_of() != Type::Int {
            return Err(RuntimeError::statement(format!(
                "readFile target '{}' is not an int",
                name
            )));
        }
        let file_name = self.evaluate_file_name(file)?;
        let value = match self.files.read_line(&file_name)? {
            None => 0,
            Some(line) => line
                .trim()
                .parse::<i64>()
                .map_err(|_| RuntimeError::FileError {
                    file: file_name.clone(),
                    message: format!("'{}' is not an integer", line.trim()),
                })?,
        };
        self.symbols.assign(name, Value::Int(value))
    }
}
