//! Runtime error types
//!
//! This module defines [`RuntimeError`], which represents every failure that
//! can occur while evaluating an expression, executing a statement, or
//! scheduling program states.
//!
//! Errors are fatal only for the program state that raised them: the
//! scheduler marks that state as errored and keeps running the others.

use crate::memory::value::Address;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Operand or expression type mismatch
    #[error("Type error: {message}")]
    TypeError { message: String },

    /// Integer division by zero
    #[error("Division by zero in {expression}")]
    DivisionByZero { expression: String },

    /// Checked arithmetic overflowed
    #[error("Integer overflow in operation: {operation}")]
    IntegerOverflow { operation: String },

    /// Operator token with no meaning in its family
    #[error("Unknown operator '{operator}'")]
    UnknownOperator { operator: String },

    /// Symbol table lookup of a name that was never declared
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },

    /// Heap access to an address that is not allocated
    #[error("Invalid heap address {address}")]
    InvalidAddress { address: Address },

    /// Statement-level contract violation
    #[error("Statement error: {message}")]
    StatementError { message: String },

    /// Open, read or close failure on a read handle, or a log write failure
    #[error("File error on '{file}': {message}")]
    FileError { file: String, message: String },

    /// Controller invariant violation
    #[error("Scheduling error: {message}")]
    SchedulingError { message: String },
}

impl RuntimeError {
    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        RuntimeError::TypeError {
            message: message.into(),
        }
    }

    pub(crate) fn statement(message: impl Into<String>) -> Self {
        RuntimeError::StatementError {
            message: message.into(),
        }
    }
}
