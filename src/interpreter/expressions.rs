//! Expression evaluation implementation
//!
//! Evaluation is pure: it reads the symbol table and (for `rH`) the shared
//! heap, and never mutates either.
//!
//! # Operand Ordering
//!
//! Binary operators evaluate the left operand first and check its type
//! *before* the right operand is evaluated. When both operands are ill-typed
//! the error therefore always names the first operand.
//!
//! # Safety
//!
//! All arithmetic uses checked math; overflow and division by zero surface as
//! [`RuntimeError`]s instead of panicking.

use crate::ast::{ArithOp, Expr, LogicOp, RelOp};
use crate::interpreter::errors::RuntimeError;
use crate::memory::heap::Heap;
use crate::memory::symbols::SymbolTable;
use crate::memory::value::Value;

impl Expr {
    /// Evaluate this expression against a symbol table and heap
    pub fn evaluate(&self, symbols: &SymbolTable, heap: &Heap) -> Result<Value, RuntimeError> {
        match self {
            Expr::Constant(value) => Ok(value.clone()),

            Expr::Variable(name) => symbols.lookup(name).cloned(),

            Expr::Arithmetic { op, left, right } => {
                let a = left
                    .evaluate(symbols, heap)?
                    .as_int()
                    .ok_or_else(|| RuntimeError::type_error("first operand not integer"))?;
                let b = right
                    .evaluate(symbols, heap)?
                    .as_int()
                    .ok_or_else(|| RuntimeError::type_error("second operand not integer"))?;
                self.apply_arith(*op, a, b).map(Value::Int)
            }

            Expr::Logical { op, left, right } => {
                let a = left
                    .evaluate(symbols, heap)?
                    .as_bool()
                    .ok_or_else(|| RuntimeError::type_error("first operand not bool"))?;
                let b = right
                    .evaluate(symbols, heap)?
                    .as_bool()
                    .ok_or_else(|| RuntimeError::type_error("second operand not bool"))?;
                Ok(Value::Bool(match op {
                    LogicOp::And => a && b,
                    LogicOp::Or => a || b,
                    LogicOp::Xor => a ^ b,
                }))
            }

            Expr::Relational { op, left, right } => {
                let a = left.evaluate(symbols, heap)?;
                if !op.is_equality() && a.as_int().is_none() {
                    return Err(RuntimeError::type_error("first operand not integer"));
                }
                let b = right.evaluate(symbols, heap)?;
                if !a.equal_type(&b) {
                    return Err(RuntimeError::type_error(format!(
                        "second operand not {}",
                        a.type_of()
                    )));
                }
                Ok(Value::Bool(compare(*op, &a, &b)))
            }

            Expr::HeapRead(address) => {
                let value = address.evaluate(symbols, heap)?;
                let address = value.as_address().ok_or_else(|| {
                    RuntimeError::type_error(format!(
                        "heap read expects a reference, got {}",
                        value.type_of()
                    ))
                })?;
                heap.get(address)
            }
        }
    }

    #[inline]
    fn apply_arith(&self, op: ArithOp, a: i64, b: i64) -> Result<i64, RuntimeError> {
        let result = match op {
            ArithOp::Add => a.checked_add(b),
            ArithOp::Sub => a.checked_sub(b),
            ArithOp::Mul => a.checked_mul(b),
            ArithOp::Div => {
                if b == 0 {
                    return Err(RuntimeError::DivisionByZero {
                        expression: self.to_string(),
                    });
                }
                a.checked_div(b)
            }
        };
        result.ok_or_else(|| RuntimeError::IntegerOverflow {
            operation: format!("{} {} {}", a, op.symbol(), b),
        })
    }
}

// Callers guarantee both operands share a type, and that it is Int for ordering operators.
fn compare(op: RelOp, a: &Value, b: &Value) -> bool {
    let x = a.as_int().unwrap_or_default();
    let y = b.as_int().unwrap_or_default();
    match op {
        RelOp::Equal => a == b,
        RelOp::NotEqual => a != b,
        RelOp::Less => x < y,
        RelOp::LessEqual => x <= y,
        RelOp::Greater => x > y,
        RelOp::GreaterEqual => x >= y,
    }
}
