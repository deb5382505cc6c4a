//! Symbol table: variable name -> current value
//!
//! Each program state owns its table outright. Forking copies the table, so
//! a child never observes later bindings made by its parent or vice versa.

use super::value::{Address, Value};
use crate::interpreter::errors::RuntimeError;
use rustc_hash::FxHashMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    bindings: FxHashMap<String, Value>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a variable is declared
    pub fn is_defined(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Look up a variable, failing if it was never declared
    pub fn lookup(&self, name: &str) -> Result<&Value, RuntimeError> {
        self.bindings
            .get(name)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    /// Bind a new variable; redeclaration is a statement error
    pub fn declare(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        if self.is_defined(name) {
            return Err(RuntimeError::StatementError {
                message: format!("variable '{}' is already declared", name),
            });
        }
        self.bindings.insert(name.to_string(), value);
        Ok(())
    }

    /// Overwrite an existing binding.
    ///
    /// The name must already be declared and `value` must have the same type
    /// as the current binding.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let slot = self
            .bindings
            .get_mut(name)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
            })?;
        if !slot.equal_type(&value) {
            return Err(RuntimeError::StatementError {
                message: format!(
                    "declared type of variable '{}' ({}) and type of the assigned value ({}) do not match",
                    name,
                    slot.type_of(),
                    value.type_of()
                ),
            });
        }
        *slot = value;
        Ok(())
    }

    /// Every address held directly by a Reference binding
    pub fn referenced_addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.bindings.values().filter_map(Value::as_address)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings ordered by name, for display
    pub fn sorted_entries(&self) -> Vec<(&str, &Value)> {
        let mut entries: Vec<(&str, &Value)> = self
            .bindings
            .iter()
            .map(|(name, value)| (name.as_str(), value))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.sorted_entries() {
            writeln!(f, "{} -> {}", name, value)?;
        }
        Ok(())
    }
}
