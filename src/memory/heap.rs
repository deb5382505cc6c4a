//! Shared heap implementation
//!
//! The heap maps [`Address`]es to [`Value`]s. A [`Heap`] is a cheap handle:
//! cloning it yields another handle to the *same* cells, which is how a
//! forked program state shares memory with its parent.
//!
//! Every public operation takes the lock exactly once, so concurrent steps
//! from different program states interleave operation by operation and never
//! observe a half-applied allocation or a half-rebuilt heap.

use super::value::{Address, Value};
use crate::interpreter::constants::FIRST_HEAP_ADDRESS;
use crate::interpreter::errors::RuntimeError;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The cells behind the lock
#[derive(Debug, Clone)]
pub struct HeapCells {
    cells: FxHashMap<Address, Value>,
    next_address: Address,
}

impl HeapCells {
    fn new() -> Self {
        HeapCells {
            cells: FxHashMap::default(),
            next_address: FIRST_HEAP_ADDRESS,
        }
    }

    /// Read-only view of the address -> value mapping
    pub fn cells(&self) -> &FxHashMap<Address, Value> {
        &self.cells
    }
}

/// Handle to a heap shared by a program state and everything forked from it
#[derive(Debug, Clone)]
pub struct Heap {
    inner: Arc<Mutex<HeapCells>>,
}

impl Heap {
    /// Create an empty heap
    pub fn new() -> Self {
        Heap {
            inner: Arc::new(Mutex::new(HeapCells::new())),
        }
    }

    // Every write completes under the lock, so a poisoned guard still holds consistent cells.
    fn lock(&self) -> MutexGuard<'_, HeapCells> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `value` in a fresh cell and return its address
    pub fn allocate(&self, value: Value) -> Address {
        let mut heap = self.lock();
        let address = heap.next_address;
        heap.next_address += 1;
        heap.cells.insert(address, value);
        address
    }

    /// Read the value stored at `address`
    pub fn get(&self, address: Address) -> Result<Value, RuntimeError> {
        self.lock()
            .cells
            .get(&address)
            .cloned()
            .ok_or(RuntimeError::InvalidAddress { address })
    }

    /// Overwrite the value stored at an already allocated `address`
    pub fn put(&self, address: Address, value: Value) -> Result<(), RuntimeError> {
        let mut heap = self.lock();
        match heap.cells.get_mut(&address) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(RuntimeError::InvalidAddress { address }),
        }
    }

    /// Check whether `address` is currently allocated
    pub fn contains(&self, address: Address) -> bool {
        self.lock().cells.contains_key(&address)
    }

    pub fn len(&self) -> usize {
        self.lock().cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().cells.is_empty()
    }

    /// Copy of the current contents
    pub fn content(&self) -> FxHashMap<Address, Value> {
        self.lock().cells.clone()
    }

    /// Contents ordered by address, for display
    pub fn sorted_entries(&self) -> Vec<(Address, Value)> {
        let mut entries: Vec<(Address, Value)> = self
            .lock()
            .cells
            .iter()
            .map(|(address, value)| (*address, value.clone()))
            .collect();
        entries.sort_by_key(|(address, _)| *address);
        entries
    }

    /// Rebuild the heap keeping only the addresses chosen by `keep`.
    ///
    /// `keep` runs while the lock is held, so choosing and discarding form one
    /// atomic operation. Returns the number of discarded cells.
    pub fn rebuild<F>(&self, keep: F) -> usize
    where
        F: FnOnce(&HeapCells) -> FxHashSet<Address>,
    {
        let mut heap = self.lock();
        let reachable = keep(&heap);
        let before = heap.cells.len();
        heap.cells.retain(|address, _| reachable.contains(address));
        before - heap.cells.len()
    }

    /// Whether two handles refer to the same heap
    pub fn same_heap(&self, other: &Heap) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (address, value) in self.sorted_entries() {
            writeln!(f, "{} -> {}", address, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_hands_out_fresh_addresses() {
        let heap = Heap::new();
        let a = heap.allocate(Value::Int(1));
        let b = heap.allocate(Value::Int(2));
        assert_ne!(a, b);
        assert_ne!(a, 0);
        assert_eq!(heap.get(b).unwrap(), Value::Int(2));
    }

    #[test]
    fn put_requires_an_allocated_cell() {
        let heap = Heap::new();
        let err = heap.put(42, Value::Int(1)).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidAddress { address: 42 }));
    }

    #[test]
    fn cloned_handles_share_cells() {
        let heap = Heap::new();
        let other = heap.clone();
        let address = heap.allocate(Value::Int(20));
        other.put(address, Value::Int(30)).unwrap();
        assert_eq!(heap.get(address).unwrap(), Value::Int(30));
        assert!(heap.same_heap(&other));
        assert!(!heap.same_heap(&Heap::new()));
    }

    #[test]
    fn rebuild_discards_unchosen_cells() {
        let heap = Heap::new();
        let keep = heap.allocate(Value::Int(1));
        heap.allocate(Value::Int(2));
        let removed = heap.rebuild(|_| [keep].into_iter().collect());
        assert_eq!(removed, 1);
        assert_eq!(heap.len(), 1);
        assert!(heap.contains(keep));
    }

    #[test]
    fn addresses_are_not_reused_after_collection() {
        let heap = Heap::new();
        let first = heap.allocate(Value::Int(1));
        heap.rebuild(|_| FxHashSet::default());
        let second = heap.allocate(Value::Int(2));
        assert_ne!(first, second);
    }
}
