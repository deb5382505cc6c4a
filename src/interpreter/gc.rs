//! Conservative garbage collector
//!
//! Runs once per round, before any state is stepped. Roots are the addresses
//! held by Reference values in the symbol tables of *all* active states that
//! share a heap. The reachable set is then grown to a fixed point by
//! following References stored in heap cells, and the heap is rebuilt with
//! only the reachable cells.
//!
//! Addresses mentioned only by statements still waiting on an execution stack
//! are not roots.

use crate::interpreter::engine::ProgramState;
use crate::memory::heap::Heap;
use crate::memory::value::{Address, Value};
use rustc_hash::{FxHashMap, FxHashSet};

/// Addresses reachable from `roots` through any number of heap indirections.
///
/// Cycle-safe: an address is added at most once, so an unreachable cycle is
/// never pulled in and a reachable one terminates.
pub fn reachable_addresses<I>(roots: I, cells: &FxHashMap<Address, Value>) -> FxHashSet<Address>
where
    I: IntoIterator<Item = Address>,
{
    let mut reachable: FxHashSet<Address> = roots.into_iter().collect();
    loop {
        let discovered: Vec<Address> = cells
            .iter()
            .filter(|(address, _)| reachable.contains(*address))
            .filter_map(|(_, value)| value.as_address())
            .filter(|target| !reachable.contains(target))
            .collect();
        if discovered.is_empty() {
            return reachable;
        }
        reachable.extend(discovered);
    }
}

/// Collect `heap` using `roots`; returns the number of discarded cells
pub fn collect_heap<I>(heap: &Heap, roots: I) -> usize
where
    I: IntoIterator<Item = Address>,
{
    heap.rebuild(|cells| reachable_addresses(roots, cells.cells()))
}

/// Collect every heap used by `states`, each rooted in the symbol tables of
/// the states sharing it. Returns the total number of discarded cells.
pub fn collect_garbage(states: &[ProgramState]) -> usize {
    let mut groups: Vec<(&Heap, Vec<Address>)> = Vec::new();
    for state in states {
        let roots = state.symbols().referenced_addresses();
        match groups.iter_mut().find(|(heap, _)| heap.same_heap(state.heap())) {
            Some((_, group_roots)) => group_roots.extend(roots),
            None => groups.push((state.heap(), roots.collect())),
        }
    }

    let mut discarded = 0;
    for (heap, roots) in groups {
        let removed = collect_heap(heap, roots);
        if removed > 0 {
            tracing::debug!(removed, remaining = heap.len(), "collected heap cells");
        }
        discarded += removed;
    }
    discarded
}
