// Garbage collector tests

use forklang::ast::{Expr, Stmt};
use forklang::interpreter::engine::ProgramState;
use forklang::interpreter::gc::{collect_garbage, collect_heap, reachable_addresses};
use forklang::memory::heap::Heap;
use forklang::memory::value::{Type, Value};

fn reference(address: u64) -> Value {
    Value::Reference {
        address,
        location: Type::Int,
    }
}

fn run_state(state: &mut ProgramState) -> Vec<ProgramState> {
    let mut children = Vec::new();
    while state.is_active() {
        if let Some(child) = state.one_step().expect("step failed") {
            children.push(child);
        }
    }
    children
}

#[test]
fn test_chain_is_followed_to_the_end() {
    let heap = Heap::new();
    let last = heap.allocate(Value::Int(7));
    let middle = heap.allocate(reference(last));
    let first = heap.allocate(reference(middle));
    let stray = heap.allocate(Value::Int(1));

    let reachable = reachable_addresses([first], &heap.content());
    assert!(reachable.contains(&first));
    assert!(reachable.contains(&middle));
    assert!(reachable.contains(&last));
    assert!(!reachable.contains(&stray));

    assert_eq!(collect_heap(&heap, [first]), 1);
    assert_eq!(heap.len(), 3);
    assert!(!heap.contains(stray));
}

#[test]
fn test_rooted_cycle_is_retained() {
    let heap = Heap::new();
    let a = heap.allocate(Value::Int(0));
    let b = heap.allocate(reference(a));
    heap.put(a, reference(b)).expect("a is allocated");

    assert_eq!(collect_heap(&heap, [a]), 0);
    assert!(heap.contains(a));
    assert!(heap.contains(b));
}

#[test]
fn test_unrooted_cycle_is_removed() {
    let heap = Heap::new();
    let a = heap.allocate(Value::Int(0));
    let b = heap.allocate(reference(a));
    heap.put(a, reference(b)).expect("a is allocated");

    assert_eq!(collect_heap(&heap, std::iter::empty()), 2);
    assert!(heap.is_empty());
}

#[test]
fn test_dangling_root_is_harmless() {
    let heap = Heap::new();
    let cell = heap.allocate(Value::Int(3));
    assert_eq!(collect_heap(&heap, [0, 999]), 1);
    assert!(!heap.contains(cell));
}

#[test]
fn test_overwritten_reference_is_collected() {
    let program = Stmt::sequence([
        Stmt::declare("v", Type::reference(Type::Int)),
        Stmt::new_cell("v", Expr::int(20)),
        Stmt::new_cell("v", Expr::int(30)),
    ]);
    let mut state = ProgramState::new(program);
    run_state(&mut state);
    assert_eq!(state.heap().len(), 2);

    assert_eq!(collect_garbage(std::slice::from_ref(&state)), 1);
    assert_eq!(state.heap().sorted_entries().len(), 1);
    assert_eq!(
        state.heap().sorted_entries()[0].1,
        Value::Int(30),
        "the cell still bound to v survives"
    );
}

#[test]
fn test_roots_come_from_every_state_sharing_the_heap() {
    // The child rebinds its copy of `a`; the parent still holds the first cell.
    let program = Stmt::sequence([
        Stmt::declare("a", Type::reference(Type::Int)),
        Stmt::new_cell("a", Expr::int(1)),
        Stmt::fork(Stmt::new_cell("a", Expr::int(2))),
    ]);
    let mut parent = ProgramState::new(program);
    let mut children = run_state(&mut parent);
    let mut child = children.pop().expect("fork produced a child");
    run_state(&mut child);
    assert_eq!(parent.heap().len(), 2);

    let states = vec![parent, child];
    assert_eq!(collect_garbage(&states), 0);
    assert_eq!(states[0].heap().len(), 2);

    // Without the parent, its cell is unreachable.
    assert_eq!(collect_garbage(&states[1..]), 1);
    assert_eq!(states[1].heap().len(), 1);
}

#[test]
fn test_separate_heaps_are_collected_independently() {
    let mut first = ProgramState::new(Stmt::sequence([
        Stmt::declare("v", Type::reference(Type::Int)),
        Stmt::new_cell("v", Expr::int(1)),
    ]));
    let mut second = ProgramState::new(Stmt::sequence([
        Stmt::declare("w", Type::reference(Type::Int)),
        Stmt::new_cell("w", Expr::int(2)),
    ]));
    run_state(&mut first);
    run_state(&mut second);
    assert!(!first.heap().same_heap(second.heap()));

    // Roots of one heap never keep cells of the other alive.
    assert_eq!(collect_garbage(&[first, second]), 0);
}
