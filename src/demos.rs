//! Built-in example programs
//!
//! Statement trees for the classic exercises: declarations, arithmetic,
//! branching, file reading, heap allocation, heap reads and writes, garbage
//! collection, loops and fork. The CLI picks one by number.

use crate::ast::{ArithOp, Expr, RelOp, Stmt};
use crate::memory::value::Type;

/// A named example program
pub struct Demo {
    pub name: &'static str,
    build: fn() -> Stmt,
}

impl Demo {
    /// Build a fresh statement tree for this demo
    pub fn program(&self) -> Stmt {
        (self.build)()
    }
}

/// All demos, in menu order
pub fn all() -> Vec<Demo> {
    vec![
        Demo {
            name: "declare and print",
            build: declare_and_print,
        },
        Demo {
            name: "arithmetic",
            build: arithmetic,
        },
        Demo {
            name: "if / else",
            build: branching,
        },
        Demo {
            name: "read integers from test.in",
            build: read_file,
        },
        Demo {
            name: "heap allocation",
            build: heap_allocation,
        },
        Demo {
            name: "heap read",
            build: heap_read,
        },
        Demo {
            name: "heap write",
            build: heap_write,
        },
        Demo {
            name: "garbage collection",
            build: garbage_collection,
        },
        Demo {
            name: "while loop",
            build: while_loop,
        },
        Demo {
            name: "fork",
            build: fork,
        },
    ]
}

/// Look up a demo by its 1-based menu number
pub fn by_number(number: usize) -> Option<Demo> {
    all().into_iter().nth(number.checked_sub(1)?)
}

fn ref_int() -> Type {
    Type::reference(Type::Int)
}

// int v; v = 2; print(v)
fn declare_and_print() -> Stmt {
    Stmt::sequence([
        Stmt::declare("v", Type::Int),
        Stmt::assign("v", Expr::int(2)),
        Stmt::print(Expr::var("v")),
    ])
}

// int a; int b; a = 2 + 3 * 5; b = a + 1; print(b)
fn arithmetic() -> Stmt {
    Stmt::sequence([
        Stmt::declare("a", Type::Int),
        Stmt::declare("b", Type::Int),
        Stmt::assign(
            "a",
            Expr::arith(
                ArithOp::Add,
                Expr::int(2),
                Expr::arith(ArithOp::Mul, Expr::int(3), Expr::int(5)),
            ),
        ),
        Stmt::assign("b", Expr::arith(ArithOp::Add, Expr::var("a"), Expr::int(1))),
        Stmt::print(Expr::var("b")),
    ])
}

// bool a; int v; a = true; if a then v = 2 else v = 3; print(v)
fn branching() -> Stmt {
    Stmt::sequence([
        Stmt::declare("a", Type::Bool),
        Stmt::declare("v", Type::Int),
        Stmt::assign("a", Expr::bool(true)),
        Stmt::if_then_else(
            Expr::var("a"),
            Stmt::assign("v", Expr::int(2)),
            Stmt::assign("v", Expr::int(3)),
        ),
        Stmt::print(Expr::var("v")),
    ])
}

fn read_file() -> Stmt {
    Stmt::sequence([
        Stmt::declare("varf", Type::String),
        Stmt::assign("varf", Expr::string("test.in")),
        Stmt::open_read(Expr::var("varf")),
        Stmt::declare("varc", Type::Int),
        Stmt::read_file(Expr::var("varf"), "varc"),
        Stmt::print(Expr::var("varc")),
        Stmt::read_file(Expr::var("varf"), "varc"),
        Stmt::print(Expr::var("varc")),
        Stmt::close_read(Expr::var("varf")),
    ])
}

// Ref int v; new(v, 20); Ref Ref int a; new(a, v); print(v); print(a)
fn heap_allocation() -> Stmt {
    Stmt::sequence([
        Stmt::declare("v", ref_int()),
        Stmt::new_cell("v", Expr::int(20)),
        Stmt::declare("a", Type::reference(ref_int())),
        Stmt::new_cell("a", Expr::var("v")),
        Stmt::print(Expr::var("v")),
        Stmt::print(Expr::var("a")),
    ])
}

// ... print(rH(v)); print(rH(rH(a)) + 5)
fn heap_read() -> Stmt {
    Stmt::sequence([
        Stmt::declare("v", ref_int()),
        Stmt::new_cell("v", Expr::int(20)),
        Stmt::declare("a", Type::reference(ref_int())),
        Stmt::new_cell("a", Expr::var("v")),
        Stmt::print(Expr::heap_read(Expr::var("v"))),
        Stmt::print(Expr::arith(
            ArithOp::Add,
            Expr::heap_read(Expr::heap_read(Expr::var("a"))),
            Expr::int(5),
        )),
    ])
}

// Ref int v; new(v, 20); print(rH(v)); wH(v, 30); print(rH(v) + 5)
fn heap_write() -> Stmt {
    Stmt::sequence([
        Stmt::declare("v", ref_int()),
        Stmt::new_cell("v", Expr::int(20)),
        Stmt::print(Expr::heap_read(Expr::var("v"))),
        Stmt::heap_write("v", Expr::int(30)),
        Stmt::print(Expr::arith(
            ArithOp::Add,
            Expr::heap_read(Expr::var("v")),
            Expr::int(5),
        )),
    ])
}

// The first cell of v stays alive through a; the second one replaces it in v.
fn garbage_collection() -> Stmt {
    Stmt::sequence([
        Stmt::declare("v", ref_int()),
        Stmt::new_cell("v", Expr::int(20)),
        Stmt::declare("a", Type::reference(ref_int())),
        Stmt::new_cell("a", Expr::var("v")),
        Stmt::new_cell("v", Expr::int(30)),
        Stmt::print(Expr::heap_read(Expr::heap_read(Expr::var("a")))),
    ])
}

// int v; v = 4; while (v > 0) (print(v); v = v - 1); print(v)
fn while_loop() -> Stmt {
    Stmt::sequence([
        Stmt::declare("v", Type::Int),
        Stmt::assign("v", Expr::int(4)),
        Stmt::while_loop(
            Expr::rel(RelOp::Greater, Expr::var("v"), Expr::int(0)),
            Stmt::sequence([
                Stmt::print(Expr::var("v")),
                Stmt::assign("v", Expr::arith(ArithOp::Sub, Expr::var("v"), Expr::int(1))),
            ]),
        ),
        Stmt::print(Expr::var("v")),
    ])
}

// int v; Ref int a; v = 10; new(a, 22);
// fork(wH(a, 30); v = 32; print(v); print(rH(a)));
// print(v); print(rH(a))
fn fork() -> Stmt {
    Stmt::sequence([
        Stmt::declare("v", Type::Int),
        Stmt::declare("a", ref_int()),
        Stmt::assign("v", Expr::int(10)),
        Stmt::new_cell("a", Expr::int(22)),
        Stmt::fork(Stmt::sequence([
            Stmt::heap_write("a", Expr::int(30)),
            Stmt::assign("v", Expr::int(32)),
            Stmt::print(Expr::var("v")),
            Stmt::print(Expr::heap_read(Expr::var("a"))),
        ])),
        Stmt::print(Expr::var("v")),
        Stmt::print(Expr::heap_read(Expr::var("a"))),
    ])
}
