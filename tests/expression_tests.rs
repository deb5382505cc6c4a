// Expression evaluation tests

use forklang::ast::{ArithOp, Expr, LogicOp, RelOp};
use forklang::interpreter::errors::RuntimeError;
use forklang::memory::heap::Heap;
use forklang::memory::symbols::SymbolTable;
use forklang::memory::value::{Type, Value};

fn eval(expr: &Expr) -> Result<Value, RuntimeError> {
    expr.evaluate(&SymbolTable::new(), &Heap::new())
}

fn type_message(result: Result<Value, RuntimeError>) -> String {
    match result {
        Err(RuntimeError::TypeError { message }) => message,
        other => panic!("expected a type error, got {:?}", other),
    }
}

#[test]
fn test_addition() {
    let expr = Expr::arith(ArithOp::Add, Expr::int(3), Expr::int(4));
    assert_eq!(eval(&expr).unwrap(), Value::Int(7));
}

#[test]
fn test_precedence_is_tree_shape() {
    // 2 + 3 * 5
    let expr = Expr::arith(
        ArithOp::Add,
        Expr::int(2),
        Expr::arith(ArithOp::Mul, Expr::int(3), Expr::int(5)),
    );
    assert_eq!(eval(&expr).unwrap(), Value::Int(17));
}

#[test]
fn test_division_truncates() {
    let expr = Expr::arith(ArithOp::Div, Expr::int(7), Expr::int(2));
    assert_eq!(eval(&expr).unwrap(), Value::Int(3));
}

#[test]
fn test_division_by_zero_is_distinct() {
    let expr = Expr::arith(ArithOp::Div, Expr::int(3), Expr::int(0));
    let err = eval(&expr).unwrap_err();
    assert!(
        matches!(err, RuntimeError::DivisionByZero { .. }),
        "got {:?}",
        err
    );
}

#[test]
fn test_overflow_is_reported() {
    let expr = Expr::arith(ArithOp::Mul, Expr::int(i64::MAX), Expr::int(2));
    assert!(matches!(
        eval(&expr).unwrap_err(),
        RuntimeError::IntegerOverflow { .. }
    ));
}

#[test]
fn test_arithmetic_operand_checks() {
    let first = Expr::arith(ArithOp::Add, Expr::bool(true), Expr::int(1));
    assert_eq!(type_message(eval(&first)), "first operand not integer");

    let second = Expr::arith(ArithOp::Add, Expr::int(1), Expr::string("x"));
    assert_eq!(type_message(eval(&second)), "second operand not integer");
}

#[test]
fn test_left_operand_error_wins() {
    // The right side would fail with an unbound variable if it were evaluated.
    let expr = Expr::arith(ArithOp::Add, Expr::bool(true), Expr::var("missing"));
    assert_eq!(type_message(eval(&expr)), "first operand not integer");

    let expr = Expr::logic(LogicOp::Xor, Expr::int(1), Expr::var("missing"));
    assert_eq!(type_message(eval(&expr)), "first operand not bool");
}

#[test]
fn test_logical_operators() {
    let xor = Expr::logic(LogicOp::Xor, Expr::bool(true), Expr::bool(false));
    assert_eq!(eval(&xor).unwrap(), Value::Bool(true));

    let and = Expr::logic(LogicOp::And, Expr::bool(true), Expr::bool(false));
    assert_eq!(eval(&and).unwrap(), Value::Bool(false));

    let or = Expr::logic(LogicOp::Or, Expr::bool(false), Expr::bool(true));
    assert_eq!(eval(&or).unwrap(), Value::Bool(true));

    let bad = Expr::logic(LogicOp::And, Expr::bool(true), Expr::int(0));
    assert_eq!(type_message(eval(&bad)), "second operand not bool");
}

#[test]
fn test_relational_operators() {
    let less = Expr::rel(RelOp::Less, Expr::int(1), Expr::int(2));
    assert_eq!(eval(&less).unwrap(), Value::Bool(true));

    let ge = Expr::rel(RelOp::GreaterEqual, Expr::int(1), Expr::int(2));
    assert_eq!(eval(&ge).unwrap(), Value::Bool(false));

    let eq = Expr::rel(RelOp::Equal, Expr::string("a"), Expr::string("a"));
    assert_eq!(eval(&eq).unwrap(), Value::Bool(true));

    let ne = Expr::rel(RelOp::NotEqual, Expr::bool(true), Expr::bool(false));
    assert_eq!(eval(&ne).unwrap(), Value::Bool(true));
}

#[test]
fn test_relational_type_checks() {
    let ordering_on_bool = Expr::rel(RelOp::Less, Expr::bool(true), Expr::var("missing"));
    assert_eq!(type_message(eval(&ordering_on_bool)), "first operand not integer");

    let mixed = Expr::rel(RelOp::Equal, Expr::int(1), Expr::bool(true));
    assert_eq!(type_message(eval(&mixed)), "second operand not int");
}

#[test]
fn test_variables_and_unbound_names() {
    let mut symbols = SymbolTable::new();
    symbols.declare("x", Value::Int(5)).unwrap();
    let heap = Heap::new();

    let expr = Expr::arith(ArithOp::Sub, Expr::var("x"), Expr::int(2));
    assert_eq!(expr.evaluate(&symbols, &heap).unwrap(), Value::Int(3));

    let err = Expr::var("y").evaluate(&symbols, &heap).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::UndefinedVariable {
            name: "y".to_string()
        }
    );
}

#[test]
fn test_heap_read_follows_references() {
    let heap = Heap::new();
    let inner = heap.allocate(Value::Int(20));
    let outer = heap.allocate(Value::Reference {
        address: inner,
        location: Type::Int,
    });

    let mut symbols = SymbolTable::new();
    symbols
        .declare(
            "a",
            Value::Reference {
                address: outer,
                location: Type::reference(Type::Int),
            },
        )
        .unwrap();

    let expr = Expr::arith(
        ArithOp::Add,
        Expr::heap_read(Expr::heap_read(Expr::var("a"))),
        Expr::int(5),
    );
    assert_eq!(expr.evaluate(&symbols, &heap).unwrap(), Value::Int(25));
}

#[test]
fn test_heap_read_of_dangling_reference() {
    let mut symbols = SymbolTable::new();
    symbols
        .declare("v", Type::reference(Type::Int).default_value())
        .unwrap();
    let err = Expr::heap_read(Expr::var("v"))
        .evaluate(&symbols, &Heap::new())
        .unwrap_err();
    assert_eq!(err, RuntimeError::InvalidAddress { address: 0 });

    let not_a_ref = Expr::heap_read(Expr::int(3));
    assert!(matches!(
        eval(&not_a_ref).unwrap_err(),
        RuntimeError::TypeError { .. }
    ));
}
