//! Statement and expression trees
//!
//! Trees are immutable once built. Statement children are held behind
//! [`Arc`], so pushing a subtree onto an execution stack, or handing a fork
//! body to a new program state, shares the node instead of copying it; no
//! stack can ever mutate a node another stack sees.

use crate::interpreter::errors::RuntimeError;
use crate::memory::value::{Type, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Shared, immutable statement node
pub type StmtRef = Arc<Stmt>;

/// Arithmetic operators over Int operands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Logical operators over Bool operands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
    Xor,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Less,
    LessEqual,
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
}

impl RelOp {
    /// `==` and `!=` accept any pair of equally typed operands
    pub fn is_equality(self) -> bool {
        matches!(self, RelOp::Equal | RelOp::NotEqual)
    }
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }
}

impl LogicOp {
    pub fn symbol(self) -> &'static str {
        match self {
            LogicOp::And => "&&",
            LogicOp::Or => "||",
            LogicOp::Xor => "^",
        }
    }
}

impl RelOp {
    pub fn symbol(self) -> &'static str {
        match self {
            RelOp::Less => "<",
            RelOp::LessEqual => "<=",
            RelOp::Equal => "==",
            RelOp::NotEqual => "!=",
            RelOp::Greater => ">",
            RelOp::GreaterEqual => ">=",
        }
    }
}

fn unknown_operator(token: &str) -> RuntimeError {
    RuntimeError::UnknownOperator {
        operator: token.to_string(),
    }
}

impl FromStr for ArithOp {
    type Err = RuntimeError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "+" => Ok(ArithOp::Add),
            "-" => Ok(ArithOp::Sub),
            "*" => Ok(ArithOp::Mul),
            "/" => Ok(ArithOp::Div),
            _ => Err(unknown_operator(token)),
        }
    }
}

impl FromStr for LogicOp {
    type Err = RuntimeError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "&&" => Ok(LogicOp::And),
            "||" => Ok(LogicOp::Or),
            "^" => Ok(LogicOp::Xor),
            _ => Err(unknown_operator(token)),
        }
    }
}

impl FromStr for RelOp {
    type Err = RuntimeError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "<" => Ok(RelOp::Less),
            "<=" => Ok(RelOp::LessEqual),
            "==" => Ok(RelOp::Equal),
            "!=" => Ok(RelOp::NotEqual),
            ">" => Ok(RelOp::Greater),
            ">=" => Ok(RelOp::GreaterEqual),
            _ => Err(unknown_operator(token)),
        }
    }
}

/// Side-effect-free expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(Value),
    Variable(String),
    Arithmetic {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Relational {
        op: RelOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `rH(e)`: value stored at the address `e` evaluates to
    HeapRead(Box<Expr>),
}

impl Expr {
    pub fn int(n: i64) -> Self {
        Expr::Constant(Value::Int(n))
    }

    pub fn bool(b: bool) -> Self {
        Expr::Constant(Value::Bool(b))
    }

    pub fn string(s: &str) -> Self {
        Expr::Constant(Value::String(s.to_string()))
    }

    pub fn var(name: &str) -> Self {
        Expr::Variable(name.to_string())
    }

    pub fn arith(op: ArithOp, left: Expr, right: Expr) -> Self {
        Expr::Arithmetic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn logic(op: LogicOp, left: Expr, right: Expr) -> Self {
        Expr::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn rel(op: RelOp, left: Expr, right: Expr) -> Self {
        Expr::Relational {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn heap_read(address: Expr) -> Self {
        Expr::HeapRead(Box::new(address))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(value) => write!(f, "{}", value),
            Expr::Variable(name) => write!(f, "{}", name),
            Expr::Arithmetic { op, left, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
            Expr::Logical { op, left, right } => write!(f, "{} {} {}", left, op.symbol(), right),
            Expr::Relational { op, left, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
            Expr::HeapRead(address) => write!(f, "rH({})", address),
        }
    }
}

/// Statements; executing one pops it and may push follow-up work
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Nop,
    VarDecl {
        name: String,
        var_type: Type,
    },
    Assign {
        name: String,
        expr: Expr,
    },
    Compound(StmtRef, StmtRef),
    If {
        guard: Expr,
        then_branch: StmtRef,
        else_branch: StmtRef,
    },
    While {
        guard: Expr,
        body: StmtRef,
    },
    Print(Expr),
    Fork(StmtRef),
    /// `new(v, e)`: allocate a heap cell holding `e`, bind its reference to `v`
    New {
        name: String,
        expr: Expr,
    },
    /// `wH(v, e)`: overwrite the cell `v` refers to
    HeapWrite {
        name: String,
        expr: Expr,
    },
    OpenRead(Expr),
    ReadFile {
        file: Expr,
        name: String,
    },
    CloseRead(Expr),
}

impl Stmt {
    pub fn declare(name: &str, var_type: Type) -> Self {
        Stmt::VarDecl {
            name: name.to_string(),
            var_type,
        }
    }

    pub fn assign(name: &str, expr: Expr) -> Self {
        Stmt::Assign {
            name: name.to_string(),
            expr,
        }
    }

    pub fn compound(first: Stmt, second: Stmt) -> Self {
        Stmt::Compound(Arc::new(first), Arc::new(second))
    }

    /// Chain statements left to right; an empty list is `nop`
    pub fn sequence<I>(statements: I) -> Self
    where
        I: IntoIterator<Item = Stmt>,
        I::IntoIter: DoubleEndedIterator,
    {
        let mut iter = statements.into_iter().rev();
        let last = match iter.next() {
            Some(stmt) => stmt,
            None => return Stmt::Nop,
        };
        iter.fold(last, |rest, stmt| Stmt::compound(stmt, rest))
    }

    pub fn if_then_else(guard: Expr, then_branch: Stmt, else_branch: Stmt) -> Self {
        Stmt::If {
            guard,
            then_branch: Arc::new(then_branch),
            else_branch: Arc::new(else_branch),
        }
    }

    pub fn while_loop(guard: Expr, body: Stmt) -> Self {
        Stmt::While {
            guard,
            body: Arc::new(body),
        }
    }

    pub fn print(expr: Expr) -> Self {
        Stmt::Print(expr)
    }

    pub fn fork(body: Stmt) -> Self {
        Stmt::Fork(Arc::new(body))
    }

    pub fn new_cell(name: &str, expr: Expr) -> Self {
        Stmt::New {
            name: name.to_string(),
            expr,
        }
    }

    pub fn heap_write(name: &str, expr: Expr) -> Self {
        Stmt::HeapWrite {
            name: name.to_string(),
            expr,
        }
    }

    pub fn open_read(file: Expr) -> Self {
        Stmt::OpenRead(file)
    }

    pub fn read_file(file: Expr, name: &str) -> Self {
        Stmt::ReadFile {
            file,
            name: name.to_string(),
        }
    }

    pub fn close_read(file: Expr) -> Self {
        Stmt::CloseRead(file)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Nop => write!(f, "nop"),
            Stmt::VarDecl { name, var_type } => write!(f, "{} {}", var_type, name),
            Stmt::Assign { name, expr } => write!(f, "{} = {}", name, expr),
            Stmt::Compound(first, second) => write!(f, "({}; {})", first, second),
            Stmt::If {
                guard,
                then_branch,
                else_branch,
            } => write!(
                f,
                "if ({}) then ({}) else ({})",
                guard, then_branch, else_branch
            ),
            Stmt::While { guard, body } => write!(f, "while ({}) {}", guard, body),
            Stmt::Print(expr) => write!(f, "print({})", expr),
            Stmt::Fork(body) => write!(f, "fork({})", body),
            Stmt::New { name, expr } => write!(f, "new({}, {})", name, expr),
            Stmt::HeapWrite { name, expr } => write!(f, "wH({}, {})", name, expr),
            Stmt::OpenRead(file) => write!(f, "openRFile({})", file),
            Stmt::ReadFile { file, name } => write!(f, "readFile({}, {})", file, name),
            Stmt::CloseRead(file) => write!(f, "closeRFile({})", file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_tokens_parse() {
        assert_eq!("/".parse::<ArithOp>().unwrap(), ArithOp::Div);
        assert_eq!("^".parse::<LogicOp>().unwrap(), LogicOp::Xor);
        assert_eq!(">=".parse::<RelOp>().unwrap(), RelOp::GreaterEqual);
    }

    #[test]
    fn unknown_operator_token_is_rejected() {
        let err = "%".parse::<ArithOp>().unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownOperator { ref operator } if operator == "%"));
        assert!("!".parse::<LogicOp>().is_err());
    }

    #[test]
    fn sequence_nests_to_the_right() {
        let stmt = Stmt::sequence([
            Stmt::declare("v", Type::Int),
            Stmt::assign("v", Expr::int(2)),
            Stmt::print(Expr::var("v")),
        ]);
        assert_eq!(stmt.to_string(), "(int v; (v = 2; print(v)))");
        assert_eq!(Stmt::sequence(Vec::new()), Stmt::Nop);
    }

    #[test]
    fn expressions_render_infix() {
        let expr = Expr::arith(
            ArithOp::Add,
            Expr::int(2),
            Expr::arith(ArithOp::Mul, Expr::int(3), Expr::int(5)),
        );
        assert_eq!(expr.to_string(), "2 + 3 * 5");
        assert_eq!(Expr::heap_read(Expr::var("a")).to_string(), "rH(a)");
    }
}
