use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Integer(i64),
    Variable(String),
    Neg(Box<Expr>),
    Binary(BinaryOp),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinaryOp {
    pub kind: BinOpKind,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOpKind {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mul => "*",
            BinOpKind::Div => "/",
            BinOpKind::Pow => "^",
        }
    }

    /// Higher binds tighter; negation sits between `^` and `*`
    pub fn precedence(self) -> u8 {
        match self {
            BinOpKind::Add | BinOpKind::Sub => 1,
            BinOpKind::Mul | BinOpKind::Div => 2,
            BinOpKind::Pow => 4,
        }
    }

    pub fn is_right_associative(self) -> bool {
        matches!(self, BinOpKind::Pow)
    }
}

impl Expr {
    pub const NEG_PRECEDENCE: u8 = 3;
    pub const ATOM_PRECEDENCE: u8 = 5;

    pub fn integer(value: i64) -> Self {
        Expr::Integer(value)
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn neg(operand: Expr) -> Self {
        Expr::Neg(Box::new(operand))
    }

    pub fn binary(kind: BinOpKind, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(BinaryOp {
            kind,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn precedence(&self) -> u8 {
        match self {
            Expr::Integer(_) | Expr::Variable(_) => Self::ATOM_PRECEDENCE,
            Expr::Neg(_) => Self::NEG_PRECEDENCE,
            Expr::Binary(op) => op.kind.precedence(),
        }
    }
}
