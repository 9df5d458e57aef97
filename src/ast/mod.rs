//! Syntax trees produced by the bundled grammars.

pub mod expression;
pub mod outline;
pub mod statement;

pub use expression::{BinOpKind, BinaryOp, Expr};
pub use outline::Item;
pub use statement::Statement;
