use serde::Serialize;

use super::expression::Expr;

/// `name = value;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub name: String,
    pub value: Expr,
}

impl Statement {
    pub fn new(name: impl Into<String>, value: Expr) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}
