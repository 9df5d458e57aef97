use thiserror::Error;

use crate::ast::{BinOpKind, BinaryOp, Expr, Statement};

use super::scope::Scope;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("negative exponent {0}")]
    NegativeExponent(i64),

    #[error("arithmetic overflow in {0}")]
    Overflow(String),
}

impl Expr {
    pub fn eval(&self, scope: &Scope) -> Result<i64, EvalError> {
        match self {
            Expr::Integer(value) => Ok(*value),
            Expr::Variable(name) => scope
                .resolve(name)
                .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),
            Expr::Neg(operand) => {
                let value = operand.eval(scope)?;
                value
                    .checked_neg()
                    .ok_or_else(|| EvalError::Overflow(self.to_string()))
            }
            Expr::Binary(op) => op.eval(scope),
        }
    }
}

impl BinaryOp {
    pub fn eval(&self, scope: &Scope) -> Result<i64, EvalError> {
        let lhs = self.lhs.eval(scope)?;
        let rhs = self.rhs.eval(scope)?;
        let result = match self.kind {
            BinOpKind::Add => lhs.checked_add(rhs),
            BinOpKind::Sub => lhs.checked_sub(rhs),
            BinOpKind::Mul => lhs.checked_mul(rhs),
            BinOpKind::Div if rhs == 0 => return Err(EvalError::DivisionByZero),
            BinOpKind::Div => lhs.checked_div(rhs),
            BinOpKind::Pow => {
                if rhs < 0 {
                    return Err(EvalError::NegativeExponent(rhs));
                }
                let exponent =
                    u32::try_from(rhs).map_err(|_| EvalError::Overflow(self.to_string()))?;
                lhs.checked_pow(exponent)
            }
        };
        result.ok_or_else(|| EvalError::Overflow(self.to_string()))
    }
}

impl Statement {
    /// Evaluate the value and bind it to the statement's name
    pub fn run(&self, scope: &mut Scope) -> Result<i64, EvalError> {
        let value = self.value.eval(scope)?;
        log::trace!("{} = {value}", self.name);
        scope.add(&self.name, value);
        Ok(value)
    }
}
