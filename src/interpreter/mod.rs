//! Evaluation of parsed statement files.
//!
//! Statements run top to bottom; each binds its name in a single [`Scope`]
//! and later statements may refer to earlier ones. Arithmetic is checked
//! `i64` arithmetic.

mod eval;
mod scope;

pub use eval::EvalError;
pub use scope::Scope;

use crate::ast::Statement;

/// Run `statements` in a fresh scope, returning each binding in order
pub fn run(statements: &[Statement]) -> Result<Vec<(String, i64)>, EvalError> {
    let mut scope = Scope::new();
    statements
        .iter()
        .map(|statement| {
            let value = statement.run(&mut scope)?;
            Ok((statement.name.clone(), value))
        })
        .collect()
}
