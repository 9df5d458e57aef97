//! Grammars built on the parser runtime.
//!
//! - [`arith`] - arithmetic expressions from an operator table
//! - [`statements`] - `name = expr;` lines, recovering from broken ones
//! - [`outline`] - an indentation-structured outline

pub mod arith;
pub mod outline;
pub mod statements;
