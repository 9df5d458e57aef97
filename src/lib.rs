//! # Trellis - Parser Combinators with Recovery and Layout
//!
//! Trellis is a character-level parser combinator runtime. Beyond the usual
//! building blocks it handles the parts hand-written parsers tend to get
//! wrong:
//!
//! - **Error recovery** - a broken unit becomes a diagnostic and parsing
//!   continues behind it ([`parser::recovery`]).
//! - **Indentation** - blocks whose children must line up at one column
//!   ([`parser::indent`]).
//! - **Operator precedence** - expression parsers generated from a table of
//!   tiers ([`parser::expr`]).
//!
//! ## Pipeline
//!
//! ```text
//! Source (&str)
//!     ↓
//! [Parser] → value, or ParseErrors (furthest failure + registered ones)
//!     ↓
//! [Interpreter] → bindings (statement files only)
//! ```
//!
//! ## Module Structure
//!
//! - [`parser`] - the combinator runtime
//! - [`grammar`] - arithmetic, statement-file and outline grammars
//! - [`ast`] - trees produced by those grammars
//! - [`fmt`] - printing trees back to source
//! - [`interpreter`] - evaluating statement files
//!
//! ## Example
//!
//! ```text
//! x = 1 + 2 * 3;
//! y = (x - 1) ^ 2;
//! z = y / ;          # recovered, reported, skipped
//! w = y / x;
//! ```

pub mod ast;
pub mod fmt;
pub mod grammar;
pub mod interpreter;
pub mod parser;
