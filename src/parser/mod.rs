//! # Parser Combinator Runtime
//!
//! Parsers are values of type [`BoxedParser<T>`], built from small pieces and
//! composed with operators:
//!
//! | operator | meaning                       |
//! |----------|-------------------------------|
//! | `a + b`  | both, yielding `(A, B)`       |
//! | `a - b`  | both, keeping `A`             |
//! | `a * b`  | both, keeping `B`             |
//! | `a \| b` | `a`, or `b` if `a` consumed nothing |
//! | `a >> f` | map the result with `f`       |
//!
//! ## Layout
//!
//! - [`state`] - input snapshots and the [`Parser`] trait
//! - [`error`] - failure records and how they merge
//! - [`combinators`] / [`text`] - the building blocks
//! - [`recovery`] - keep parsing after a broken unit
//! - [`indent`] - indentation-sensitive blocks
//! - [`expr`] - operator-precedence tables
//!
//! A grammar is run with [`run`], which also reports any failures that were
//! registered along the way.

pub mod combinators;
pub mod error;
pub mod expr;
pub mod indent;
pub mod recovery;
pub mod state;
pub mod text;

pub use combinators::*;
pub use error::{ErrorItem, FailureKind, IndentRelation, ParseErrors, ParseFailure};
pub use expr::{Fixity, Operator, OperatorTable, TableError};
pub use indent::{IndentOpt, indent_block, indent_guard, indent_level, line_fold, non_indented};
pub use recovery::{
    RecoveredItem, recover_registering, recovering, register_failure, skip_line, skip_past,
    with_recovery,
};
pub use state::{Failed, ParseResult, ParseState, Parser, Position};

/// Run `parser` over `input`.
///
/// Fails if the parser fails or if any failure was registered during the
/// parse. Registered failures come first, in the order they were registered.
pub fn run<T, P: Parser<T>>(
    parser: &P,
    source_name: &str,
    input: &str,
) -> Result<T, ParseErrors> {
    log::debug!("parsing {source_name} ({} bytes)", input.len());
    match parser.parse(ParseState::new(source_name, input)) {
        Ok((value, state)) if state.registered().is_empty() => Ok(value),
        Ok((_, state)) => {
            log::debug!("{source_name}: {} registered failures", state.registered().len());
            Err(ParseErrors::new(source_name, state.registered().to_vec()))
        }
        Err(Failed { failure, state }) => {
            log::debug!("{source_name}: parse failed at {}", failure.position);
            let mut failures = state.registered().to_vec();
            failures.push(failure);
            Err(ParseErrors::new(source_name, failures))
        }
    }
}

/// Run a recovering item parser repeatedly until the end of input.
///
/// Malformed units show up as [`RecoveredItem::Recovered`] entries; only a
/// failure that recovery could not absorb makes the whole run fail.
pub fn run_recovering<T: 'static>(
    item: BoxedParser<RecoveredItem<T>>,
    source_name: &str,
    input: &str,
) -> Result<Vec<RecoveredItem<T>>, ParseErrors> {
    run(&(many(item) - eof()), source_name, input)
}
