//! # Indentation-Sensitive Blocks
//!
//! Blocks are described by what their header parser returns, see
//! [`IndentOpt`]. The column a block's children must share is worked out per
//! invocation and carried in local variables and closures; there is no
//! indentation stack. Nested blocks work because an inner [`indent_block`]
//! is simply the child parser of an outer one:
//!
//! ```text
//! fruits:          header, column 1
//!   citrus:        child of fruits, level 3; header of its own block
//!     lemon        child of citrus, level 5
//!     lime
//!   apple          column 3 < 5 ends citrus, continues fruits
//! ```
//!
//! The space consumer handed to these combinators must skip line breaks,
//! while header and child parsers must leave them alone; otherwise the
//! column of the next line is never looked at.

use std::cmp::Ordering;
use std::sync::Arc;

use super::combinators::BoxedParser;
use super::error::{ErrorItem, IndentRelation, ParseFailure};
use super::state::{Failed, ParseResult, ParseState, Parser};

pub type Assemble<A, B> = Arc<dyn Fn(Vec<B>) -> A + Send + Sync>;

/// What follows a block header
pub enum IndentOpt<A, B> {
    /// Just the header
    NoChildren(A),
    /// Any number of children at a shared column
    ZeroOrMoreChildren {
        /// Required column; `None` takes the column of the first child
        reference: Option<usize>,
        assemble: Assemble<A, B>,
        child: BoxedParser<B>,
    },
    /// Like `ZeroOrMoreChildren`, but a block without children is an error
    OneOrMoreChildren {
        reference: Option<usize>,
        assemble: Assemble<A, B>,
        child: BoxedParser<B>,
    },
}

impl<A, B> IndentOpt<A, B> {
    pub fn none(value: A) -> Self {
        IndentOpt::NoChildren(value)
    }

    pub fn many<F>(reference: Option<usize>, assemble: F, child: BoxedParser<B>) -> Self
    where
        F: Fn(Vec<B>) -> A + Send + Sync + 'static,
    {
        IndentOpt::ZeroOrMoreChildren {
            reference,
            assemble: Arc::new(assemble),
            child,
        }
    }

    pub fn some<F>(reference: Option<usize>, assemble: F, child: BoxedParser<B>) -> Self
    where
        F: Fn(Vec<B>) -> A + Send + Sync + 'static,
    {
        IndentOpt::OneOrMoreChildren {
            reference,
            assemble: Arc::new(assemble),
            child,
        }
    }
}

/// Current column, without consuming input
pub fn indent_level() -> BoxedParser<usize> {
    BoxedParser::new(|state: ParseState| {
        let column = state.column();
        Ok((column, state))
    })
}

fn incorrect_indent_at<T>(
    state: ParseState,
    relation: IndentRelation,
    reference: usize,
) -> ParseResult<T> {
    let failure = ParseFailure::indentation(state.position(), relation, reference, state.column());
    Err(Failed::new(failure, state))
}

/// Always fail with an indentation failure at the current position
pub fn incorrect_indent<T: 'static>(
    relation: Ordering,
    reference: usize,
    actual: usize,
) -> BoxedParser<T> {
    BoxedParser::new(move |state: ParseState| {
        let failure =
            ParseFailure::indentation(state.position(), relation.into(), reference, actual);
        Err(Failed::new(failure, state))
    })
}

/// Skip space with `sc`, then require `column.cmp(reference) == relation`
pub fn indent_guard(
    sc: BoxedParser<()>,
    relation: Ordering,
    reference: usize,
) -> BoxedParser<usize> {
    BoxedParser::new(move |state: ParseState| {
        let (_, state) = sc.parse(state)?;
        let column = state.column();
        if column.cmp(&reference) == relation {
            Ok((column, state))
        } else {
            incorrect_indent_at(state, relation.into(), reference)
        }
    })
}

/// `parser` must start in the first column
pub fn non_indented<T: 'static>(sc: BoxedParser<()>, parser: BoxedParser<T>) -> BoxedParser<T> {
    indent_guard(sc, Ordering::Equal, 1) * parser
}

/// Parse a construct that may continue on following lines.
///
/// `action` receives a space consumer to use between the parts of the fold;
/// it only moves to a new line if that line is indented deeper than the
/// fold's first line.
pub fn line_fold<T: 'static, F>(sc: BoxedParser<()>, action: F) -> BoxedParser<T>
where
    F: Fn(BoxedParser<()>) -> BoxedParser<T> + Send + Sync + 'static,
{
    BoxedParser::new(move |state: ParseState| {
        let (_, state) = sc.parse(state)?;
        let reference = state.column();
        let continuation = indent_guard(sc.clone(), Ordering::Greater, reference).map(|_| ());
        action(continuation).parse(state)
    })
}

/// Parse a header and the indented block it introduces.
///
/// `sc` must consume line breaks. The header decides, through the
/// [`IndentOpt`] it returns, whether children follow.
pub fn indent_block<A: 'static, B: 'static>(
    sc: BoxedParser<()>,
    header: BoxedParser<IndentOpt<A, B>>,
) -> BoxedParser<A> {
    BoxedParser::new(move |state: ParseState| {
        let (_, state) = sc.parse(state)?;
        let header_column = state.column();
        let (opt, header_end) = header.parse(state)?;

        match opt {
            IndentOpt::NoChildren(value) => {
                let (_, state) = sc.parse(header_end)?;
                Ok((value, state))
            }
            IndentOpt::ZeroOrMoreChildren {
                reference,
                assemble,
                child,
            } => {
                let (_, state) = sc.parse(header_end.clone())?;
                if !opens_block(&header_end, &state, header_column) {
                    return Ok((assemble(Vec::new()), state));
                }
                let level = reference.unwrap_or(state.column());
                let (children, state) = indented_items(&sc, &child, level, state)?;
                Ok((assemble(children), state))
            }
            IndentOpt::OneOrMoreChildren {
                reference,
                assemble,
                child,
            } => {
                let (_, state) = sc.parse(header_end.clone())?;
                if state.line() == header_end.line() && !state.is_at_end() {
                    let failure =
                        ParseFailure::unexpected_at(&header_end, [ErrorItem::label("end of line")]);
                    return Err(Failed::new(failure, header_end));
                }
                if state.column() <= header_column {
                    return incorrect_indent_at(state, IndentRelation::Greater, header_column);
                }
                let level = reference.unwrap_or(state.column());
                if state.column() != level {
                    return incorrect_indent_at(state, IndentRelation::Equal, level);
                }
                let (first, next) = child.parse(state)?;
                let (_, next) = sc.parse(next)?;
                let (mut children, state) = indented_items(&sc, &child, level, next)?;
                children.insert(0, first);
                Ok((assemble(children), state))
            }
        }
    })
}

/// Whether the token at `state` starts a block under a header ending at `header_end`
fn opens_block(header_end: &ParseState, state: &ParseState, header_column: usize) -> bool {
    !state.is_at_end() && state.line() > header_end.line() && state.column() > header_column
}

/// Children at exactly `level`; a shallower token ends the block, a deeper one is an error
fn indented_items<B>(
    sc: &BoxedParser<()>,
    child: &BoxedParser<B>,
    level: usize,
    state: ParseState,
) -> ParseResult<Vec<B>> {
    let mut items = Vec::new();
    let mut state = state;
    while !state.is_at_end() {
        match state.column().cmp(&level) {
            Ordering::Less => break,
            Ordering::Greater => return incorrect_indent_at(state, IndentRelation::Equal, level),
            Ordering::Equal => {}
        }
        let (item, next) = child.parse(state.clone())?;
        let (_, next) = sc.parse(next)?;
        let progressed = next.consumed_since(&state);
        items.push(item);
        state = next;
        if !progressed {
            break;
        }
    }
    Ok((items, state))
}
