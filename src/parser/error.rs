//! # Parse Failures
//!
//! Failures are plain values. A primitive that does not match builds a
//! [`ParseFailure`] naming what it found and what it would have accepted;
//! alternatives merge the failures of their branches; the recovery engine may
//! turn one into data; whatever is left surfaces once at the run boundary as
//! [`ParseErrors`].
//!
//! ## Merging
//!
//! Among competing failures the one furthest into the input wins. Two
//! mismatches at the same offset union their expected sets, which is how a
//! failed `a | b | c` ends up reporting "expecting a, b, or c".

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::state::{ParseState, Position};

/// Something found in, or expected from, the input.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ErrorItem {
    /// Literal input text
    Tokens(String),
    /// A named construct, e.g. "identifier"
    Label(String),
    EndOfInput,
}

impl ErrorItem {
    pub fn token(c: char) -> Self {
        ErrorItem::Tokens(c.to_string())
    }

    pub fn tokens(s: impl Into<String>) -> Self {
        ErrorItem::Tokens(s.into())
    }

    pub fn label(s: impl Into<String>) -> Self {
        ErrorItem::Label(s.into())
    }

    /// The item at the front of `state`
    pub fn at(state: &ParseState) -> Self {
        match state.peek() {
            Some(c) => ErrorItem::token(c),
            None => ErrorItem::EndOfInput,
        }
    }
}

impl fmt::Display for ErrorItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorItem::Tokens(s) if s == "\n" => f.write_str("newline"),
            ErrorItem::Tokens(s) if s == "\t" => f.write_str("tab"),
            ErrorItem::Tokens(s) => write!(f, "'{}'", s.escape_debug()),
            ErrorItem::Label(s) => f.write_str(s),
            ErrorItem::EndOfInput => f.write_str("end of input"),
        }
    }
}

/// How an indented token's column had to relate to the reference column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndentRelation {
    Less,
    Equal,
    Greater,
}

impl From<Ordering> for IndentRelation {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => IndentRelation::Less,
            Ordering::Equal => IndentRelation::Equal,
            Ordering::Greater => IndentRelation::Greater,
        }
    }
}

impl fmt::Display for IndentRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndentRelation::Less => f.write_str("less than"),
            IndentRelation::Equal => f.write_str("equal to"),
            IndentRelation::Greater => f.write_str("greater than"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// The current item did not match; see `unexpected` and `expected`
    Mismatch,
    /// A block child or guarded token sat at the wrong column
    Indentation {
        relation: IndentRelation,
        reference: usize,
        actual: usize,
    },
    /// Free-form failure raised by a grammar
    Message { message: String },
}

/// A structured parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseFailure {
    pub position: Position,
    pub unexpected: Option<ErrorItem>,
    pub expected: BTreeSet<ErrorItem>,
    pub kind: FailureKind,
}

impl ParseFailure {
    pub fn mismatch(
        position: Position,
        unexpected: Option<ErrorItem>,
        expected: impl IntoIterator<Item = ErrorItem>,
    ) -> Self {
        Self {
            position,
            unexpected,
            expected: expected.into_iter().collect(),
            kind: FailureKind::Mismatch,
        }
    }

    /// A mismatch at the front of `state`
    pub fn unexpected_at(state: &ParseState, expected: impl IntoIterator<Item = ErrorItem>) -> Self {
        Self::mismatch(state.position(), Some(ErrorItem::at(state)), expected)
    }

    pub fn indentation(
        position: Position,
        relation: IndentRelation,
        reference: usize,
        actual: usize,
    ) -> Self {
        Self {
            position,
            unexpected: None,
            expected: BTreeSet::new(),
            kind: FailureKind::Indentation {
                relation,
                reference,
                actual,
            },
        }
    }

    pub fn message(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            unexpected: None,
            expected: BTreeSet::new(),
            kind: FailureKind::Message {
                message: message.into(),
            },
        }
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self.kind, FailureKind::Mismatch)
    }

    pub fn is_indentation(&self) -> bool {
        matches!(self.kind, FailureKind::Indentation { .. })
    }

    /// Combine two competing failures: furthest wins, ties merge.
    pub fn merge(self, other: ParseFailure) -> ParseFailure {
        match self.position.offset.cmp(&other.position.offset) {
            Ordering::Greater => self,
            Ordering::Less => other,
            Ordering::Equal => match (self.is_mismatch(), other.is_mismatch()) {
                (true, true) => {
                    let mut merged = self;
                    merged.unexpected = merged.unexpected.or(other.unexpected);
                    merged.expected.extend(other.expected);
                    merged
                }
                (true, false) => other,
                _ => self,
            },
        }
    }
}

fn or_list(items: &BTreeSet<ErrorItem>) -> String {
    let items: Vec<String> = items.iter().map(ToString::to_string).collect();
    match items.as_slice() {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{a} or {b}"),
        [init @ .., last] => format!("{}, or {last}", init.join(", ")),
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.position)?;
        match &self.kind {
            FailureKind::Mismatch => {
                match (&self.unexpected, self.expected.is_empty()) {
                    (Some(item), true) => write!(f, "unexpected {item}"),
                    (Some(item), false) => {
                        write!(f, "unexpected {item}, expecting {}", or_list(&self.expected))
                    }
                    (None, false) => write!(f, "expecting {}", or_list(&self.expected)),
                    (None, true) => f.write_str("unknown parse error"),
                }
            }
            FailureKind::Indentation {
                relation,
                reference,
                actual,
            } => write!(
                f,
                "incorrect indentation (got {actual}, should be {relation} {reference})"
            ),
            FailureKind::Message { message } => f.write_str(message),
        }
    }
}

impl std::error::Error for ParseFailure {}

/// Everything that stopped a parse, in encounter order.
///
/// Contains at most one unrecovered failure (always last), preceded by any
/// failures registered along the way.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{}", render_failures(.source_name, .failures))]
pub struct ParseErrors {
    pub source_name: String,
    pub failures: Vec<ParseFailure>,
}

impl ParseErrors {
    pub fn new(source_name: impl Into<String>, failures: Vec<ParseFailure>) -> Self {
        Self {
            source_name: source_name.into(),
            failures,
        }
    }

    pub fn first(&self) -> Option<&ParseFailure> {
        self.failures.first()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

fn render_failures(source_name: &str, failures: &[ParseFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("{source_name}:{failure}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(offset: usize) -> Position {
        Position::new(offset, 1, offset + 1)
    }

    #[test]
    fn test_later_failure_dominates() {
        let early = ParseFailure::mismatch(at(1), None, [ErrorItem::label("a")]);
        let late = ParseFailure::mismatch(at(3), None, [ErrorItem::label("b")]);
        assert_eq!(early.clone().merge(late.clone()), late);
        assert_eq!(late.clone().merge(early), late);
    }

    #[test]
    fn test_same_position_unions_expected() {
        let a = ParseFailure::mismatch(at(2), Some(ErrorItem::token('x')), [ErrorItem::label("a")]);
        let b = ParseFailure::mismatch(at(2), Some(ErrorItem::token('x')), [ErrorItem::label("b")]);
        let merged = a.merge(b);
        assert_eq!(merged.expected.len(), 2);
        assert_eq!(merged.unexpected, Some(ErrorItem::token('x')));
    }

    #[test]
    fn test_indentation_beats_mismatch_at_same_position() {
        let mismatch = ParseFailure::mismatch(at(2), None, [ErrorItem::label("a")]);
        let indent = ParseFailure::indentation(at(2), IndentRelation::Equal, 3, 5);
        assert!(mismatch.clone().merge(indent.clone()).is_indentation());
        assert!(indent.merge(mismatch).is_indentation());
    }

    #[test]
    fn test_display() {
        let failure = ParseFailure::mismatch(
            Position::new(4, 2, 3),
            Some(ErrorItem::token('@')),
            [ErrorItem::label("digit"), ErrorItem::token('('), ErrorItem::label("identifier")],
        );
        assert_eq!(
            failure.to_string(),
            "2:3: unexpected '@', expecting '(', digit, or identifier"
        );

        let indent = ParseFailure::indentation(Position::new(9, 3, 5), IndentRelation::Equal, 3, 5);
        assert_eq!(
            indent.to_string(),
            "3:5: incorrect indentation (got 5, should be equal to 3)"
        );
    }

    #[test]
    fn test_errors_render_with_source_name() {
        let errors = ParseErrors::new(
            "input.txt",
            vec![ParseFailure::message(Position::new(0, 1, 1), "boom")],
        );
        assert_eq!(errors.to_string(), "input.txt:1:1: boom");
    }
}
