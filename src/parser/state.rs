use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::error::ParseFailure;

/// A location in the input.
///
/// `offset` counts characters, `line` and `column` are 1-based. Tabs are not
/// expanded: every character advances the column by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const START: Position = Position {
        offset: 0,
        line: 1,
        column: 1,
    };

    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Position after consuming `c`
    pub fn advance(self, c: char) -> Self {
        if c == '\n' {
            Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            }
        } else {
            Self {
                offset: self.offset + 1,
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset.cmp(&other.offset)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An immutable snapshot of the parser input.
///
/// Combinators take a state by value and hand back a new one; the caller's
/// copy is never touched, so backtracking is just keeping an older clone
/// around. Cloning is cheap: the source text is shared.
///
/// A state also carries a hint: the expectations of alternatives that failed
/// here without consuming and were passed over, such as the element `many`
/// stopped at. A later failure at the same offset absorbs them, so the final
/// report lists everything that was acceptable at that point. Consuming input
/// clears the hint.
#[derive(Clone)]
pub struct ParseState {
    source: Arc<str>,
    name: Arc<str>,
    byte: usize,
    position: Position,
    registered: Arc<Vec<ParseFailure>>,
    hint: Option<Arc<ParseFailure>>,
    depth: usize,
}

impl ParseState {
    pub fn new(name: impl Into<Arc<str>>, source: impl Into<Arc<str>>) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
            byte: 0,
            position: Position::START,
            registered: Arc::new(Vec::new()),
            hint: None,
            depth: 0,
        }
    }

    pub fn source_name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn offset(&self) -> usize {
        self.position.offset
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }

    /// The input that has not been consumed yet
    pub fn remaining(&self) -> &str {
        &self.source[self.byte..]
    }

    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    pub fn is_at_end(&self) -> bool {
        self.byte >= self.source.len()
    }

    /// Consume a single character, returning it with the advanced state
    pub fn advance(&self) -> Option<(char, ParseState)> {
        let c = self.peek()?;
        let mut next = self.clone();
        next.byte += c.len_utf8();
        next.position = self.position.advance(c);
        next.hint = None;
        Some((c, next))
    }

    /// Consume `chunk`, which the caller has checked is a prefix of the remaining input
    pub(crate) fn advance_str(&self, chunk: &str) -> ParseState {
        if chunk.is_empty() {
            return self.clone();
        }
        let mut next = self.clone();
        next.byte += chunk.len();
        next.position = chunk.chars().fold(self.position, Position::advance);
        next.hint = None;
        next
    }

    /// Whether this state lies strictly after `earlier`
    pub fn consumed_since(&self, earlier: &ParseState) -> bool {
        self.position.offset > earlier.position.offset
    }

    /// Record a failure without failing; it surfaces at the run boundary.
    pub fn register(&self, failure: ParseFailure) -> ParseState {
        let mut next = self.clone();
        Arc::make_mut(&mut next.registered).push(failure);
        next
    }

    /// Failures registered so far, in encounter order
    pub fn registered(&self) -> &[ParseFailure] {
        &self.registered
    }

    /// Expectations collected at this offset by alternatives that were passed over
    pub fn hint(&self) -> Option<&ParseFailure> {
        self.hint.as_deref()
    }

    /// Remember a failure that was passed over here.
    ///
    /// Only failures at this very offset are kept; one that an `attempt`
    /// reported further on is no hint for what may come next.
    pub(crate) fn with_hint(&self, failure: ParseFailure) -> ParseState {
        if failure.position.offset != self.offset() {
            return self.clone();
        }
        let mut next = self.clone();
        next.hint = Some(Arc::new(match self.hint.as_deref() {
            Some(hint) => hint.clone().merge(failure),
            None => failure,
        }));
        next
    }

    /// This state with the hint of `other` in place of its own
    pub(crate) fn with_hint_of(&self, other: &ParseState) -> ParseState {
        let mut next = self.clone();
        next.hint = other.hint.clone();
        next
    }

    pub(crate) fn without_hint(&self) -> ParseState {
        let mut next = self.clone();
        next.hint = None;
        next
    }

    /// Fold the hint into a failure reported from here
    pub fn merge_hint(&self, failure: ParseFailure) -> ParseFailure {
        match self.hint.as_deref() {
            Some(hint) => failure.merge(hint.clone()),
            None => failure,
        }
    }

    /// How many recursive parsers are active
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn with_depth(&self, depth: usize) -> ParseState {
        let mut next = self.clone();
        next.depth = depth;
        next
    }
}

impl fmt::Debug for ParseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.remaining().chars().take(16).collect();
        f.debug_struct("ParseState")
            .field("name", &self.name)
            .field("position", &self.position)
            .field("remaining", &preview)
            .field("registered", &self.registered.len())
            .field("hint", &self.hint)
            .field("depth", &self.depth)
            .finish()
    }
}

/// A failed parse: the failure record plus the state the failing branch reached.
///
/// Whether input was consumed is decided by comparing `state` with the state
/// the combinator started from.
#[derive(Debug, Clone)]
pub struct Failed {
    pub failure: ParseFailure,
    pub state: ParseState,
}

impl Failed {
    /// A failure reported at `state`; the hint `state` carries is folded in.
    pub fn new(failure: ParseFailure, state: ParseState) -> Self {
        let failure = state.merge_hint(failure);
        Self { failure, state }
    }

    pub fn consumed_since(&self, start: &ParseState) -> bool {
        self.state.consumed_since(start)
    }
}

pub type ParseResult<T> = Result<(T, ParseState), Failed>;

pub trait Parser<T>: Sized {
    fn parse(&self, state: ParseState) -> ParseResult<T>;
}

// Allow closures to be parsers
impl<T, F: Fn(ParseState) -> ParseResult<T>> Parser<T> for F {
    fn parse(&self, state: ParseState) -> ParseResult<T> {
        self(state)
    }
}
