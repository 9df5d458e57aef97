use std::collections::BTreeSet;
use std::ops::{Add, BitOr, Mul, Shr, Sub};
use std::sync::{Arc, OnceLock, Weak};

use super::error::{ErrorItem, ParseFailure};
use super::state::{Failed, ParseResult, ParseState, Parser};

type ParserFn<T> = Arc<dyn Fn(ParseState) -> ParseResult<T> + Send + Sync>;

/// A type-erased parser; cloning shares the underlying function
pub struct BoxedParser<T> {
    parser: ParserFn<T>,
}

impl<T> Clone for BoxedParser<T> {
    fn clone(&self) -> Self {
        BoxedParser {
            parser: Arc::clone(&self.parser),
        }
    }
}

impl<T: 'static> BoxedParser<T> {
    pub fn new<P: Parser<T> + Send + Sync + 'static>(parser: P) -> Self {
        BoxedParser {
            parser: Arc::new(move |state: ParseState| parser.parse(state)),
        }
    }
}

impl<T> Parser<T> for BoxedParser<T> {
    fn parse(&self, state: ParseState) -> ParseResult<T> {
        (self.parser)(state)
    }
}

impl<T: 'static> BoxedParser<T> {
    /// Run `self`, then `other`; yield both results
    pub fn seq<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<(T, U)> {
        BoxedParser::new(move |state: ParseState| {
            let (a, state) = self.parse(state)?;
            let (b, state) = other.parse(state)?;
            Ok(((a, b), state))
        })
    }

    /// Run both, keep the result of `self`
    pub fn skip<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<T> {
        BoxedParser::new(move |state: ParseState| {
            let (a, state) = self.parse(state)?;
            let (_, state) = other.parse(state)?;
            Ok((a, state))
        })
    }

    /// Run both, keep the result of `other`
    pub fn skip_left<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<U> {
        BoxedParser::new(move |state: ParseState| {
            let (_, state) = self.parse(state)?;
            other.parse(state)
        })
    }

    pub fn map<U: 'static, F: Fn(T) -> U + Send + Sync + 'static>(self, f: F) -> BoxedParser<U> {
        BoxedParser::new(move |state: ParseState| {
            let (a, state) = self.parse(state)?;
            Ok((f(a), state))
        })
    }

    /// Replace the result with a fixed value
    pub fn value<U: Clone + Send + Sync + 'static>(self, value: U) -> BoxedParser<U> {
        self.map(move |_| value.clone())
    }

    /// Bind: choose the next parser from this one's result
    pub fn and_then<U: 'static, F>(self, f: F) -> BoxedParser<U>
    where
        F: Fn(T) -> BoxedParser<U> + Send + Sync + 'static,
    {
        BoxedParser::new(move |state: ParseState| {
            let (a, state) = self.parse(state)?;
            f(a).parse(state)
        })
    }

    /// Choice: try self, if it fails without consuming input try other.
    ///
    /// A branch that consumed input before failing commits the alternative;
    /// wrap it in [`attempt`](Self::attempt) to opt out.
    pub fn or(self, other: BoxedParser<T>) -> BoxedParser<T> {
        BoxedParser::new(move |state: ParseState| match self.parse(state.clone()) {
            Ok(done) => Ok(done),
            Err(first) if first.consumed_since(&state) => Err(first),
            Err(first) => match other.parse(state.with_hint(first.failure.clone())) {
                Ok(done) => Ok(done),
                Err(second) => Err(Failed::new(first.failure.merge(second.failure), second.state)),
            },
        })
    }

    /// Report a non-consuming mismatch as "expecting `name`".
    ///
    /// Only the expectations of `self` are replaced; hints collected before
    /// it started are kept.
    pub fn label(self, name: impl Into<String>) -> BoxedParser<T> {
        let name = name.into();
        BoxedParser::new(move |state: ParseState| match self.parse(state.clone()) {
            Err(mut failed) if !failed.consumed_since(&state) && failed.failure.is_mismatch() => {
                failed.failure.expected = BTreeSet::from([ErrorItem::label(name.clone())]);
                failed.failure = state.merge_hint(failed.failure);
                Err(failed)
            }
            other => other,
        })
    }

    /// On failure, pretend no input was consumed
    pub fn attempt(self) -> BoxedParser<T> {
        BoxedParser::new(move |state: ParseState| {
            self.parse(state.clone())
                .map_err(|failed| Failed::new(failed.failure, state))
        })
    }

    pub fn optional(self) -> BoxedParser<Option<T>> {
        optional(self)
    }

    pub fn many(self) -> BoxedParser<Vec<T>> {
        many(self)
    }

    pub fn some(self) -> BoxedParser<Vec<T>> {
        some(self)
    }
}

/// `a + b` is [`BoxedParser::seq`]
impl<T: 'static, U: 'static> Add<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<(T, U)>;

    fn add(self, rhs: BoxedParser<U>) -> Self::Output {
        self.seq(rhs)
    }
}

/// `a - b` is [`BoxedParser::skip`]
impl<T: 'static, U: 'static> Sub<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn sub(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip(rhs)
    }
}

/// `a * b` is [`BoxedParser::skip_left`]
impl<T: 'static, U: 'static> Mul<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn mul(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip_left(rhs)
    }
}

/// `a | b` is [`BoxedParser::or`]
impl<T: 'static> BitOr<BoxedParser<T>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn bitor(self, rhs: BoxedParser<T>) -> Self::Output {
        self.or(rhs)
    }
}

/// `a >> f` is [`BoxedParser::map`]
impl<T: 'static, U: 'static, F: Fn(T) -> U + Send + Sync + 'static> Shr<F> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn shr(self, f: F) -> Self::Output {
        self.map(f)
    }
}

// Primitives

/// Low-level item parser with custom error
pub(crate) fn token_with_error<F: Fn(char) -> bool + Send + Sync + 'static>(
    predicate: F,
    expected: ErrorItem,
) -> BoxedParser<char> {
    BoxedParser::new(move |state: ParseState| match state.advance() {
        Some((c, next)) if predicate(c) => Ok((c, next)),
        _ => Err(Failed::new(
            ParseFailure::unexpected_at(&state, [expected.clone()]),
            state,
        )),
    })
}

/// Consume one item if `predicate` holds
pub fn satisfy<F: Fn(char) -> bool + Send + Sync + 'static>(
    predicate: F,
    label: impl Into<String>,
) -> BoxedParser<char> {
    token_with_error(predicate, ErrorItem::label(label))
}

/// Succeed with `value` without consuming input
pub fn pure<T: Clone + Send + Sync + 'static>(value: T) -> BoxedParser<T> {
    BoxedParser::new(move |state: ParseState| Ok((value.clone(), state)))
}

/// Always fail with `message`, without consuming input
pub fn fail<T: 'static>(message: impl Into<String>) -> BoxedParser<T> {
    let message = message.into();
    BoxedParser::new(move |state: ParseState| {
        Err(Failed::new(
            ParseFailure::message(state.position(), message.clone()),
            state,
        ))
    })
}

/// Succeed only at the end of input
pub fn eof() -> BoxedParser<()> {
    BoxedParser::new(move |state: ParseState| {
        if state.is_at_end() {
            Ok(((), state))
        } else {
            Err(Failed::new(
                ParseFailure::unexpected_at(&state, [ErrorItem::EndOfInput]),
                state,
            ))
        }
    })
}

/// Run `parser` without consuming input on success
pub fn look_ahead<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<T> {
    BoxedParser::new(move |state: ParseState| {
        let (value, _) = parser.parse(state.clone())?;
        Ok((value, state))
    })
}

/// Succeed, consuming nothing, only if `parser` fails here
pub fn not_followed_by<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<()> {
    BoxedParser::new(move |state: ParseState| match parser.parse(state.clone()) {
        Ok(_) => Err(Failed::new(ParseFailure::unexpected_at(&state, []), state)),
        Err(_) => Ok(((), state)),
    })
}

/// Zero or more repetitions, in order
pub fn many<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |state: ParseState| {
        let mut items = Vec::new();
        let mut state = state;
        loop {
            match parser.parse(state.clone()) {
                Ok((item, next)) => {
                    let progressed = next.consumed_since(&state);
                    items.push(item);
                    state = next;
                    // An empty match would repeat forever
                    if !progressed {
                        break;
                    }
                }
                Err(failed) if failed.consumed_since(&state) => return Err(failed),
                Err(failed) => {
                    state = state.with_hint(failed.failure);
                    break;
                }
            }
        }
        Ok((items, state))
    })
}

pub fn some<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Vec<T>> {
    let rest = many(parser.clone());
    BoxedParser::new(move |state: ParseState| {
        let (first, state) = parser.parse(state)?;
        let (mut tail, state) = rest.parse(state)?;
        tail.insert(0, first);
        Ok((tail, state))
    })
}

/// Parse zero or more occurrences, discarding them
pub fn skip_many<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<()> {
    many(parser).map(|_| ())
}

/// `None` if `parser` fails without consuming
pub fn optional<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Option<T>> {
    BoxedParser::new(move |state: ParseState| match parser.parse(state.clone()) {
        Ok((item, next)) => Ok((Some(item), next)),
        Err(failed) if failed.consumed_since(&state) => Err(failed),
        Err(failed) => Ok((None, state.with_hint(failed.failure))),
    })
}

/// Run `parser` without letting it show up in "expecting ..." lists.
///
/// Used for whitespace: after `1 ` the report should name what may follow
/// the number, not "white space".
pub fn hidden<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<T> {
    BoxedParser::new(move |state: ParseState| match parser.parse(state.clone()) {
        Ok((value, next)) if next.consumed_since(&state) => Ok((value, next.without_hint())),
        Ok((value, next)) => Ok((value, next.with_hint_of(&state))),
        Err(mut failed) if !failed.consumed_since(&state) && failed.failure.is_mismatch() => {
            failed.failure.expected.clear();
            failed.failure = state.merge_hint(failed.failure);
            Err(failed)
        }
        Err(failed) => Err(failed),
    })
}

/// Try each parser in turn
pub fn choice<T: 'static>(parsers: impl IntoIterator<Item = BoxedParser<T>>) -> BoxedParser<T> {
    parsers
        .into_iter()
        .reduce(BoxedParser::or)
        .unwrap_or_else(|| fail("no alternatives"))
}

/// open parser close
pub fn between<O: 'static, C: 'static, T: 'static>(
    open: BoxedParser<O>,
    close: BoxedParser<C>,
    parser: BoxedParser<T>,
) -> BoxedParser<T> {
    open * parser - close
}

/// parser (sep parser)*
pub fn sep_by1<T: 'static, S: 'static>(
    parser: BoxedParser<T>,
    sep: BoxedParser<S>,
) -> BoxedParser<Vec<T>> {
    some_with_rest(parser.clone(), many(sep * parser))
}

/// [parser (sep parser)*]
pub fn sep_by<T: 'static, S: 'static>(
    parser: BoxedParser<T>,
    sep: BoxedParser<S>,
) -> BoxedParser<Vec<T>> {
    optional(sep_by1(parser, sep)).map(Option::unwrap_or_default)
}

fn some_with_rest<T: 'static>(
    first: BoxedParser<T>,
    rest: BoxedParser<Vec<T>>,
) -> BoxedParser<Vec<T>> {
    (first + rest).map(|(head, mut tail)| {
        tail.insert(0, head);
        tail
    })
}

/// How deeply [`recursive`] parsers may nest before the parse is refused
pub const MAX_NESTING: usize = 48;

/// Build a parser that refers to itself.
///
/// `define` receives a handle standing in for the finished parser. The
/// handle only holds a weak reference, so the grammar does not leak.
///
/// Every pass through a handle counts one level of nesting across all
/// recursive parsers; past [`MAX_NESTING`] levels the handle fails with a
/// message instead of running the parser again.
pub fn recursive<T: 'static, F>(define: F) -> BoxedParser<T>
where
    F: FnOnce(BoxedParser<T>) -> BoxedParser<T>,
{
    recursive_with_limit(MAX_NESTING, define)
}

/// [`recursive`] with a custom nesting limit
pub fn recursive_with_limit<T: 'static, F>(limit: usize, define: F) -> BoxedParser<T>
where
    F: FnOnce(BoxedParser<T>) -> BoxedParser<T>,
{
    type Slot<T> = OnceLock<Weak<dyn Fn(ParseState) -> ParseResult<T> + Send + Sync>>;

    let slot: Arc<Slot<T>> = Arc::new(OnceLock::new());
    let handle = {
        let slot = Arc::clone(&slot);
        BoxedParser::new(move |state: ParseState| {
            let depth = state.depth();
            if depth >= limit {
                let message = format!("nesting exceeds {limit} levels");
                return Err(Failed::new(
                    ParseFailure::message(state.position(), message),
                    state,
                ));
            }
            let parser = match slot.get().and_then(|weak| weak.upgrade()) {
                Some(parser) => parser,
                None => {
                    return Err(Failed::new(
                        ParseFailure::message(state.position(), "recursive parser is no longer alive"),
                        state,
                    ));
                }
            };
            match parser(state.with_depth(depth + 1)) {
                Ok((value, next)) => Ok((value, next.with_depth(depth))),
                Err(mut failed) => {
                    failed.state = failed.state.with_depth(depth);
                    Err(failed)
                }
            }
        })
    };
    let parser = define(handle);
    let _ = slot.set(Arc::downgrade(&parser.parser));
    parser
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digit() -> BoxedParser<char> {
        satisfy(|c| c.is_ascii_digit(), "digit")
    }

    #[test]
    fn test_satisfy_leaves_state_on_failure() {
        let start = ParseState::new("test", "x");
        let failed = digit().parse(start.clone()).unwrap_err();
        assert!(!failed.consumed_since(&start));
        assert_eq!(failed.failure.unexpected, Some(ErrorItem::token('x')));
    }

    #[test]
    fn test_many_stops_on_empty_match() {
        let empty = pure(());
        let (items, state) = many(empty).parse(ParseState::new("test", "abc")).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(state.offset(), 0);
    }

    #[test]
    fn test_recursive_nests() {
        // nested := "(" nested ")" | ""
        let nested = recursive(|nested: BoxedParser<usize>| {
            let open = satisfy(|c| c == '(', "'('");
            let close = satisfy(|c| c == ')', "')'");
            (open * nested - close).map(|depth| depth + 1) | pure(0)
        });
        let (depth, state) = nested.parse(ParseState::new("test", "((()))")).unwrap();
        assert_eq!(depth, 3);
        assert_eq!(state.depth(), 0);
    }

    #[test]
    fn test_recursive_refuses_deep_nesting() {
        let nested = recursive_with_limit(2, |nested: BoxedParser<usize>| {
            let open = satisfy(|c| c == '(', "'('");
            let close = satisfy(|c| c == ')', "')'");
            (open * nested - close).map(|depth| depth + 1) | pure(0)
        });
        assert!(nested.parse(ParseState::new("test", "(())")).is_ok());
        let failed = nested.parse(ParseState::new("test", "((()))")).unwrap_err();
        assert_eq!(failed.failure.to_string(), "1:4: nesting exceeds 2 levels");
    }

    #[test]
    fn test_many_leaves_hint() {
        let (_, state) = many(digit()).parse(ParseState::new("test", "1x")).unwrap();
        let hint = state.hint().unwrap();
        assert_eq!(hint.position.offset, 1);
        assert!(hint.expected.contains(&ErrorItem::label("digit")));
    }

    #[test]
    fn test_hidden_drops_expectations() {
        let spaces = hidden(skip_many(satisfy(|c| c == ' ', "space")));
        let (_, state) = spaces.parse(ParseState::new("test", "  x")).unwrap();
        assert_eq!(state.offset(), 2);
        assert!(state.hint().is_none());
    }
}
