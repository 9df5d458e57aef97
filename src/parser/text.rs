//! Character-level parsers and lexeme helpers.
//!
//! The convention throughout is the one the indentation engine relies on:
//! a *space consumer* skips whitespace and comments, and every token parser
//! is wrapped with [`lexeme`] so that it swallows the space *after* itself.
//! Grammars that care about line structure use two space consumers, one that
//! stops at line breaks (for lexemes) and one that does not (for the engine).

use super::combinators::{BoxedParser, choice, hidden, satisfy, skip_many, token_with_error};
use super::error::{ErrorItem, ParseFailure};
use super::state::{Failed, ParseState, Parser};

/// Match exactly `c`
pub fn single(c: char) -> BoxedParser<char> {
    token_with_error(move |x| x == c, ErrorItem::token(c))
}

/// Match the chunk `s` atomically: on mismatch nothing is consumed
pub fn string(s: &str) -> BoxedParser<String> {
    let s = s.to_string();
    BoxedParser::new(move |state: ParseState| {
        if state.remaining().starts_with(s.as_str()) {
            let next = state.advance_str(&s);
            Ok((s.clone(), next))
        } else {
            let found: String = state.remaining().chars().take(s.chars().count()).collect();
            let unexpected = if found.is_empty() {
                ErrorItem::EndOfInput
            } else {
                ErrorItem::Tokens(found)
            };
            Err(Failed::new(
                ParseFailure::mismatch(
                    state.position(),
                    Some(unexpected),
                    [ErrorItem::tokens(s.clone())],
                ),
                state,
            ))
        }
    })
}

pub fn any_char() -> BoxedParser<char> {
    satisfy(|_| true, "any character")
}

pub fn one_of(chars: &str) -> BoxedParser<char> {
    let chars: Vec<char> = chars.chars().collect();
    let expected = chars.iter().map(|&c| ErrorItem::token(c)).collect::<Vec<_>>();
    BoxedParser::new(move |state: ParseState| match state.advance() {
        Some((c, next)) if chars.contains(&c) => Ok((c, next)),
        _ => Err(Failed::new(
            ParseFailure::unexpected_at(&state, expected.iter().cloned()),
            state,
        )),
    })
}

pub fn none_of(chars: &str) -> BoxedParser<char> {
    let chars: Vec<char> = chars.chars().collect();
    satisfy(move |c| !chars.contains(&c), "other character")
}

pub fn digit() -> BoxedParser<char> {
    satisfy(|c| c.is_ascii_digit(), "digit")
}

pub fn letter() -> BoxedParser<char> {
    satisfy(char::is_alphabetic, "letter")
}

pub fn newline() -> BoxedParser<char> {
    single('\n')
}

/// "\n" or "\r\n"
pub fn eol() -> BoxedParser<String> {
    ((newline() >> |c: char| c.to_string()) | string("\r\n")).label("end of line")
}

/// Consume characters while `predicate` holds; never fails
pub fn take_while<F: Fn(char) -> bool + Send + Sync + 'static>(predicate: F) -> BoxedParser<String> {
    BoxedParser::new(move |state: ParseState| {
        let taken: String = state.remaining().chars().take_while(|&c| predicate(c)).collect();
        let next = state.advance_str(&taken);
        Ok((taken, next))
    })
}

/// Like [`take_while`], but at least one character must match
pub fn take_while1<F: Fn(char) -> bool + Send + Sync + 'static>(
    predicate: F,
    label: impl Into<String>,
) -> BoxedParser<String> {
    let label = label.into();
    let rest = take_while(predicate);
    BoxedParser::new(move |state: ParseState| {
        let (taken, next) = rest.parse(state.clone())?;
        if taken.is_empty() {
            Err(Failed::new(
                ParseFailure::unexpected_at(&state, [ErrorItem::label(label.clone())]),
                state,
            ))
        } else {
            Ok((taken, next))
        }
    })
}

/// Skip any whitespace, line breaks included
pub fn space() -> BoxedParser<()> {
    take_while(char::is_whitespace).map(|_| ())
}

pub fn space1() -> BoxedParser<()> {
    take_while1(char::is_whitespace, "white space").map(|_| ())
}

/// Skip spaces and tabs, but not line breaks
pub fn hspace() -> BoxedParser<()> {
    take_while(is_hspace).map(|_| ())
}

pub fn hspace1() -> BoxedParser<()> {
    take_while1(is_hspace, "white space").map(|_| ())
}

fn is_hspace(c: char) -> bool {
    c.is_whitespace() && c != '\n' && c != '\r'
}

// === Lexeme helpers ===

/// Skip a line comment starting with `prefix`, up to (not including) the line break
pub fn skip_line_comment(prefix: &str) -> BoxedParser<()> {
    (string(prefix) + take_while(|c| c != '\n')).map(|_| ())
}

/// Skip a block comment from `start` through `end`; block comments do not nest
pub fn skip_block_comment(start: &str, end: &str) -> BoxedParser<()> {
    let end = end.to_string();
    let open = string(start);
    BoxedParser::new(move |state: ParseState| {
        let (_, mut state) = open.parse(state)?;
        loop {
            if state.remaining().starts_with(end.as_str()) {
                return Ok(((), state.advance_str(&end)));
            }
            match state.advance() {
                Some((_, next)) => state = next,
                None => {
                    return Err(Failed::new(
                        ParseFailure::mismatch(
                            state.position(),
                            Some(ErrorItem::EndOfInput),
                            [ErrorItem::tokens(end.clone())],
                        ),
                        state,
                    ));
                }
            }
        }
    })
}

/// Build a space consumer from a whitespace parser and optional comment styles.
///
/// `space1` must consume at least one character when it succeeds. Whether line
/// breaks count as space is up to it. The result is [`hidden`]: skipped space
/// never appears in "expecting ..." lists.
pub fn space_consumer(
    space1: BoxedParser<()>,
    line_comment: Option<&str>,
    block_comment: Option<(&str, &str)>,
) -> BoxedParser<()> {
    let mut alternatives = vec![space1];
    if let Some(prefix) = line_comment {
        alternatives.push(skip_line_comment(prefix));
    }
    if let Some((start, end)) = block_comment {
        alternatives.push(skip_block_comment(start, end));
    }
    hidden(skip_many(choice(alternatives)))
}

/// Run `parser`, then skip trailing space with `sc`
pub fn lexeme<T: 'static>(sc: BoxedParser<()>, parser: BoxedParser<T>) -> BoxedParser<T> {
    parser - sc
}

/// A verbatim symbol followed by trailing space
pub fn symbol(sc: BoxedParser<()>, s: &str) -> BoxedParser<String> {
    lexeme(sc, string(s))
}

/// An unsigned decimal integer
pub fn decimal() -> BoxedParser<i64> {
    let digits = take_while1(|c| c.is_ascii_digit(), "integer");
    BoxedParser::new(move |state: ParseState| {
        let (text, next) = digits.parse(state.clone())?;
        match text.parse::<i64>() {
            Ok(value) => Ok((value, next)),
            Err(_) => Err(Failed::new(
                ParseFailure::message(state.position(), format!("integer literal {text} is out of range")),
                state,
            )),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T>(parser: &BoxedParser<T>, input: &str) -> Option<(T, usize)> {
        parser
            .parse(ParseState::new("test", input))
            .ok()
            .map(|(value, state)| (value, state.offset()))
    }

    #[test]
    fn test_string_is_atomic() {
        let start = ParseState::new("test", "lex");
        let failed = string("let").parse(start.clone()).unwrap_err();
        assert!(!failed.consumed_since(&start));
        assert_eq!(failed.failure.unexpected, Some(ErrorItem::tokens("lex")));
    }

    #[test]
    fn test_space_consumer_skips_comments() {
        let sc = space_consumer(space1(), Some("--"), Some(("{-", "-}")));
        let (_, offset) = parse(&sc, "  -- note\n {- block\n -} x").unwrap();
        assert_eq!(offset, 24);
    }

    #[test]
    fn test_hspace_stops_at_newline() {
        let (_, offset) = parse(&hspace(), " \t\nx").unwrap();
        assert_eq!(offset, 2);
    }

    #[test]
    fn test_unterminated_block_comment_fails() {
        assert!(parse(&skip_block_comment("/*", "*/"), "/* open").is_none());
    }

    #[test]
    fn test_decimal() {
        assert_eq!(parse(&decimal(), "1234 rest"), Some((1234, 4)));
        assert!(parse(&decimal(), "99999999999999999999").is_none());
    }
}
