//! # Error Recovery
//!
//! [`with_recovery`] lets a grammar keep going after a localized failure.
//! When the wrapped parser fails, a recovery parser chosen from the failure
//! runs from exactly where the failed attempt stopped, never from where it
//! started, so it can skip "the rest of the broken unit" without re-reading
//! input that was already rejected.
//!
//! Two ways of keeping the diagnostics around are offered:
//!
//! - [`recovering`] turns each unit into a [`RecoveredItem`], so the result
//!   of `many(recovering(..))` lists every well-formed and malformed unit in
//!   input order.
//! - [`recover_registering`] stores the failure in the parse state instead;
//!   the run boundary reports all of them once the parse completes.
//!
//! ```text
//! x = 1;        Parsed(x = 1)
//! y = 2 +;      Recovered(2:8: unexpected ';', expecting '-' or term)
//! z = 3;        Parsed(z = 3)
//! ```

use serde::Serialize;

use super::combinators::BoxedParser;
use super::error::ParseFailure;
use super::state::{Failed, ParseState, Parser};

/// Outcome of one recoverable unit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum RecoveredItem<T> {
    Recovered(ParseFailure),
    Parsed(T),
}

impl<T> RecoveredItem<T> {
    pub fn is_parsed(&self) -> bool {
        matches!(self, RecoveredItem::Parsed(_))
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, RecoveredItem::Recovered(_))
    }

    pub fn parsed(&self) -> Option<&T> {
        match self {
            RecoveredItem::Parsed(value) => Some(value),
            RecoveredItem::Recovered(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ParseFailure> {
        match self {
            RecoveredItem::Recovered(failure) => Some(failure),
            RecoveredItem::Parsed(_) => None,
        }
    }

    /// Split a sequence into its values and its diagnostics, both in input order
    pub fn partition(items: Vec<RecoveredItem<T>>) -> (Vec<T>, Vec<ParseFailure>) {
        let mut values = Vec::new();
        let mut failures = Vec::new();
        for item in items {
            match item {
                RecoveredItem::Parsed(value) => values.push(value),
                RecoveredItem::Recovered(failure) => failures.push(failure),
            }
        }
        (values, failures)
    }
}

/// Run `primary`; if it fails, run `recover(failure)` from the failure point.
///
/// When recovery fails as well, the original failure propagates unchanged.
pub fn with_recovery<T: 'static, F>(primary: BoxedParser<T>, recover: F) -> BoxedParser<T>
where
    F: Fn(ParseFailure) -> BoxedParser<T> + Send + Sync + 'static,
{
    BoxedParser::new(move |state: ParseState| match primary.parse(state) {
        Ok(done) => Ok(done),
        Err(failed) => {
            log::trace!("recovering from {}", failed.failure);
            match recover(failed.failure.clone()).parse(failed.state.clone()) {
                Ok(done) => Ok(done),
                Err(_) => Err(failed),
            }
        }
    })
}

/// Lift `primary` into [`RecoveredItem`], skipping malformed input with `strategy`.
///
/// Recovery must make progress: if neither `primary` nor `strategy` consumed
/// anything, the original failure is returned so that repetition ends.
pub fn recovering<T: 'static>(
    primary: BoxedParser<T>,
    strategy: BoxedParser<()>,
) -> BoxedParser<RecoveredItem<T>> {
    let item = with_recovery(primary.map(RecoveredItem::Parsed), move |failure| {
        strategy
            .clone()
            .map(move |_| RecoveredItem::Recovered(failure.clone()))
    });
    BoxedParser::new(move |state: ParseState| {
        let (value, next) = item.parse(state.clone())?;
        match value {
            RecoveredItem::Recovered(failure) if !next.consumed_since(&state) => {
                Err(Failed::new(failure, state))
            }
            value => Ok((value, next)),
        }
    })
}

/// Record `failure` in the parse state without failing
pub fn register_failure(failure: ParseFailure) -> BoxedParser<()> {
    BoxedParser::new(move |state: ParseState| Ok(((), state.register(failure.clone()))))
}

/// Like [`recovering`], but the failure is registered and the unit yields `None`.
pub fn recover_registering<T: 'static>(
    primary: BoxedParser<T>,
    strategy: BoxedParser<()>,
) -> BoxedParser<Option<T>> {
    let items = recovering(primary, strategy);
    BoxedParser::new(move |state: ParseState| {
        let (item, next) = items.parse(state)?;
        match item {
            RecoveredItem::Parsed(value) => Ok((Some(value), next)),
            RecoveredItem::Recovered(failure) => Ok((None, next.register(failure))),
        }
    })
}

// === Recovery strategies ===

/// Consume up to and including the next `delimiter`, or to the end of input
pub fn skip_past(delimiter: char) -> BoxedParser<()> {
    BoxedParser::new(move |state: ParseState| {
        let mut state = state;
        while let Some((c, next)) = state.advance() {
            state = next;
            if c == delimiter {
                break;
            }
        }
        Ok(((), state))
    })
}

/// Consume the rest of the current line, line break included
pub fn skip_line() -> BoxedParser<()> {
    skip_past('\n')
}
