//! # Operator Tables
//!
//! An expression parser is described declaratively: a list of tiers, the
//! first binding tightest, each holding prefix and infix operators. The table
//! is checked once when it is created; [`OperatorTable::build`] then layers
//! one parser per tier on top of a term parser.
//!
//! ```text
//! tier 0   Prefix "-"
//! tier 1   InfixLeft "*", InfixLeft "/"
//! tier 2   InfixLeft "+", InfixLeft "-"
//!
//! 1 + 2 * 3   parses as   1 + (2 * 3)
//! ```

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::combinators::{BoxedParser, choice, many};
use super::state::{ParseResult, ParseState, Parser};
use super::text::symbol;

type UnaryFn<T> = Arc<dyn Fn(T) -> T + Send + Sync>;
type BinaryFn<T> = Arc<dyn Fn(T, T) -> T + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    Prefix,
    InfixLeft,
    InfixRight,
}

impl Fixity {
    pub fn is_infix(self) -> bool {
        matches!(self, Fixity::InfixLeft | Fixity::InfixRight)
    }
}

impl fmt::Display for Fixity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fixity::Prefix => f.write_str("prefix"),
            Fixity::InfixLeft => f.write_str("left-associative infix"),
            Fixity::InfixRight => f.write_str("right-associative infix"),
        }
    }
}

enum Build<T> {
    Unary(UnaryFn<T>),
    Binary(BinaryFn<T>),
}

impl<T> Clone for Build<T> {
    fn clone(&self) -> Self {
        match self {
            Build::Unary(f) => Build::Unary(Arc::clone(f)),
            Build::Binary(f) => Build::Binary(Arc::clone(f)),
        }
    }
}

/// One entry of an operator table
pub struct Operator<T> {
    symbol: String,
    fixity: Fixity,
    build: Build<T>,
}

impl<T> Clone for Operator<T> {
    fn clone(&self) -> Self {
        Self {
            symbol: self.symbol.clone(),
            fixity: self.fixity,
            build: self.build.clone(),
        }
    }
}

impl<T> fmt::Debug for Operator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("symbol", &self.symbol)
            .field("fixity", &self.fixity)
            .finish()
    }
}

impl<T> Operator<T> {
    pub fn prefix(symbol: impl Into<String>, build: impl Fn(T) -> T + Send + Sync + 'static) -> Self {
        Self {
            symbol: symbol.into(),
            fixity: Fixity::Prefix,
            build: Build::Unary(Arc::new(build)),
        }
    }

    pub fn infix_left(
        symbol: impl Into<String>,
        build: impl Fn(T, T) -> T + Send + Sync + 'static,
    ) -> Self {
        Self::infix(symbol, Fixity::InfixLeft, build)
    }

    pub fn infix_right(
        symbol: impl Into<String>,
        build: impl Fn(T, T) -> T + Send + Sync + 'static,
    ) -> Self {
        Self::infix(symbol, Fixity::InfixRight, build)
    }

    fn infix(
        symbol: impl Into<String>,
        fixity: Fixity,
        build: impl Fn(T, T) -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            fixity,
            build: Build::Binary(Arc::new(build)),
        }
    }
}

/// A malformed operator table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("tier {tier}: operator symbol must not be empty")]
    EmptySymbol { tier: usize },

    #[error("tier {tier}: {fixity} operator '{symbol}' is listed twice")]
    DuplicateOperator {
        tier: usize,
        symbol: String,
        fixity: Fixity,
    },

    #[error("tier {tier}: '{symbol}' is both left- and right-associative")]
    ConflictingAssociativity { tier: usize, symbol: String },
}

/// Tiers of operators, tightest binding first
pub struct OperatorTable<T> {
    tiers: Vec<Vec<Operator<T>>>,
}

impl<T> Clone for OperatorTable<T> {
    fn clone(&self) -> Self {
        Self {
            tiers: self.tiers.clone(),
        }
    }
}

impl<T> fmt::Debug for OperatorTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorTable")
            .field("tiers", &self.tiers)
            .finish()
    }
}

impl<T: 'static> OperatorTable<T> {
    /// Validate and create a table
    pub fn new(tiers: Vec<Vec<Operator<T>>>) -> Result<Self, TableError> {
        for (tier, operators) in tiers.iter().enumerate() {
            for (index, operator) in operators.iter().enumerate() {
                if operator.symbol.is_empty() {
                    return Err(TableError::EmptySymbol { tier });
                }
                for other in &operators[index + 1..] {
                    if other.symbol != operator.symbol {
                        continue;
                    }
                    if other.fixity == operator.fixity {
                        return Err(TableError::DuplicateOperator {
                            tier,
                            symbol: operator.symbol.clone(),
                            fixity: operator.fixity,
                        });
                    }
                    if other.fixity.is_infix() && operator.fixity.is_infix() {
                        return Err(TableError::ConflictingAssociativity {
                            tier,
                            symbol: operator.symbol.clone(),
                        });
                    }
                }
            }
        }
        log::debug!("operator table with {} tiers", tiers.len());
        Ok(Self { tiers })
    }

    /// Build the expression parser on top of `term`.
    ///
    /// Operator symbols are lexemes: `sc` skips the space after each one.
    pub fn build(&self, term: BoxedParser<T>, sc: BoxedParser<()>) -> BoxedParser<T> {
        self.tiers
            .iter()
            .fold(term, |operand, operators| tier_parser(operand, operators, &sc))
    }
}

fn operator_parser<F: Clone + Send + Sync + 'static>(
    mut entries: Vec<(&str, F)>,
    sc: &BoxedParser<()>,
) -> Option<BoxedParser<F>> {
    // Longest first, so "**" is not read as "*"
    entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    let parsers: Vec<BoxedParser<F>> = entries
        .into_iter()
        .map(|(sym, f)| symbol(sc.clone(), sym).value(f))
        .collect();
    if parsers.is_empty() {
        None
    } else {
        Some(choice(parsers))
    }
}

fn tier_parser<T: 'static>(
    operand: BoxedParser<T>,
    operators: &[Operator<T>],
    sc: &BoxedParser<()>,
) -> BoxedParser<T> {
    let mut prefix = Vec::new();
    let mut left = Vec::new();
    let mut right = Vec::new();
    for operator in operators {
        let sym = operator.symbol.as_str();
        match (&operator.build, operator.fixity) {
            (Build::Unary(f), _) => prefix.push((sym, Arc::clone(f))),
            (Build::Binary(f), Fixity::InfixRight) => right.push((sym, Arc::clone(f))),
            (Build::Binary(f), _) => left.push((sym, Arc::clone(f))),
        }
    }

    let operand = match operator_parser(prefix, sc) {
        Some(prefix) => with_prefixes(many(prefix), operand),
        None => operand,
    };
    let left = operator_parser(left, sc);
    let right = operator_parser(right, sc);
    if left.is_none() && right.is_none() {
        return operand;
    }
    BoxedParser::new(move |state: ParseState| {
        let (mut first, mut state) = operand.parse(state)?;
        if let Some(right) = &right {
            let (value, next) = right_chain(&operand, right, first, state.clone())?;
            if next.consumed_since(&state) {
                return Ok((value, next));
            }
            first = value;
            state = next;
        }
        match &left {
            Some(left) => left_chain(&operand, left, first, state),
            None => Ok((first, state)),
        }
    })
}

fn with_prefixes<T: 'static>(
    prefixes: BoxedParser<Vec<UnaryFn<T>>>,
    operand: BoxedParser<T>,
) -> BoxedParser<T> {
    (prefixes + operand).map(|(prefixes, value)| {
        prefixes
            .into_iter()
            .rev()
            .fold(value, |value, apply| apply(value))
    })
}

fn left_chain<T>(
    operand: &BoxedParser<T>,
    operator: &BoxedParser<BinaryFn<T>>,
    first: T,
    state: ParseState,
) -> ParseResult<T> {
    let mut acc = first;
    let mut state = state;
    loop {
        match operator.parse(state.clone()) {
            Ok((op, next)) => {
                let (rhs, next) = operand.parse(next)?;
                acc = op(acc, rhs);
                state = next;
            }
            Err(failed) if failed.consumed_since(&state) => return Err(failed),
            Err(failed) => return Ok((acc, state.with_hint(failed.failure))),
        }
    }
}

fn right_chain<T>(
    operand: &BoxedParser<T>,
    operator: &BoxedParser<BinaryFn<T>>,
    lhs: T,
    state: ParseState,
) -> ParseResult<T> {
    match operator.parse(state.clone()) {
        Ok((op, next)) => {
            let (rhs, next) = operand.parse(next)?;
            let (rhs, next) = right_chain(operand, operator, rhs, next)?;
            Ok((op(lhs, rhs), next))
        }
        Err(failed) if failed.consumed_since(&state) => Err(failed),
        Err(failed) => Ok((lhs, state.with_hint(failed.failure))),
    }
}
