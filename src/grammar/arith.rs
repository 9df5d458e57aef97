use crate::ast::{BinOpKind, Expr};
use crate::parser::text::{decimal, lexeme, letter, space1, space_consumer, symbol, take_while};
use crate::parser::{
    BoxedParser, Operator, OperatorTable, ParseErrors, TableError, between, choice, eof, fail,
    recursive, run,
};

/// Skips white space, line breaks included, and `#` comments
pub fn sc() -> BoxedParser<()> {
    space_consumer(space1(), Some("#"), None)
}

/// identifier := letter (alphanumeric | "_")*
pub fn identifier(sc: BoxedParser<()>) -> BoxedParser<String> {
    let word = (letter() + take_while(|c| c.is_alphanumeric() || c == '_'))
        >> |(first, rest)| format!("{first}{rest}");
    lexeme(sc, word).label("identifier")
}

/// Tightest first: `^` (right), prefix `-`, `*` `/`, `+` `-`
pub fn operator_table() -> Result<OperatorTable<Expr>, TableError> {
    let binary = |kind: BinOpKind| move |lhs: Expr, rhs: Expr| Expr::binary(kind, lhs, rhs);
    OperatorTable::new(vec![
        vec![Operator::infix_right("^", binary(BinOpKind::Pow))],
        vec![Operator::prefix("-", Expr::neg)],
        vec![
            Operator::infix_left("*", binary(BinOpKind::Mul)),
            Operator::infix_left("/", binary(BinOpKind::Div)),
        ],
        vec![
            Operator::infix_left("+", binary(BinOpKind::Add)),
            Operator::infix_left("-", binary(BinOpKind::Sub)),
        ],
    ])
}

/// term := integer | identifier | "(" expression ")"
///
/// expression := term, layered with [`operator_table`]
pub fn expression(sc: BoxedParser<()>) -> BoxedParser<Expr> {
    let table = match operator_table() {
        Ok(table) => table,
        Err(err) => return fail(err.to_string()),
    };
    recursive(move |expression: BoxedParser<Expr>| {
        let parens = between(symbol(sc.clone(), "("), symbol(sc.clone(), ")"), expression);
        let term = choice([
            lexeme(sc.clone(), decimal()) >> Expr::Integer,
            identifier(sc.clone()) >> Expr::Variable,
            parens,
        ])
        .label("term");
        table.build(term, sc)
    })
}

/// A single expression filling the whole input
pub fn parse_expression(source_name: &str, input: &str) -> Result<Expr, ParseErrors> {
    let sc = sc();
    run(&(sc.clone() * expression(sc) - eof()), source_name, input)
}
