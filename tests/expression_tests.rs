use pretty_assertions::assert_eq;
use rstest::rstest;
use trellis::ast::{BinOpKind, Expr};
use trellis::grammar::arith::parse_expression;
use trellis::parser::text::{decimal, hspace, lexeme, single};
use trellis::parser::{
    BoxedParser, Fixity, Operator, OperatorTable, ParseState, Parser, TableError, between,
    recursive,
};

fn int(value: i64) -> Expr {
    Expr::integer(value)
}

fn bin(kind: BinOpKind, lhs: Expr, rhs: Expr) -> Expr {
    Expr::binary(kind, lhs, rhs)
}

#[test]
fn multiplication_binds_tighter() {
    let expr = parse_expression("test", "1 + 2 * 3").unwrap();
    assert_eq!(
        expr,
        bin(BinOpKind::Add, int(1), bin(BinOpKind::Mul, int(2), int(3)))
    );
}

#[test]
fn subtraction_is_left_associative() {
    let expr = parse_expression("test", "1 - 2 - 3").unwrap();
    assert_eq!(
        expr,
        bin(BinOpKind::Sub, bin(BinOpKind::Sub, int(1), int(2)), int(3))
    );
}

#[test]
fn power_is_right_associative() {
    let expr = parse_expression("test", "2 ^ 3 ^ 4").unwrap();
    assert_eq!(
        expr,
        bin(BinOpKind::Pow, int(2), bin(BinOpKind::Pow, int(3), int(4)))
    );
}

#[test]
fn parentheses_override_tiers() {
    let expr = parse_expression("test", "(1 + 2) * -x").unwrap();
    assert_eq!(
        expr,
        bin(
            BinOpKind::Mul,
            bin(BinOpKind::Add, int(1), int(2)),
            Expr::neg(Expr::variable("x"))
        )
    );
}

#[rstest]
#[case("1 +", "test:1:4: unexpected end of input, expecting '-' or term")]
#[case("(1", "test:1:3: unexpected end of input, expecting ')', '*', '+', '-', '/', or '^'")]
#[case("* 2", "test:1:1: unexpected '*', expecting '-' or term")]
#[case("1 2", "test:1:3: unexpected '2', expecting '*', '+', '-', '/', '^', or end of input")]
#[case("x y + 1", "test:1:3: unexpected 'y', expecting '*', '+', '-', '/', '^', or end of input")]
fn expression_errors(#[case] input: &str, #[case] message: &str) {
    let errors = parse_expression("test", input).unwrap_err();
    assert_eq!(errors.to_string(), message);
}

fn nested_parens(depth: usize) -> String {
    format!("{}1{}", "(".repeat(depth), ")".repeat(depth))
}

#[test]
fn moderate_nesting_parses() {
    assert_eq!(parse_expression("test", &nested_parens(40)).unwrap(), int(1));
}

#[test]
fn excessive_nesting_is_refused() {
    let errors = parse_expression("test", &nested_parens(1000)).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.to_string(), "test:1:50: nesting exceeds 48 levels");
}

fn tiny_table(tiers: Vec<Vec<Operator<i64>>>) -> Result<OperatorTable<i64>, TableError> {
    OperatorTable::new(tiers)
}

#[rstest]
#[case::empty_symbol(
    vec![vec![Operator::prefix("", |x: i64| x)]],
    TableError::EmptySymbol { tier: 0 }
)]
#[case::duplicate(
    vec![vec![], vec![Operator::infix_left("+", |a: i64, b: i64| a + b), Operator::infix_left("+", |a: i64, b: i64| a - b)]],
    TableError::DuplicateOperator { tier: 1, symbol: "+".into(), fixity: Fixity::InfixLeft }
)]
#[case::conflicting(
    vec![vec![Operator::infix_left("^", |a: i64, b: i64| a + b), Operator::infix_right("^", |a: i64, b: i64| a + b)]],
    TableError::ConflictingAssociativity { tier: 0, symbol: "^".into() }
)]
fn invalid_tables(#[case] tiers: Vec<Vec<Operator<i64>>>, #[case] expected: TableError) {
    assert_eq!(tiny_table(tiers).unwrap_err(), expected);
}

#[test]
fn prefix_and_infix_may_share_a_symbol() {
    let table = tiny_table(vec![vec![
        Operator::prefix("-", |a: i64| -a),
        Operator::infix_left("-", |a: i64, b: i64| a - b),
    ]]);
    assert!(table.is_ok());
}

#[test]
fn table_builds_evaluating_parser() {
    let sc = hspace();
    let table = tiny_table(vec![
        vec![Operator::prefix("-", |a: i64| -a)],
        vec![
            Operator::infix_left("*", |a: i64, b: i64| a * b),
            Operator::infix_left("/", |a: i64, b: i64| a / b),
        ],
        vec![
            Operator::infix_left("+", |a: i64, b: i64| a + b),
            Operator::infix_left("-", |a: i64, b: i64| a - b),
        ],
    ])
    .unwrap();
    let parser = recursive(|expr: BoxedParser<i64>| {
        let parens = between(single('(') - sc.clone(), single(')') - sc.clone(), expr);
        let term = lexeme(sc.clone(), decimal()) | parens;
        table.build(term, sc.clone())
    });

    let cases = [("1 + 2 * 3", 7), ("(1 + 2) * 3", 9), ("10 - 4 - 3", 3), ("-2 * -3", 6), ("8 / 2 / 2", 2)];
    for (input, expected) in cases {
        let (value, state) = parser.parse(ParseState::new("test", input)).unwrap();
        assert_eq!(value, expected, "{input}");
        assert!(state.is_at_end());
    }
}
