use std::cmp::Ordering;

use pretty_assertions::assert_eq;
use rstest::rstest;
use trellis::ast::Item;
use trellis::grammar::outline::parse_outline;
use trellis::parser::indent::incorrect_indent;
use trellis::parser::text::{hspace, lexeme, space, space1, space_consumer, take_while1};
use trellis::parser::{
    BoxedParser, FailureKind, IndentOpt, IndentRelation, ParseErrors, ParseFailure, eof,
    indent_block, indent_guard, indent_level, run,
};

fn word() -> BoxedParser<String> {
    lexeme(hspace(), take_while1(char::is_alphanumeric, "word"))
}

fn scn() -> BoxedParser<()> {
    space_consumer(space1(), None, None)
}

/// header followed by children in a block of the given kind
fn block(kind: &'static str, reference: Option<usize>) -> BoxedParser<(String, Vec<String>)> {
    let header = word().map(move |name| match kind {
        "many" => IndentOpt::many(
            reference,
            move |children: Vec<String>| (name.clone(), children),
            word(),
        ),
        "some" => IndentOpt::some(
            reference,
            move |children: Vec<String>| (name.clone(), children),
            word(),
        ),
        _ => IndentOpt::none((name, Vec::new())),
    });
    indent_block(scn(), header) - eof()
}

fn parse_block(
    kind: &'static str,
    reference: Option<usize>,
    input: &str,
) -> Result<(String, Vec<String>), ParseErrors> {
    run(&block(kind, reference), "test", input)
}

fn indentation(failure: &ParseFailure) -> Option<(IndentRelation, usize, usize)> {
    match failure.kind {
        FailureKind::Indentation {
            relation,
            reference,
            actual,
        } => Some((relation, reference, actual)),
        _ => None,
    }
}

#[test]
fn children_at_one_column() {
    let (header, children) = parse_block("many", None, "h\n  a\n  b\n  c\n").unwrap();
    assert_eq!(header, "h");
    assert_eq!(children, vec!["a", "b", "c"]);
}

#[test]
fn deeper_child_is_incorrect_indentation() {
    let errors = parse_block("many", None, "h\n  a\n    b\n  c\n").unwrap_err();
    let failure = errors.first().unwrap();
    assert_eq!(failure.position.line, 3);
    assert_eq!(indentation(failure), Some((IndentRelation::Equal, 3, 5)));
    assert_eq!(
        errors.to_string(),
        "test:3:5: incorrect indentation (got 5, should be equal to 3)"
    );
}

#[test]
fn shallower_token_ends_block() {
    let input = "h\n    a\n    b\n  c\n";
    let errors = parse_block("many", None, input).unwrap_err();
    // "c" closes the block and is left for whatever follows
    assert!(errors.first().unwrap().expected.iter().any(|item| item.to_string() == "end of input"));
}

#[test]
fn zero_or_more_accepts_no_children() {
    let (header, children) = parse_block("many", None, "h\n").unwrap();
    assert_eq!(header, "h");
    assert!(children.is_empty());
}

#[test]
fn one_or_more_rejects_no_children() {
    let errors = parse_block("some", None, "h\n").unwrap_err();
    assert_eq!(errors.first().unwrap().position.line, 2);
}

#[test]
fn one_or_more_rejects_child_on_header_line() {
    let errors = parse_block("some", None, "h a\n").unwrap_err();
    let failure = errors.first().unwrap();
    assert_eq!(failure.position.column, 3);
    assert!(failure.expected.iter().any(|item| item.to_string() == "end of line"));
}

#[rstest]
#[case("h\n a\n b\n")]
#[case("h\n  a\n  b\n  c\n  d\n")]
#[case("h\n\n\n      a\n\n      b\n")]
fn one_or_more_matches_zero_or_more_with_children(#[case] input: &str) {
    assert_eq!(
        parse_block("some", None, input).unwrap(),
        parse_block("many", None, input).unwrap()
    );
}

#[test]
fn explicit_reference_column() {
    assert!(parse_block("some", Some(5), "h\n    a\n    b\n").is_ok());
    let errors = parse_block("some", Some(3), "h\n    a\n").unwrap_err();
    assert_eq!(
        indentation(errors.first().unwrap()),
        Some((IndentRelation::Equal, 3, 5))
    );
}

#[test]
fn zero_or_more_children_at_explicit_reference() {
    let (_, children) = parse_block("many", Some(5), "h\n    a\n    b\n").unwrap();
    assert_eq!(children, vec!["a", "b"]);
}

#[test]
fn zero_or_more_ends_silently_before_explicit_reference() {
    // column 3 is shallower than 7: no children, "a" is left for eof
    let errors = parse_block("many", Some(7), "h\n  a\n").unwrap_err();
    let failure = errors.first().unwrap();
    assert_eq!(indentation(failure), None);
    assert_eq!(
        errors.to_string(),
        "test:2:3: unexpected 'a', expecting end of input"
    );
}

#[test]
fn zero_or_more_rejects_child_past_explicit_reference() {
    let errors = parse_block("many", Some(3), "h\n    a\n").unwrap_err();
    assert_eq!(
        indentation(errors.first().unwrap()),
        Some((IndentRelation::Equal, 3, 5))
    );
    assert_eq!(
        errors.to_string(),
        "test:2:5: incorrect indentation (got 5, should be equal to 3)"
    );
}

#[test]
fn indented_top_level_item_reports_indentation() {
    let errors = parse_outline("test", "a\n  b\n").unwrap_err();
    assert_eq!(
        errors.to_string(),
        "test:2:3: incorrect indentation (got 3, should be equal to 1)"
    );
}

#[test]
fn child_at_header_column_is_rejected() {
    let errors = parse_block("some", None, "  h\n  a\n").unwrap_err();
    assert_eq!(
        indentation(errors.first().unwrap()),
        Some((IndentRelation::Greater, 3, 3))
    );
}

#[test]
fn indent_guard_compares_columns() {
    let guard = indent_guard(space(), Ordering::Less, 4);
    assert!(run(&(guard.clone() * word() - eof()), "test", "  ab").is_ok());
    assert!(run(&(guard * word() - eof()), "test", "      ab").is_err());
}

#[test]
fn nested_outline() {
    let input = "\
fruits:
  citrus:
    lemon
    lime
  apple
tools:
    hammer
";
    let items = parse_outline("test", input).unwrap();
    assert_eq!(
        items,
        vec![
            Item::with_children(
                "fruits",
                vec![
                    Item::with_children("citrus", vec![Item::leaf("lemon"), Item::leaf("lime")]),
                    Item::leaf("apple"),
                ],
            ),
            Item::with_children("tools", vec![Item::leaf("hammer")]),
        ]
    );
}

#[test]
fn nested_levels_resolve_independently() {
    // The inner block picks column 9 without affecting the outer column 2
    let input = "a:\n b:\n        c\n d\n";
    let items = parse_outline("test", input).unwrap();
    assert_eq!(items[0].children.len(), 2);
    assert_eq!(items[0].children[0].children, vec![Item::leaf("c")]);
}

#[test]
fn misaligned_outline_sibling() {
    let input = "a:\n  b\n   c\n";
    let errors = parse_outline("test", input).unwrap_err();
    assert_eq!(
        indentation(errors.first().unwrap()),
        Some((IndentRelation::Equal, 3, 4))
    );
}

#[test]
fn no_children_leaves_indented_lines() {
    assert_eq!(parse_block("none", None, "h\n").unwrap(), ("h".to_string(), vec![]));
    assert!(parse_block("none", None, "h\n  a\n").is_err());
}

#[test]
fn indent_level_reports_current_column() {
    let parser = space() * indent_level();
    assert_eq!(run(&parser, "test", "   ").unwrap(), 4);
}

#[test]
fn incorrect_indent_always_fails() {
    let parser: BoxedParser<()> = incorrect_indent(Ordering::Less, 2, 6);
    let errors = run(&parser, "test", "").unwrap_err();
    assert_eq!(
        errors.to_string(),
        "test:1:1: incorrect indentation (got 6, should be less than 2)"
    );
}
