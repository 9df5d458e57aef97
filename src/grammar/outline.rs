//! Outlines: one name per line, nesting by indentation.
//!
//! ```text
//! groceries:
//!   fruit:
//!     apples
//!     pears
//!   bread
//! chores
//! ```
//!
//! A name ending in `:` opens a block and needs at least one child. Children
//! of one block share a column; any column deeper than the parent's works.

use crate::ast::Item;
use crate::parser::text::{hspace1, lexeme, space1, space_consumer, symbol, take_while1};
use crate::parser::{
    BoxedParser, IndentOpt, ParseErrors, eof, indent_block, many, non_indented, optional,
    recursive, run,
};

/// Skips spaces and `#` comments, stopping at line breaks
fn line_sc() -> BoxedParser<()> {
    space_consumer(hspace1(), Some("#"), None)
}

/// Skips spaces, line breaks and `#` comments
fn scn() -> BoxedParser<()> {
    space_consumer(space1(), Some("#"), None)
}

/// name := (alphanumeric | "_" | "-")+
fn name() -> BoxedParser<String> {
    let chars = take_while1(|c| c.is_alphanumeric() || c == '_' || c == '-', "item name");
    lexeme(line_sc(), chars)
}

/// item := name | name ":" NEWLINE INDENT item+ DEDENT
pub fn item() -> BoxedParser<Item> {
    recursive(|item: BoxedParser<Item>| {
        let header = (name() + optional(symbol(line_sc(), ":"))).map(move |(name, colon)| {
            match colon {
                Some(_) => IndentOpt::some(
                    None,
                    move |children: Vec<Item>| Item::with_children(name.clone(), children),
                    item.clone(),
                ),
                None => IndentOpt::none(Item::leaf(name)),
            }
        });
        indent_block(scn(), header)
    })
}

/// outline := (non-indented item)* EOF
pub fn outline() -> BoxedParser<Vec<Item>> {
    scn() * many(non_indented(scn(), item())) - eof()
}

pub fn parse_outline(source_name: &str, input: &str) -> Result<Vec<Item>, ParseErrors> {
    run(&outline(), source_name, input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_items() {
        let items = parse_outline("test", "a\nb\n").unwrap();
        assert_eq!(items, vec![Item::leaf("a"), Item::leaf("b")]);
    }

    #[test]
    fn test_comment_after_header() {
        let items = parse_outline("test", "a: # list\n  b\n").unwrap();
        assert_eq!(items, vec![Item::with_children("a", vec![Item::leaf("b")])]);
    }

    #[test]
    fn test_indented_top_level_is_rejected() {
        assert!(parse_outline("test", "a\n  b\n").is_err());
    }
}
