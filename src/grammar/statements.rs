//! Statement files: `name = expression;`, one unit per semicolon.
//!
//! A malformed statement does not end the parse. Everything up to and
//! including its `;` is skipped and the failure is kept, so one pass reports
//! every broken statement in the file.

use crate::ast::Statement;
use crate::parser::recovery::{recover_registering, recovering, skip_past};
use crate::parser::text::symbol;
use crate::parser::{BoxedParser, ParseErrors, RecoveredItem, eof, many, run};

use super::arith::{expression, identifier, sc};

/// statement := identifier "=" expression ";"
pub fn statement(sc: BoxedParser<()>) -> BoxedParser<Statement> {
    let name = identifier(sc.clone()) - symbol(sc.clone(), "=");
    let value = expression(sc.clone()) - symbol(sc, ";");
    (name + value) >> |(name, value)| Statement::new(name, value)
}

/// Skip the rest of a broken statement, through its `;`
pub fn skip_statement(sc: BoxedParser<()>) -> BoxedParser<()> {
    skip_past(';') - sc
}

/// statements := (statement | recovered)* EOF
pub fn statements() -> BoxedParser<Vec<RecoveredItem<Statement>>> {
    let sc = sc();
    let item = recovering(statement(sc.clone()), skip_statement(sc.clone()));
    sc * many(item) - eof()
}

/// Like [`statements`], but broken statements are registered with the parse
/// state and only the well-formed ones are returned.
pub fn strict_statements() -> BoxedParser<Vec<Statement>> {
    let sc = sc();
    let item = recover_registering(statement(sc.clone()), skip_statement(sc.clone()));
    (sc * many(item) - eof()) >> |items: Vec<Option<Statement>>| items.into_iter().flatten().collect()
}

/// Parse a statement file, keeping malformed statements as diagnostics
pub fn parse_statements(
    source_name: &str,
    input: &str,
) -> Result<Vec<RecoveredItem<Statement>>, ParseErrors> {
    run(&statements(), source_name, input)
}

/// Parse a statement file; any malformed statement fails the whole parse
pub fn parse_statements_strict(
    source_name: &str,
    input: &str,
) -> Result<Vec<Statement>, ParseErrors> {
    run(&strict_statements(), source_name, input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;

    #[test]
    fn test_statement_consumes_trailing_space() {
        let items = parse_statements("test", "x = 1;\n\n  y = x;  # done\n").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[1].parsed(),
            Some(&Statement::new("y", Expr::variable("x")))
        );
    }

    #[test]
    fn test_stray_semicolon_is_recovered() {
        let items = parse_statements("test", "x = 1; ; y = 2;").unwrap();
        let statuses: Vec<bool> = items.iter().map(RecoveredItem::is_parsed).collect();
        assert_eq!(statuses, vec![true, false, true]);
    }

    #[test]
    fn test_unterminated_statement_recovers_to_end() {
        let items = parse_statements("test", "x = 1; y = 2 +").unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[1].is_recovered());
    }
}
