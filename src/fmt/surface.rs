use std::fmt::{self, Display};

use crate::ast::{BinaryOp, Expr, Item, Statement};

use super::Formatter;

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = Formatter::new();
        format_expression(self, &mut formatter, 0);
        write!(f, "{}", formatter.finish())
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = Formatter::new();
        format_binary_op(self, &mut formatter);
        write!(f, "{}", formatter.finish())
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = Formatter::new();
        format_statement(self, &mut formatter);
        write!(f, "{}", formatter.finish())
    }
}

impl Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = Formatter::new();
        format_item(self, &mut formatter);
        write!(f, "{}", formatter.finish())
    }
}

/// One statement per line
pub fn format_statements(statements: &[Statement]) -> String {
    let mut formatter = Formatter::new();
    for statement in statements {
        format_statement(statement, &mut formatter);
        formatter.write_newline();
    }
    formatter.finish()
}

/// Top-level items in the first column, children two spaces deeper
pub fn format_outline(items: &[Item]) -> String {
    let mut formatter = Formatter::new();
    for item in items {
        format_item(item, &mut formatter);
    }
    formatter.finish()
}

fn format_statement(statement: &Statement, fmt: &mut Formatter) {
    fmt.write_str(&statement.name);
    fmt.write_str(" = ");
    format_expression(&statement.value, fmt, 0);
    fmt.write_str(";");
}

fn format_item(item: &Item, fmt: &mut Formatter) {
    fmt.write_indent();
    fmt.write_str(&item.name);
    if item.is_leaf() {
        fmt.write_newline();
        return;
    }

    fmt.write_str(":");
    fmt.write_newline();
    fmt.indent();
    for child in &item.children {
        format_item(child, fmt);
    }
    fmt.dedent();
}

/// `precedence` is the weakest binding the surrounding context accepts unparenthesized
fn format_expression(expr: &Expr, fmt: &mut Formatter, precedence: u8) {
    let needs_parens = expr.precedence() < precedence;
    if needs_parens {
        fmt.write_str("(");
    }

    match expr {
        Expr::Integer(value) => fmt.write_str(&value.to_string()),
        Expr::Variable(name) => fmt.write_str(name),
        Expr::Neg(operand) => {
            fmt.write_str("-");
            format_expression(operand, fmt, Expr::NEG_PRECEDENCE);
        }
        Expr::Binary(op) => format_binary_op(op, fmt),
    }

    if needs_parens {
        fmt.write_str(")");
    }
}

fn format_binary_op(BinaryOp { kind, lhs, rhs }: &BinaryOp, fmt: &mut Formatter) {
    let own = kind.precedence();
    let (left, right) = if kind.is_right_associative() {
        (own + 1, own)
    } else {
        (own, own + 1)
    };
    format_expression(lhs, fmt, left);
    fmt.write_str(" ");
    fmt.write_str(kind.symbol());
    fmt.write_str(" ");
    format_expression(rhs, fmt, right);
}
