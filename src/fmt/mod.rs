//! Source printing for the syntax trees in [`crate::ast`].
//!
//! Printed text parses back to the same tree: expressions get the fewest
//! parentheses that keep their shape, outlines are indented by two spaces
//! per level.

pub mod surface;

pub use surface::*;

const INDENT: &str = "  ";

struct Formatter {
    buffer: String,
    indent_level: usize,
}

impl Formatter {
    fn new() -> Self {
        Self {
            buffer: String::new(),
            indent_level: 0,
        }
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    fn write_indent(&mut self) {
        self.buffer.push_str(&INDENT.repeat(self.indent_level));
    }

    fn write_str(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    fn write_newline(&mut self) {
        self.buffer.push('\n');
    }

    fn finish(self) -> String {
        self.buffer
    }
}
