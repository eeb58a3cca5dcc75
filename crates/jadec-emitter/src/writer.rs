//! Indentation-aware text output.

use std::fmt::Write as _;

#[derive(Clone, Debug)]
pub struct SourceWriter {
    output: String,
    indent_level: u32,
    indent_str: &'static str,
    at_line_start: bool,
}

impl Default for SourceWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceWriter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            indent_str: "    ",
            at_line_start: true,
        }
    }

    /// Write text, indenting it if it starts a line. Embedded newlines are
    /// honoured and every following line is indented too.
    pub fn write(&mut self, text: &str) {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.write_line();
            }
            if line.is_empty() {
                continue;
            }
            if self.at_line_start {
                self.write_indent();
                self.at_line_start = false;
            }
            self.output.push_str(line);
        }
    }

    pub fn write_line(&mut self) {
        self.output.push('\n');
        self.at_line_start = true;
    }

    /// Write `text` followed by a newline.
    pub fn write_line_text(&mut self, text: &str) {
        self.write(text);
        self.write_line();
    }

    pub fn write_usize(&mut self, value: usize) {
        if self.at_line_start {
            self.write_indent();
            self.at_line_start = false;
        }
        let _ = write!(self.output, "{value}");
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(self.indent_str);
        }
    }

    pub const fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    pub const fn decrease_indent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn into_output(self) -> String {
        self.output
    }
}

#[cfg(test)]
#[path = "../tests/writer_tests.rs"]
mod writer_tests;
