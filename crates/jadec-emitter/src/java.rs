//! Java source renderers.

use crate::writer::SourceWriter;
use std::fmt::Write as _;
use tracing::trace;

/// Quote and escape `value` as a Java string literal.
pub fn java_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\x7F' => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `header {` + indented statements + `}` as one multi-line statement.
pub fn block(header: &str, statements: &[String]) -> String {
    let mut writer = SourceWriter::new();
    writer.write_line_text(&format!("{header} {{"));
    writer.increase_indent();
    for statement in statements {
        writer.write_line_text(statement);
    }
    writer.decrease_indent();
    writer.write("}");
    writer.into_output()
}

/// A method declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JavaMethod {
    pub modifiers: String,
    pub return_type: String,
    pub name: String,
    /// `(type, name)` pairs.
    pub params: Vec<(String, String)>,
    pub body: Vec<String>,
}

impl JavaMethod {
    pub fn new(
        modifiers: impl Into<String>,
        return_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            modifiers: modifiers.into(),
            return_type: return_type.into(),
            name: name.into(),
            params: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn param(mut self, ty: impl Into<String>, name: impl Into<String>) -> Self {
        self.params.push((ty.into(), name.into()));
        self
    }

    pub fn body(mut self, body: Vec<String>) -> Self {
        self.body = body;
        self
    }

    pub fn render(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|(ty, name)| format!("{ty} {name}"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut header = String::new();
        if !self.modifiers.is_empty() {
            header.push_str(&self.modifiers);
            header.push(' ');
        }
        let _ = write!(header, "{} {}({params})", self.return_type, self.name);
        trace!(method = %self.name, statements = self.body.len(), "render method");
        block(&header, &self.body)
    }
}

/// A class declaration made of pre-rendered members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JavaClass {
    pub modifiers: String,
    pub name: String,
    pub extends: Option<String>,
    pub members: Vec<String>,
}

impl JavaClass {
    pub fn new(modifiers: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            modifiers: modifiers.into(),
            name: name.into(),
            extends: None,
            members: Vec::new(),
        }
    }

    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.extends = Some(superclass.into());
        self
    }

    pub fn member(&mut self, member: String) {
        self.members.push(member);
    }

    pub fn render(&self) -> String {
        let mut writer = SourceWriter::new();
        if !self.modifiers.is_empty() {
            writer.write(&self.modifiers);
            writer.write(" ");
        }
        writer.write("class ");
        writer.write(&self.name);
        if let Some(superclass) = &self.extends {
            writer.write(" extends ");
            writer.write(superclass);
        }
        writer.write_line_text(" {");
        writer.increase_indent();
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                writer.write_line();
            }
            writer.write_line_text(member);
        }
        writer.decrease_indent();
        writer.write("}");
        writer.into_output()
    }
}

#[cfg(test)]
#[path = "../tests/java_tests.rs"]
mod java_tests;
