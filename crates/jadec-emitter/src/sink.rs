//! Destinations for compiled statements and class members.

/// Receives Java text in emission order.
///
/// Statements belong to the method currently being compiled; members are
/// hoisted to the enclosing class (pattern procedures, holder classes).
pub trait EmissionSink {
    fn emit_statement(&mut self, statement: String);
    fn emit_member(&mut self, member: String);
}

/// Sink that keeps everything it receives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatementBuffer {
    statements: Vec<String>,
    members: Vec<String>,
}

impl StatementBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Move the buffered statements out, keeping members.
    pub fn take_statements(&mut self) -> Vec<String> {
        std::mem::take(&mut self.statements)
    }

    pub fn take_members(&mut self) -> Vec<String> {
        std::mem::take(&mut self.members)
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty() && self.members.is_empty()
    }

    /// Collect statements of a nested block: members go to `self`, the
    /// block's statements are returned.
    pub fn nested<F>(&mut self, f: F) -> Vec<String>
    where
        F: FnOnce(&mut StatementBuffer),
    {
        let mut inner = StatementBuffer::new();
        f(&mut inner);
        self.members.append(&mut inner.members);
        inner.statements
    }
}

impl EmissionSink for StatementBuffer {
    fn emit_statement(&mut self, statement: String) {
        self.statements.push(statement);
    }

    fn emit_member(&mut self, member: String) {
        self.members.push(member);
    }
}

/// Sink that drops everything, for traversals that only need the
/// expression text.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardingSink;

impl EmissionSink for DiscardingSink {
    fn emit_statement(&mut self, _statement: String) {}
    fn emit_member(&mut self, _member: String) {}
}
