//! Statement Semantics
//!
//! Statements follow the expression protocol: `validate` reports and returns
//! validity, `compile` pushes Java statements to a sink, `advance` returns
//! the state after the statement. Blocks open a scope; a path that left the
//! operation (`return`, `throw`, `fail`) invalidates the state, and the
//! first statement after it is reported as unreachable and not compiled.
//!
//! - `assign.rs` - declarations, assignments and deconstruction
//! - `control.rs` - `if`, `when … matches`, `while`

mod assign;
mod control;

use crate::context::CheckerContext;
use crate::expr;
use crate::state::StaticState;
use jadec_ast::{Block, NodeIndex, StmtIndex, StmtKind};
use jadec_common::DiagnosticCode;
use jadec_common::diagnostics::DiagnosticAcceptor;
use jadec_emitter::{EmissionSink, StatementBuffer};
use jadec_solver::TypeId;
use tracing::trace;

/// Java exception class thrown by `throw`.
pub const EXCEPTION_CLASS: &str = "jadescript.core.exception.JadescriptException";

/// Java exception class thrown by `fail`.
pub const FAILURE_CLASS: &str = "jadescript.core.exception.BehaviourFailure";

/// Statement checker for the body of one operation or handler.
#[derive(Clone, Copy)]
pub struct StatementChecker<'c, 'a> {
    cx: &'c CheckerContext<'a>,
    /// Declared result of the enclosing function; `None` in procedures and
    /// handlers.
    return_type: Option<TypeId>,
}

impl<'c, 'a> StatementChecker<'c, 'a> {
    pub fn new(cx: &'c CheckerContext<'a>, return_type: Option<TypeId>) -> Self {
        Self { cx, return_type }
    }

    // =========================================================================
    // Blocks
    // =========================================================================

    /// Validate `block` in a new scope; returns validity and the exit state
    /// (outside the scope).
    pub fn validate_block(
        &self,
        block: &Block,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> (bool, StaticState) {
        let mut ok = true;
        let mut current = state.enter_scope();
        let mut reported = false;
        for &stmt in &block.statements {
            if !current.is_valid() && !reported {
                reported = true;
                if self.cx.options.report_unreachable_code {
                    acceptor.accept_info(
                        "Unreachable code".to_string(),
                        self.cx.arena.stmt_span(stmt),
                        None,
                        None,
                        DiagnosticCode::UnreachableCode,
                    );
                }
            }
            ok &= self.validate(stmt, &current, acceptor);
            current = self.advance(stmt, &current);
        }
        (ok, current.exit_scope())
    }

    pub fn compile_block(&self, block: &Block, state: &StaticState, sink: &mut dyn EmissionSink) -> StaticState {
        let mut current = state.enter_scope();
        for &stmt in &block.statements {
            if !current.is_valid() {
                trace!(stmt = stmt.0, "skip unreachable statement");
                break;
            }
            self.compile(stmt, &current, sink);
            current = self.advance(stmt, &current);
        }
        current.exit_scope()
    }

    pub fn advance_block(&self, block: &Block, state: &StaticState) -> StaticState {
        block
            .statements
            .iter()
            .fold(state.enter_scope(), |current, &stmt| self.advance(stmt, &current))
            .exit_scope()
    }

    /// Compile `block` into its own lines; class members still go to `sink`.
    fn compile_nested(&self, block: &Block, state: &StaticState, sink: &mut dyn EmissionSink) -> (Vec<String>, StaticState) {
        let mut buffer = StatementBuffer::new();
        let exit = self.compile_block(block, state, &mut buffer);
        for member in buffer.take_members() {
            sink.emit_member(member);
        }
        (buffer.take_statements(), exit)
    }

    /// Compile `node` keeping its auxiliary statements apart; class members
    /// still go to `sink`.
    fn compile_detached(&self, node: NodeIndex, state: &StaticState, sink: &mut dyn EmissionSink) -> (Vec<String>, String) {
        let mut buffer = StatementBuffer::new();
        let text = expr::compile(self.cx, node, state, &mut buffer);
        for member in buffer.take_members() {
            sink.emit_member(member);
        }
        (buffer.take_statements(), text)
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    pub fn validate(&self, stmt: StmtIndex, state: &StaticState, acceptor: &mut dyn DiagnosticAcceptor) -> bool {
        let cx = self.cx;
        let Some(node) = cx.arena.stmt(stmt) else {
            return false;
        };
        match &node.kind {
            StmtKind::Declaration { name, ty, init } => {
                self.validate_declaration(stmt, *name, ty.as_ref(), *init, state, acceptor)
            }
            StmtKind::Assignment { target, value } => self.validate_assignment(stmt, *target, *value, state, acceptor),
            StmtKind::If { branches, otherwise } => self.validate_if(branches, otherwise.as_ref(), state, acceptor),
            StmtKind::WhenMatches {
                scrutinee,
                branches,
                otherwise,
            } => self.validate_when(*scrutinee, branches, otherwise.as_ref(), state, acceptor),
            StmtKind::While { condition, body } => self.validate_while(*condition, body, state, acceptor),
            StmtKind::Return(value) => self.validate_return(stmt, *value, state, acceptor),
            StmtKind::Throw(value) | StmtKind::Fail(value) | StmtKind::Expression(value) => {
                expr::validate(cx, *value, state, acceptor)
            }
            StmtKind::Block(block) => self.validate_block(block, state, acceptor).0,
        }
    }

    pub fn compile(&self, stmt: StmtIndex, state: &StaticState, sink: &mut dyn EmissionSink) {
        let cx = self.cx;
        let Some(node) = cx.arena.stmt(stmt) else {
            return;
        };
        match &node.kind {
            StmtKind::Declaration { name, ty, init } => self.compile_declaration(*name, ty.as_ref(), *init, state, sink),
            StmtKind::Assignment { target, value } => self.compile_assignment(*target, *value, state, sink),
            StmtKind::If { branches, otherwise } => self.compile_if(branches, otherwise.as_ref(), state, sink),
            StmtKind::WhenMatches {
                scrutinee,
                branches,
                otherwise,
            } => self.compile_when(*scrutinee, branches, otherwise.as_ref(), state, sink),
            StmtKind::While { condition, body } => self.compile_while(*condition, body, state, sink),
            StmtKind::Return(value) => {
                let line = match value {
                    Some(value) => format!("return {};", self.compile_returned(*value, state, sink)),
                    None => "return;".to_string(),
                };
                sink.emit_statement(line);
            }
            StmtKind::Throw(value) => {
                let text = expr::compile(cx, *value, state, sink);
                sink.emit_statement(format!("throw new {EXCEPTION_CLASS}({text});"));
            }
            StmtKind::Fail(reason) => {
                let text = expr::compile(cx, *reason, state, sink);
                sink.emit_statement(format!("throw new {FAILURE_CLASS}({text});"));
            }
            StmtKind::Expression(value) => {
                let text = expr::compile(cx, *value, state, sink);
                sink.emit_statement(expression_statement(cx, *value, text));
            }
            StmtKind::Block(block) => {
                let (lines, _) = self.compile_nested(block, state, sink);
                sink.emit_statement(jadec_emitter::block("", &lines).trim_start().to_string());
            }
        }
    }

    pub fn advance(&self, stmt: StmtIndex, state: &StaticState) -> StaticState {
        let cx = self.cx;
        let Some(node) = cx.arena.stmt(stmt) else {
            return state.clone();
        };
        match &node.kind {
            StmtKind::Declaration { name, ty, init } => self.advance_declaration(*name, ty.as_ref(), *init, state),
            StmtKind::Assignment { target, value } => self.advance_assignment(*target, *value, state),
            StmtKind::If { branches, otherwise } => self.advance_if(branches, otherwise.as_ref(), state),
            StmtKind::WhenMatches {
                scrutinee,
                branches,
                otherwise,
            } => self.advance_when(*scrutinee, branches, otherwise.as_ref(), state),
            StmtKind::While { condition, body } => self.advance_while(*condition, body, state),
            StmtKind::Return(value) => value
                .map_or_else(|| state.clone(), |v| expr::advance(cx, v, state))
                .invalidate_until_exit_operation(),
            StmtKind::Throw(value) | StmtKind::Fail(value) => {
                expr::advance(cx, *value, state).invalidate_until_exit_operation()
            }
            StmtKind::Expression(value) => expr::advance(cx, *value, state),
            StmtKind::Block(block) => self.advance_block(block, state),
        }
    }

    // =========================================================================
    // Return
    // =========================================================================

    fn validate_return(
        &self,
        stmt: StmtIndex,
        value: Option<NodeIndex>,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let cx = self.cx;
        let span = cx.arena.stmt_span(stmt);
        match (self.return_type, value) {
            (Some(expected), Some(value)) => {
                if !expr::validate_expecting(cx, value, state, Some(expected), acceptor) {
                    return false;
                }
                let actual = expr::infer_type_expecting(cx, value, state, Some(expected));
                if actual.is_error() || expected.is_error() || cx.is_assignable(actual, expected) {
                    return true;
                }
                acceptor.accept_error(
                    format!(
                        "Cannot return a value of type '{}' from a function returning '{}'",
                        cx.format_type(actual),
                        cx.format_type(expected)
                    ),
                    cx.span(value),
                    None,
                    None,
                    DiagnosticCode::ReturnTypeMismatch,
                );
                false
            }
            (Some(expected), None) => {
                acceptor.accept_error(
                    format!("A function returning '{}' must return a value", cx.format_type(expected)),
                    span,
                    None,
                    None,
                    DiagnosticCode::ReturnTypeMismatch,
                );
                false
            }
            (None, Some(value)) => {
                expr::validate(cx, value, state, acceptor);
                acceptor.accept_error(
                    "Procedures and handlers cannot return a value".to_string(),
                    span,
                    None,
                    None,
                    DiagnosticCode::ReturnTypeMismatch,
                );
                false
            }
            (None, None) => true,
        }
    }

    fn compile_returned(&self, value: NodeIndex, state: &StaticState, sink: &mut dyn EmissionSink) -> String {
        expr::compile_expecting(self.cx, value, state, self.return_type, sink)
    }
}

/// Java statement evaluating `text`. Only calls are valid Java expression
/// statements; anything else is bound to a scoped temporary.
fn expression_statement(cx: &CheckerContext<'_>, node: NodeIndex, text: String) -> String {
    let node = expr::ExpressionDispatcher::traverse(cx, node);
    if matches!(cx.arena.kind(node), Some(jadec_ast::ExprKind::Call { .. })) && !text.starts_with("null") {
        format!("{text};")
    } else {
        jadec_emitter::block("", &[format!("final java.lang.Object __unused = {text};")])
            .trim_start()
            .to_string()
    }
}

/// Default value of a Java local declared without an initializer.
pub(crate) fn default_value(type_id: TypeId) -> &'static str {
    match type_id {
        TypeId::INTEGER => "0",
        TypeId::REAL => "0.0f",
        TypeId::BOOLEAN => "false",
        TypeId::TEXT => "\"\"",
        _ => "null",
    }
}
