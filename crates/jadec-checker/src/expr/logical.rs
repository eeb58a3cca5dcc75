//! Short-circuit boolean operators.
//!
//! `a and b` evaluates `b` only in the state where `a` returned true, so
//! refinements established by `a` (type tests, pattern bindings) are
//! visible in `b`. The state after the whole expression is the join of its
//! true and false outcomes.
//!
//! A later operand that emits statements is compiled into an `if` block
//! updating a `boolean` temporary, so its statements run only when the
//! earlier operands did not decide the result.

use super::{ExpressionSemantics, assert_returned_false, assert_returned_true, infer_type};
use crate::context::CheckerContext;
use crate::state::StaticState;
use jadec_ast::{ExprKind, NodeIndex};
use jadec_common::DiagnosticCode;
use jadec_common::diagnostics::DiagnosticAcceptor;
use jadec_emitter::{EmissionSink, StatementBuffer, block};
use jadec_solver::TypeId;
use tracing::trace;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Connective {
    And,
    Or,
}

impl Connective {
    fn operands<'n>(self, cx: &'n CheckerContext<'_>, node: NodeIndex) -> &'n [NodeIndex] {
        match (self, cx.arena.kind(node)) {
            (Connective::And, Some(ExprKind::And(operands)))
            | (Connective::Or, Some(ExprKind::Or(operands))) => operands,
            _ => &[],
        }
    }

    const fn java_operator(self) -> &'static str {
        match self {
            Connective::And => " && ",
            Connective::Or => " || ",
        }
    }

    /// State in which the operand at position `i` is evaluated: every
    /// earlier operand took the non-short-circuiting value.
    fn continue_state(
        self,
        cx: &CheckerContext<'_>,
        operand: NodeIndex,
        state: &StaticState,
    ) -> StaticState {
        match self {
            Connective::And => assert_returned_true(cx, operand, state),
            Connective::Or => assert_returned_false(cx, operand, state),
        }
    }

    /// State after `operand` took the short-circuiting value.
    fn stop_state(self, cx: &CheckerContext<'_>, operand: NodeIndex, state: &StaticState) -> StaticState {
        match self {
            Connective::And => assert_returned_false(cx, operand, state),
            Connective::Or => assert_returned_true(cx, operand, state),
        }
    }

    /// Outcome where every operand continued: `and` true, `or` false.
    fn all_continue(self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> StaticState {
        self.operands(cx, node)
            .iter()
            .fold(state.clone(), |s, &op| self.continue_state(cx, op, &s))
    }

    /// Outcome where some operand stopped: join over the stopping position.
    fn some_stop(self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> StaticState {
        let operands = self.operands(cx, node);
        let mut alternatives = Vec::with_capacity(operands.len());
        let mut prefix = state.clone();
        for &op in operands {
            alternatives.push(self.stop_state(cx, op, &prefix));
            prefix = self.continue_state(cx, op, &prefix);
        }
        if alternatives.is_empty() {
            return state.invalidate_until_exit_operation();
        }
        trace!(alternatives = alternatives.len(), "join short-circuit outcomes");
        StaticState::intersect_all_alternatives(&alternatives, cx.types)
    }

    fn validate(
        self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let mut ok = true;
        let mut prefix = state.clone();
        for (i, &op) in self.operands(cx, node).iter().enumerate() {
            ok &= validate_boolean_operand(cx, op, &prefix, Some(i), acceptor);
            prefix = self.continue_state(cx, op, &prefix);
        }
        ok
    }

    fn compile(
        self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        sink: &mut dyn EmissionSink,
    ) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut prefix = state.clone();
        for &op in self.operands(cx, node) {
            let mut buffer = StatementBuffer::new();
            let text = super::compile(cx, op, &prefix, &mut buffer);
            for member in buffer.take_members() {
                sink.emit_member(member);
            }
            let statements = buffer.take_statements();
            if parts.is_empty() || statements.is_empty() {
                for statement in statements {
                    sink.emit_statement(statement);
                }
                parts.push(text);
            } else {
                let temp = cx.fresh_condition_temp();
                trace!(temp = %temp, statements = statements.len(), "guard operand statements");
                sink.emit_statement(format!("boolean {temp} = {};", self.join(&parts)));
                let mut guarded = statements;
                guarded.push(format!("{temp} = {text};"));
                sink.emit_statement(block(&self.guard(&temp), &guarded));
                parts = vec![temp];
            }
            prefix = self.continue_state(cx, op, &prefix);
        }
        self.join(&parts)
    }

    fn join(self, parts: &[String]) -> String {
        format!("({})", parts.join(self.java_operator()))
    }

    /// Header of the block evaluating a later operand.
    fn guard(self, temp: &str) -> String {
        match self {
            Connective::And => format!("if ({temp})"),
            Connective::Or => format!("if (!{temp})"),
        }
    }

    fn advance(self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> StaticState {
        let outcomes = [
            self.all_continue(cx, node, state),
            self.some_stop(cx, node, state),
        ];
        StaticState::intersect_all_alternatives(&outcomes, cx.types)
    }
}

/// Validate `operand` and require it to be boolean.
pub(crate) fn validate_boolean_operand(
    cx: &CheckerContext<'_>,
    operand: NodeIndex,
    state: &StaticState,
    index: Option<usize>,
    acceptor: &mut dyn DiagnosticAcceptor,
) -> bool {
    if !super::validate(cx, operand, state, acceptor) {
        return false;
    }
    let ty = infer_type(cx, operand, state);
    if cx.is_assignable(ty, TypeId::BOOLEAN) {
        return true;
    }
    acceptor.accept_error(
        format!("Expected a boolean operand, found '{}'", cx.format_type(ty)),
        cx.span(operand),
        Some("operand"),
        index,
        DiagnosticCode::InvalidOperandType,
    );
    false
}

macro_rules! connective_semantics {
    ($name:ident, $connective:expr, $on_true:ident, $on_false:ident) => {
        pub(super) struct $name;

        impl ExpressionSemantics for $name {
            fn infer_type(&self, _cx: &CheckerContext<'_>, _node: NodeIndex, _state: &StaticState) -> TypeId {
                TypeId::BOOLEAN
            }

            fn compile(
                &self,
                cx: &CheckerContext<'_>,
                node: NodeIndex,
                state: &StaticState,
                sink: &mut dyn EmissionSink,
            ) -> String {
                $connective.compile(cx, node, state, sink)
            }

            fn validate(
                &self,
                cx: &CheckerContext<'_>,
                node: NodeIndex,
                state: &StaticState,
                acceptor: &mut dyn DiagnosticAcceptor,
            ) -> bool {
                $connective.validate(cx, node, state, acceptor)
            }

            fn advance(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> StaticState {
                $connective.advance(cx, node, state)
            }

            fn assert_returned_true(
                &self,
                cx: &CheckerContext<'_>,
                node: NodeIndex,
                state: &StaticState,
            ) -> StaticState {
                $connective.$on_true(cx, node, state)
            }

            fn assert_returned_false(
                &self,
                cx: &CheckerContext<'_>,
                node: NodeIndex,
                state: &StaticState,
            ) -> StaticState {
                $connective.$on_false(cx, node, state)
            }
        }
    };
}

connective_semantics!(AndSemantics, Connective::And, all_continue, some_stop);
connective_semantics!(OrSemantics, Connective::Or, some_stop, all_continue);

/// `not operand`: swaps the true and false outcomes.
pub(super) struct NotSemantics;

impl NotSemantics {
    fn operand(cx: &CheckerContext<'_>, node: NodeIndex) -> Option<NodeIndex> {
        match cx.arena.kind(node) {
            Some(ExprKind::Not(operand)) => Some(*operand),
            _ => None,
        }
    }
}

impl ExpressionSemantics for NotSemantics {
    fn infer_type(&self, _cx: &CheckerContext<'_>, _node: NodeIndex, _state: &StaticState) -> TypeId {
        TypeId::BOOLEAN
    }

    fn compile(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        sink: &mut dyn EmissionSink,
    ) -> String {
        match Self::operand(cx, node) {
            Some(operand) => format!("(!{})", super::compile(cx, operand, state, sink)),
            None => super::unresolved_placeholder("operand"),
        }
    }

    fn validate(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        Self::operand(cx, node)
            .is_some_and(|operand| validate_boolean_operand(cx, operand, state, None, acceptor))
    }

    fn assert_returned_true(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
    ) -> StaticState {
        match Self::operand(cx, node) {
            Some(operand) => assert_returned_false(cx, operand, state),
            None => state.clone(),
        }
    }

    fn assert_returned_false(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
    ) -> StaticState {
        match Self::operand(cx, node) {
            Some(operand) => assert_returned_true(cx, operand, state),
            None => state.clone(),
        }
    }
}
