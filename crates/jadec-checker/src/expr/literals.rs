use super::ExpressionSemantics;
use crate::context::CheckerContext;
use crate::state::StaticState;
use jadec_ast::{ExprKind, NodeIndex};
use jadec_common::diagnostics::DiagnosticAcceptor;
use jadec_emitter::{EmissionSink, java_string_literal};
use jadec_solver::TypeId;

/// Integer, real, boolean and text literals.
pub(super) struct LiteralSemantics;

impl ExpressionSemantics for LiteralSemantics {
    fn infer_type(&self, cx: &CheckerContext<'_>, node: NodeIndex, _state: &StaticState) -> TypeId {
        match cx.arena.kind(node) {
            Some(ExprKind::IntegerLiteral(_)) => TypeId::INTEGER,
            Some(ExprKind::RealLiteral(_)) => TypeId::REAL,
            Some(ExprKind::BooleanLiteral(_)) => TypeId::BOOLEAN,
            Some(ExprKind::TextLiteral(_)) => TypeId::TEXT,
            _ => TypeId::ERROR,
        }
    }

    fn compile(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        _state: &StaticState,
        _sink: &mut dyn EmissionSink,
    ) -> String {
        match cx.arena.kind(node) {
            Some(ExprKind::IntegerLiteral(v)) if *v < 0 => format!("({v})"),
            Some(ExprKind::IntegerLiteral(v)) => v.to_string(),
            Some(ExprKind::RealLiteral(v)) => real_literal(*v),
            Some(ExprKind::BooleanLiteral(b)) => b.to_string(),
            Some(ExprKind::TextLiteral(s)) => java_string_literal(s),
            _ => super::unresolved_placeholder("literal"),
        }
    }

    fn validate(
        &self,
        _cx: &CheckerContext<'_>,
        _node: NodeIndex,
        _state: &StaticState,
        _acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        true
    }

    fn advance(&self, _cx: &CheckerContext<'_>, _node: NodeIndex, state: &StaticState) -> StaticState {
        state.clone()
    }

    // A literal that cannot have the asserted value makes the path dead.

    fn assert_returned_true(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
    ) -> StaticState {
        match cx.arena.kind(node) {
            Some(ExprKind::BooleanLiteral(false)) => state.invalidate_until_exit_operation(),
            _ => state.clone(),
        }
    }

    fn assert_returned_false(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
    ) -> StaticState {
        match cx.arena.kind(node) {
            Some(ExprKind::BooleanLiteral(true)) => state.invalidate_until_exit_operation(),
            _ => state.clone(),
        }
    }

    fn is_without_side_effects(
        &self,
        _cx: &CheckerContext<'_>,
        _node: NodeIndex,
        _state: &StaticState,
    ) -> bool {
        true
    }
}

fn real_literal(value: f64) -> String {
    if value.is_nan() {
        "java.lang.Float.NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "java.lang.Float.POSITIVE_INFINITY".to_string()
        } else {
            "java.lang.Float.NEGATIVE_INFINITY".to_string()
        }
    } else if value < 0.0 {
        format!("({value:?}f)")
    } else {
        format!("{value:?}f")
    }
}
