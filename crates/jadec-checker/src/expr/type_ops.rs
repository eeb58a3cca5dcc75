//! `is` type tests and `as` conversions.

use super::{ExpressionSemantics, advance, describe_expression, infer_type};
use crate::context::CheckerContext;
use crate::state::StaticState;
use crate::type_node::{resolve_type, resolve_type_silently};
use jadec_ast::{ExprKind, NodeIndex, TypeExpr};
use jadec_common::DiagnosticCode;
use jadec_common::diagnostics::DiagnosticAcceptor;
use jadec_emitter::EmissionSink;
use jadec_solver::TypeId;
use tracing::trace;

fn operand_and_type<'n>(cx: &'n CheckerContext<'_>, node: NodeIndex) -> Option<(NodeIndex, &'n TypeExpr)> {
    match cx.arena.kind(node) {
        Some(ExprKind::TypeTest { operand, ty } | ExprKind::Cast { operand, ty }) => Some((*operand, ty)),
        _ => None,
    }
}

/// Type a value of type `current` has after passing a test for `tested`.
pub(crate) fn narrow_to(cx: &CheckerContext<'_>, current: TypeId, tested: TypeId) -> TypeId {
    if current.is_error() || tested.is_error() {
        return tested;
    }
    match cx.glb(current, tested) {
        TypeId::NOTHING => tested,
        narrowed => narrowed,
    }
}

/// `operand is T`
pub(super) struct TypeTestSemantics;

impl ExpressionSemantics for TypeTestSemantics {
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
        let Some((operand, ty)) = operand_and_type(cx, node) else {
            return super::unresolved_placeholder("type test");
        };
        let tested = resolve_type_silently(cx, ty);
        let value = super::compile(cx, operand, state, sink);
        if tested == TypeId::ANY {
            format!("({value} != null)")
        } else {
            format!("({value} instanceof {})", cx.host_class(tested))
        }
    }

    fn validate(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let Some((operand, ty)) = operand_and_type(cx, node) else {
            return false;
        };
        if !super::validate(cx, operand, state, acceptor) {
            return false;
        }
        let tested = resolve_type(cx, ty, acceptor);
        let current = infer_type(cx, operand, state);
        if tested.is_error() || current.is_error() || cx.compare(current, tested).is_related() {
            return !tested.is_error();
        }
        acceptor.accept_error(
            format!(
                "A value of type '{}' can never be of type '{}'",
                cx.format_type(current),
                cx.format_type(tested)
            ),
            cx.span(node),
            Some("type"),
            None,
            DiagnosticCode::InvalidCast,
        );
        false
    }

    fn assert_returned_true(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
    ) -> StaticState {
        let Some((operand, ty)) = operand_and_type(cx, node) else {
            return state.clone();
        };
        let after = advance(cx, operand, state);
        let Some(descriptor) = describe_expression(cx, operand, state) else {
            return after;
        };
        let current = infer_type(cx, operand, state);
        let narrowed = narrow_to(cx, current, resolve_type_silently(cx, ty));
        trace!(?descriptor, narrowed = narrowed.0, "type test narrows");
        after.assert_flow_type(descriptor, narrowed)
    }
}

/// `operand as T`
pub(super) struct CastSemantics;

impl CastSemantics {
    fn is_conversion_allowed(cx: &CheckerContext<'_>, from: TypeId, to: TypeId) -> bool {
        from.is_error()
            || to.is_error()
            || to == TypeId::TEXT
            || matches!((from, to), (TypeId::REAL, TypeId::INTEGER) | (TypeId::INTEGER, TypeId::REAL))
            || cx.compare(from, to).is_related()
    }
}

impl ExpressionSemantics for CastSemantics {
    fn infer_type(&self, cx: &CheckerContext<'_>, node: NodeIndex, _state: &StaticState) -> TypeId {
        operand_and_type(cx, node).map_or(TypeId::ERROR, |(_, ty)| resolve_type_silently(cx, ty))
    }

    fn compile(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        sink: &mut dyn EmissionSink,
    ) -> String {
        let Some((operand, ty)) = operand_and_type(cx, node) else {
            return super::unresolved_placeholder("cast");
        };
        let target = resolve_type_silently(cx, ty);
        let from = infer_type(cx, operand, state);
        let value = super::compile(cx, operand, state, sink);
        match (from, target) {
            (from, to) if from == to => value,
            (TypeId::INTEGER, TypeId::REAL) => format!("((float) ({value}))"),
            (TypeId::REAL, TypeId::INTEGER) => format!("((int) (float) ({value}))"),
            (_, TypeId::TEXT) => format!("java.lang.String.valueOf({value})"),
            _ => format!("(({}) ({value}))", cx.host_type(target)),
        }
    }

    fn validate(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let Some((operand, ty)) = operand_and_type(cx, node) else {
            return false;
        };
        if !super::validate(cx, operand, state, acceptor) {
            return false;
        }
        let target = resolve_type(cx, ty, acceptor);
        if target.is_error() {
            return false;
        }
        let from = infer_type(cx, operand, state);
        if Self::is_conversion_allowed(cx, from, target) {
            return true;
        }
        acceptor.accept_error(
            format!(
                "Cannot convert a value of type '{}' to '{}'",
                cx.format_type(from),
                cx.format_type(target)
            ),
            cx.span(node),
            Some("type"),
            None,
            DiagnosticCode::InvalidCast,
        );
        false
    }

    fn is_holed(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
        operand_and_type(cx, node).is_some_and(|(operand, _)| super::is_holed(cx, operand, state))
    }
}
