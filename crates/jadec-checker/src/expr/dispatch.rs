//! Dispatch from node kinds to their semantics.

use super::calls::CallSemantics;
use super::collections::{ListSemantics, MapSemantics, SetSemantics, TupleSemantics};
use super::lambda::LambdaSemantics;
use super::literals::LiteralSemantics;
use super::logical::{AndSemantics, NotSemantics, OrSemantics};
use super::matches::MatchesSemantics;
use super::names::{NameSemantics, PlaceholderSemantics, PropertySemantics};
use super::operators::{ArithmeticSemantics, ComparisonSemantics, NegateSemantics};
use super::type_ops::{CastSemantics, TypeTestSemantics};
use super::{ExpressionSemantics, report};
use crate::context::CheckerContext;
use crate::state::{ExpressionDescriptor, StaticState};
use jadec_ast::{ExprKind, NodeIndex};
use jadec_common::DiagnosticCode;
use jadec_common::diagnostics::DiagnosticAcceptor;
use jadec_emitter::EmissionSink;
use jadec_solver::TypeId;
use tracing::trace;

/// Entry point of expression semantics: unwraps thin wrappers and
/// dispatches on the node kind.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExpressionDispatcher;

/// What a node resolves to after unwrapping parentheses.
enum Target {
    Semantics(NodeIndex, &'static dyn ExpressionSemantics),
    Missing,
}

impl ExpressionDispatcher {
    /// Skip thin wrappers down to the node that carries semantics.
    pub fn traverse(cx: &CheckerContext<'_>, mut node: NodeIndex) -> NodeIndex {
        while let Some(ExprKind::Parenthesized(inner)) = cx.arena.kind(node) {
            node = *inner;
        }
        node
    }

    fn target(cx: &CheckerContext<'_>, node: NodeIndex) -> Target {
        let node = Self::traverse(cx, node);
        let Some(kind) = cx.arena.kind(node) else {
            return Target::Missing;
        };
        let semantics: &'static dyn ExpressionSemantics = match kind {
            ExprKind::IntegerLiteral(_)
            | ExprKind::RealLiteral(_)
            | ExprKind::BooleanLiteral(_)
            | ExprKind::TextLiteral(_) => &LiteralSemantics,
            ExprKind::Name(_) => &NameSemantics,
            ExprKind::Placeholder => &PlaceholderSemantics,
            ExprKind::PropertyAccess { .. } => &PropertySemantics,
            ExprKind::And(_) => &AndSemantics,
            ExprKind::Or(_) => &OrSemantics,
            ExprKind::Not(_) => &NotSemantics,
            ExprKind::Comparison { .. } => &ComparisonSemantics,
            ExprKind::Arithmetic { .. } => &ArithmeticSemantics,
            ExprKind::Negate(_) => &NegateSemantics,
            ExprKind::TypeTest { .. } => &TypeTestSemantics,
            ExprKind::Cast { .. } => &CastSemantics,
            ExprKind::Call { .. } => &CallSemantics,
            ExprKind::TupleLiteral(_) => &TupleSemantics,
            ExprKind::ListLiteral { .. } => &ListSemantics,
            ExprKind::MapLiteral { .. } => &MapSemantics,
            ExprKind::SetLiteral { .. } => &SetSemantics,
            ExprKind::Matches { .. } => &MatchesSemantics,
            ExprKind::Lambda { .. } => &LambdaSemantics,
            ExprKind::Parenthesized(_) => return Target::Missing,
        };
        Target::Semantics(node, semantics)
    }

    fn is_parenthesized(cx: &CheckerContext<'_>, node: NodeIndex) -> bool {
        matches!(cx.arena.kind(node), Some(ExprKind::Parenthesized(_)))
    }
}

impl ExpressionSemantics for ExpressionDispatcher {
    fn infer_type(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> TypeId {
        self.infer_type_expecting(cx, node, state, None)
    }

    fn infer_type_expecting(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        expected: Option<TypeId>,
    ) -> TypeId {
        let Target::Semantics(node, semantics) = Self::target(cx, node) else {
            return TypeId::ERROR;
        };
        if !cx.enter_nesting() {
            return TypeId::ERROR;
        }
        let result = semantics.infer_type_expecting(cx, node, state, expected);
        cx.leave_nesting();
        result
    }

    fn compile(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        sink: &mut dyn EmissionSink,
    ) -> String {
        self.compile_expecting(cx, node, state, None, sink)
    }

    fn compile_expecting(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        expected: Option<TypeId>,
        sink: &mut dyn EmissionSink,
    ) -> String {
        let wrapped = Self::is_parenthesized(cx, node);
        let Target::Semantics(node, semantics) = Self::target(cx, node) else {
            return super::unresolved_placeholder("expression");
        };
        if !cx.enter_nesting() {
            return super::unresolved_placeholder("expression");
        }
        trace!(node = node.0, "compile expression");
        let text = semantics.compile_expecting(cx, node, state, expected, sink);
        cx.leave_nesting();
        if wrapped { format!("({text})") } else { text }
    }

    fn validate(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        self.validate_expecting(cx, node, state, None, acceptor)
    }

    fn validate_expecting(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        expected: Option<TypeId>,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let Target::Semantics(node, semantics) = Self::target(cx, node) else {
            return false;
        };
        if !cx.enter_nesting() {
            report(
                cx,
                acceptor,
                node,
                DiagnosticCode::InvalidOperandType,
                "Expression is nested too deeply to be checked".to_string(),
            );
            return false;
        }
        let ok = semantics.validate_expecting(cx, node, state, expected, acceptor);
        cx.leave_nesting();
        ok
    }

    fn advance(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> StaticState {
        match Self::target(cx, node) {
            Target::Semantics(node, semantics) => semantics.advance(cx, node, state),
            Target::Missing => state.clone(),
        }
    }

    fn describe_expression(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
    ) -> Option<ExpressionDescriptor> {
        match Self::target(cx, node) {
            Target::Semantics(node, semantics) => semantics.describe_expression(cx, node, state),
            Target::Missing => None,
        }
    }

    fn assert_returned_true(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
    ) -> StaticState {
        match Self::target(cx, node) {
            Target::Semantics(node, semantics) => semantics.assert_returned_true(cx, node, state),
            Target::Missing => state.clone(),
        }
    }

    fn assert_returned_false(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
    ) -> StaticState {
        match Self::target(cx, node) {
            Target::Semantics(node, semantics) => semantics.assert_returned_false(cx, node, state),
            Target::Missing => state.clone(),
        }
    }

    fn is_without_side_effects(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
    ) -> bool {
        match Self::target(cx, node) {
            Target::Semantics(node, semantics) => semantics.is_without_side_effects(cx, node, state),
            Target::Missing => true,
        }
    }

    fn is_holed(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
        match Self::target(cx, node) {
            Target::Semantics(node, semantics) => semantics.is_holed(cx, node, state),
            Target::Missing => false,
        }
    }

    fn is_typely_holed(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
        match Self::target(cx, node) {
            Target::Semantics(node, semantics) => semantics.is_typely_holed(cx, node, state),
            Target::Missing => false,
        }
    }

    fn is_unbound(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
        match Self::target(cx, node) {
            Target::Semantics(node, semantics) => semantics.is_unbound(cx, node, state),
            Target::Missing => false,
        }
    }
}
