//! Expression Semantics
//!
//! Every expression kind implements [`ExpressionSemantics`]. The operations
//! share one convention: `state` is the state *before* the expression is
//! evaluated, and each sub-expression is handled in the state produced by
//! its left siblings.
//!
//! | Operation | Result |
//! |-----------|--------|
//! | `infer_type` | static type of the value |
//! | `validate` | `true` when no error was reported |
//! | `compile` | Java expression text (auxiliary statements go to the sink) |
//! | `advance` | state after evaluation |
//! | `assert_returned_true` / `false` | state after evaluation, given the boolean outcome |
//!
//! [`ExpressionDispatcher`] resolves thin wrappers (parentheses) and
//! dispatches on the node kind.

mod calls;
mod collections;
mod dispatch;
mod lambda;
mod literals;
mod logical;
mod matches;
mod names;
mod operators;
mod type_ops;

pub use calls::{CallResolution, resolve_call_target};
pub use dispatch::ExpressionDispatcher;
pub use lambda::{Capture, capture_list};
pub(crate) use calls::{check_argument_style, map_arguments, report_ambiguity};
pub(crate) use lambda::captures_of;
pub(crate) use type_ops::narrow_to;

use crate::context::CheckerContext;
use crate::state::{ExpressionDescriptor, StaticState};
use jadec_ast::NodeIndex;
use jadec_common::diagnostics::DiagnosticAcceptor;
use jadec_emitter::EmissionSink;
use jadec_solver::TypeId;

/// The per-kind contract of expression semantics.
pub trait ExpressionSemantics {
    fn infer_type(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> TypeId;

    /// Type inference that may use a contextual expected type.
    fn infer_type_expecting(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        _expected: Option<TypeId>,
    ) -> TypeId {
        self.infer_type(cx, node, state)
    }

    fn compile(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        sink: &mut dyn EmissionSink,
    ) -> String;

    fn compile_expecting(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        _expected: Option<TypeId>,
        sink: &mut dyn EmissionSink,
    ) -> String {
        self.compile(cx, node, state, sink)
    }

    fn validate(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool;

    fn validate_expecting(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        _expected: Option<TypeId>,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        self.validate(cx, node, state, acceptor)
    }

    /// Evaluate the children left to right.
    fn advance(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> StaticState {
        advance_children(cx, node, state)
    }

    fn describe_expression(
        &self,
        _cx: &CheckerContext<'_>,
        _node: NodeIndex,
        _state: &StaticState,
    ) -> Option<ExpressionDescriptor> {
        None
    }

    fn assert_returned_true(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
    ) -> StaticState {
        self.advance(cx, node, state)
    }

    fn assert_returned_false(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
    ) -> StaticState {
        self.advance(cx, node, state)
    }

    /// Pure iff every child is pure.
    fn is_without_side_effects(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
    ) -> bool {
        let mut state = state.clone();
        for child in children(cx, node) {
            if !is_without_side_effects(cx, child, &state) {
                return false;
            }
            state = advance(cx, child, &state);
        }
        true
    }

    /// Contains a hole when read as a pattern.
    fn is_holed(&self, _cx: &CheckerContext<'_>, _node: NodeIndex, _state: &StaticState) -> bool {
        false
    }

    /// The pattern's type depends on the type of the matched value.
    fn is_typely_holed(
        &self,
        _cx: &CheckerContext<'_>,
        _node: NodeIndex,
        _state: &StaticState,
    ) -> bool {
        false
    }

    /// A name with no binding in scope.
    fn is_unbound(&self, _cx: &CheckerContext<'_>, _node: NodeIndex, _state: &StaticState) -> bool {
        false
    }
}

// =============================================================================
// Entry points
// =============================================================================

pub fn infer_type(cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> TypeId {
    ExpressionDispatcher.infer_type(cx, node, state)
}

pub fn infer_type_expecting(
    cx: &CheckerContext<'_>,
    node: NodeIndex,
    state: &StaticState,
    expected: Option<TypeId>,
) -> TypeId {
    ExpressionDispatcher.infer_type_expecting(cx, node, state, expected)
}

pub fn compile(
    cx: &CheckerContext<'_>,
    node: NodeIndex,
    state: &StaticState,
    sink: &mut dyn EmissionSink,
) -> String {
    ExpressionDispatcher.compile(cx, node, state, sink)
}

pub fn compile_expecting(
    cx: &CheckerContext<'_>,
    node: NodeIndex,
    state: &StaticState,
    expected: Option<TypeId>,
    sink: &mut dyn EmissionSink,
) -> String {
    ExpressionDispatcher.compile_expecting(cx, node, state, expected, sink)
}

pub fn validate(
    cx: &CheckerContext<'_>,
    node: NodeIndex,
    state: &StaticState,
    acceptor: &mut dyn DiagnosticAcceptor,
) -> bool {
    ExpressionDispatcher.validate(cx, node, state, acceptor)
}

pub fn validate_expecting(
    cx: &CheckerContext<'_>,
    node: NodeIndex,
    state: &StaticState,
    expected: Option<TypeId>,
    acceptor: &mut dyn DiagnosticAcceptor,
) -> bool {
    ExpressionDispatcher.validate_expecting(cx, node, state, expected, acceptor)
}

pub fn advance(cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> StaticState {
    ExpressionDispatcher.advance(cx, node, state)
}

pub fn describe_expression(
    cx: &CheckerContext<'_>,
    node: NodeIndex,
    state: &StaticState,
) -> Option<ExpressionDescriptor> {
    ExpressionDispatcher.describe_expression(cx, node, state)
}

pub fn assert_returned_true(
    cx: &CheckerContext<'_>,
    node: NodeIndex,
    state: &StaticState,
) -> StaticState {
    ExpressionDispatcher.assert_returned_true(cx, node, state)
}

pub fn assert_returned_false(
    cx: &CheckerContext<'_>,
    node: NodeIndex,
    state: &StaticState,
) -> StaticState {
    ExpressionDispatcher.assert_returned_false(cx, node, state)
}

pub fn is_without_side_effects(
    cx: &CheckerContext<'_>,
    node: NodeIndex,
    state: &StaticState,
) -> bool {
    ExpressionDispatcher.is_without_side_effects(cx, node, state)
}

pub fn is_holed(cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
    ExpressionDispatcher.is_holed(cx, node, state)
}

pub fn is_typely_holed(cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
    ExpressionDispatcher.is_typely_holed(cx, node, state)
}

pub fn is_unbound(cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
    ExpressionDispatcher.is_unbound(cx, node, state)
}

// =============================================================================
// Shared helpers
// =============================================================================

fn children(cx: &CheckerContext<'_>, node: NodeIndex) -> smallvec::SmallVec<[NodeIndex; 4]> {
    cx.arena
        .kind(node)
        .map(jadec_ast::ExprKind::children)
        .unwrap_or_default()
}

/// Thread `state` through the children of `node` in evaluation order.
pub(crate) fn advance_children(
    cx: &CheckerContext<'_>,
    node: NodeIndex,
    state: &StaticState,
) -> StaticState {
    children(cx, node)
        .into_iter()
        .fold(state.clone(), |s, child| advance(cx, child, &s))
}

/// Validate `nodes` in sequence; every node is validated even after a
/// failure so all diagnostics surface.
pub(crate) fn validate_sequence(
    cx: &CheckerContext<'_>,
    nodes: &[NodeIndex],
    state: &StaticState,
    acceptor: &mut dyn DiagnosticAcceptor,
) -> (bool, StaticState) {
    let mut ok = true;
    let mut state = state.clone();
    for &node in nodes {
        ok &= validate(cx, node, &state, acceptor);
        state = advance(cx, node, &state);
    }
    (ok, state)
}

/// Types of `nodes` evaluated in sequence.
pub(crate) fn infer_sequence(
    cx: &CheckerContext<'_>,
    nodes: &[NodeIndex],
    state: &StaticState,
) -> (Vec<TypeId>, StaticState) {
    let mut types = Vec::with_capacity(nodes.len());
    let mut state = state.clone();
    for &node in nodes {
        types.push(infer_type(cx, node, &state));
        state = advance(cx, node, &state);
    }
    (types, state)
}

/// Compiled texts of `nodes` evaluated in sequence.
pub(crate) fn compile_sequence(
    cx: &CheckerContext<'_>,
    nodes: &[NodeIndex],
    state: &StaticState,
    sink: &mut dyn EmissionSink,
) -> (Vec<String>, StaticState) {
    let mut texts = Vec::with_capacity(nodes.len());
    let mut state = state.clone();
    for &node in nodes {
        texts.push(compile(cx, node, &state, sink));
        state = advance(cx, node, &state);
    }
    (texts, state)
}

/// Report `message` on `node` as an error.
pub(crate) fn report(
    cx: &CheckerContext<'_>,
    acceptor: &mut dyn DiagnosticAcceptor,
    node: NodeIndex,
    code: jadec_common::DiagnosticCode,
    message: String,
) {
    acceptor.accept_error(message, cx.span(node), None, None, code);
}

/// Degraded Java text for an expression that failed to resolve.
pub(crate) fn unresolved_placeholder(what: &str) -> String {
    format!("null /* unresolved {} */", what.replace("*/", "* /"))
}
