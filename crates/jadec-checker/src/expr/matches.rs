//! `scrutinee matches pattern`

use super::{ExpressionSemantics, advance, describe_expression, infer_type};
use crate::context::CheckerContext;
use crate::patterns::{self, PatternMatchInput, PatternMode};
use crate::state::StaticState;
use jadec_ast::{ExprKind, NodeIndex};
use jadec_common::diagnostics::DiagnosticAcceptor;
use jadec_emitter::EmissionSink;
use jadec_solver::TypeId;

fn parts(cx: &CheckerContext<'_>, node: NodeIndex) -> Option<(NodeIndex, NodeIndex)> {
    match cx.arena.kind(node) {
        Some(ExprKind::Matches { scrutinee, pattern }) => Some((*scrutinee, *pattern)),
        _ => None,
    }
}

/// The pattern's input: matched against the scrutinee's type, in the state
/// after the scrutinee was evaluated.
fn pattern_input(
    cx: &CheckerContext<'_>,
    scrutinee: NodeIndex,
    pattern: NodeIndex,
    state: &StaticState,
) -> (PatternMatchInput, StaticState) {
    let provided = infer_type(cx, scrutinee, state);
    let mode = PatternMode::boolean_expression().with_options(&cx.options);
    (
        PatternMatchInput::root(cx, pattern, mode, provided),
        advance(cx, scrutinee, state),
    )
}

pub(super) struct MatchesSemantics;

impl ExpressionSemantics for MatchesSemantics {
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
        let Some((scrutinee, pattern)) = parts(cx, node) else {
            return super::unresolved_placeholder("matches");
        };
        let value = super::compile(cx, scrutinee, state, sink);
        let (input, after) = pattern_input(cx, scrutinee, pattern, state);
        patterns::compile_pattern(cx, &input, &after, sink).result.call(&value)
    }

    fn validate(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let Some((scrutinee, pattern)) = parts(cx, node) else {
            return false;
        };
        // An invalid scrutinee has type `error`; the pattern is still walked.
        let scrutinee_ok = super::validate(cx, scrutinee, state, acceptor);
        let (input, after) = pattern_input(cx, scrutinee, pattern, state);
        let pattern_ok = patterns::validate_pattern(cx, &input, &after, acceptor).result;
        scrutinee_ok && pattern_ok
    }

    fn advance(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> StaticState {
        match parts(cx, node) {
            Some((scrutinee, _)) => advance(cx, scrutinee, state),
            None => state.clone(),
        }
    }

    fn assert_returned_true(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> StaticState {
        let Some((scrutinee, pattern)) = parts(cx, node) else {
            return state.clone();
        };
        let descriptor = describe_expression(cx, scrutinee, state);
        let (input, after) = pattern_input(cx, scrutinee, pattern, state);
        patterns::assert_did_match(cx, &input, descriptor, &after)
    }

    fn is_without_side_effects(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
        parts(cx, node).is_some_and(|(scrutinee, pattern)| {
            super::is_without_side_effects(cx, scrutinee, state)
                && patterns::is_pattern_pure(cx, pattern, &advance(cx, scrutinee, state))
        })
    }
}
